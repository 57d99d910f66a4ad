//! Queries over the tracker set. Every query returns a snapshot ordered by artifact id, then
//! version.

use super::TrackerManager;
use crate::tracker::Tracker;
use std::path::Path;

impl TrackerManager {
    /// Every tracker.
    #[must_use]
    pub fn trackers(&self) -> Vec<Tracker> {
        self.trackers.values().cloned().collect()
    }

    /// Number of trackers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    /// Tracker of one artifact version.
    #[must_use]
    pub fn tracker(&self, artifact_id: &str, version: &str) -> Option<Tracker> {
        self.trackers.get(&(artifact_id.to_string(), version.to_string())).cloned()
    }

    /// Trackers of every version of `artifact_id`.
    #[must_use]
    pub fn find_by_artifact_id(&self, artifact_id: &str) -> Vec<Tracker> {
        self.select(|t| t.artifact_id() == artifact_id)
    }

    /// Trackers whose cached file or original file lies under `prefix`.
    #[must_use]
    pub fn find_by_path_prefix(&self, prefix: &Path) -> Vec<Tracker> {
        self.select(|t| {
            t.cached_file().starts_with(prefix) || t.file().is_some_and(|f| f.starts_with(prefix))
        })
    }

    /// Trackers of a packaging type.
    #[must_use]
    pub fn find_by_type(&self, type_: &str) -> Vec<Tracker> {
        self.select(|t| t.type_() == type_)
    }

    /// Trackers to embed, leaving out the `excluded_types`.
    #[must_use]
    pub fn embeddable(&self, excluded_types: &[&str]) -> Vec<Tracker> {
        self.select(|t| t.is_to_be_embedded() && !excluded_types.contains(&t.type_()))
    }

    /// Trackers not to embed, leaving out the `excluded_types`.
    #[must_use]
    pub fn non_embeddable(&self, excluded_types: &[&str]) -> Vec<Tracker> {
        self.select(|t| !t.is_to_be_embedded() && !excluded_types.contains(&t.type_()))
    }

    /// Trackers whose handler puts them on a build class path.
    #[must_use]
    pub fn build_classpath(&self) -> Vec<Tracker> {
        self.select(|t| t.handler().is_build_classpath_type())
    }

    fn select(&self, predicate: impl Fn(&Tracker) -> bool) -> Vec<Tracker> {
        self.trackers.values().filter(|t| predicate(t)).cloned().collect()
    }
}
