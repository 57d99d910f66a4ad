//! Staged construction of a [`TrackerManager`].
//!
//! Settings are grouped in four stages that must be visited in order:
//!
//! 1. [`MavenSetup`]: repository system, cache directory, repository sets
//! 2. [`FilteringSetup`]: scopes, transitive and optional inclusion, exclusions
//! 3. [`RemoteIndexSetup`]: remote index sets, URL override, offline mode, timeout
//! 4. [`OperationalSetup`]: naming pattern, grouping, properties sets, archivers, verbosity
//!
//! Moving to the next stage consumes the builder, so a stage cannot be revisited. Validation
//! happens in [`TrackerManagerBuilder::build`], before any I/O.

use super::{ResolutionConfig, TrackerManager};
use crate::archiver::{ArchiverFactory, ZipArchiverFactory};
use crate::artifact::{PropertiesSet, RemoteIndexSet, RepositorySet};
use crate::core::BundleCacheError;
use crate::handler::HandlerRegistry;
use crate::naming::NamingPattern;
use crate::repository::RepositorySystem;
use crate::resolver::filter::FilterChain;
use crate::utils::Transport;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::time::Duration;

/// Stage 1: repository system and repository sets.
#[derive(Debug)]
pub struct MavenSetup;

/// Stage 2: candidate filtering.
#[derive(Debug)]
pub struct FilteringSetup;

/// Stage 3: remote index sets and network behaviour.
#[derive(Debug)]
pub struct RemoteIndexSetup;

/// Stage 4: naming, packaging and reporting.
#[derive(Debug)]
pub struct OperationalSetup;

/// Builder of a [`TrackerManager`], parameterized by its current stage.
#[derive(Debug)]
pub struct TrackerManagerBuilder<S> {
    repository: Option<Box<dyn RepositorySystem>>,
    archivers: Option<Box<dyn ArchiverFactory>>,
    handlers: HandlerRegistry,
    config: ResolutionConfig,
    naming_pattern: Option<String>,
    repository_sets: Vec<RepositorySet>,
    remote_index_sets: Vec<RemoteIndexSet>,
    properties_sets: Vec<PropertiesSet>,
    stage: PhantomData<S>,
}

impl<S> TrackerManagerBuilder<S> {
    fn advance<T>(self) -> TrackerManagerBuilder<T> {
        TrackerManagerBuilder {
            repository: self.repository,
            archivers: self.archivers,
            handlers: self.handlers,
            config: self.config,
            naming_pattern: self.naming_pattern,
            repository_sets: self.repository_sets,
            remote_index_sets: self.remote_index_sets,
            properties_sets: self.properties_sets,
            stage: PhantomData,
        }
    }
}

impl TrackerManagerBuilder<MavenSetup> {
    pub(super) fn new() -> Self {
        Self {
            repository: None,
            archivers: None,
            handlers: HandlerRegistry::default(),
            config: ResolutionConfig::default(),
            naming_pattern: None,
            repository_sets: Vec::new(),
            remote_index_sets: Vec::new(),
            properties_sets: Vec::new(),
            stage: PhantomData,
        }
    }

    /// Repository system resolving files and project models. Required.
    #[must_use]
    pub fn with_repository_system(mut self, repository: Box<dyn RepositorySystem>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Cache root for sets without their own cache directory.
    pub fn with_cache_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config.cache_directory = directory.into();
        self
    }

    #[must_use]
    pub fn with_repository_set(mut self, set: RepositorySet) -> Self {
        self.repository_sets.push(set);
        self
    }

    #[must_use]
    pub fn with_repository_sets(mut self, sets: impl IntoIterator<Item = RepositorySet>) -> Self {
        self.repository_sets.extend(sets);
        self
    }

    /// Replace the default type handlers.
    #[must_use]
    pub fn with_handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    /// Move on to filtering.
    #[must_use]
    pub fn filtering(self) -> TrackerManagerBuilder<FilteringSetup> {
        self.advance()
    }
}

impl TrackerManagerBuilder<FilteringSetup> {
    /// Scopes taking part in resolution; empty accepts every scope.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.config.scopes = scopes;
        self
    }

    #[must_use]
    pub fn with_cache_scopes(mut self, scopes: Vec<String>) -> Self {
        self.config.cache_scopes = scopes;
        self
    }

    #[must_use]
    pub fn with_embed_scopes(mut self, scopes: Vec<String>) -> Self {
        self.config.embed_scopes = scopes;
        self
    }

    #[must_use]
    pub const fn with_transitive(mut self, include_transitive: bool) -> Self {
        self.config.include_transitive = include_transitive;
        self
    }

    #[must_use]
    pub const fn with_optional(mut self, include_optional: bool) -> Self {
        self.config.include_optional = include_optional;
        self
    }

    /// `group:artifact` glob patterns to leave out.
    #[must_use]
    pub fn with_exclusions(mut self, exclusions: Vec<String>) -> Self {
        self.config.exclusions = exclusions;
        self
    }

    /// Move on to remote index setup.
    #[must_use]
    pub fn remote_index(self) -> TrackerManagerBuilder<RemoteIndexSetup> {
        self.advance()
    }
}

impl TrackerManagerBuilder<RemoteIndexSetup> {
    #[must_use]
    pub fn with_remote_index_set(mut self, set: RemoteIndexSet) -> Self {
        self.remote_index_sets.push(set);
        self
    }

    #[must_use]
    pub fn with_remote_index_sets(
        mut self,
        sets: impl IntoIterator<Item = RemoteIndexSet>,
    ) -> Self {
        self.remote_index_sets.extend(sets);
        self
    }

    /// URL used instead of every set's declared URL.
    #[must_use]
    pub fn with_remote_index_override(mut self, url: Option<String>) -> Self {
        self.config.remote_index_override = url.filter(|u| !u.is_empty());
        self
    }

    #[must_use]
    pub const fn with_offline(mut self, offline: bool) -> Self {
        self.config.offline = offline;
        self
    }

    /// Timeout of probes and downloads. Zero keeps the transport default.
    #[must_use]
    pub const fn with_network_timeout(mut self, timeout: Duration) -> Self {
        self.config.network_timeout = timeout;
        self
    }

    /// Move on to operational setup.
    #[must_use]
    pub fn operational(self) -> TrackerManagerBuilder<OperationalSetup> {
        self.advance()
    }
}

impl TrackerManagerBuilder<OperationalSetup> {
    /// Cache file naming pattern, validated by [`build`](Self::build).
    pub fn with_naming_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.naming_pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub const fn with_group_by_type(mut self, group_by_type: bool) -> Self {
        self.config.group_by_type = group_by_type;
        self
    }

    #[must_use]
    pub const fn with_previous_caching_required(mut self, required: bool) -> Self {
        self.config.previous_caching_required = required;
        self
    }

    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    #[must_use]
    pub fn with_properties_set(mut self, set: PropertiesSet) -> Self {
        self.properties_sets.push(set);
        self
    }

    #[must_use]
    pub fn with_properties_sets(mut self, sets: impl IntoIterator<Item = PropertiesSet>) -> Self {
        self.properties_sets.extend(sets);
        self
    }

    /// Archiver factory used to pack workspace projects. Defaults to ZIP archivers.
    #[must_use]
    pub fn with_archiver_factory(mut self, archivers: Box<dyn ArchiverFactory>) -> Self {
        self.archivers = Some(archivers);
        self
    }

    /// Validate the settings and build the manager.
    ///
    /// Fails with [`BundleCacheError::ConfigurationError`] when the repository system is missing
    /// or an exclusion pattern is invalid, and with [`BundleCacheError::InvalidNamingPattern`] for
    /// a bad naming pattern.
    pub fn build(mut self) -> Result<TrackerManager> {
        let Some(repository) = self.repository.take() else {
            return Err(BundleCacheError::ConfigurationError {
                message: "no repository system configured".to_string(),
            }
            .into());
        };

        if let Some(pattern) = &self.naming_pattern {
            self.config.naming_pattern = NamingPattern::parse(pattern)?;
        }

        let filters = FilterChain::new(
            self.config.scopes.clone(),
            self.config.include_optional,
            &self.config.exclusions,
        )
        .map_err(|e| BundleCacheError::ConfigurationError {
            message: format!("{e:#}"),
        })?;

        let transport = Transport::new(self.config.network_timeout)
            .context("Failed to initialize the network transport")?;

        Ok(TrackerManager {
            repository,
            archivers: self.archivers.unwrap_or_else(|| Box::new(ZipArchiverFactory)),
            handlers: self.handlers,
            transport,
            filters,
            config: self.config,
            repository_sets: self.repository_sets,
            remote_index_sets: self.remote_index_sets,
            properties_sets: self.properties_sets,
            trackers: BTreeMap::new(),
        })
    }
}
