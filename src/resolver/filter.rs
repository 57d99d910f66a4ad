//! Artifact filter chain.
//!
//! Every candidate of a resolution pass is checked by the configured filters in order: scope,
//! optional policy, exclusion list, then the caller's own filter. The first filter that rejects an
//! artifact names the reason in the log.

use crate::session::ResolvedArtifact;
use anyhow::{Context, Result};
use glob::Pattern;

/// Decides whether a dependency takes part in a resolution pass.
pub trait ArtifactFilter {
    /// Name used when logging rejections.
    fn name(&self) -> &str;

    /// Whether `artifact` passes.
    fn accepts(&self, artifact: &ResolvedArtifact) -> bool;
}

impl<F> ArtifactFilter for F
where
    F: Fn(&ResolvedArtifact) -> bool,
{
    fn name(&self) -> &str {
        "caller filter"
    }

    fn accepts(&self, artifact: &ResolvedArtifact) -> bool {
        self(artifact)
    }
}

/// Accepts artifacts whose scope is listed; an empty list accepts every scope.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    scopes: Vec<String>,
}

impl ScopeFilter {
    pub fn new(scopes: Vec<String>) -> Self {
        Self {
            scopes,
        }
    }
}

impl ArtifactFilter for ScopeFilter {
    fn name(&self) -> &str {
        "scope filter"
    }

    fn accepts(&self, artifact: &ResolvedArtifact) -> bool {
        self.scopes.is_empty() || self.scopes.iter().any(|s| s == &artifact.scope)
    }
}

/// Rejects optional dependencies unless they are included.
#[derive(Debug, Clone, Copy)]
pub struct OptionalFilter {
    include_optional: bool,
}

impl OptionalFilter {
    pub const fn new(include_optional: bool) -> Self {
        Self {
            include_optional,
        }
    }
}

impl ArtifactFilter for OptionalFilter {
    fn name(&self) -> &str {
        "optional filter"
    }

    fn accepts(&self, artifact: &ResolvedArtifact) -> bool {
        self.include_optional || !artifact.optional
    }
}

/// Rejects artifacts whose `group:artifact` matches one of the glob patterns.
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    patterns: Vec<Pattern>,
}

impl ExclusionFilter {
    /// Compile the exclusion patterns, e.g. `org.osgi:*` or `*:junit`.
    pub fn new(patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::new(p).with_context(|| format!("Invalid exclusion pattern: {p}")))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            patterns,
        })
    }
}

impl ArtifactFilter for ExclusionFilter {
    fn name(&self) -> &str {
        "exclusion list"
    }

    fn accepts(&self, artifact: &ResolvedArtifact) -> bool {
        let key = artifact.coordinates.group_artifact();
        !self.patterns.iter().any(|p| p.matches(&key))
    }
}

/// The configured filters, applied in order.
pub struct FilterChain {
    filters: Vec<Box<dyn ArtifactFilter>>,
}

impl FilterChain {
    /// Chain of scope, optional and exclusion filters.
    pub fn new(scopes: Vec<String>, include_optional: bool, exclusions: &[String]) -> Result<Self> {
        Ok(Self {
            filters: vec![
                Box::new(ScopeFilter::new(scopes)),
                Box::new(OptionalFilter::new(include_optional)),
                Box::new(ExclusionFilter::new(exclusions)?),
            ],
        })
    }

    /// Name of the first filter rejecting `artifact`, the caller's filter last.
    pub fn rejection<'a>(
        &'a self,
        artifact: &ResolvedArtifact,
        caller: Option<&'a dyn ArtifactFilter>,
    ) -> Option<&'a str> {
        if let Some(filter) = self.filters.iter().find(|f| !f.accepts(artifact)) {
            return Some(filter.name());
        }
        caller.filter(|f| !f.accepts(artifact)).map(|f| f.name())
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.filters.iter().map(|filter| filter.name())).finish()
    }
}
