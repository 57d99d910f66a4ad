//! bundle-cache: resolve, track and cache the artifacts of an OSGi assembly
//!
//! An assembly (a composite archive such as a subsystem or a deployment package) embeds or
//! references bundles coming from several places. This crate resolves them, decides for each one
//! whether it is cached and whether it is embedded, names the cached copies and keeps the cache
//! up to date, packing modules of the same build on the fly.
//!
//! # Architecture Overview
//!
//! - A [`session::BuildSession`] describes the project: its resolved dependencies and the
//!   modules built alongside it.
//! - Artifact sets ([`artifact::RepositorySet`], [`artifact::RemoteIndexSet`],
//!   [`artifact::PropertiesSet`]) declare additional artifacts and where to cache them.
//! - The [`resolver::TrackerManager`] runs the resolution pass and owns one
//!   [`tracker::Tracker`] per artifact version.
//! - [`handler::TypeHandler`]s carry the per-type rules: manifest location, required headers,
//!   extension and archiver.
//! - The copy phases bring the cache up to date and report what they did.
//!
//! # Core Modules
//!
//! ## Resolution
//! - [`resolver`] - Tracker manager: resolution pass, queries, copy phases
//! - [`tracker`] - Per-artifact records and their builder
//! - [`session`] - Input of a resolution pass
//! - [`artifact`] - Coordinates, references and artifact sets
//!
//! ## Artifact Types
//! - [`handler`] - Type handlers and their registry
//! - [`manifest`] - JAR manifest reading
//! - [`archiver`] - ZIP archivers packing workspace output
//! - [`naming`] - Cache file naming patterns
//!
//! ## Sources
//! - [`repository`] - Repository system abstraction and a local Maven-layout implementation
//! - [`utils`] - File system helpers and the download transport
//!
//! ## Surface
//! - [`config`] - `bundle-cache.toml`
//! - [`cli`] - Command-line interface
//! - [`core`] - Error types and user-facing error rendering
//! - [`constants`] - Shared defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use bundle_cache::artifact::ArtifactCoordinates;
//! use bundle_cache::repository::LocalRepository;
//! use bundle_cache::resolver::TrackerManager;
//! use bundle_cache::session::{BuildSession, ResolvedArtifact};
//!
//! # fn example() -> anyhow::Result<()> {
//! let session = BuildSession::new(ArtifactCoordinates::new("com.acme", "dist", "1.0"), ".")
//!     .with_dependency(ResolvedArtifact::new(
//!         ArtifactCoordinates::new("org.apache.felix", "org.apache.felix.scr", "2.2.6"),
//!         "compile",
//!     ));
//!
//! let mut manager = TrackerManager::builder()
//!     .with_repository_system(Box::new(LocalRepository::new("/home/me/.m2/repository")))
//!     .with_cache_directory("target/bundle-cache")
//!     .filtering()
//!     .with_embed_scopes(vec!["compile".to_string()])
//!     .remote_index()
//!     .operational()
//!     .build()?;
//!
//! manager.resolve_all(&session)?;
//! let report = manager.cache_all()?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod archiver;
pub mod artifact;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod handler;
pub mod manifest;
pub mod naming;
pub mod repository;
pub mod resolver;
pub mod session;
pub mod tracker;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
