//! Packaging-type handlers.
//!
//! A [`TypeHandler`] is the policy object for one family of packaging types. It knows where the
//! manifest lives inside an archive, which headers carry the symbolic name and version, which
//! type strings and extensions it accepts, where a workspace project keeps its unpacked build
//! output, and whether such output may be packed on the fly.
//!
//! The resolver never branches on packaging types itself: it asks the [`HandlerRegistry`] for a
//! handler and follows the answers. Supporting a new packaging type means adding a handler.
//!
//! | Handler | Types | Extension | Manifest | Pack on the fly |
//! |---|---|---|---|---|
//! | [`BundleHandler`] | `bundle` (`jar` when synthesized) | `jar` | `META-INF/MANIFEST.MF` | yes |
//! | [`SubsystemHandler`] | `esa`, `subsystem-*`, `osgi.subsystem.*` | `esa` | `OSGI-INF/SUBSYSTEM.MF` | yes |
//! | [`DeploymentPackageHandler`] | `dp`, `deployment-package` | `dp` | `META-INF/MANIFEST.MF` | no |
//! | [`IndexZipHandler`] | `index-zip`, `osgi-index` | `zip` | none | yes |
//! | [`RepositoryArchiveHandler`] | `eclipse-repository`, `p2-repository` | `zip` | none | no |
//! | [`DistributionHandler`] | `container-distribution`, `karaf-assembly` | `zip` | none | no |
//! | [`DefaultHandler`] | none | none | never valid | no |

mod archives;
mod bundle;
mod fallback;
mod subsystem;

pub use archives::{
    DeploymentPackageHandler, DistributionHandler, IndexZipHandler, RepositoryArchiveHandler,
};
pub use bundle::BundleHandler;
pub use fallback::DefaultHandler;
pub use subsystem::{SubsystemHandler, SubsystemKind};

use crate::archiver::ArchiverKind;
use crate::constants::DEFAULT_BUILD_DIRECTORY;
use crate::manifest::ManifestHeaders;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Policy for one family of packaging types. All queries are free of side effects.
pub trait TypeHandler: fmt::Debug + Send + Sync {
    /// Short name used in logs and for type-grouped cache directories.
    fn name(&self) -> &str;

    /// Type strings this handler accepts.
    fn types(&self) -> &[&'static str];

    /// Whether `type_` is one of [`types`](Self::types), ignoring ASCII case.
    fn is_type_valid(&self, type_: &str) -> bool {
        self.types().iter().any(|t| t.eq_ignore_ascii_case(type_))
    }

    /// Extension of packed artifacts, without the dot.
    fn default_extension(&self) -> Option<&'static str>;

    /// Whether `path` carries the handler's extension.
    fn is_extension_valid(&self, path: &Path) -> bool {
        match (self.default_extension(), path.extension().and_then(|e| e.to_str())) {
            (Some(expected), Some(actual)) => expected.eq_ignore_ascii_case(actual),
            _ => false,
        }
    }

    /// Manifest location inside an archive or a workspace output directory.
    fn default_manifest_path(&self) -> Option<&'static str>;

    /// Whether an artifact without a valid manifest must be rejected.
    fn is_manifest_file_required(&self) -> bool {
        self.default_manifest_path().is_some()
    }

    /// Whether artifacts of this type belong on a build class path.
    fn is_build_classpath_type(&self) -> bool {
        false
    }

    /// Whether workspace output may be packed into an archive during resolution.
    fn is_pack_on_the_fly_allowed(&self) -> bool;

    /// Header carrying the symbolic name.
    fn default_symbolic_name_header(&self) -> Option<&'static str>;

    /// Header carrying the version.
    fn default_version_header(&self) -> Option<&'static str>;

    /// Unpacked build output of a workspace project, given its main artifact file.
    fn workspace_directory(&self, main_file: &Path) -> PathBuf;

    /// Whether the headers satisfy this type's requirements.
    fn is_artifact_manifest_valid(&self, headers: &ManifestHeaders) -> bool {
        [self.default_symbolic_name_header(), self.default_version_header()]
            .into_iter()
            .flatten()
            .all(|header| headers.has(header))
    }

    /// Archiver able to pack this type, if any.
    fn archiver_kind(&self) -> Option<ArchiverKind>;
}

/// Build directory of a project, derived from whatever file represents its main artifact.
///
/// - `<base>/pom.xml` → `<base>/target`
/// - `<base>/target/classes` (unpacked output) → `<base>/target`
/// - `<base>/target/foo.jar` → `<base>/target`
/// - anything else → `<parent>/target`
#[must_use]
pub fn project_build_directory(main_file: &Path) -> PathBuf {
    let parent = main_file.parent().unwrap_or_else(|| Path::new(""));
    let file_name = main_file.file_name().and_then(|n| n.to_str()).unwrap_or_default();

    if file_name == "pom.xml" {
        return parent.join(DEFAULT_BUILD_DIRECTORY);
    }
    if parent.file_name().and_then(|n| n.to_str()) == Some(DEFAULT_BUILD_DIRECTORY) {
        return parent.to_path_buf();
    }
    parent.join(DEFAULT_BUILD_DIRECTORY)
}

/// Registry of the known handlers, in lookup order.
#[derive(Debug, Clone)]
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn TypeHandler>>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self {
            handlers: vec![
                Arc::new(BundleHandler::new()),
                Arc::new(SubsystemHandler::new(SubsystemKind::Application)),
                Arc::new(SubsystemHandler::new(SubsystemKind::Composite)),
                Arc::new(SubsystemHandler::new(SubsystemKind::Feature)),
                Arc::new(DeploymentPackageHandler),
                Arc::new(IndexZipHandler),
                Arc::new(RepositoryArchiveHandler),
                Arc::new(DistributionHandler),
            ],
        }
    }
}

impl HandlerRegistry {
    /// Registry without any handler; every lookup falls back.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Add a handler; it is consulted after the ones already registered.
    pub fn register(&mut self, handler: Arc<dyn TypeHandler>) {
        self.handlers.push(handler);
    }

    /// First registered handler accepting `type_`.
    #[must_use]
    pub fn lookup(&self, type_: &str) -> Option<Arc<dyn TypeHandler>> {
        self.handlers.iter().find(|h| h.is_type_valid(type_)).cloned()
    }

    /// Handler for an artifact of type `type_` whose project declares `packaging`.
    ///
    /// Without a registered handler for the type, a generic bundle handler is synthesized when
    /// the type itself is `jar` or the packaging is `jar`, and the [`DefaultHandler`] is returned
    /// otherwise. A `jar`-typed artifact is a jar whatever its project packaging says: bundles
    /// built with `<packaging>bundle</packaging>` are consumed as type `jar`.
    #[must_use]
    pub fn resolve_handler(&self, type_: &str, packaging: Option<&str>) -> Arc<dyn TypeHandler> {
        if let Some(handler) = self.lookup(type_) {
            return handler;
        }
        if type_.eq_ignore_ascii_case("jar")
            || packaging.is_some_and(|p| p.eq_ignore_ascii_case("jar"))
        {
            debug!("No handler for type '{type_}', using a generic bundle handler");
            return Arc::new(BundleHandler::generic());
        }
        debug!("No handler for type '{type_}' (packaging {packaging:?}), using the default");
        Arc::new(DefaultHandler)
    }

    /// Registered handlers.
    pub fn handlers(&self) -> impl Iterator<Item = &Arc<dyn TypeHandler>> {
        self.handlers.iter()
    }
}
