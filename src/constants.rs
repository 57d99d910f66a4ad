//! Global constants used throughout the bundle-cache codebase.
//!
//! Defaults for the naming pattern, manifest locations, scopes and network settings live here so
//! that the configuration layer, the resolver and the tests agree on them.

use std::time::Duration;

/// Default naming pattern for cached files: artifact id, classifier, version, extension.
pub const DEFAULT_NAMING_PATTERN: &str = "%n-%c-%v.%e";

/// Name of the configuration file searched for in the current and parent directories.
pub const CONFIG_FILE_NAME: &str = "bundle-cache.toml";

/// Default cache directory, relative to the project base directory.
pub const DEFAULT_CACHE_DIRECTORY: &str = "target/bundle-cache";

/// Default build output directory of a project, relative to its base directory.
pub const DEFAULT_BUILD_DIRECTORY: &str = "target";

/// Manifest location inside bundles, deployment packages and plain jars.
pub const JAR_MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Manifest location inside subsystem archives.
pub const SUBSYSTEM_MANIFEST_PATH: &str = "OSGI-INF/SUBSYSTEM.MF";

/// Marker entry written first into subsystem archives.
pub const SUBSYSTEM_MIME_ENTRY: &str = "mimetype";

/// Content of the subsystem MIME-type marker entry.
pub const SUBSYSTEM_MIME_TYPE: &str = "application/vnd.osgi.subsystem";

/// Directory of a P2 repository holding the plugin jars.
pub const P2_PLUGINS_DIRECTORY: &str = "plugins";

/// Group id given to P2 entries declared without one.
pub const DEFAULT_P2_GROUP_ID: &str = "p2";

/// Scope assigned to artifacts declared outside the dependency graph.
pub const DEFAULT_SCOPE: &str = "compile";

/// Scopes cached when the configuration does not name any.
pub const DEFAULT_CACHE_SCOPES: &[&str] = &["compile", "runtime"];

/// Default network timeout for reachability probes and downloads.
///
/// Zero means no explicit timeout is configured and the HTTP transport's own default applies.
/// A stalled server can therefore hold a probe for as long as the transport allows; set
/// `[resolution] network-timeout` (seconds) to bound it.
pub const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::ZERO;

/// Fixed date-time layout of the numeric timestamp that replaces `-SNAPSHOT`.
pub const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S%3f";
