//! Error handling for bundle-cache
//!
//! Errors are split into two layers, the same way the rest of the crate reports failures:
//! 1. **Strongly-typed errors** ([`BundleCacheError`]) raised by the resolution core
//! 2. **User-facing context** ([`ErrorContext`]) with a suggestion, built for the CLI
//!
//! # Error Categories
//!
//! - **Configuration**: [`BundleCacheError::ConfigurationError`],
//!   [`BundleCacheError::InvalidNamingPattern`], [`BundleCacheError::MissingBuilderField`].
//!   Always fatal and raised before any I/O happens.
//! - **Resolution**: [`BundleCacheError::ResolutionError`],
//!   [`BundleCacheError::RepositoryUnreachable`]. Fatal for required dependencies.
//! - **Manifest validation**: [`BundleCacheError::ManifestValidationError`]. Never fatal; the
//!   resolver logs it and drops the artifact.
//! - **Packaging**: [`BundleCacheError::PackagingError`]. Fatal, carries the archiver and the
//!   artifact coordinates.
//! - **I/O**: [`BundleCacheError::FileSystemError`], [`BundleCacheError::IoError`].
//!
//! Operations in this crate return [`anyhow::Result`]; the typed error can be recovered with
//! `error.downcast_ref::<BundleCacheError>()`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bundle_cache::core::{BundleCacheError, user_friendly_error};
//!
//! let error = BundleCacheError::ResolutionError {
//!     coordinates: "com.acme:foo:jar:1.0".to_string(),
//!     reason: "not found in the local repository".to_string(),
//! };
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for bundle-cache operations.
///
/// Every variant that concerns a single artifact carries that artifact's coordinates so that a
/// fatal failure in a long resolution pass can be traced back to the offending dependency.
#[derive(Error, Debug)]
pub enum BundleCacheError {
    /// Generic configuration problem (bad value, missing section, inconsistent flags)
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration error
        message: String,
    },

    /// Configuration file could not be parsed
    #[error("Invalid configuration file syntax in {file}: {reason}")]
    ConfigParseError {
        /// Path to the configuration file
        file: String,
        /// Reason reported by the parser
        reason: String,
    },

    /// Configuration file not found
    #[error("Configuration file bundle-cache.toml not found in current directory or any parent directory")]
    ConfigNotFound,

    /// The naming pattern contains an unknown or truncated token
    #[error("Invalid naming pattern '{pattern}': {reason}")]
    InvalidNamingPattern {
        /// The pattern as configured
        pattern: String,
        /// What is wrong with it
        reason: String,
    },

    /// A tracker builder was asked to build without a required field
    #[error("Cannot build tracker for '{artifact}': missing {field}")]
    MissingBuilderField {
        /// Name of the missing field
        field: String,
        /// Coordinates (or partial identity) of the artifact being built
        artifact: String,
    },

    /// The repository system could not resolve an artifact
    #[error("Cannot resolve artifact {coordinates}: {reason}")]
    ResolutionError {
        /// Coordinates of the artifact that failed to resolve
        coordinates: String,
        /// Why the resolution failed
        reason: String,
    },

    /// A remote (P2) repository could not be reached
    #[error("Cannot reach remote repository at {url}")]
    RepositoryUnreachable {
        /// The effective URL that was probed
        url: String,
    },

    /// An artifact set rejected an entry
    #[error("Invalid entry {coordinates} in artifact set: {reason}")]
    InvalidArtifactSet {
        /// Coordinates of the rejected entry
        coordinates: String,
        /// Why it was rejected
        reason: String,
    },

    /// Manifest missing or incomplete; the resolver downgrades this to a warning
    #[error("Invalid manifest for {coordinates}: {reason}")]
    ManifestValidationError {
        /// Coordinates of the artifact whose manifest was checked
        coordinates: String,
        /// Which header or file is missing
        reason: String,
    },

    /// Archive creation failed during on-the-fly packaging
    #[error("Failed to package {coordinates} with the {archiver} archiver: {reason}")]
    PackagingError {
        /// Coordinates of the workspace artifact being packed
        coordinates: String,
        /// Archiver kind in use
        archiver: String,
        /// Underlying failure
        reason: String,
    },

    /// File system error
    #[error("File system error: {operation}")]
    FileSystemError {
        /// The file system operation that failed
        operation: String,
        /// Path where the file system error occurred
        path: String,
    },

    /// Network error
    #[error("Network error: {operation}")]
    NetworkError {
        /// The network operation that failed
        operation: String,
        /// Reason for the network failure
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Clone for BundleCacheError {
    fn clone(&self) -> Self {
        match self {
            Self::ConfigurationError {
                message,
            } => Self::ConfigurationError {
                message: message.clone(),
            },
            Self::ConfigParseError {
                file,
                reason,
            } => Self::ConfigParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::ConfigNotFound => Self::ConfigNotFound,
            Self::InvalidNamingPattern {
                pattern,
                reason,
            } => Self::InvalidNamingPattern {
                pattern: pattern.clone(),
                reason: reason.clone(),
            },
            Self::MissingBuilderField {
                field,
                artifact,
            } => Self::MissingBuilderField {
                field: field.clone(),
                artifact: artifact.clone(),
            },
            Self::ResolutionError {
                coordinates,
                reason,
            } => Self::ResolutionError {
                coordinates: coordinates.clone(),
                reason: reason.clone(),
            },
            Self::RepositoryUnreachable {
                url,
            } => Self::RepositoryUnreachable {
                url: url.clone(),
            },
            Self::InvalidArtifactSet {
                coordinates,
                reason,
            } => Self::InvalidArtifactSet {
                coordinates: coordinates.clone(),
                reason: reason.clone(),
            },
            Self::ManifestValidationError {
                coordinates,
                reason,
            } => Self::ManifestValidationError {
                coordinates: coordinates.clone(),
                reason: reason.clone(),
            },
            Self::PackagingError {
                coordinates,
                archiver,
                reason,
            } => Self::PackagingError {
                coordinates: coordinates.clone(),
                archiver: archiver.clone(),
                reason: reason.clone(),
            },
            Self::FileSystemError {
                operation,
                path,
            } => Self::FileSystemError {
                operation: operation.clone(),
                path: path.clone(),
            },
            Self::NetworkError {
                operation,
                reason,
            } => Self::NetworkError {
                operation: operation.clone(),
                reason: reason.clone(),
            },
            // io::Error is not Clone, keep kind and message
            Self::IoError(e) => Self::IoError(std::io::Error::new(e.kind(), e.to_string())),
        }
    }
}

impl BundleCacheError {
    /// Returns `true` for errors that must abort a resolution pass.
    ///
    /// Manifest validation problems only ever drop the affected artifact.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ManifestValidationError { .. })
    }
}

/// Error wrapper with a suggestion and details for CLI display.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: BundleCacheError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details.
    #[must_use]
    pub const fn new(error: BundleCacheError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error (printed in green).
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error (printed in yellow).
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with an actionable suggestion.
///
/// Recognizes [`BundleCacheError`] anywhere in the `anyhow` chain, then [`std::io::Error`], and
/// falls back to a generic configuration error carrying the full chain as its message.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(bc_error) = cause.downcast_ref::<BundleCacheError>() {
            let mut context = create_error_context(bc_error.clone());
            if context.details.is_none() && error.chain().count() > 1 {
                context.details = Some(format!("{error:#}"));
            }
            return context;
        }
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(BundleCacheError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check the permissions of the cache and work directories")
                .with_details(io_error.to_string());
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(BundleCacheError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct")
                .with_details(io_error.to_string());
            }
            _ => {}
        }
    }

    ErrorContext::new(BundleCacheError::ConfigurationError {
        message: format!("{error:#}"),
    })
}

fn create_error_context(error: BundleCacheError) -> ErrorContext {
    let suggestion = match &error {
        BundleCacheError::ConfigNotFound => {
            "Create a bundle-cache.toml in the project directory or pass --config <path>"
        }
        BundleCacheError::ConfigParseError {
            ..
        } => "Check the TOML syntax; keys use kebab-case (e.g. cache-directory)",
        BundleCacheError::InvalidNamingPattern {
            ..
        } => "Supported tokens are %n, %c, %s, %v, %e and %% (e.g. %n-%c-%v.%e)",
        BundleCacheError::ResolutionError {
            ..
        } => "Make sure the artifact is installed in the local repository or declared with the right coordinates",
        BundleCacheError::RepositoryUnreachable {
            ..
        } => "Check the remote index URL and your network, or rerun with --offline once the cache is populated",
        BundleCacheError::PackagingError {
            ..
        } => "Build the workspace module first so that its output directory and manifest exist",
        BundleCacheError::FileSystemError {
            ..
        }
        | BundleCacheError::IoError(_) => "Check the permissions and free space of the cache directory",
        _ => "Rerun with --verbose for more information",
    };
    ErrorContext::new(error).with_suggestion(suggestion)
}
