//! Core types shared by every bundle-cache module.
//!
//! This is the error layer: [`BundleCacheError`] for typed failures raised by the
//! resolution core and [`ErrorContext`] / [`user_friendly_error`] for presenting them on the
//! command line.
//!
//! ```rust
//! use bundle_cache::core::BundleCacheError;
//!
//! let error = BundleCacheError::RepositoryUnreachable {
//!     url: "https://p2.example.com".to_string(),
//! };
//! assert!(error.is_fatal());
//! ```

pub mod error;

pub use error::{BundleCacheError, ErrorContext, user_friendly_error};
