//! Integration test suite for bundle-cache
//!
//! End-to-end tests that build a project on disk (configuration file, local Maven repository,
//! workspace modules, remote index directories) and drive it through the library API or the
//! `bundle-cache` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **resolution**: Configuration-driven resolution and caching through the library
//! - **workspace**: Packing of modules built alongside the assembly
//! - **cli**: Commands, flags, output formats and exit codes

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod resolution;
mod workspace;
