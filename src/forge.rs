//! GitHub access for release publishing and release PR bodies.
//!
//! Commands talk to a [`manager::ForgeManager`], which wraps a boxed
//! [`traits::Forge`] so the retry and rate limit policy can be tested
//! against a mock.

/// Configuration and authentication for the remote repository.
pub mod config;

/// GitHub API client implementation.
pub mod github;

/// Retry, fallback and dry-run policy around a forge.
pub mod manager;

/// Common trait for forge implementations.
pub mod traits;

/// Request and response types.
pub mod types;
