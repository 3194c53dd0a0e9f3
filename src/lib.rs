//! Changeset driven release automation for plugin projects.
//!
//! Merged pull requests leave one changeset record each. At release time the
//! records are aggregated into release notes, which drive the next semantic
//! version, the changelog and upgrade notice, readme.txt and the GitHub
//! release.

pub mod changelog;
pub mod changeset;
pub mod classifier;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod forge;
pub mod notes;
pub mod readme;
pub mod version;
pub mod workspace;

pub use error::{ChangesetError, Result};

#[cfg(test)]
pub mod test_helpers;
