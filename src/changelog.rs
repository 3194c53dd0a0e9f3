//! Persistent changelog documents and the logic merging release notes into
//! them.
//!
//! Two documents share one structure: the Markdown changelog and the
//! upgrade notice, which only ever records breaking changes.

pub mod document;
pub mod merger;

pub use document::{ChangelogDocument, Section, SectionKind};
pub use merger::{ChangelogMerger, DocumentKind};
