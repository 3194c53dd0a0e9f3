//! Changeset records: one small file per merged PR and target branch.
//!
//! Records are written when a PR merges into a tracked branch and read back
//! at release time by the aggregator.

mod format;
mod record;
mod store;

pub use format::{parse, render};
pub use record::{ChangesetDraft, ChangesetDraftBuilder, ChangesetRecord, slug};
pub use store::ChangesetStore;
