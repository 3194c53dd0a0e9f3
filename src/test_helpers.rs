//! Common test helper functions shared across test modules.
//!
//! This module provides reusable utilities for creating test fixtures,
//! reducing code duplication across different test suites.
use chrono::{DateTime, TimeZone, Utc};
use std::path::Path;

use crate::{
    changeset::{ChangesetDraftBuilder, ChangesetRecord, ChangesetStore},
    config::Config,
};

/// Fixed creation time used by fixtures.
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap()
}

/// Creates a classified record with sensible defaults.
///
/// # Example
/// ```ignore
/// let record = create_test_record(10, "feat: add widget", "develop");
/// ```
pub fn create_test_record(
    pr: u64,
    title: &str,
    target: &str,
) -> ChangesetRecord {
    create_test_record_with_body(pr, title, target, "")
}

/// Creates a record for a PR opened from `source` into `target`, such as a
/// milestone branch being merged into develop.
pub fn create_test_merge_record(
    pr: u64,
    title: &str,
    source: &str,
    target: &str,
) -> ChangesetRecord {
    let mut record = create_test_record(pr, title, target);
    record.source_branch = source.to_string();
    record
}

/// Same as [`create_test_record`] with a body.
pub fn create_test_record_with_body(
    pr: u64,
    title: &str,
    target: &str,
    body: &str,
) -> ChangesetRecord {
    ChangesetDraftBuilder::default()
        .pr_number(pr)
        .title(title)
        .author(format!("dev{pr}"))
        .source_branch(format!("feature/pr-{pr}"))
        .target_branch(target)
        .body(body)
        .build()
        .unwrap()
        .into_record(fixed_time())
        .unwrap()
}

/// Creates a store under `root` using the default changeset directory and
/// writes `records` to it.
pub fn create_test_store(
    root: &Path,
    records: &[ChangesetRecord],
) -> ChangesetStore {
    let store = ChangesetStore::new(root.join(Config::default().changeset_dir));
    for record in records.iter() {
        store.write(record).unwrap();
    }
    store
}
