//! File based changeset store, one file per `(target branch, PR)`.
use chrono::{DateTime, Utc};
use log::*;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    Result,
    changeset::{
        format,
        record::{ChangesetRecord, slug},
    },
};

/// Directory of changeset records.
#[derive(Debug, Clone)]
pub struct ChangesetStore {
    dir: PathBuf,
}

impl ChangesetStore {
    /// Create store rooted at `dir`. The directory is created lazily on the
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deterministic path for a PR on a target branch.
    pub fn path_for(&self, target_branch: &str, pr_number: u64) -> PathBuf {
        self.dir
            .join(format!("{}-{}.md", slug(target_branch), pr_number))
    }

    /// Write a record, overwriting any previous record for the same PR and
    /// target branch. The original creation time survives regeneration.
    pub fn write(&self, record: &ChangesetRecord) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(&record.target_branch, record.pr_number);
        let mut record = record.clone();

        if path.exists() {
            match self.read_file(&path) {
                Ok(existing) => {
                    info!(
                        "overwriting changeset for PR #{} on {}",
                        record.pr_number, record.target_branch
                    );
                    record.created_at = existing.created_at;
                }
                Err(err) => {
                    warn!(
                        "replacing unreadable changeset {}: {err}",
                        path.display()
                    );
                }
            }
        }

        fs::write(&path, format::render(&record))?;

        debug!("wrote changeset: {}", path.display());

        Ok(path)
    }

    /// Records whose target branch is `target_branch`.
    pub fn read_all(&self, target_branch: &str) -> Result<Vec<ChangesetRecord>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|r| r.target_branch == target_branch)
            .collect())
    }

    /// Every readable record in the store, ordered by file name. Malformed
    /// files are skipped with a warning.
    pub fn load(&self) -> Result<Vec<ChangesetRecord>> {
        if !self.dir.exists() {
            debug!(
                "changeset directory {} does not exist",
                self.dir.display()
            );
            return Ok(vec![]);
        }

        let mut paths = vec![];

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file()
                && path.extension().is_some_and(|ext| ext == "md")
            {
                paths.push(path);
            }
        }

        paths.sort();

        let mut records = vec![];

        for path in paths.iter() {
            match self.read_file(path) {
                Ok(record) => {
                    let expected = self
                        .path_for(&record.target_branch, record.pr_number);
                    if &expected != path {
                        warn!(
                            "changeset {} should be named {}",
                            path.display(),
                            expected.display()
                        );
                    }
                    records.push(record);
                }
                Err(err) => {
                    warn!("skipping changeset: {err}");
                }
            }
        }

        info!(
            "loaded {} changesets from {}",
            records.len(),
            self.dir.display()
        );

        Ok(records)
    }

    /// Delete the files backing `records`. Returns how many were removed.
    pub fn remove(&self, records: &[ChangesetRecord]) -> Result<usize> {
        let mut removed = 0;

        for record in records.iter() {
            let path = self.path_for(&record.target_branch, record.pr_number);
            if path.exists() {
                fs::remove_file(&path)?;
                info!("removed changeset: {}", path.display());
                removed += 1;
            }
        }

        Ok(removed)
    }

    fn read_file(&self, path: &Path) -> Result<ChangesetRecord> {
        let content = fs::read_to_string(path)?;
        let fallback = fs::metadata(path)
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_default();

        format::parse(&path.display().to_string(), &content, fallback)
    }
}
