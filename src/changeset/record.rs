use chrono::{DateTime, Utc};
use derive_builder::Builder;
use regex::Regex;
use std::{collections::BTreeMap, sync::LazyLock};

use crate::{
    ChangesetError, Result,
    changeset::format::KNOWN_KEYS,
    classifier::{self, ChangeType},
};

/// Keys allowed in the metadata block
pub(super) static KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").unwrap());

/// Runs of characters that are not allowed in a file name slug
static SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// A single merged change, the unit of release note aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangesetRecord {
    pub pr_number: u64,
    pub title: String,
    /// GitHub login without the leading "@".
    pub author: String,
    pub source_branch: String,
    pub target_branch: String,
    pub body: String,
    /// Inferred from title and body, never read from the file.
    pub change_type: ChangeType,
    pub is_breaking: bool,
    pub created_at: DateTime<Utc>,
    /// Metadata keys this tool does not know about, kept for round-trips.
    pub extra: BTreeMap<String, String>,
}

impl ChangesetRecord {
    /// Stable identifier derived from target branch and PR number.
    pub fn id(&self) -> String {
        format!("{}-{}", slug(&self.target_branch), self.pr_number)
    }

    /// File name the record is stored under.
    pub fn file_name(&self) -> String {
        format!("{}.md", self.id())
    }

    /// Release note entry, e.g. "feat: add widget (#10) by @alice".
    pub fn entry(&self) -> String {
        if self.author.is_empty() {
            return format!("{} (#{})", self.title, self.pr_number);
        }
        format!("{} (#{}) by @{}", self.title, self.pr_number, self.author)
    }

    /// Upgrade guidance taken from the body's breaking changes section.
    pub fn breaking_details(&self) -> Vec<String> {
        classifier::breaking_details(&self.body)
    }
}

/// Input for a new changeset before it is normalised and classified.
#[derive(Debug, Clone, Default, Builder)]
#[builder(setter(into), default)]
pub struct ChangesetDraft {
    pub pr_number: u64,
    pub title: String,
    pub author: String,
    pub source_branch: String,
    pub target_branch: String,
    pub body: String,
    pub extra: BTreeMap<String, String>,
}

impl ChangesetDraft {
    /// Normalise, validate and classify into a record.
    pub fn into_record(self, created_at: DateTime<Utc>) -> Result<ChangesetRecord> {
        let title = normalize_line(&self.title);
        let author = normalize_line(&self.author)
            .trim_start_matches('@')
            .to_string();
        let source_branch = normalize_line(&self.source_branch);
        let target_branch = normalize_line(&self.target_branch);
        let body = normalize_body(&self.body);

        if self.pr_number == 0 {
            return Err(ChangesetError::InvalidArgs(
                "pr number must be a positive integer".into(),
            ));
        }

        if title.is_empty() {
            return Err(ChangesetError::InvalidArgs(format!(
                "title is required for PR #{}",
                self.pr_number
            )));
        }

        if target_branch.is_empty() {
            return Err(ChangesetError::InvalidArgs(format!(
                "target branch is required for PR #{}",
                self.pr_number
            )));
        }

        let mut extra = BTreeMap::new();
        for (key, value) in self.extra {
            let key = key.trim().to_ascii_lowercase();
            if !KEY_REGEX.is_match(&key)
                || (KNOWN_KEYS.contains(&key.as_str()) && key != "branch")
            {
                return Err(ChangesetError::InvalidArgs(format!(
                    "invalid metadata key: {key}"
                )));
            }
            extra.insert(key, normalize_line(&value));
        }

        let classification = classifier::classify_text(&title, &body);

        Ok(ChangesetRecord {
            pr_number: self.pr_number,
            title,
            author,
            source_branch,
            target_branch,
            body,
            change_type: classification.change_type,
            is_breaking: classification.is_breaking,
            created_at: truncate_to_seconds(created_at),
            extra,
        })
    }
}

/// File name safe form of a branch name: lowercase, runs of other
/// characters collapsed into a single "-".
pub fn slug(branch: &str) -> String {
    SLUG_REGEX
        .replace_all(&branch.to_ascii_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Collapse a metadata value onto one trimmed line.
pub(super) fn normalize_line(value: &str) -> String {
    value
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Strip leading blank lines and trailing whitespace; non-empty bodies end
/// with exactly one newline.
pub(super) fn normalize_body(body: &str) -> String {
    let body = body.replace("\r\n", "\n");
    let trimmed = body.trim_start_matches('\n').trim_end();
    if trimmed.trim().is_empty() {
        return String::new();
    }
    format!("{trimmed}\n")
}

/// Timestamps are stored with second precision.
pub(super) fn truncate_to_seconds(value: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(value.timestamp(), 0).unwrap_or(value)
}
