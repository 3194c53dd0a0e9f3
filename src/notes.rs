//! Release notes: category sections built from changeset records.
//!
//! The textual form is stable, so notes written to a file by one command can
//! be parsed back by the next one in the pipeline.
use regex::Regex;
use serde::Serialize;
use std::{fmt::Display, sync::LazyLock};

use crate::{ChangesetError, Result, classifier::ChangeType};

pub mod aggregator;
pub mod pr_body;
pub mod summary;

const SECTION_PREFIX: &str = "### ";
const ENTRY_PREFIX: &str = "- ";
const DETAIL_INDENT: &str = "  ";

/// "(#123)" reference inside an entry
static PR_REF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(#(\d+)\)").unwrap());

/// One line of release notes plus optional upgrade guidance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotesEntry {
    pub pr_number: u64,
    pub text: String,
    pub details: Vec<String>,
}

/// Entries of a single category, ordered by PR number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotesSection {
    pub category: ChangeType,
    pub entries: Vec<NotesEntry>,
}

/// Ordered category sections; empty notes render a placeholder line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseNotes {
    pub sections: Vec<NotesSection>,
    pub placeholder: String,
}

impl ReleaseNotes {
    /// Notes without any entries.
    pub fn empty(placeholder: impl Into<String>) -> Self {
        Self {
            sections: vec![],
            placeholder: placeholder.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.entries.is_empty())
    }

    /// The breaking changes section, if any.
    pub fn breaking(&self) -> Option<&NotesSection> {
        self.sections
            .iter()
            .find(|s| s.category == ChangeType::Breaking && !s.entries.is_empty())
    }

    pub fn has_breaking(&self) -> bool {
        self.breaking().is_some()
    }

    /// Copy holding only the breaking changes section.
    pub fn only_breaking(&self) -> Self {
        Self {
            sections: self.breaking().cloned().into_iter().collect(),
            placeholder: self.placeholder.clone(),
        }
    }

    /// Render to markdown. Identical notes always render identical bytes.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return format!("{}\n", self.placeholder.trim());
        }

        let mut blocks = vec![];

        for section in self.sections.iter().filter(|s| !s.entries.is_empty()) {
            let mut block = format!(
                "{SECTION_PREFIX}{}\n\n",
                section.category.heading()
            );
            for entry in section.entries.iter() {
                block.push_str(ENTRY_PREFIX);
                block.push_str(&entry.text);
                block.push('\n');
                for detail in entry.details.iter() {
                    block.push_str(DETAIL_INDENT);
                    block.push_str(detail);
                    block.push('\n');
                }
            }
            blocks.push(block);
        }

        blocks.join("\n")
    }

    /// Parse notes previously produced by [`ReleaseNotes::render`].
    pub fn parse(content: &str) -> Result<Self> {
        let content = content.replace("\r\n", "\n");
        let mut sections: Vec<NotesSection> = vec![];

        for line in content.lines() {
            if let Some(heading) = line.strip_prefix(SECTION_PREFIX) {
                let category =
                    ChangeType::from_heading(heading).ok_or_else(|| {
                        ChangesetError::InvalidNotes(format!(
                            "unknown section heading: {heading}"
                        ))
                    })?;
                sections.push(NotesSection {
                    category,
                    entries: vec![],
                });
                continue;
            }

            if line.trim().is_empty() {
                continue;
            }

            let Some(section) = sections.last_mut() else {
                // free text before any section is the placeholder
                continue;
            };

            if let Some(text) = line.strip_prefix(ENTRY_PREFIX) {
                let pr_number = PR_REF_REGEX
                    .captures_iter(text)
                    .last()
                    .and_then(|c| c[1].parse::<u64>().ok())
                    .unwrap_or_default();
                section.entries.push(NotesEntry {
                    pr_number,
                    text: text.trim_end().to_string(),
                    details: vec![],
                });
                continue;
            }

            if let Some(detail) = line.strip_prefix(DETAIL_INDENT)
                && let Some(entry) = section.entries.last_mut()
            {
                entry.details.push(detail.trim_end().to_string());
                continue;
            }

            return Err(ChangesetError::InvalidNotes(format!(
                "unexpected line in {} section: {line}",
                section.category.heading()
            )));
        }

        let placeholder = if sections.is_empty() {
            content.trim().to_string()
        } else {
            String::new()
        };

        Ok(Self {
            sections,
            placeholder,
        })
    }
}

impl Display for ReleaseNotes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}
