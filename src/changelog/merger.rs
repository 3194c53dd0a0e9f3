//! Merges [`ReleaseNotes`] into a [`ChangelogDocument`].
use chrono::NaiveDate;
use log::*;
use semver::Version;

use crate::{
    ChangesetError, Result,
    changelog::document::{ChangelogDocument, Section, section_body},
    notes::ReleaseNotes,
};

/// Which persistent document a merger writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Full changelog with an unreleased section and dated versions.
    Changelog,
    /// Breaking changes only, undated versions, no unreleased section.
    UpgradeNotice,
}

impl DocumentKind {
    /// Title for a document that does not exist yet.
    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::Changelog => "Changelog",
            DocumentKind::UpgradeNotice => "Upgrade Notice",
        }
    }
}

pub struct ChangelogMerger {
    kind: DocumentKind,
    date: NaiveDate,
    unreleased_heading: String,
}

impl ChangelogMerger {
    pub fn new(kind: DocumentKind, date: NaiveDate) -> Self {
        Self {
            kind,
            date,
            unreleased_heading: "Unreleased".into(),
        }
    }

    /// Heading text used for the in-flight section.
    pub fn with_unreleased_heading(mut self, heading: impl Into<String>) -> Self {
        self.unreleased_heading = heading.into();
        self
    }

    /// Heading for the in-flight section of a milestone.
    pub fn with_milestone(self, milestone: &str) -> Self {
        self.with_unreleased_heading(format!("Upcoming ({milestone})"))
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Merge `notes` into `document`.
    ///
    /// A non-final merge rewrites the unreleased section. A final merge
    /// freezes the notes under `version`; merging a version that is already
    /// present returns the document unchanged. Notes without entries are
    /// never frozen.
    pub fn merge(
        &self,
        mut document: ChangelogDocument,
        notes: &ReleaseNotes,
        version: &Version,
        is_final: bool,
    ) -> Result<ChangelogDocument> {
        if self.kind == DocumentKind::UpgradeNotice {
            if !is_final {
                debug!("upgrade notice has no unreleased section: skipping");
                return Ok(document);
            }
            if !notes.has_breaking() {
                info!("no breaking changes in {version}: upgrade notice unchanged");
                return Ok(document);
            }
        }

        if !is_final {
            debug!("updating {} section", self.unreleased_heading);
            document.set_unreleased(
                format!("## {}", self.unreleased_heading),
                section_body(&notes.render()),
            );
            return Ok(document);
        }

        if notes.is_empty() {
            warn!("no release notes entries for {version}: refusing to freeze");
            return Err(ChangesetError::NoChanges);
        }

        if document.find_release(version).is_some() {
            info!(
                "{} already contains {version}: nothing to merge",
                self.kind.title().to_lowercase()
            );
            return Ok(document);
        }

        if let Some(last) = document.latest_release()
            && version <= last
        {
            return Err(ChangesetError::VersionNotIncreasing {
                last: last.to_string(),
                next: version.to_string(),
            });
        }

        let (heading, body) = match self.kind {
            DocumentKind::Changelog => (
                format!("## {} - {}", version, self.date.format("%Y-%m-%d")),
                notes.render(),
            ),
            DocumentKind::UpgradeNotice => {
                (format!("## {version}"), notes.only_breaking().render())
            }
        };

        info!("adding {heading:?} to {}", self.kind.title().to_lowercase());
        document.insert_release(Section::new(heading, section_body(&body)));

        if self.kind == DocumentKind::Changelog {
            document.clear_unreleased();
        }

        Ok(document)
    }
}
