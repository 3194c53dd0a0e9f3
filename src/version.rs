//! Semantic version resolution and version file updates.
use clap::ValueEnum;
use log::*;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::{
    ChangesetError, Result, changelog::ChangelogDocument,
    changeset::ChangesetRecord, classifier::ChangeType,
};

pub mod files;
pub mod resolver;

pub use resolver::resolve;

/// Semver component to increment.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BumpType {
    Patch,
    Minor,
    Major,
}

impl BumpType {
    /// Smallest bump covering every record, `None` when there are none.
    pub fn for_records(records: &[ChangesetRecord]) -> Option<Self> {
        records
            .iter()
            .map(|r| {
                if r.is_breaking || r.change_type == ChangeType::Breaking {
                    BumpType::Major
                } else if r.change_type == ChangeType::Feature {
                    BumpType::Minor
                } else {
                    BumpType::Patch
                }
            })
            .max()
    }

    /// Increment `version`, resetting lower components and dropping any
    /// pre-release or build metadata.
    pub fn apply(&self, version: &Version) -> Result<Version> {
        let next = match self {
            BumpType::Major => {
                increment(version.major).map(|major| Version::new(major, 0, 0))
            }
            BumpType::Minor => increment(version.minor)
                .map(|minor| Version::new(version.major, minor, 0)),
            BumpType::Patch => increment(version.patch)
                .map(|patch| Version::new(version.major, version.minor, patch)),
        };

        next.ok_or_else(|| {
            ChangesetError::InvalidArgs(format!(
                "cannot apply {self} bump to {version}: component overflow"
            ))
        })
    }
}

fn increment(component: u64) -> Option<u64> {
    component.checked_add(1)
}

impl Display for BumpType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BumpType::Major => f.write_str("major"),
            BumpType::Minor => f.write_str("minor"),
            BumpType::Patch => f.write_str("patch"),
        }
    }
}

/// Last released version: the newest frozen changelog section, then the
/// `version` of package.json, then 0.0.0.
pub fn last_version(
    changelog: Option<&ChangelogDocument>,
    package_json: Option<&str>,
) -> Result<Version> {
    if let Some(version) = changelog.and_then(|doc| doc.latest_release()) {
        debug!("last version from changelog: {version}");
        return Ok(version.clone());
    }

    if let Some(content) = package_json
        && let Some(version) = files::read_json_version(content)?
    {
        debug!("last version from package.json: {version}");
        return Ok(version);
    }

    debug!("no previous version found: starting from 0.0.0");
    Ok(Version::new(0, 0, 0))
}

/// Version of the newest frozen changelog section when it already lists
/// every record, meaning these changesets were released and not yet cleaned
/// up.
pub fn released_version(
    changelog: &ChangelogDocument,
    records: &[ChangesetRecord],
) -> Option<Version> {
    if records.is_empty() {
        return None;
    }

    let section = changelog.latest_release_section()?;
    let released = section.pr_numbers();

    if !records.iter().all(|r| released.contains(&r.pr_number)) {
        return None;
    }
    section.version().cloned()
}
