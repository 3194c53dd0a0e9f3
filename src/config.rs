//! Configuration loading and parsing for `changeset.toml` files.
//!
//! Every field has a default so a repository without a config file still
//! works with the conventional layout.
use derive_builder::Builder;
use log::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Result;

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "changeset.toml";

/// Default directory holding changeset records.
pub const DEFAULT_CHANGESET_DIR: &str = ".changesets";

/// Default line emitted when there is nothing to report.
pub const DEFAULT_PLACEHOLDER: &str = "- No notable changes.";

/// Default template for the release notes block in a release PR body.
pub const DEFAULT_PR_BODY_TEMPLATE: &str = r#"## Release {{ version }}

{{ notes }}"#;

/// Default template for the GitHub release name.
pub const DEFAULT_RELEASE_NAME_TEMPLATE: &str = "v{{ version }}";

/// A file that carries the plugin version and should follow version bumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
#[serde(default)]
pub struct VersionFileConfig {
    /// Path relative to the repository root.
    pub path: String,
    /// Optional regex whose first capture group is the version to replace.
    /// When absent the handler is chosen from the file extension.
    pub pattern: Option<String>,
}

impl Default for VersionFileConfig {
    fn default() -> Self {
        Self {
            path: "package.json".into(),
            pattern: None,
        }
    }
}

/// Root configuration structure for `changeset.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
#[serde(default)]
pub struct Config {
    /// Directory holding one changeset file per PR and target branch.
    pub changeset_dir: String,
    /// Markdown changelog.
    pub changelog: String,
    /// Upgrade-notice document, only ever receives breaking changes.
    pub upgrade_notice: String,
    /// WordPress style readme.txt.
    pub readme: String,
    /// Integration branch collecting day to day work.
    pub develop_branch: String,
    /// Release branch; a merge here is a final release.
    pub main_branch: String,
    /// Prefix identifying long lived milestone branches.
    pub milestone_prefix: String,
    /// Heading of the in-flight changelog section.
    pub unreleased_heading: String,
    /// Line rendered when no changesets match.
    pub placeholder: String,
    /// Tera template for the release notes block of a PR body.
    pub pr_body_template: String,
    /// Tera template for the GitHub release name.
    pub release_name_template: String,
    /// Files whose version is rewritten by bump-version.
    #[serde(rename = "version_file")]
    pub version_files: Vec<VersionFileConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            changeset_dir: DEFAULT_CHANGESET_DIR.into(),
            changelog: "CHANGELOG.md".into(),
            upgrade_notice: "UPGRADE.md".into(),
            readme: "readme.txt".into(),
            develop_branch: "develop".into(),
            main_branch: "main".into(),
            milestone_prefix: "milestone/".into(),
            unreleased_heading: "Unreleased".into(),
            placeholder: DEFAULT_PLACEHOLDER.into(),
            pr_body_template: DEFAULT_PR_BODY_TEMPLATE.into(),
            release_name_template: DEFAULT_RELEASE_NAME_TEMPLATE.into(),
            version_files: vec![VersionFileConfig::default()],
        }
    }
}

impl Config {
    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(
                "no config found at {}: using default configuration",
                path.display()
            );
            return Ok(Self::default());
        }

        info!("loading configuration from {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Branch name for a milestone, e.g. "2.0" -> "milestone/2.0".
    pub fn milestone_branch(&self, milestone: &str) -> String {
        if milestone.starts_with(&self.milestone_prefix) {
            return milestone.to_string();
        }
        format!("{}{}", self.milestone_prefix, milestone)
    }

    /// Whether the branch is a tracked milestone branch.
    pub fn is_milestone_branch(&self, branch: &str) -> bool {
        !self.milestone_prefix.is_empty()
            && branch.starts_with(&self.milestone_prefix)
    }

    fn validate(&self) -> Result<()> {
        if self.changeset_dir.trim().is_empty() {
            return Err(crate::ChangesetError::invalid_config(
                "changeset_dir must not be empty",
            ));
        }

        if self.develop_branch == self.main_branch {
            return Err(crate::ChangesetError::invalid_config(
                "develop_branch and main_branch must differ",
            ));
        }

        for file in self.version_files.iter() {
            if let Some(pattern) = &file.pattern {
                let regex = regex::Regex::new(pattern)?;
                if regex.captures_len() < 2 {
                    return Err(crate::ChangesetError::invalid_config(format!(
                        "version_file pattern for {} needs a capture group",
                        file.path
                    )));
                }
            }
        }

        Ok(())
    }
}
