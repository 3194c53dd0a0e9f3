//! Functionality shared between commands
use chrono::{NaiveDate, Utc};
use log::*;
use semver::Version;
use std::{fs, path::Path};

use crate::{
    ChangesetError, Result,
    changelog::{ChangelogDocument, DocumentKind},
    changeset::{ChangesetRecord, ChangesetStore},
    cli::{self, TargetArgs},
    config::Config,
    forge::manager::ForgeManager,
    notes::{ReleaseNotes, aggregator::AggregateTarget},
    version::{self, BumpType},
    workspace::{FileChange, Workspace},
};

/// Everything a command needs about the repository it runs in.
#[derive(Debug, Clone)]
pub struct Context {
    pub workspace: Workspace,
    pub config: Config,
    /// Release date written into frozen changelog sections.
    pub date: NaiveDate,
    pub dry_run: bool,
}

impl Context {
    /// Load the configuration relative to the repository root.
    pub fn load(args: &cli::Args) -> Result<Self> {
        let workspace = Workspace::new(&args.root);
        let config = Config::load(&workspace.root().join(&args.config))?;

        Ok(Self {
            workspace,
            config,
            date: Utc::now().date_naive(),
            dry_run: args.dry_run,
        })
    }

    pub fn store(&self) -> ChangesetStore {
        ChangesetStore::new(self.workspace.path(&self.config.changeset_dir))
    }

    /// Aggregation target from `--branch` / `--milestone`, defaulting to the
    /// develop branch.
    pub fn target(&self, args: &TargetArgs) -> AggregateTarget {
        if let Some(milestone) = &args.milestone {
            return AggregateTarget::Milestone(milestone.clone());
        }
        AggregateTarget::Branch(
            args.branch
                .clone()
                .unwrap_or_else(|| self.config.develop_branch.clone()),
        )
    }

    /// Existing document at `path`, or a new one titled for `kind`.
    pub fn read_document(
        &self,
        path: &str,
        kind: DocumentKind,
    ) -> Result<ChangelogDocument> {
        match self.workspace.read_optional(path)? {
            Some(content) => Ok(ChangelogDocument::parse(&content)),
            None => {
                info!("{path} not found: starting a new document");
                Ok(ChangelogDocument::with_title(kind.title()))
            }
        }
    }

    /// Last released version per the changelog and package.json.
    pub fn last_version(&self, changelog: &ChangelogDocument) -> Result<Version> {
        let package_json = self.workspace.read_optional("package.json")?;
        version::last_version(Some(changelog), package_json.as_deref())
    }

    /// Version to release `records` under. A re-run over changesets the
    /// newest changelog section already lists reuses that version instead of
    /// bumping again.
    pub fn next_version(
        &self,
        changelog: &ChangelogDocument,
        records: &[ChangesetRecord],
        bump: Option<BumpType>,
    ) -> Result<Version> {
        if let Some(released) = version::released_version(changelog, records) {
            warn!(
                "changesets already released as {released}: reusing version"
            );
            return Ok(released);
        }

        let last = self.last_version(changelog)?;
        version::resolve(records, &last, bump)
    }

    /// Write all changes at once, or only log them on a dry run.
    pub fn commit(&self, changes: &[FileChange]) -> Result<Vec<String>> {
        if self.dry_run {
            for change in changes.iter() {
                warn!("dry_run: would write {}:\n{}", change.path, change.content);
            }
            return Ok(vec![]);
        }
        self.workspace.commit(changes)
    }
}

/// Parse the version given on the command line, with or without a leading
/// "v".
pub fn parse_version(value: &str) -> Result<Version> {
    let value = value.trim();
    Ok(Version::parse(value.strip_prefix('v').unwrap_or(value))?)
}

/// Release notes written by `generate-release-notes`.
pub fn read_notes(path: &Path) -> Result<ReleaseNotes> {
    if !path.exists() {
        return Err(ChangesetError::InvalidArgs(format!(
            "notes file not found: {}",
            path.display()
        )));
    }
    ReleaseNotes::parse(&fs::read_to_string(path)?)
}

/// Forge manager for commands that talk to GitHub.
pub fn forge_manager(args: &cli::Args) -> Result<ForgeManager> {
    let remote = args.get_remote()?;
    let forge = remote.get_forge()?;
    Ok(ForgeManager::new(forge))
}

/// Render a one off tera template against a version.
pub fn render_version_template(template: &str, version: &Version) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("version", &version.to_string());
    Ok(tera::Tera::one_off(template, &context, false)?)
}
