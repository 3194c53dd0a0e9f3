//! CLI argument parsing and forge configuration.
use clap::{Args as ClapArgs, Parser, Subcommand};
use git_url_parse::GitUrl;
use secrecy::SecretString;
use std::{env, path::PathBuf};

use crate::{
    ChangesetError, Result,
    config::DEFAULT_CONFIG_FILE,
    forge::config::{Remote, RemoteConfig},
    version::BumpType,
};

/// Global CLI arguments for forge configuration and debugging.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = "", global = true)]
    /// GitHub repository URL (https://github.com/owner/repo).
    pub github_repo: String,

    #[arg(long, default_value = "", global = true)]
    /// GitHub personal access token. Falls back to GITHUB_TOKEN env var.
    pub github_token: String,

    #[arg(long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    /// Path to the configuration file, relative to the repository root.
    pub config: PathBuf,

    #[arg(long, default_value = ".", global = true)]
    /// Repository root.
    pub root: PathBuf,

    #[arg(long, default_value_t = false, global = true)]
    /// Report what would change without writing files or calling GitHub.
    pub dry_run: bool,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Branch or milestone whose changesets a command works on.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct TargetArgs {
    #[arg(long, conflicts_with = "milestone")]
    /// Target branch, e.g. develop or main.
    pub branch: Option<String>,

    #[arg(long)]
    /// Milestone name, with or without the milestone branch prefix.
    pub milestone: Option<String>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct GenerateChangesetArgs {
    #[arg(long)]
    /// Pull request number.
    pub pr: u64,

    #[arg(long)]
    /// Pull request title.
    pub title: String,

    #[arg(long, default_value = "")]
    /// Pull request author login.
    pub author: String,

    #[arg(long, conflicts_with = "body_file")]
    /// Pull request description.
    pub body: Option<String>,

    #[arg(long)]
    /// File holding the pull request description.
    pub body_file: Option<PathBuf>,

    #[arg(long)]
    /// Alias for --target.
    pub branch: Option<String>,

    #[arg(long, default_value = "")]
    /// Head branch of the pull request.
    pub source: String,

    #[arg(long)]
    /// Base branch the pull request merged into.
    pub target: Option<String>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ReleaseNotesArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[arg(long)]
    /// Write the notes to this file instead of stdout.
    pub output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct BumpVersionArgs {
    #[arg(long = "type", value_enum)]
    /// Force a bump instead of deriving it from the changesets.
    pub bump: Option<BumpType>,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct MergeNotesArgs {
    #[arg(long)]
    /// Version being released.
    pub version: String,

    #[arg(long)]
    /// Release notes produced by generate-release-notes.
    pub notes_file: PathBuf,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct UpdateChangelogsArgs {
    #[arg(long)]
    /// Version being released; without it only the unreleased section
    /// changes.
    pub version: Option<String>,

    #[arg(long)]
    /// Release notes produced by generate-release-notes.
    pub notes_file: PathBuf,

    #[arg(long)]
    /// Milestone whose upcoming section is updated.
    pub milestone: Option<String>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct PrepareReleaseArgs {
    #[arg(long = "type", value_enum)]
    /// Force a bump instead of deriving it from the changesets.
    pub bump: Option<BumpType>,

    #[arg(long)]
    /// Branch to aggregate; defaults to the main branch.
    pub branch: Option<String>,

    #[arg(long)]
    /// Also write the release notes to this file.
    pub output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct CleanupArgs {
    #[arg(long)]
    /// Branch whose released changesets are removed; defaults to the main
    /// branch.
    pub branch: Option<String>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct PublishReleaseArgs {
    #[arg(long)]
    /// Version being released.
    pub version: String,

    #[arg(long)]
    /// Release notes used as the release body.
    pub notes_file: PathBuf,

    #[arg(long)]
    /// Commit or branch the release tag points at.
    pub target_commitish: Option<String>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct UpdatePrBodyArgs {
    #[arg(long)]
    /// Release pull request number.
    pub pr: u64,

    #[arg(long)]
    /// Release notes to place in the body.
    pub notes_file: PathBuf,

    #[arg(long)]
    /// Version shown in the notes block.
    pub version: Option<String>,
}

/// Release automation subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the changeset record for a merged pull request.
    GenerateChangeset(GenerateChangesetArgs),

    /// Print a JSON summary of pending changesets.
    AnalyzeChangesets(TargetArgs),

    /// Aggregate changesets into release notes.
    GenerateReleaseNotes(ReleaseNotesArgs),

    /// Resolve the next version and write it to the version files.
    BumpVersion(BumpVersionArgs),

    /// Freeze release notes into the changelog.
    UpdateChangelog(MergeNotesArgs),

    /// Update the unreleased section, or freeze notes into the changelog and
    /// upgrade notice.
    UpdateChangelogs(UpdateChangelogsArgs),

    /// Sync readme.txt with the changelog and upgrade notice.
    UpdateReadme,

    /// Freeze breaking changes into the upgrade notice.
    UpdateUpgradeNotice(MergeNotesArgs),

    /// Run the whole release preparation and write every file at once.
    PrepareRelease(PrepareReleaseArgs),

    /// Delete changesets included in a published release.
    CleanupChangesets(CleanupArgs),

    /// Create the GitHub release.
    PublishRelease(PublishReleaseArgs),

    /// Refresh the release notes block of a pull request body.
    UpdatePrBody(UpdatePrBodyArgs),
}

impl Args {
    /// Configure remote repository connection from CLI arguments.
    pub fn get_remote(&self) -> Result<Remote> {
        if self.github_repo.is_empty() {
            return Err(ChangesetError::InvalidArgs(
                "--github-repo is required for this command".into(),
            ));
        }

        let token = env::var("GITHUB_TOKEN").ok();

        get_github_remote(
            &self.github_repo,
            &self.github_token,
            token,
            self.dry_run,
        )
    }
}

/// Validate repository URL uses HTTP or HTTPS scheme.
fn validate_scheme(scheme: git_url_parse::Scheme) -> Result<()> {
    match scheme {
        git_url_parse::Scheme::Http => Ok(()),
        git_url_parse::Scheme::Https => Ok(()),
        _ => Err(ChangesetError::InvalidRemoteUrl(
            "only http and https schemes are supported for repo urls".into(),
        )),
    }
}

/// Configure GitHub remote with URL parsing and token resolution. The token
/// comes from the flag, then the URL, then `env_token`.
fn get_github_remote(
    github_repo: &str,
    github_token: &str,
    env_token: Option<String>,
    dry_run: bool,
) -> Result<Remote> {
    let parsed = GitUrl::parse(github_repo)?;

    validate_scheme(parsed.scheme)?;

    let mut token = github_token.to_string();

    if token.is_empty()
        && let Some(parsed_token) = parsed.token
    {
        token = parsed_token;
    }

    if token.is_empty()
        && let Some(env_token) = env_token
    {
        token = env_token;
    }

    if token.is_empty() {
        return Err(ChangesetError::InvalidArgs(
            "must set github token".into(),
        ));
    }

    let host = parsed.host.ok_or_else(|| {
        ChangesetError::InvalidRemoteUrl(format!(
            "unable to parse host from github repo: {github_repo}"
        ))
    })?;

    let owner = parsed.owner.ok_or_else(|| {
        ChangesetError::InvalidRemoteUrl(format!(
            "unable to parse owner from github repo: {github_repo}"
        ))
    })?;

    let release_link_base_url = format!(
        "{}://{}/{}/{}/releases/tag",
        parsed.scheme, host, owner, parsed.name
    );

    Ok(Remote::Github(RemoteConfig {
        host,
        scheme: parsed.scheme.to_string(),
        owner,
        repo: parsed.name,
        token: SecretString::from(token),
        release_link_base_url,
        dry_run,
    }))
}
