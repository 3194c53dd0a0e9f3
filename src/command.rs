//! Command execution for changeset-release.
//!
//! Each subcommand lives in its own module and follows the same shape:
//! load what it needs from the workspace, compute new documents in memory,
//! then hand every file change to a single commit. Commands return the text
//! printed to stdout so CI steps can capture it.
//!
//! The GitHub facing commands (`publish-release`, `update-pr-body`) go
//! through a [`crate::forge::manager::ForgeManager`], which owns the retry
//! and rate limit policy.
use crate::{
    Result,
    cli::{Args, Command},
};

pub mod analyze_changesets;
pub mod bump_version;
pub mod cleanup_changesets;
pub mod common;
pub mod generate_changeset;
pub mod generate_release_notes;
pub mod prepare_release;
pub mod publish_release;
pub mod update_changelog;
pub mod update_changelogs;
pub mod update_pr_body;
pub mod update_readme;
pub mod update_upgrade_notice;


/// Run the parsed subcommand and print its output.
pub async fn execute(args: &Args) -> Result<()> {
    let ctx = common::Context::load(args)?;

    let output = match &args.command {
        Command::GenerateChangeset(cmd) => generate_changeset::execute(&ctx, cmd)?,
        Command::AnalyzeChangesets(cmd) => analyze_changesets::execute(&ctx, cmd)?,
        Command::GenerateReleaseNotes(cmd) => {
            generate_release_notes::execute(&ctx, cmd)?
        }
        Command::BumpVersion(cmd) => bump_version::execute(&ctx, cmd)?,
        Command::UpdateChangelog(cmd) => update_changelog::execute(&ctx, cmd)?,
        Command::UpdateChangelogs(cmd) => update_changelogs::execute(&ctx, cmd)?,
        Command::UpdateReadme => update_readme::execute(&ctx)?,
        Command::UpdateUpgradeNotice(cmd) => {
            update_upgrade_notice::execute(&ctx, cmd)?
        }
        Command::PrepareRelease(cmd) => prepare_release::execute(&ctx, cmd)?,
        Command::CleanupChangesets(cmd) => cleanup_changesets::execute(&ctx, cmd)?,
        Command::PublishRelease(cmd) => {
            let manager = common::forge_manager(args)?;
            publish_release::execute(&ctx, &manager, cmd).await?
        }
        Command::UpdatePrBody(cmd) => {
            let manager = common::forge_manager(args)?;
            update_pr_body::execute(&ctx, &manager, cmd).await?
        }
    };

    if !output.is_empty() {
        println!("{}", output.trim_end());
    }

    Ok(())
}
