//! Creates the GitHub release for a version.
use log::*;

use crate::{
    ChangesetError, Result,
    cli::PublishReleaseArgs,
    command::common::{self, Context},
    forge::{manager::ForgeManager, types::CreateReleaseRequest},
};

/// Returns the release URL.
pub async fn execute(
    ctx: &Context,
    manager: &ForgeManager,
    args: &PublishReleaseArgs,
) -> Result<String> {
    let version = common::parse_version(&args.version)?;
    let notes = common::read_notes(&args.notes_file)?;
    if notes.is_empty() {
        warn!(
            "{} has no entries: not publishing v{version}",
            args.notes_file.display()
        );
        return Err(ChangesetError::NoChanges);
    }

    let name = common::render_version_template(
        &ctx.config.release_name_template,
        &version,
    )?;

    let release = manager
        .publish_release(CreateReleaseRequest {
            tag: format!("v{version}"),
            name,
            body: notes.render(),
            target_commitish: args.target_commitish.clone(),
            draft: false,
            prerelease: !version.pre.is_empty(),
        })
        .await?;

    Ok(release.url)
}
