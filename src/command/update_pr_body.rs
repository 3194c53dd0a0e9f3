//! Refreshes the release notes block of the release pull request.
use log::*;

use crate::{
    Result,
    cli::UpdatePrBodyArgs,
    command::common::{self, Context},
    forge::{manager::ForgeManager, types::PrBodySync},
    notes::pr_body::{PrBodyComposer, PrBodyContext},
};

pub async fn execute(
    ctx: &Context,
    manager: &ForgeManager,
    args: &UpdatePrBodyArgs,
) -> Result<String> {
    let notes = common::read_notes(&args.notes_file)?;

    let version = match &args.version {
        Some(version) => common::parse_version(version)?.to_string(),
        None => ctx.config.unreleased_heading.clone(),
    };

    let composer = PrBodyComposer::new(ctx.config.pr_body_template.as_str());
    let context = PrBodyContext {
        version,
        notes: notes.render(),
        target: ctx.config.main_branch.clone(),
    };

    let result = manager
        .sync_pr_body(args.pr, |current| composer.compose(current, &context))
        .await?;

    if result == PrBodySync::Skipped {
        warn!("PR #{} body was not updated", args.pr);
    }

    Ok(String::new())
}
