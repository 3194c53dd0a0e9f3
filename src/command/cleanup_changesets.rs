//! Deletes the changesets included in a published release.
use log::*;

use crate::{
    Result,
    cli::CleanupArgs,
    command::common::Context,
    notes::aggregator::{AggregateTarget, Aggregator},
};

/// Returns how many records were removed.
pub fn execute(ctx: &Context, args: &CleanupArgs) -> Result<String> {
    let target = AggregateTarget::Branch(
        args.branch
            .clone()
            .unwrap_or_else(|| ctx.config.main_branch.clone()),
    );

    let store = ctx.store();
    let records = Aggregator::new(&ctx.config).included(store.load()?, &target);

    if ctx.dry_run {
        for record in records.iter() {
            warn!("dry_run: would remove changeset {}", record.file_name());
        }
        return Ok(format!("{} changesets would be removed", records.len()));
    }

    let removed = store.remove(&records)?;
    info!("removed {removed} changesets released from {target}");

    Ok(format!("{removed} changesets removed"))
}
