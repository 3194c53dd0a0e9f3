//! Resolves the next version and writes it to the configured version files.
use crate::{
    Result,
    changelog::DocumentKind,
    cli::BumpVersionArgs,
    command::common::Context,
    notes::aggregator::Aggregator,
    version::files,
};

/// Returns the resolved version.
pub fn execute(ctx: &Context, args: &BumpVersionArgs) -> Result<String> {
    let target = ctx.target(&args.target);
    let aggregation =
        Aggregator::new(&ctx.config).aggregate(&ctx.store(), &target)?;

    let changelog =
        ctx.read_document(&ctx.config.changelog, DocumentKind::Changelog)?;
    let next = ctx.next_version(&changelog, &aggregation.records, args.bump)?;

    let changes = files::update_version_files(
        &ctx.workspace,
        &ctx.config.version_files,
        &next,
    )?;
    ctx.commit(&changes)?;

    Ok(next.to_string())
}
