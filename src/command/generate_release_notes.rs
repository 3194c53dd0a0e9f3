//! Aggregates changesets into release notes.
use log::*;
use std::fs;

use crate::{
    Result, cli::ReleaseNotesArgs, command::common::Context,
    notes::aggregator::Aggregator,
};

/// Returns the notes, or nothing when they were written to `--output`.
pub fn execute(ctx: &Context, args: &ReleaseNotesArgs) -> Result<String> {
    let target = ctx.target(&args.target);
    let aggregation =
        Aggregator::new(&ctx.config).aggregate(&ctx.store(), &target)?;
    let notes = aggregation.notes.render();

    let Some(output) = &args.output else {
        return Ok(notes);
    };

    if ctx.dry_run {
        warn!("dry_run: would write notes to {}", output.display());
        return Ok(notes);
    }

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, &notes)?;
    info!("wrote release notes to {}", output.display());

    Ok(String::new())
}
