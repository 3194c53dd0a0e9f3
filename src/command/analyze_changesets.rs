//! Prints a JSON overview of the changesets pending for a target.
use crate::{
    Result,
    cli::TargetArgs,
    command::common::Context,
    notes::{aggregator::Aggregator, summary::AnalysisSummary},
};

pub fn execute(ctx: &Context, args: &TargetArgs) -> Result<String> {
    let target = ctx.target(args);
    let aggregation =
        Aggregator::new(&ctx.config).aggregate(&ctx.store(), &target)?;

    AnalysisSummary::from_records(&target, &aggregation.records).to_json()
}
