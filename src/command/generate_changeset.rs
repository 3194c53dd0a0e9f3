//! Writes the changeset record for a merged pull request.
use chrono::Utc;
use log::*;
use std::fs;

use crate::{
    ChangesetError, Result,
    changeset::{self, ChangesetDraftBuilder},
    cli::GenerateChangesetArgs,
    command::common::Context,
};

/// Returns the path of the written record.
pub fn execute(ctx: &Context, args: &GenerateChangesetArgs) -> Result<String> {
    let body = match &args.body_file {
        Some(path) => fs::read_to_string(path)?,
        None => args.body.clone().unwrap_or_default(),
    };

    let target = args
        .target
        .clone()
        .or_else(|| args.branch.clone())
        .unwrap_or_else(|| ctx.config.develop_branch.clone());

    let record = ChangesetDraftBuilder::default()
        .pr_number(args.pr)
        .title(args.title.as_str())
        .author(args.author.as_str())
        .source_branch(args.source.as_str())
        .target_branch(target)
        .body(body)
        .build()
        .map_err(|err| ChangesetError::InvalidArgs(err.to_string()))?
        .into_record(Utc::now())?;

    info!(
        "PR #{} classified as {}{}",
        record.pr_number,
        record.change_type,
        if record.is_breaking { " (breaking)" } else { "" }
    );

    let store = ctx.store();

    if ctx.dry_run {
        let path = store.path_for(&record.target_branch, record.pr_number);
        warn!(
            "dry_run: would write {}:\n{}",
            path.display(),
            changeset::render(&record)
        );
        return Ok(path.display().to_string());
    }

    let path = store.write(&record)?;
    Ok(path.display().to_string())
}
