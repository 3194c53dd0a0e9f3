//! Syncs readme.txt with the changelog and upgrade notice.
use log::*;

use crate::{
    Result,
    changelog::{ChangelogDocument, DocumentKind},
    command::common::Context,
    readme,
    workspace::FileChange,
};

pub fn execute(ctx: &Context) -> Result<String> {
    let Some(content) = ctx.workspace.read_optional(&ctx.config.readme)? else {
        warn!("{} not found: nothing to update", ctx.config.readme);
        return Ok(String::new());
    };

    let changelog =
        ctx.read_document(&ctx.config.changelog, DocumentKind::Changelog)?;
    let notice = ctx
        .workspace
        .read_optional(&ctx.config.upgrade_notice)?
        .map(|content| ChangelogDocument::parse(&content));

    let updated = readme::sync(&content, &changelog, notice.as_ref())?;

    ctx.commit(&[FileChange {
        path: ctx.config.readme.clone(),
        content: updated,
    }])?;

    Ok(String::new())
}
