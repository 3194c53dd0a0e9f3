//! Freezes the breaking changes of a release into the upgrade notice.
use log::*;

use crate::{
    Result,
    changelog::{ChangelogMerger, DocumentKind},
    cli::MergeNotesArgs,
    command::common::{self, Context},
    workspace::FileChange,
};

pub fn execute(ctx: &Context, args: &MergeNotesArgs) -> Result<String> {
    let version = common::parse_version(&args.version)?;
    let notes = common::read_notes(&args.notes_file)?;

    if !notes.has_breaking() {
        info!("no breaking changes in {version}: upgrade notice unchanged");
        return Ok(String::new());
    }

    let path = &ctx.config.upgrade_notice;
    let document = ctx.read_document(path, DocumentKind::UpgradeNotice)?;

    let merged = ChangelogMerger::new(DocumentKind::UpgradeNotice, ctx.date)
        .merge(document, &notes, &version, true)?;

    ctx.commit(&[FileChange {
        path: path.clone(),
        content: merged.render(),
    }])?;

    Ok(String::new())
}
