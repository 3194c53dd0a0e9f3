//! Freezes release notes into the changelog under a version.
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

    let path = &ctx.config.changelog;
    let document = ctx.read_document(path, DocumentKind::Changelog)?;

    let merged = ChangelogMerger::new(DocumentKind::Changelog, ctx.date)
        .with_unreleased_heading(&ctx.config.unreleased_heading)
        .merge(document, &notes, &version, true)?;

    ctx.commit(&[FileChange {
        path: path.clone(),
        content: merged.render(),
    }])?;

    Ok(String::new())
}
