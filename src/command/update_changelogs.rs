//! Without a version, rewrites the unreleased section of the changelog.
//! With one, freezes the notes into both the changelog and the upgrade
//! notice in a single write.
use crate::{
    Result,
    changelog::{ChangelogMerger, DocumentKind},
    cli::UpdateChangelogsArgs,
    command::common::{self, Context},
    workspace::FileChange,
};

pub fn execute(ctx: &Context, args: &UpdateChangelogsArgs) -> Result<String> {
    let notes = common::read_notes(&args.notes_file)?;

    let changelog_path = &ctx.config.changelog;
    let changelog =
        ctx.read_document(changelog_path, DocumentKind::Changelog)?;

    let mut merger = ChangelogMerger::new(DocumentKind::Changelog, ctx.date)
        .with_unreleased_heading(&ctx.config.unreleased_heading);

    if let Some(milestone) = &args.milestone {
        merger = merger.with_milestone(milestone);
    }

    let Some(version) = &args.version else {
        let last = ctx.last_version(&changelog)?;
        let merged = merger.merge(changelog, &notes, &last, false)?;

        ctx.commit(&[FileChange {
            path: changelog_path.clone(),
            content: merged.render(),
        }])?;

        return Ok(String::new());
    };

    let version = common::parse_version(version)?;
    let merged_changelog = merger.merge(changelog, &notes, &version, true)?;

    let notice_path = &ctx.config.upgrade_notice;
    let notice = ctx.read_document(notice_path, DocumentKind::UpgradeNotice)?;
    let merged_notice =
        ChangelogMerger::new(DocumentKind::UpgradeNotice, ctx.date).merge(
            notice.clone(),
            &notes,
            &version,
            true,
        )?;

    let mut changes = vec![FileChange {
        path: changelog_path.clone(),
        content: merged_changelog.render(),
    }];

    if merged_notice != notice {
        changes.push(FileChange {
            path: notice_path.clone(),
            content: merged_notice.render(),
        });
    }

    ctx.commit(&changes)?;

    Ok(String::new())
}
