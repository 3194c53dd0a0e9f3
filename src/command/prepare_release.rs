//! Runs the whole release preparation in memory and writes every resulting
//! file at a single commit point.
use log::*;

use crate::{
    Result,
    changelog::{ChangelogMerger, DocumentKind},
    cli::PrepareReleaseArgs,
    command::common::Context,
    notes::aggregator::{AggregateTarget, Aggregator},
    readme,
    version::files,
    workspace::FileChange,
};

/// Returns the released version.
pub fn execute(ctx: &Context, args: &PrepareReleaseArgs) -> Result<String> {
    let config = &ctx.config;
    let target = AggregateTarget::Branch(
        args.branch.clone().unwrap_or_else(|| config.main_branch.clone()),
    );

    let aggregation = Aggregator::new(config).aggregate(&ctx.store(), &target)?;

    let changelog = ctx.read_document(&config.changelog, DocumentKind::Changelog)?;
    let next = ctx.next_version(&changelog, &aggregation.records, args.bump)?;

    info!("preparing release {next} from {} changesets", aggregation.records.len());

    let merged_changelog = ChangelogMerger::new(DocumentKind::Changelog, ctx.date)
        .with_unreleased_heading(&config.unreleased_heading)
        .merge(changelog, &aggregation.notes, &next, true)?;

    let notice =
        ctx.read_document(&config.upgrade_notice, DocumentKind::UpgradeNotice)?;
    let merged_notice = ChangelogMerger::new(DocumentKind::UpgradeNotice, ctx.date)
        .merge(notice.clone(), &aggregation.notes, &next, true)?;

    let mut changes = vec![FileChange {
        path: config.changelog.clone(),
        content: merged_changelog.render(),
    }];

    let notice_changed = merged_notice != notice;
    if notice_changed {
        changes.push(FileChange {
            path: config.upgrade_notice.clone(),
            content: merged_notice.render(),
        });
    }

    changes.extend(files::update_version_files(
        &ctx.workspace,
        &config.version_files,
        &next,
    )?);

    if let Some(content) = ctx.workspace.read_optional(&config.readme)? {
        let notice_exists = notice_changed
            || ctx.workspace.read_optional(&config.upgrade_notice)?.is_some();
        let synced = readme::sync(
            &content,
            &merged_changelog,
            notice_exists.then_some(&merged_notice),
        )?;
        changes.push(FileChange {
            path: config.readme.clone(),
            content: synced,
        });
    }

    if let Some(output) = &args.output {
        changes.push(FileChange {
            path: output.display().to_string(),
            content: aggregation.notes.render(),
        });
    }

    let written = ctx.commit(&changes)?;
    debug!("release {next} wrote: {written:?}");

    Ok(next.to_string())
}
