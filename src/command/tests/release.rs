//! Tests for release preparation and changeset cleanup.
use tempfile::TempDir;

use super::common::*;
use crate::{
    ChangesetError,
    changelog::ChangelogDocument,
    cli::{CleanupArgs, PrepareReleaseArgs},
    command::{cleanup_changesets, prepare_release},
    config::{VersionFileConfig, VersionFileConfigBuilder},
    test_helpers::{
        create_test_merge_record, create_test_record,
        create_test_record_with_body, create_test_store,
    },
};

const RELEASE_NOTES: &str = "### Breaking Changes\n\n- refactor!: rename hooks (#12) by @dev12\n  Use `widgets_init` instead.\n\n### Features\n\n- feat: add widget (#10) by @dev10\n\n### Fixes\n\n- fix: typo (#11) by @dev11\n\n### Chores\n\n- chore: merge milestone 2.0 (#13) by @dev13\n";

/// Develop work, a milestone merged into develop through #13 and a milestone
/// that is still open.
fn setup_release(tmp: &TempDir) {
    write_file(tmp, "CHANGELOG.md", CHANGELOG);
    write_file(tmp, "package.json", PACKAGE_JSON);
    write_file(tmp, "readme.txt", README);
    create_test_store(
        tmp.path(),
        &[
            create_test_record(10, "feat: add widget", "develop"),
            create_test_record(11, "fix: typo", "milestone/2.0"),
            create_test_record_with_body(
                12,
                "refactor!: rename hooks",
                "develop",
                "## Breaking Changes\n\nUse `widgets_init` instead.\n",
            ),
            create_test_merge_record(
                13,
                "chore: merge milestone 2.0",
                "milestone/2.0",
                "develop",
            ),
            create_test_record(50, "fix: pending work", "milestone/3.0"),
        ],
    );
}

#[test_log::test]
fn prepare_release_updates_every_document() {
    let tmp = TempDir::new().unwrap();
    let ctx = create_test_context(&tmp);
    setup_release(&tmp);

    let args = PrepareReleaseArgs {
        output: Some(tmp.path().join("release-notes.md")),
        ..PrepareReleaseArgs::default()
    };

    let version = prepare_release::execute(&ctx, &args).unwrap();

    assert_eq!(version, "2.0.0");
    assert_eq!(
        read_file(&tmp, "CHANGELOG.md"),
        format!(
            "# Changelog\n\n## Unreleased\n\n## 2.0.0 - {RELEASE_DATE}\n\n{RELEASE_NOTES}\n## 1.2.0 - 2026-01-01\n\n### Fixes\n\n- fix: a (#1) by @dev1\n"
        )
    );
    assert_eq!(
        read_file(&tmp, "UPGRADE.md"),
        "# Upgrade Notice\n\n## 2.0.0\n\n### Breaking Changes\n\n- refactor!: rename hooks (#12) by @dev12\n  Use `widgets_init` instead.\n\n"
    );
    assert_eq!(
        read_file(&tmp, "package.json"),
        "{\n  \"name\": \"widgets\",\n  \"version\": \"2.0.0\"\n}\n"
    );
    assert_eq!(read_file(&tmp, "release-notes.md"), RELEASE_NOTES);

    let readme = read_file(&tmp, "readme.txt");
    assert!(readme.contains("Stable tag: 2.0.0\n"));
    assert!(readme.contains(&format!(
        "== Changelog ==\n\n= 2.0.0 - {RELEASE_DATE} =\n\n**Breaking Changes**\n\n"
    )));
    assert!(readme.ends_with(
        "== Upgrade Notice ==\n\n= 2.0.0 =\n\n**Breaking Changes**\n\n* refactor!: rename hooks (#12) by @dev12\n  Use `widgets_init` instead.\n"
    ));
}

#[test_log::test]
fn prepare_release_with_forced_bump() {
    let tmp = TempDir::new().unwrap();
    let ctx = create_test_context(&tmp);
    write_file(&tmp, "CHANGELOG.md", CHANGELOG);
    create_test_store(tmp.path(), &[create_test_record(10, "fix: a", "develop")]);

    let args = PrepareReleaseArgs {
        bump: Some(crate::version::BumpType::Minor),
        ..PrepareReleaseArgs::default()
    };

    assert_eq!(prepare_release::execute(&ctx, &args).unwrap(), "1.3.0");
    assert!(!file_exists(&tmp, "UPGRADE.md"));
    assert!(!file_exists(&tmp, "readme.txt"));
}

#[test_log::test]
fn prepare_release_rerun_reuses_version() {
    let tmp = TempDir::new().unwrap();
    let ctx = create_test_context(&tmp);
    setup_release(&tmp);

    let args = PrepareReleaseArgs {
        output: Some(tmp.path().join("release-notes.md")),
        ..PrepareReleaseArgs::default()
    };

    assert_eq!(prepare_release::execute(&ctx, &args).unwrap(), "2.0.0");
    let changelog = read_file(&tmp, "CHANGELOG.md");
    let notice = read_file(&tmp, "UPGRADE.md");
    let readme = read_file(&tmp, "readme.txt");

    assert_eq!(prepare_release::execute(&ctx, &args).unwrap(), "2.0.0");

    assert_eq!(read_file(&tmp, "CHANGELOG.md"), changelog);
    assert_eq!(read_file(&tmp, "UPGRADE.md"), notice);
    assert_eq!(read_file(&tmp, "readme.txt"), readme);
    assert_eq!(changelog.matches("feat: add widget (#10)").count(), 1);
    assert!(!changelog.contains("## 3.0.0"));
    assert!(read_file(&tmp, "package.json").contains("\"version\": \"2.0.0\""));
}

#[test_log::test]
fn unmerged_milestone_survives_release_and_cleanup() {
    let tmp = TempDir::new().unwrap();
    let ctx = create_test_context(&tmp);
    setup_release(&tmp);

    prepare_release::execute(&ctx, &PrepareReleaseArgs::default()).unwrap();
    assert!(!read_file(&tmp, "CHANGELOG.md").contains("(#50)"));

    cleanup_changesets::execute(&ctx, &CleanupArgs::default()).unwrap();

    let remaining = ctx.store().load().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].pr_number, 50);
    assert!(file_exists(&tmp, ".changesets/milestone-3-0-50.md"));
}

#[test_log::test]
fn cleanup_after_release_leaves_nothing_to_release() {
    let tmp = TempDir::new().unwrap();
    let ctx = create_test_context(&tmp);
    setup_release(&tmp);

    prepare_release::execute(&ctx, &PrepareReleaseArgs::default()).unwrap();

    let output =
        cleanup_changesets::execute(&ctx, &CleanupArgs::default()).unwrap();
    assert_eq!(output, "4 changesets removed");

    let result = prepare_release::execute(&ctx, &PrepareReleaseArgs::default());
    assert!(matches!(result, Err(ChangesetError::NoChanges)));
}

#[test_log::test]
fn cleanup_for_branch_keeps_other_changesets() {
    let tmp = TempDir::new().unwrap();
    let ctx = create_test_context(&tmp);
    setup_release(&tmp);

    let args = CleanupArgs {
        branch: Some("milestone/2.0".into()),
    };

    let output = cleanup_changesets::execute(&ctx, &args).unwrap();

    assert_eq!(output, "1 changesets removed");
    let remaining = ctx.store().load().unwrap();
    assert_eq!(remaining.len(), 4);
    assert!(remaining.iter().all(|r| r.target_branch != "milestone/2.0"));
}

#[test_log::test]
fn cleanup_dry_run_keeps_changesets() {
    let tmp = TempDir::new().unwrap();
    let mut ctx = create_test_context(&tmp);
    ctx.dry_run = true;
    setup_release(&tmp);

    let output =
        cleanup_changesets::execute(&ctx, &CleanupArgs::default()).unwrap();

    assert_eq!(output, "4 changesets would be removed");
    assert_eq!(ctx.store().load().unwrap().len(), 5);
}

#[test_log::test]
fn breaking_code_sample_keeps_older_releases() {
    let tmp = TempDir::new().unwrap();
    let ctx = create_test_context(&tmp);
    write_file(&tmp, "CHANGELOG.md", CHANGELOG);
    create_test_store(
        tmp.path(),
        &[create_test_record_with_body(
            12,
            "refactor!: rename hooks",
            "develop",
            "## Breaking Changes\n\n```php\n## Removed hooks\nwidgets_setup();\n",
        )],
    );

    prepare_release::execute(&ctx, &PrepareReleaseArgs::default()).unwrap();

    let changelog = read_file(&tmp, "CHANGELOG.md");
    assert!(changelog.contains(
        "- refactor!: rename hooks (#12) by @dev12\n  ```php\n  ## Removed hooks\n  widgets_setup();\n  ```\n"
    ));

    let doc = ChangelogDocument::parse(&changelog);
    let versions = doc
        .releases()
        .filter_map(|s| s.version().map(|v| v.to_string()))
        .collect::<Vec<String>>();
    assert_eq!(versions, vec!["2.0.0", "1.2.0"]);
}

#[test_log::test]
fn failed_release_leaves_tree_untouched() {
    let tmp = TempDir::new().unwrap();
    let mut ctx = create_test_context(&tmp);
    ctx.config.version_files = vec![
        VersionFileConfig::default(),
        VersionFileConfigBuilder::default()
            .path("VERSION")
            .build()
            .unwrap(),
    ];
    setup_release(&tmp);
    write_file(&tmp, "VERSION", "1.2.0\n");

    let result = prepare_release::execute(&ctx, &PrepareReleaseArgs::default());

    assert!(matches!(result, Err(ChangesetError::InvalidConfig(_))));
    assert_eq!(read_file(&tmp, "CHANGELOG.md"), CHANGELOG);
    assert_eq!(read_file(&tmp, "package.json"), PACKAGE_JSON);
    assert_eq!(read_file(&tmp, "readme.txt"), README);
    assert!(!file_exists(&tmp, "UPGRADE.md"));
    assert_eq!(read_file(&tmp, "VERSION"), "1.2.0\n");
}

#[test_log::test]
fn prepare_release_dry_run_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let mut ctx = create_test_context(&tmp);
    ctx.dry_run = true;
    setup_release(&tmp);

    let version =
        prepare_release::execute(&ctx, &PrepareReleaseArgs::default()).unwrap();

    assert_eq!(version, "2.0.0");
    assert_eq!(read_file(&tmp, "CHANGELOG.md"), CHANGELOG);
    assert_eq!(read_file(&tmp, "package.json"), PACKAGE_JSON);
    assert!(!file_exists(&tmp, "UPGRADE.md"));
}
