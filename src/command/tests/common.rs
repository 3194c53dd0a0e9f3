//! Common test utilities for command tests.
use chrono::NaiveDate;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

use crate::{
    command::common::Context,
    config::Config,
    forge::{config::RemoteConfig, manager::ForgeManager, traits::MockForge},
    workspace::Workspace,
};

pub const RELEASE_DATE: &str = "2026-10-18";

pub const CHANGELOG: &str = "# Changelog\n\n## Unreleased\n\n## 1.2.0 - 2026-01-01\n\n### Fixes\n\n- fix: a (#1) by @dev1\n";

pub const PACKAGE_JSON: &str =
    "{\n  \"name\": \"widgets\",\n  \"version\": \"1.2.0\"\n}\n";

pub const README: &str = "=== Widgets ===\nStable tag: 1.2.0\n\nShort description.\n\n== Changelog ==\n\n= 1.2.0 - 2026-01-01 =\n\n**Fixes**\n\n* fix: a (#1) by @dev1\n";

/// Creates a context rooted in `tmp` with default configuration and a fixed
/// release date.
pub fn create_test_context(tmp: &TempDir) -> Context {
    Context {
        workspace: Workspace::new(tmp.path()),
        config: Config::default(),
        date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
        dry_run: false,
    }
}

/// Creates a forge manager around a mock that reports a default remote.
pub fn create_test_manager(mut mock_forge: MockForge) -> ForgeManager {
    mock_forge
        .expect_remote_config()
        .returning(RemoteConfig::default);
    ForgeManager::new(Box::new(mock_forge))
}

pub fn write_file(tmp: &TempDir, path: &str, content: &str) -> PathBuf {
    let path = tmp.path().join(path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

pub fn read_file(tmp: &TempDir, path: &str) -> String {
    fs::read_to_string(tmp.path().join(path)).unwrap()
}

pub fn file_exists(tmp: &TempDir, path: &str) -> bool {
    tmp.path().join(path).exists()
}
