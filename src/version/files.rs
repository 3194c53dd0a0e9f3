//! Writes a resolved version into the files that carry it.
use log::*;
use regex::{Captures, Regex};
use semver::Version;
use serde_json::{Value, json};
use std::{path::Path, sync::LazyLock};

use crate::{
    ChangesetError, Result,
    config::VersionFileConfig,
    workspace::{FileChange, Workspace},
};

/// `Version:` line of a plugin header comment
static PHP_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t/*#@]*Version:[ \t]*)([^\s]+)").unwrap()
});

/// `define( 'PLUGIN_VERSION', '1.2.3' )`
static PHP_DEFINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(define\(\s*['"][A-Za-z0-9_]*VERSION['"]\s*,\s*['"])([^'"]+)(['"])"#,
    )
    .unwrap()
});

/// Rewrites the version inside one file's content.
pub trait VersionUpdater {
    /// New content, or `None` when the file carries no version.
    fn update(
        &self,
        path: &str,
        content: &str,
        version: &Version,
    ) -> Result<Option<String>>;
}

/// Top level `version` key of a JSON manifest such as package.json.
pub struct JsonVersion {}

impl VersionUpdater for JsonVersion {
    fn update(
        &self,
        path: &str,
        content: &str,
        version: &Version,
    ) -> Result<Option<String>> {
        let mut doc: Value = serde_json::from_str(content)?;

        let Some(obj) = doc.as_object_mut() else {
            warn!("{path} is not a valid JSON object");
            return Ok(None);
        };

        obj.insert("version".to_string(), json!(version.to_string()));

        let mut formatted = serde_json::to_string_pretty(&doc)?;
        if content.ends_with('\n') {
            formatted.push('\n');
        }

        Ok(Some(formatted))
    }
}

/// Plugin header `Version:` line and `*_VERSION` constants.
pub struct PhpVersion {}

impl VersionUpdater for PhpVersion {
    fn update(
        &self,
        path: &str,
        content: &str,
        version: &Version,
    ) -> Result<Option<String>> {
        if !PHP_HEADER_REGEX.is_match(content)
            && !PHP_DEFINE_REGEX.is_match(content)
        {
            debug!("{path}: no version header or constant");
            return Ok(None);
        }

        let updated = PHP_HEADER_REGEX
            .replace_all(content, |caps: &Captures| format!("{}{version}", &caps[1]));

        let updated = PHP_DEFINE_REGEX.replace_all(&updated, |caps: &Captures| {
            format!("{}{version}{}", &caps[1], &caps[3])
        });

        Ok(Some(updated.into_owned()))
    }
}

/// User supplied regex; capture group 1 holds the version.
pub struct PatternVersion {
    regex: Regex,
}

impl PatternVersion {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        if regex.captures_len() < 2 {
            return Err(ChangesetError::invalid_config(format!(
                "version pattern needs a capture group: {pattern}"
            )));
        }
        Ok(Self { regex })
    }
}

impl VersionUpdater for PatternVersion {
    fn update(
        &self,
        path: &str,
        content: &str,
        version: &Version,
    ) -> Result<Option<String>> {
        let mut updated = String::with_capacity(content.len());
        let mut last = 0;
        let mut matched = false;

        for caps in self.regex.captures_iter(content) {
            let Some(slot) = caps.get(1) else {
                continue;
            };
            updated.push_str(&content[last..slot.start()]);
            updated.push_str(&version.to_string());
            last = slot.end();
            matched = true;
        }

        if !matched {
            debug!("{path}: pattern {} did not match", self.regex.as_str());
            return Ok(None);
        }

        updated.push_str(&content[last..]);
        Ok(Some(updated))
    }
}

/// Pick the handler for a configured version file.
pub fn updater_for(file: &VersionFileConfig) -> Result<Box<dyn VersionUpdater>> {
    if let Some(pattern) = &file.pattern {
        return Ok(Box::new(PatternVersion::new(pattern)?));
    }

    let extension = Path::new(&file.path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("json") => Ok(Box::new(JsonVersion {})),
        Some("php") => Ok(Box::new(PhpVersion {})),
        _ => Err(ChangesetError::invalid_config(format!(
            "no version handler for {}: configure a pattern",
            file.path
        ))),
    }
}

/// File changes writing `version` into every configured file. Missing files
/// and files without a version are skipped with a warning.
pub fn update_version_files(
    workspace: &Workspace,
    files: &[VersionFileConfig],
    version: &Version,
) -> Result<Vec<FileChange>> {
    let mut changes = vec![];

    for file in files.iter() {
        let updater = updater_for(file)?;

        let Some(content) = workspace.read_optional(&file.path)? else {
            warn!("version file not found: {}", file.path);
            continue;
        };

        match updater.update(&file.path, &content, version)? {
            Some(updated) => {
                info!("updating {} version to {version}", file.path);
                changes.push(FileChange {
                    path: file.path.clone(),
                    content: updated,
                });
            }
            None => warn!("no version found in {}: left untouched", file.path),
        }
    }

    Ok(changes)
}

/// The `version` field of a JSON manifest.
pub fn read_json_version(content: &str) -> Result<Option<Version>> {
    let doc: Value = serde_json::from_str(content)?;

    match doc.get("version").and_then(Value::as_str) {
        Some(version) => Ok(Some(Version::parse(version.trim())?)),
        None => Ok(None),
    }
}
