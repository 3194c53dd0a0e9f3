//! Front-matter serialisation of a changeset record.
//!
//! ```text
//! ---
//! pr: 42
//! title: feat: add widget
//! author: octocat
//! source: feature/widget
//! target: develop
//! created: 2026-10-18T09:30:00Z
//! ---
//!
//! free markdown body
//! ```
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use std::{collections::BTreeMap, fmt::Write, sync::LazyLock};

use crate::{
    ChangesetError, Result,
    changeset::record::{
        ChangesetRecord, KEY_REGEX, normalize_body, truncate_to_seconds,
    },
    classifier,
};

const FENCE: &str = "---";

/// "key: value" line of the metadata block
static META_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9_-]*)\s*:(.*)$").unwrap()
});

/// Metadata keys with a fixed meaning.
pub(super) const KNOWN_KEYS: [&str; 7] =
    ["pr", "title", "author", "branch", "source", "target", "created"];

/// Render a record into its file representation.
pub fn render(record: &ChangesetRecord) -> String {
    let mut out = String::new();

    _ = writeln!(out, "{FENCE}");
    _ = writeln!(out, "pr: {}", record.pr_number);
    _ = writeln!(out, "title: {}", record.title);
    _ = writeln!(out, "author: {}", record.author);
    _ = writeln!(out, "source: {}", record.source_branch);
    _ = writeln!(out, "target: {}", record.target_branch);
    _ = writeln!(
        out,
        "created: {}",
        record.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    for (key, value) in record.extra.iter() {
        _ = writeln!(out, "{key}: {value}");
    }

    _ = writeln!(out, "{FENCE}");

    if !record.body.is_empty() {
        out.push('\n');
        out.push_str(&record.body);
    }

    out
}

/// Parse a record file. `path` is only used for error messages and
/// `fallback_created` is used when the file has no `created` key.
pub fn parse(
    path: &str,
    content: &str,
    fallback_created: DateTime<Utc>,
) -> Result<ChangesetRecord> {
    let content = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");
    let mut lines = content.split_inclusive('\n');

    let first = lines.next().unwrap_or_default();
    if first.trim() != FENCE {
        return Err(ChangesetError::malformed(
            path,
            "missing opening metadata fence",
        ));
    }

    let mut meta: BTreeMap<String, String> = BTreeMap::new();
    let mut closed = false;
    let mut consumed = first.len();

    for line in lines.by_ref() {
        consumed += line.len();
        let trimmed = line.trim();

        if trimmed == FENCE {
            closed = true;
            break;
        }

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let caps = META_LINE_REGEX.captures(trimmed).ok_or_else(|| {
            ChangesetError::malformed(
                path,
                format!("invalid metadata line: {trimmed}"),
            )
        })?;

        let key = caps[1].to_ascii_lowercase();
        let value = caps[2].trim().to_string();

        if meta.insert(key.clone(), value).is_some() {
            return Err(ChangesetError::malformed(
                path,
                format!("duplicate metadata key: {key}"),
            ));
        }
    }

    if !closed {
        return Err(ChangesetError::malformed(
            path,
            "missing closing metadata fence",
        ));
    }

    let body = normalize_body(&content[consumed..]);

    let pr_number = meta
        .get("pr")
        .ok_or_else(|| ChangesetError::malformed(path, "missing pr"))?
        .trim_start_matches('#')
        .parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| {
            ChangesetError::malformed(path, "pr must be a positive integer")
        })?;

    let title = meta
        .get("title")
        .filter(|t| !t.is_empty())
        .cloned()
        .ok_or_else(|| ChangesetError::malformed(path, "missing title"))?;

    let target_branch = meta
        .get("target")
        .or_else(|| meta.get("branch"))
        .filter(|t| !t.is_empty())
        .cloned()
        .ok_or_else(|| {
            ChangesetError::malformed(path, "missing target branch")
        })?;

    let created_at = match meta.get("created") {
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| {
                ChangesetError::malformed(
                    path,
                    format!("invalid created timestamp: {e}"),
                )
            })?,
        None => truncate_to_seconds(fallback_created),
    };

    let author = meta
        .get("author")
        .map(|a| a.trim_start_matches('@').to_string())
        .unwrap_or_default();

    let source_branch = meta.get("source").cloned().unwrap_or_default();

    let mut extra = BTreeMap::new();
    for (key, value) in meta.iter() {
        if KNOWN_KEYS.contains(&key.as_str()) {
            continue;
        }
        if !KEY_REGEX.is_match(key) {
            continue;
        }
        extra.insert(key.clone(), value.clone());
    }

    // an explicit target wins; keep a redundant branch key around
    if meta.contains_key("target")
        && let Some(branch) = meta.get("branch")
    {
        extra.insert("branch".into(), branch.clone());
    }

    let classification = classifier::classify_text(&title, &body);

    Ok(ChangesetRecord {
        pr_number,
        title,
        author,
        source_branch,
        target_branch,
        body,
        change_type: classification.change_type,
        is_breaking: classification.is_breaking,
        created_at,
        extra,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{changeset::ChangesetDraftBuilder, classifier::ChangeType};
    use chrono::TimeZone;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap()
    }

    fn record(title: &str, body: &str) -> ChangesetRecord {
        ChangesetDraftBuilder::default()
            .pr_number(42u64)
            .title(title)
            .author("octocat")
            .source_branch("feature/widget")
            .target_branch("develop")
            .body(body)
            .build()
            .unwrap()
            .into_record(created())
            .unwrap()
    }

    #[test]
    fn test_render_layout() {
        let rendered = render(&record("feat: add widget", "Adds a widget."));
        assert_eq!(
            rendered,
            "---\npr: 42\ntitle: feat: add widget\nauthor: octocat\nsource: feature/widget\ntarget: develop\ncreated: 2026-10-18T09:30:00Z\n---\n\nAdds a widget.\n"
        );
    }

    #[test]
    fn test_round_trip() {
        let mut original = record(
            "feat!: drop legacy API",
            "Intro\n\n## Breaking Changes\n\n- `legacy_api()` is gone\n",
        );
        original.extra.insert("labels".into(), "api, php".into());

        let parsed = parse("develop-42.md", &render(&original), Utc::now()).unwrap();
        assert_eq!(parsed, original);
        assert_eq!(parsed.change_type, ChangeType::Feature);
        assert!(parsed.is_breaking);
    }

    #[test]
    fn test_round_trip_empty_body() {
        let original = record("fix: typo", "");
        let rendered = render(&original);
        assert!(rendered.ends_with("---\n"));
        assert_eq!(parse("x.md", &rendered, Utc::now()).unwrap(), original);
    }

    #[test]
    fn test_branch_is_target_alias() {
        let content = "---\npr: #7\ntitle: docs: readme\nbranch: milestone/2.0\n---\nbody\n";
        let parsed = parse("m.md", content, created()).unwrap();
        assert_eq!(parsed.pr_number, 7);
        assert_eq!(parsed.target_branch, "milestone/2.0");
        assert_eq!(parsed.created_at, created());
        assert_eq!(parsed.author, "");
        assert_eq!(parsed.body, "body\n");
        assert!(parsed.extra.is_empty());
    }

    #[test]
    fn test_unknown_keys_collected() {
        let content = "---\npr: 3\ntitle: chore: deps\ntarget: develop\nReviewer: someone\n---\n";
        let parsed = parse("d.md", content, created()).unwrap();
        assert_eq!(parsed.extra.get("reviewer").map(String::as_str), Some("someone"));
    }

    #[test]
    fn test_malformed_inputs() {
        let cases = [
            "no fence at all",
            "---\npr: 1\ntitle: x\ntarget: develop\n",
            "---\ntitle: x\ntarget: develop\n---\n",
            "---\npr: abc\ntitle: x\ntarget: develop\n---\n",
            "---\npr: 0\ntitle: x\ntarget: develop\n---\n",
            "---\npr: 1\ntarget: develop\n---\n",
            "---\npr: 1\ntitle: x\n---\n",
            "---\npr: 1\ntitle: x\ntarget: develop\ncreated: yesterday\n---\n",
            "---\npr: 1\npr: 2\ntitle: x\ntarget: develop\n---\n",
            "---\npr: 1\njust words\n---\n",
        ];

        for content in cases {
            let result = parse("bad.md", content, created());
            assert!(
                matches!(result, Err(ChangesetError::MalformedRecord { .. })),
                "expected malformed for {content:?}"
            );
        }
    }

    #[test]
    fn test_crlf_content() {
        let content = "---\r\npr: 5\r\ntitle: fix: crlf\r\ntarget: develop\r\n---\r\n\r\nline\r\n";
        let parsed = parse("c.md", content, created()).unwrap();
        assert_eq!(parsed.title, "fix: crlf");
        assert_eq!(parsed.body, "line\n");
    }
}
