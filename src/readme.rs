//! Keeps a WordPress style `readme.txt` in line with the Markdown changelog
//! and upgrade notice.
use log::*;
use regex::{Captures, Regex};
use semver::Version;
use std::sync::LazyLock;

use crate::{
    Result,
    changelog::{ChangelogDocument, Section},
};

pub const CHANGELOG_SECTION: &str = "Changelog";
pub const UPGRADE_NOTICE_SECTION: &str = "Upgrade Notice";

/// "Stable tag: 1.2.3" header line
static STABLE_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^(Stable tag:[ \t]*)(\S*)[ \t]*$").unwrap()
});

/// Any "== Section ==" heading
static SECTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^==[^=\n].*==[ \t]*$").unwrap());

/// A "= 1.2.3 =" entry heading inside a section
static BLOCK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^=[^=\n].*=[ \t]*$").unwrap());

/// Version at the start of an entry heading, e.g. "= v1.2.3 - 2026-01-01 ="
static BLOCK_VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^=\s*v?(\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?)").unwrap()
});

/// One "= title =" entry of a readme section.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Block {
    version: Option<Version>,
    text: String,
}

impl Block {
    fn parse(text: &str) -> Self {
        let version = BLOCK_VERSION_REGEX
            .captures(text)
            .and_then(|caps| Version::parse(&caps[1]).ok());
        Self {
            version,
            text: text.trim_end().to_string(),
        }
    }
}

/// Rewrite `readme` from the frozen sections of both documents.
pub fn sync(
    readme: &str,
    changelog: &ChangelogDocument,
    upgrade_notice: Option<&ChangelogDocument>,
) -> Result<String> {
    let mut content = readme.replace("\r\n", "\n");

    if let Some(version) = changelog.latest_release() {
        content = set_stable_tag(&content, version);
    }

    let changelog_blocks = to_readme_blocks(changelog);
    if !changelog_blocks.is_empty() {
        content = replace_section(&content, CHANGELOG_SECTION, changelog_blocks)?;
    }

    if let Some(doc) = upgrade_notice {
        let notice_blocks = to_readme_blocks(doc);
        if !notice_blocks.is_empty() {
            content =
                replace_section(&content, UPGRADE_NOTICE_SECTION, notice_blocks)?;
        }
    }

    Ok(content)
}

fn set_stable_tag(content: &str, version: &Version) -> String {
    if !STABLE_TAG_REGEX.is_match(content) {
        warn!("readme has no Stable tag header");
        return content.to_string();
    }

    STABLE_TAG_REGEX
        .replace(content, |caps: &Captures| format!("{}{version}", &caps[1]))
        .into_owned()
}

/// Frozen sections rendered in readme syntax, newest first.
fn to_readme_blocks(doc: &ChangelogDocument) -> Vec<Block> {
    doc.releases()
        .map(|section| Block {
            version: section.version().cloned(),
            text: to_readme_section(section),
        })
        .collect()
}

fn to_readme_section(section: &Section) -> String {
    let title = section.heading.trim_start_matches('#').trim();
    let mut lines = vec![format!("= {title} ="), String::new()];

    for line in section.body.trim().lines() {
        let line = line.trim_end();
        if let Some(heading) = line.strip_prefix("### ") {
            lines.push(format!("**{}**", heading.trim()));
        } else if let Some(entry) = line.strip_prefix("- ") {
            lines.push(format!("* {entry}"));
        } else {
            lines.push(line.to_string());
        }
    }

    let mut out = lines.join("\n");
    // empty body
    while out.ends_with('\n') {
        out.pop();
    }
    out
}

/// Merge `blocks` into the body of `== title ==`, appending the section when
/// missing. Existing entries for other versions are kept.
fn replace_section(
    content: &str,
    title: &str,
    blocks: Vec<Block>,
) -> Result<String> {
    let heading_regex = Regex::new(&format!(
        r"(?mi)^==\s*{}\s*==[ \t]*$",
        regex::escape(title)
    ))?;

    let Some(heading) = heading_regex.find(content) else {
        debug!("appending missing {title} section to readme");
        let section = render_section(title, "", &blocks);
        let existing = content.trim_end();
        if existing.is_empty() {
            return Ok(section);
        }
        return Ok(format!("{existing}\n\n{section}"));
    };

    let rest = &content[heading.end()..];
    let next = SECTION_REGEX.find(rest).map(|m| heading.end() + m.start());
    let body = &content[heading.end()..next.unwrap_or(content.len())];

    let (intro, existing) = split_blocks(body);
    let merged = merge_blocks(blocks, existing);

    let mut out = content[..heading.start()].to_string();
    out.push_str(&render_section(title, &intro, &merged));
    if let Some(next) = next {
        out.push('\n');
        out.push_str(&content[next..]);
    }

    Ok(out)
}

/// Free text before the first entry, and the entries themselves.
fn split_blocks(body: &str) -> (String, Vec<Block>) {
    let starts = BLOCK_REGEX
        .find_iter(body)
        .map(|m| m.start())
        .collect::<Vec<usize>>();

    let intro_end = starts.first().copied().unwrap_or(body.len());
    let intro = body[..intro_end].trim().to_string();

    let blocks = starts
        .iter()
        .enumerate()
        .map(|(i, start)| {
            let end = starts.get(i + 1).copied().unwrap_or(body.len());
            Block::parse(&body[*start..end])
        })
        .collect();

    (intro, blocks)
}

/// Generated entries replace existing ones of the same version. Other
/// versioned entries are slotted in by version, unversioned ones stay below
/// the entry they followed.
fn merge_blocks(generated: Vec<Block>, existing: Vec<Block>) -> Vec<Block> {
    let mut merged = generated;
    let mut anchor = 0;

    for block in existing {
        let Some(version) = block.version.clone() else {
            let index = anchor.min(merged.len());
            merged.insert(index, block);
            anchor = index + 1;
            continue;
        };

        if let Some(index) = merged
            .iter()
            .position(|b| b.version.as_ref() == Some(&version))
        {
            anchor = index + 1;
            continue;
        }

        debug!("keeping readme entry for {version}");
        let index = merged
            .iter()
            .position(|b| b.version.as_ref().is_some_and(|v| v < &version))
            .unwrap_or(merged.len());
        merged.insert(index, block);
        anchor = index + 1;
    }

    merged
}

fn render_section(title: &str, intro: &str, blocks: &[Block]) -> String {
    let mut parts = vec![];
    if !intro.is_empty() {
        parts.push(intro);
    }
    parts.extend(blocks.iter().map(|b| b.text.as_str()));

    format!("== {title} ==\n\n{}\n", parts.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const README: &str = "=== Widgets ===\nContributors: someone\nStable tag: 1.2.0\nLicense: GPLv2\n\nShort description.\n\n== Description ==\n\nA plugin.\n\n== Changelog ==\n\n= 1.2.0 =\n* old\n\n== Upgrade Notice ==\n\n= 1.0.0 =\nold notice\n\n== Screenshots ==\n\n1. One\n";

    fn changelog() -> ChangelogDocument {
        ChangelogDocument::parse(
            "# Changelog\n\n## Unreleased\n\n## 1.3.0 - 2026-10-18\n\n### Breaking Changes\n\n- feat!: drop legacy (#20) by @bob\n  Call `new_api()` instead.\n\n### Fixes\n\n- fix: typo (#21) by @carol\n\n## 1.2.0 - 2026-01-01\n\n### Features\n\n- feat: a (#1) by @dev\n",
        )
    }

    fn upgrade_notice() -> ChangelogDocument {
        ChangelogDocument::parse(
            "# Upgrade Notice\n\n## 1.3.0\n\n### Breaking Changes\n\n- feat!: drop legacy (#20) by @bob\n",
        )
    }

    #[test]
    fn test_sync_rewrites_sections_and_tag() {
        let updated =
            sync(README, &changelog(), Some(&upgrade_notice())).unwrap();

        assert!(updated.contains("Stable tag: 1.3.0\n"));
        assert!(updated.contains(
            "== Changelog ==\n\n= 1.3.0 - 2026-10-18 =\n\n**Breaking Changes**\n\n* feat!: drop legacy (#20) by @bob\n  Call `new_api()` instead.\n\n**Fixes**\n\n* fix: typo (#21) by @carol\n\n= 1.2.0 - 2026-01-01 =\n\n**Features**\n\n* feat: a (#1) by @dev\n\n== Upgrade Notice =="
        ));
        assert!(updated.contains(
            "== Upgrade Notice ==\n\n= 1.3.0 =\n\n**Breaking Changes**\n\n* feat!: drop legacy (#20) by @bob\n\n= 1.0.0 =\nold notice\n\n== Screenshots ==\n\n1. One\n"
        ));
        assert!(updated.contains("== Description ==\n\nA plugin.\n\n"));
    }

    #[test]
    fn test_sync_is_idempotent() {
        let once = sync(README, &changelog(), Some(&upgrade_notice())).unwrap();
        let twice = sync(&once, &changelog(), Some(&upgrade_notice())).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sync_keeps_hand_written_entries() {
        let readme = "=== Widgets ===\nStable tag: 1.2.0\n\n== Changelog ==\n\nOlder entries live on the website.\n\n= 1.2.5 =\n* backport\n\n= 1.2.0 =\n* old\n\n= Beta =\n* testing\n\n= 0.9.0 =\n* first\n\n== Other Notes ==\n\nnone\n";

        let once = sync(readme, &changelog(), None).unwrap();
        let twice = sync(&once, &changelog(), None).unwrap();

        assert_eq!(once, twice);
        assert!(once.contains(
            "== Changelog ==\n\nOlder entries live on the website.\n\n= 1.3.0 - 2026-10-18 =\n\n"
        ));
        assert!(once.contains(
            "* fix: typo (#21) by @carol\n\n= 1.2.5 =\n* backport\n\n= 1.2.0 - 2026-01-01 =\n\n**Features**\n\n* feat: a (#1) by @dev\n\n= Beta =\n* testing\n\n= 0.9.0 =\n* first\n\n== Other Notes ==\n\nnone\n"
        ));
        assert!(!once.contains("* old\n"));
    }

    #[test]
    fn test_missing_sections_are_appended() {
        let updated = sync("=== Widgets ===\nStable tag: 0.1.0\n", &changelog(), None)
            .unwrap();

        assert!(updated.starts_with("=== Widgets ===\nStable tag: 1.3.0\n\n== Changelog ==\n\n= 1.3.0 - 2026-10-18 ="));
        assert!(updated.ends_with("* feat: a (#1) by @dev\n"));
        assert!(!updated.contains(UPGRADE_NOTICE_SECTION));
    }

    #[test]
    fn test_no_releases_leaves_readme_untouched() {
        let doc = ChangelogDocument::parse("# Changelog\n\n## Unreleased\n\n- x\n");
        assert_eq!(sync(README, &doc, None).unwrap(), README);
    }
}
