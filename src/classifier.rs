//! Change type and breaking-change detection for changeset records.
//!
//! Only two markers count as breaking: a conventional `!` in the title and a
//! "Breaking Changes" heading in the body. Free text is never interpreted.
use git_conventional::Commit as ConventionalCommit;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, sync::LazyLock};

use crate::changeset::ChangesetRecord;

/// Release note categories. Variant order is the display order.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Breaking,
    Feature,
    Fix,
    Docs,
    Chore,
    #[default]
    Other,
}

impl ChangeType {
    /// All categories in display order.
    pub const ALL: [ChangeType; 6] = [
        ChangeType::Breaking,
        ChangeType::Feature,
        ChangeType::Fix,
        ChangeType::Docs,
        ChangeType::Chore,
        ChangeType::Other,
    ];

    /// Section heading used in rendered release notes.
    pub fn heading(&self) -> &'static str {
        match self {
            ChangeType::Breaking => "Breaking Changes",
            ChangeType::Feature => "Features",
            ChangeType::Fix => "Fixes",
            ChangeType::Docs => "Documentation",
            ChangeType::Chore => "Chores",
            ChangeType::Other => "Other",
        }
    }

    /// Reverse of [`ChangeType::heading`], case-insensitive.
    pub fn from_heading(heading: &str) -> Option<Self> {
        let heading = heading.trim();
        ChangeType::ALL
            .into_iter()
            .find(|t| t.heading().eq_ignore_ascii_case(heading))
    }

    /// Map a conventional commit type onto a category.
    pub fn from_conventional(kind: &str) -> Option<Self> {
        match kind.to_ascii_lowercase().as_str() {
            "feat" | "feature" => Some(ChangeType::Feature),
            "fix" | "bugfix" | "hotfix" => Some(ChangeType::Fix),
            "docs" | "doc" => Some(ChangeType::Docs),
            "chore" | "build" | "ci" | "refactor" | "perf" | "test"
            | "style" | "deps" => Some(ChangeType::Chore),
            "breaking" => Some(ChangeType::Breaking),
            _ => None,
        }
    }
}

impl Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChangeType::Breaking => "breaking",
            ChangeType::Feature => "feature",
            ChangeType::Fix => "fix",
            ChangeType::Docs => "docs",
            ChangeType::Chore => "chore",
            ChangeType::Other => "other",
        };
        f.write_str(name)
    }
}

/// Result of classifying a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub change_type: ChangeType,
    pub is_breaking: bool,
}

const CODE_FENCE: &str = "```";

/// Markdown heading announcing breaking changes, any level
static BREAKING_HEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s{0,3}(#{1,6})\s+breaking[ -]changes?\s*:?\s*#*\s*$")
        .unwrap()
});

/// Any markdown ATX heading
static HEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}(#{1,6})(\s|$)").unwrap());

/// Classify a stored record.
pub fn classify(record: &ChangesetRecord) -> Classification {
    classify_text(&record.title, &record.body)
}

/// Classify from raw title and body, first match wins.
pub fn classify_text(title: &str, body: &str) -> Classification {
    let parsed = ConventionalCommit::parse(title.trim()).ok();

    let title_breaking = parsed.as_ref().is_some_and(|c| c.breaking());
    let is_breaking = title_breaking || has_breaking_heading(body);

    let conventional_type = parsed
        .as_ref()
        .and_then(|c| ChangeType::from_conventional(c.type_().as_str()));

    let change_type = match conventional_type {
        Some(change_type) => change_type,
        None if is_breaking => ChangeType::Breaking,
        None => ChangeType::Other,
    };

    Classification {
        change_type,
        is_breaking,
    }
}

/// Whether the body carries a "Breaking Changes" heading outside of code
/// fences.
pub fn has_breaking_heading(body: &str) -> bool {
    let mut in_fence = false;

    body.lines().any(|line| {
        if is_fence(line) {
            in_fence = !in_fence;
            return false;
        }
        !in_fence && BREAKING_HEADING_REGEX.is_match(line)
    })
}

/// Non-empty lines below the "Breaking Changes" heading, up to the next
/// heading of the same or a higher level. Headings inside code fences do not
/// count, and a fence left open is closed so it cannot run into whatever the
/// details are rendered into.
pub fn breaking_details(body: &str) -> Vec<String> {
    let mut details = vec![];
    let mut level: Option<usize> = None;
    let mut in_fence = false;

    for line in body.lines() {
        match level {
            None => {
                if is_fence(line) {
                    in_fence = !in_fence;
                } else if !in_fence
                    && let Some(caps) = BREAKING_HEADING_REGEX.captures(line)
                {
                    level = Some(caps[1].len());
                }
            }
            Some(current) => {
                if !in_fence
                    && let Some(caps) = HEADING_REGEX.captures(line)
                    && caps[1].len() <= current
                {
                    break;
                }

                if is_fence(line) {
                    in_fence = !in_fence;
                }

                let trimmed = line.trim_end();
                if !trimmed.trim().is_empty() {
                    details.push(trimmed.to_string());
                }
            }
        }
    }

    if in_fence && level.is_some() {
        details.push(CODE_FENCE.to_string());
    }

    details
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with(CODE_FENCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_title() {
        let c = classify_text("feat: add widget block", "");
        assert_eq!(c.change_type, ChangeType::Feature);
        assert!(!c.is_breaking);
    }

    #[test]
    fn test_scoped_fix_title() {
        let c = classify_text("fix(editor): keep selection on save", "");
        assert_eq!(c.change_type, ChangeType::Fix);
        assert!(!c.is_breaking);
    }

    #[test]
    fn test_bang_marks_feature_as_breaking() {
        let c = classify_text("feat!: drop legacy API", "");
        assert_eq!(c.change_type, ChangeType::Feature);
        assert!(c.is_breaking);
    }

    #[test]
    fn test_body_heading_marks_breaking() {
        let body = "Some context.\n\n## Breaking Changes\n\nThe `foo` filter was removed.\n";
        let c = classify_text("chore: tidy hooks", body);
        assert_eq!(c.change_type, ChangeType::Chore);
        assert!(c.is_breaking);
    }

    #[test]
    fn test_breaking_without_known_prefix() {
        let c = classify_text(
            "Remove the settings page",
            "### breaking change\nSettings moved to the block editor.",
        );
        assert_eq!(c.change_type, ChangeType::Breaking);
        assert!(c.is_breaking);
    }

    #[test]
    fn test_unknown_prefix_is_other() {
        let c = classify_text("wip: something", "");
        assert_eq!(c.change_type, ChangeType::Other);
        assert!(!c.is_breaking);

        let c = classify_text("Update dependencies", "");
        assert_eq!(c.change_type, ChangeType::Other);
    }

    #[test]
    fn test_informal_breaking_claims_are_ignored() {
        let c = classify_text(
            "fix: adjust output",
            "Note: this is a breaking change for themes.",
        );
        assert_eq!(c.change_type, ChangeType::Fix);
        assert!(!c.is_breaking);
    }

    #[test]
    fn test_chore_aliases() {
        for title in [
            "refactor: split module",
            "ci: cache deps",
            "build: bump node",
            "perf: faster queries",
            "test: cover edge case",
        ] {
            assert_eq!(
                classify_text(title, "").change_type,
                ChangeType::Chore,
                "{title}"
            );
        }
        assert_eq!(
            classify_text("docs: explain hooks", "").change_type,
            ChangeType::Docs
        );
    }

    #[test]
    fn test_breaking_details_stop_at_next_heading() {
        let body = "## Summary\nstuff\n\n## Breaking Changes\n\n- Removed `foo()`.\n  Use `bar()` instead.\n\n### Migration\nrun the script\n\n## Testing\nmanual";
        let details = breaking_details(body);
        assert_eq!(
            details,
            vec![
                "- Removed `foo()`.".to_string(),
                "  Use `bar()` instead.".to_string(),
                "### Migration".to_string(),
                "run the script".to_string(),
            ]
        );
    }

    #[test]
    fn test_fenced_headings_are_ignored() {
        let body = "```md\n## Breaking Changes\n```\n\nNothing breaks.\n";
        assert!(!has_breaking_heading(body));
        assert!(breaking_details(body).is_empty());
        assert!(!classify_text("docs: example", body).is_breaking);
    }

    #[test]
    fn test_breaking_details_keep_fenced_headings() {
        let body = "## Breaking Changes\n\n```php\n## not a heading\nold_call();\n```\n\n## Testing\nmanual";
        assert_eq!(
            breaking_details(body),
            vec!["```php", "## not a heading", "old_call();", "```"]
        );
    }

    #[test]
    fn test_breaking_details_close_open_fence() {
        let body = "## Breaking Changes\n\n```php\nold_call();\n";
        assert_eq!(breaking_details(body), vec!["```php", "old_call();", "```"]);
    }

    #[test]
    fn test_breaking_details_empty_without_heading() {
        assert!(breaking_details("just a body").is_empty());
    }

    #[test]
    fn test_heading_round_trip() {
        for t in ChangeType::ALL {
            assert_eq!(ChangeType::from_heading(t.heading()), Some(t));
        }
        assert_eq!(ChangeType::from_heading("features"), Some(ChangeType::Feature));
        assert_eq!(ChangeType::from_heading("Misc"), None);
    }

    #[test]
    fn test_display_order() {
        let mut types = vec![ChangeType::Other, ChangeType::Fix, ChangeType::Breaking];
        types.sort();
        assert_eq!(
            types,
            vec![ChangeType::Breaking, ChangeType::Fix, ChangeType::Other]
        );
    }

    #[test]
    fn test_classify_record() {
        let record = crate::test_helpers::create_test_record_with_body(
            3,
            "docs: explain hooks",
            "develop",
            "### Breaking changes\n\nHook names changed.\n",
        );
        let c = classify(&record);
        assert_eq!(c.change_type, ChangeType::Docs);
        assert!(c.is_breaking);
        assert_eq!(record.breaking_details(), vec!["Hook names changed."]);
    }
}
