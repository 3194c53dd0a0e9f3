use regex::Regex;
use semver::Version;
use std::{collections::BTreeSet, sync::LazyLock};

const SECTION_PREFIX: &str = "## ";
const CODE_FENCE: &str = "```";

/// "Unreleased" / "Upcoming" heading, optionally bracketed
static UNRELEASED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\[?(unreleased|upcoming)\b").unwrap()
});

/// Version heading such as "1.2.3 - 2026-01-01" or "[v1.2.3]"
static VERSION_HEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[?v?(\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?)\]?(\s|$)",
    )
    .unwrap()
});

/// PR reference inside an entry, e.g. "(#12)"
static PR_REF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(#(\d+)\)").unwrap());

/// What a `## ` section represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionKind {
    /// In-flight notes, replaced wholesale on every aggregation.
    Unreleased,
    /// Frozen notes of a released version.
    Release(Version),
    /// Anything else, preserved untouched.
    Other,
}

/// A `## ` heading plus the raw text up to the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Heading line without its trailing newline.
    pub heading: String,
    pub kind: SectionKind,
    /// Raw text following the heading line.
    pub body: String,
}

impl Section {
    pub fn new(heading: impl Into<String>, body: impl Into<String>) -> Self {
        let heading = heading.into();
        let kind = classify_heading(&heading);
        Self {
            heading,
            kind,
            body: body.into(),
        }
    }

    pub fn version(&self) -> Option<&Version> {
        match &self.kind {
            SectionKind::Release(version) => Some(version),
            _ => None,
        }
    }

    /// PR numbers referenced by the entries of this section.
    pub fn pr_numbers(&self) -> BTreeSet<u64> {
        PR_REF_REGEX
            .captures_iter(&self.body)
            .filter_map(|caps| caps[1].parse::<u64>().ok())
            .collect()
    }
}

/// Markdown document split into a preamble and `## ` sections. Sections
/// that are not touched render back byte for byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangelogDocument {
    pub preamble: String,
    pub sections: Vec<Section>,
}

impl ChangelogDocument {
    /// Empty document with a top level title.
    pub fn with_title(title: &str) -> Self {
        Self {
            preamble: format!("# {title}\n\n"),
            sections: vec![],
        }
    }

    pub fn parse(content: &str) -> Self {
        let mut preamble = String::new();
        let mut sections: Vec<Section> = vec![];
        let mut in_fence = false;

        for line in content.split_inclusive('\n') {
            if line.trim_start().starts_with(CODE_FENCE) {
                in_fence = !in_fence;
            }

            if !in_fence && line.starts_with(SECTION_PREFIX) {
                sections.push(Section::new(
                    line.trim_end_matches(['\n', '\r']),
                    "",
                ));
                continue;
            }

            match sections.last_mut() {
                Some(section) => section.body.push_str(line),
                None => preamble.push_str(line),
            }
        }

        Self { preamble, sections }
    }

    pub fn render(&self) -> String {
        let mut out = self.preamble.clone();
        for section in self.sections.iter() {
            out.push_str(&section.heading);
            out.push('\n');
            out.push_str(&section.body);
        }
        out
    }

    pub fn unreleased(&self) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.kind == SectionKind::Unreleased)
    }

    /// Index of the section frozen for `version`.
    pub fn find_release(&self, version: &Version) -> Option<usize> {
        self.sections
            .iter()
            .position(|s| s.version().is_some_and(|v| v == version))
    }

    /// Highest released version recorded in the document.
    pub fn latest_release(&self) -> Option<&Version> {
        self.sections.iter().filter_map(Section::version).max()
    }

    /// Section frozen for the highest released version.
    pub fn latest_release_section(&self) -> Option<&Section> {
        let latest = self.latest_release()?;
        self.sections.iter().find(|s| s.version() == Some(latest))
    }

    /// Frozen sections in document order (newest first).
    pub fn releases(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| s.version().is_some())
    }

    /// Replace the unreleased section, or insert it as the first section.
    pub fn set_unreleased(&mut self, heading: String, body: String) {
        let section = Section {
            heading,
            kind: SectionKind::Unreleased,
            body,
        };

        if let Some(index) = self
            .sections
            .iter()
            .position(|s| s.kind == SectionKind::Unreleased)
        {
            self.sections[index] = section;
            return;
        }

        ensure_blank_line(&mut self.preamble);
        self.sections.insert(0, section);
    }

    /// Empty the unreleased section body, keeping its heading.
    pub fn clear_unreleased(&mut self) {
        if let Some(section) = self
            .sections
            .iter_mut()
            .find(|s| s.kind == SectionKind::Unreleased)
        {
            section.body = "\n".into();
        }
    }

    /// Insert a frozen section above the newest frozen section, or after the
    /// unreleased section when there is none yet.
    pub fn insert_release(&mut self, section: Section) {
        let index = self
            .sections
            .iter()
            .position(|s| s.version().is_some())
            .unwrap_or_else(|| {
                self.sections
                    .iter()
                    .position(|s| s.kind == SectionKind::Unreleased)
                    .map(|i| i + 1)
                    .unwrap_or(self.sections.len())
            });

        match index.checked_sub(1) {
            Some(previous) => ensure_blank_line(&mut self.sections[previous].body),
            None => ensure_blank_line(&mut self.preamble),
        }

        self.sections.insert(index, section);
    }
}

/// Body text for a freshly written section: a blank line, the content, and
/// a trailing blank line separating it from whatever follows.
pub fn section_body(content: &str) -> String {
    let content = content.trim();
    if content.is_empty() {
        return "\n".into();
    }
    format!("\n{content}\n\n")
}

fn classify_heading(heading: &str) -> SectionKind {
    let text = heading.trim_start_matches('#').trim();

    if UNRELEASED_REGEX.is_match(text) {
        return SectionKind::Unreleased;
    }

    VERSION_HEADING_REGEX
        .captures(text)
        .and_then(|caps| Version::parse(&caps[1]).ok())
        .map(SectionKind::Release)
        .unwrap_or(SectionKind::Other)
}

fn ensure_blank_line(text: &mut String) {
    if text.is_empty() || text.ends_with("\n\n") {
        return;
    }
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text.push('\n');
}
