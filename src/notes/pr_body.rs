//! Keeps a release notes block inside a pull request body up to date.
//!
//! The block is delimited by HTML comment markers so the rest of the body,
//! whether written by a human or another bot, is never touched.
use serde::Serialize;

use crate::Result;

pub const START_MARKER: &str = "<!-- changeset-release:start -->";
pub const END_MARKER: &str = "<!-- changeset-release:end -->";

const TEMPLATE_NAME: &str = "pr_body";

/// Values available to the PR body template.
#[derive(Debug, Clone, Serialize)]
pub struct PrBodyContext {
    pub version: String,
    pub notes: String,
    pub target: String,
}

/// Renders the notes block and splices it into an existing body.
pub struct PrBodyComposer {
    template: String,
}

impl PrBodyComposer {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Render the template for `context`.
    pub fn render_block(&self, context: &PrBodyContext) -> Result<String> {
        let mut tera = tera::Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, &self.template)?;
        let context = tera::Context::from_serialize(context)?;
        let rendered = tera.render(TEMPLATE_NAME, &context)?;
        Ok(rendered.trim().to_string())
    }

    /// Existing body with the notes block replaced, or appended when the
    /// markers are absent.
    pub fn compose(&self, existing: &str, context: &PrBodyContext) -> Result<String> {
        let block = self.render_block(context)?;
        Ok(replace_block(existing, &block))
    }
}

/// Replace the marker delimited block of `body` with `block`.
pub fn replace_block(body: &str, block: &str) -> String {
    let wrapped = format!("{START_MARKER}\n{}\n{END_MARKER}", block.trim());

    if let Some(start) = body.find(START_MARKER)
        && let Some(end) = body[start..].find(END_MARKER)
    {
        let end = start + end + END_MARKER.len();
        return format!("{}{}{}", &body[..start], wrapped, &body[end..]);
    }

    let existing = body.trim_end();
    if existing.is_empty() {
        return format!("{wrapped}\n");
    }

    format!("{existing}\n\n{wrapped}\n")
}

/// Content currently between the markers.
pub fn extract_block(body: &str) -> Option<&str> {
    let start = body.find(START_MARKER)? + START_MARKER.len();
    let end = body[start..].find(END_MARKER)? + start;
    Some(body[start..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PR_BODY_TEMPLATE;

    fn context() -> PrBodyContext {
        PrBodyContext {
            version: "1.3.0".into(),
            notes: "### Features\n\n- feat: add widget (#10) by @alice\n".into(),
            target: "main".into(),
        }
    }

    #[test]
    fn test_render_default_template() {
        let composer = PrBodyComposer::new(DEFAULT_PR_BODY_TEMPLATE);
        assert_eq!(
            composer.render_block(&context()).unwrap(),
            "## Release 1.3.0\n\n### Features\n\n- feat: add widget (#10) by @alice"
        );
    }

    #[test]
    fn test_append_when_markers_missing() {
        let composer = PrBodyComposer::new("{{ notes }}");
        let body = composer
            .compose("Release checklist:\n- [ ] QA\n", &context())
            .unwrap();

        assert!(body.starts_with("Release checklist:\n- [ ] QA\n\n"));
        assert!(body.ends_with(&format!("{END_MARKER}\n")));
        assert_eq!(
            extract_block(&body),
            Some("### Features\n\n- feat: add widget (#10) by @alice")
        );
    }

    #[test]
    fn test_replace_keeps_surrounding_text() {
        let body = format!(
            "Intro\n\n{START_MARKER}\nold notes\n{END_MARKER}\n\nFooter by a human\n"
        );

        let updated = replace_block(&body, "new notes");

        assert_eq!(
            updated,
            format!(
                "Intro\n\n{START_MARKER}\nnew notes\n{END_MARKER}\n\nFooter by a human\n"
            )
        );
    }

    #[test]
    fn test_compose_is_idempotent() {
        let composer = PrBodyComposer::new(DEFAULT_PR_BODY_TEMPLATE);
        let once = composer.compose("Intro", &context()).unwrap();
        let twice = composer.compose(&once, &context()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_body_gets_only_block() {
        let updated = replace_block("", "notes");
        assert_eq!(updated, format!("{START_MARKER}\nnotes\n{END_MARKER}\n"));
    }

    #[test]
    fn test_invalid_template_is_error() {
        let composer = PrBodyComposer::new("{{ unclosed");
        assert!(composer.render_block(&context()).is_err());
    }
}
