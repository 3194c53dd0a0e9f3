use serde::Serialize;

/// Release to create on the forge. Serializes to the body expected by the
/// GitHub releases endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateReleaseRequest {
    #[serde(rename = "tag_name")]
    pub tag: String,
    pub name: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_commitish: Option<String>,
    pub draft: bool,
    pub prerelease: bool,
}

/// Release as created on the forge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub tag: String,
    pub url: String,
}

/// Outcome of keeping a PR body in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrBodySync {
    Updated,
    Unchanged,
    /// Rate limited or dry run; nothing was written.
    Skipped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_request_json() {
        let req = CreateReleaseRequest {
            tag: "v1.3.0".into(),
            name: "v1.3.0".into(),
            body: "notes".into(),
            target_commitish: None,
            draft: false,
            prerelease: false,
        };

        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["tag_name"], "v1.3.0");
        assert!(json.get("target_commitish").is_none());
        assert_eq!(json["draft"], false);
    }
}
