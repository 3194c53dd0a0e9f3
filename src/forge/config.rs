//! Configuration for the remote repository connection.
use secrecy::SecretString;

use crate::{
    Result,
    forge::{github::Github, traits::Forge},
};

/// Remote repository connection configuration for authenticating and
/// interacting with the forge.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Remote forge host (e.g., "github.com").
    pub host: String,
    /// URL scheme (http or https).
    pub scheme: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Access token for authentication.
    pub token: SecretString,
    /// Base URL for release links.
    pub release_link_base_url: String,
    /// Log mutations instead of performing them.
    pub dry_run: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "".to_string(),
            scheme: "".to_string(),
            owner: "".to_string(),
            repo: "".to_string(),
            token: SecretString::from("".to_string()),
            release_link_base_url: "".to_string(),
            dry_run: false,
        }
    }
}

impl RemoteConfig {
    /// API root: api.github.com for github.com, /api/v3 for Enterprise.
    pub fn api_base_uri(&self) -> String {
        if self.host == "github.com" {
            return format!("{}://api.{}", self.scheme, self.host);
        }
        format!("{}://{}/api/v3", self.scheme, self.host)
    }
}

#[derive(Debug, Clone)]
/// Supported forge platforms.
pub enum Remote {
    Github(RemoteConfig),
}

impl Remote {
    /// Create forge client instance for the configured platform.
    pub fn get_forge(&self) -> Result<Box<dyn Forge>> {
        match self {
            Remote::Github(config) => {
                let forge = Github::new(config.clone())?;
                Ok(Box::new(forge))
            }
        }
    }
}
