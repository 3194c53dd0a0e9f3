//! Implements the Forge trait for Github
use async_trait::async_trait;
use log::*;
use octocrab::{Octocrab, models::repos::Release};

use crate::{
    Result,
    forge::{
        config::RemoteConfig,
        traits::Forge,
        types::{CreateReleaseRequest, ReleaseInfo},
    },
};

/// GitHub forge implementation using Octocrab for API interactions with
/// pull requests and releases.
pub struct Github {
    config: RemoteConfig,
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with personal access token authentication and API
    /// base URL configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let base_uri = config.api_base_uri();
        debug!("using github api at {base_uri}");

        let instance = Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(base_uri)?
            .build()?;

        Ok(Self { config, instance })
    }

    fn release_info(&self, release: Release) -> ReleaseInfo {
        ReleaseInfo {
            tag: release.tag_name,
            url: release.html_url.to_string(),
        }
    }
}

#[async_trait]
impl Forge for Github {
    fn remote_config(&self) -> RemoteConfig {
        self.config.clone()
    }

    async fn get_pr_body(&self, pr_number: u64) -> Result<String> {
        let pr = self
            .instance
            .pulls(&self.config.owner, &self.config.repo)
            .get(pr_number)
            .await?;

        Ok(pr.body.unwrap_or_default())
    }

    async fn update_pr_body(&self, pr_number: u64, body: String) -> Result<()> {
        self.instance
            .pulls(&self.config.owner, &self.config.repo)
            .update(pr_number)
            .body(body)
            .send()
            .await?;

        Ok(())
    }

    async fn create_release(
        &self,
        req: CreateReleaseRequest,
    ) -> Result<ReleaseInfo> {
        let repos = self.instance.repos(&self.config.owner, &self.config.repo);
        let releases = repos.releases();

        let mut builder = releases
            .create(&req.tag)
            .name(&req.name)
            .body(&req.body)
            .draft(req.draft)
            .prerelease(req.prerelease);

        if let Some(commitish) = req.target_commitish.as_deref() {
            builder = builder.target_commitish(commitish);
        }

        let release = builder.send().await?;

        Ok(self.release_info(release))
    }

    async fn create_release_fallback(
        &self,
        req: CreateReleaseRequest,
    ) -> Result<ReleaseInfo> {
        let route =
            format!("/repos/{}/{}/releases", self.config.owner, self.config.repo);

        let release: Release = self.instance.post(route, Some(&req)).await?;

        Ok(self.release_info(release))
    }
}
