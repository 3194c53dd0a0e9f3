//! Manager that wraps forge implementations
use log::*;

use crate::{
    ChangesetError, Result,
    forge::{
        config::RemoteConfig,
        traits::Forge,
        types::{CreateReleaseRequest, PrBodySync, ReleaseInfo},
    },
};

pub struct ForgeManager {
    forge: Box<dyn Forge>,
    remote_config: RemoteConfig,
}

impl ForgeManager {
    pub fn new(forge: Box<dyn Forge>) -> Self {
        let remote_config = forge.remote_config();
        Self {
            forge,
            remote_config,
        }
    }

    /// Create a release through the primary path, retrying once through the
    /// fallback path on any failure.
    pub async fn publish_release(
        &self,
        req: CreateReleaseRequest,
    ) -> Result<ReleaseInfo> {
        if self.remote_config.dry_run {
            warn!("dry_run: would create release: req: {:#?}", req);
            return Ok(ReleaseInfo {
                url: self.release_url(&req.tag),
                tag: req.tag,
            });
        }

        let tag = req.tag.clone();

        match self.forge.create_release(req.clone()).await {
            Ok(release) => {
                info!("created release {} at {}", release.tag, release.url);
                Ok(release)
            }
            Err(err) => {
                warn!("failed to create release {tag}: {err}: trying fallback");
                self.fallback(req).await
            }
        }
    }

    /// Replace the PR body with `compose(current)` when that differs from the
    /// current body. A rate limit skips the update instead of failing.
    pub async fn sync_pr_body<F>(
        &self,
        pr_number: u64,
        compose: F,
    ) -> Result<PrBodySync>
    where
        F: FnOnce(&str) -> Result<String>,
    {
        let current = match self.forge.get_pr_body(pr_number).await {
            Ok(body) => body,
            Err(ChangesetError::RateLimitExceeded) => {
                warn!("rate limited reading PR #{pr_number}: skipping update");
                return Ok(PrBodySync::Skipped);
            }
            Err(err) => return Err(err),
        };

        let body = compose(&current)?;

        if body == current {
            info!("PR #{pr_number} body already up to date");
            return Ok(PrBodySync::Unchanged);
        }

        if self.remote_config.dry_run {
            warn!("dry_run: would update PR #{pr_number} body:\n{body}");
            return Ok(PrBodySync::Skipped);
        }

        match self.forge.update_pr_body(pr_number, body).await {
            Ok(()) => {
                info!("updated PR #{pr_number} body");
                Ok(PrBodySync::Updated)
            }
            Err(ChangesetError::RateLimitExceeded) => {
                warn!("rate limited updating PR #{pr_number}: skipping update");
                Ok(PrBodySync::Skipped)
            }
            Err(err) => Err(err),
        }
    }

    /// Public page of a release, built from the remote's release link base.
    fn release_url(&self, tag: &str) -> String {
        let base = self.remote_config.release_link_base_url.trim_end_matches('/');
        if base.is_empty() {
            return String::new();
        }
        format!("{base}/{tag}")
    }

    async fn fallback(&self, req: CreateReleaseRequest) -> Result<ReleaseInfo> {
        let release = self.forge.create_release_fallback(req).await?;
        info!(
            "created release {} at {} through fallback",
            release.tag, release.url
        );
        Ok(release)
    }
}
