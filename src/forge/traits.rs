//! Traits related to remote git forges
use async_trait::async_trait;

use crate::{
    Result,
    forge::{
        config::RemoteConfig,
        types::{CreateReleaseRequest, ReleaseInfo},
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    fn remote_config(&self) -> RemoteConfig;
    async fn get_pr_body(&self, pr_number: u64) -> Result<String>;
    async fn update_pr_body(&self, pr_number: u64, body: String) -> Result<()>;
    async fn create_release(
        &self,
        req: CreateReleaseRequest,
    ) -> Result<ReleaseInfo>;
    /// Alternate creation path used once when the primary path fails.
    async fn create_release_fallback(
        &self,
        req: CreateReleaseRequest,
    ) -> Result<ReleaseInfo>;
}
