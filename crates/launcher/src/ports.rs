//! Collaborator interfaces the launchers consume.
//!
//! - [`AccountResolver`]: account reference to platform credentials
//! - [`MediaRepository`]: campaign media lookup and persistence
//! - [`VideoConverter`]: image-to-video fallback for video-only platforms
//!
//! In-memory implementations live in [`crate::memory`].

use std::path::PathBuf;

use async_trait::async_trait;
use campaign_core::{AccountCredentials, CampaignResult, MediaAsset, MediaType, Platform};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[async_trait]
pub trait AccountResolver: Send + Sync {
    /// Fails with `NotFound` when the account or its platform-specific ID
    /// is missing.
    async fn resolve(&self, account_id: &str, platform: Platform) -> CampaignResult<AccountCredentials>;
}

#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn list_by_campaign_and_type(
        &self,
        campaign_id: Uuid,
        media_type: MediaType,
    ) -> CampaignResult<Vec<MediaAsset>>;

    async fn get(&self, media_id: Uuid) -> CampaignResult<Option<MediaAsset>>;

    /// Persist a new asset, returning the stored copy.
    async fn save(&self, asset: MediaAsset) -> CampaignResult<MediaAsset>;
}

/// Output of an image-to-video conversion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConvertedVideo {
    pub local_path: PathBuf,
    pub remote_url: String,
    pub width: u32,
    pub height: u32,
}

#[async_trait]
pub trait VideoConverter: Send + Sync {
    async fn convert(&self, image_url: &str, file_name: &str) -> anyhow::Result<ConvertedVideo>;
}
