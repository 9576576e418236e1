//! In-memory collaborator implementations.
//!
//! Back the operator CLI's sandbox mode and the test suite. Not suitable for
//! production: nothing is persisted and nothing leaves the process.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use campaign_core::{
    AccountCredentials, CampaignError, CampaignResult, MediaAsset, MediaType, Platform,
};
use dashmap::DashMap;
use uuid::Uuid;

use crate::ports::{AccountResolver, ConvertedVideo, MediaRepository, VideoConverter};

/// Accounts keyed by account reference.
#[derive(Debug, Default)]
pub struct InMemoryAccountResolver {
    accounts: DashMap<String, AccountCredentials>,
}

impl InMemoryAccountResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, credentials: AccountCredentials) {
        self.accounts.insert(credentials.account_id.clone(), credentials);
    }
}

#[async_trait]
impl AccountResolver for InMemoryAccountResolver {
    async fn resolve(&self, account_id: &str, platform: Platform) -> CampaignResult<AccountCredentials> {
        let credentials = self
            .accounts
            .get(account_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CampaignError::NotFound(format!("account {account_id}")))?;

        if credentials.platform != platform {
            return Err(CampaignError::NotFound(format!(
                "account {account_id} is not a {} account",
                platform.display_name()
            )));
        }
        if credentials.platform_account_id.trim().is_empty() {
            return Err(CampaignError::NotFound(format!(
                "account {account_id} has no {} account ID",
                platform.display_name()
            )));
        }
        Ok(credentials)
    }
}

/// Media keyed by asset ID.
#[derive(Debug, Default)]
pub struct InMemoryMediaRepository {
    assets: DashMap<Uuid, MediaAsset>,
}

impl InMemoryMediaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, asset: MediaAsset) {
        self.assets.insert(asset.id, asset);
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[async_trait]
impl MediaRepository for InMemoryMediaRepository {
    async fn list_by_campaign_and_type(
        &self,
        campaign_id: Uuid,
        media_type: MediaType,
    ) -> CampaignResult<Vec<MediaAsset>> {
        let mut assets: Vec<MediaAsset> = self
            .assets
            .iter()
            .filter(|entry| {
                let asset = entry.value();
                asset.campaign_id == campaign_id && asset.media_type == media_type
            })
            .map(|entry| entry.value().clone())
            .collect();
        assets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.file_name.cmp(&b.file_name)));
        Ok(assets)
    }

    async fn get(&self, media_id: Uuid) -> CampaignResult<Option<MediaAsset>> {
        Ok(self.assets.get(&media_id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, asset: MediaAsset) -> CampaignResult<MediaAsset> {
        self.assets.insert(asset.id, asset.clone());
        Ok(asset)
    }
}

/// Converter that fabricates a video URL next to the source image.
#[derive(Debug)]
pub struct StaticVideoConverter {
    base_url: String,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl StaticVideoConverter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent conversion fail.
    pub fn fail_conversions(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for StaticVideoConverter {
    fn default() -> Self {
        Self::new("https://media.sandbox.local/converted")
    }
}

#[async_trait]
impl VideoConverter for StaticVideoConverter {
    async fn convert(&self, image_url: &str, file_name: &str) -> anyhow::Result<ConvertedVideo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("conversion service rejected {image_url}");
        }
        Ok(ConvertedVideo {
            local_path: PathBuf::from("/tmp").join(file_name),
            remote_url: format!("{}/{}", self.base_url.trim_end_matches('/'), file_name),
            width: 1080,
            height: 1920,
        })
    }
}
