//! In-memory social-graph backend for the sandbox CLI and tests.

use async_trait::async_trait;
use campaign_core::MediaAsset;
use tracing::debug;

use super::api::{AdSetSpec, AdSpec, CampaignSpec, CreativeSpec, InterestMatch, SocialGraphApi};
use crate::launcher::PlatformSession;
use crate::platforms::sandbox::{EntityStatus, FaultInjector, SandboxStore};

pub const KIND_CAMPAIGN: &str = "campaign";
pub const KIND_AD_SET: &str = "adset";
pub const KIND_CREATIVE: &str = "creative";
pub const KIND_AD: &str = "ad";
pub const KIND_IMAGE: &str = "image";
pub const KIND_VIDEO: &str = "video";

#[derive(Debug)]
pub struct InMemorySocialGraphApi {
    store: SandboxStore,
    faults: FaultInjector,
    interests: Vec<InterestMatch>,
}

impl Default for InMemorySocialGraphApi {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySocialGraphApi {
    pub fn new() -> Self {
        let catalog = [
            ("6003107902433", "Fitness and wellness", 410_000_000),
            ("6003397425735", "Running", 120_000_000),
            ("6003346592981", "Online shopping", 890_000_000),
            ("6003430696269", "Travel", 760_000_000),
            ("6003659420716", "Cooking", 450_000_000),
            ("6003020834693", "Personal finance", 150_000_000),
        ];
        Self {
            store: SandboxStore::new("sg"),
            faults: FaultInjector::default(),
            interests: catalog
                .iter()
                .map(|(id, name, size)| InterestMatch {
                    id: id.to_string(),
                    name: name.to_string(),
                    audience_size: Some(*size),
                })
                .collect(),
        }
    }

    pub fn store(&self) -> &SandboxStore {
        &self.store
    }

    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    fn authorize(&self, session: &PlatformSession) -> anyhow::Result<()> {
        if session.access_token.is_empty() {
            anyhow::bail!("OAuthException: missing access token");
        }
        Ok(())
    }

    fn create(
        &self,
        operation: &str,
        kind: &str,
        parent: Option<&str>,
        name: &str,
        status: EntityStatus,
        payload: serde_json::Value,
    ) -> anyhow::Result<String> {
        self.faults.check(operation)?;
        if let Some(parent) = parent {
            let live = self
                .store
                .get(parent)
                .is_some_and(|p| p.status != EntityStatus::Deleted);
            if !live {
                anyhow::bail!("parent object {parent} does not exist");
            }
        }
        let id = self.store.insert(kind, parent, name, status, payload);
        debug!(operation, id = %id, "Sandbox social-graph object created");
        Ok(id)
    }
}

#[async_trait]
impl SocialGraphApi for InMemorySocialGraphApi {
    async fn create_campaign(&self, session: &PlatformSession, spec: &CampaignSpec) -> anyhow::Result<String> {
        self.authorize(session)?;
        self.create(
            "create_campaign",
            KIND_CAMPAIGN,
            None,
            &spec.name,
            spec.status,
            serde_json::to_value(spec)?,
        )
    }

    async fn search_interests(&self, session: &PlatformSession, query: &str) -> anyhow::Result<Vec<InterestMatch>> {
        self.authorize(session)?;
        self.faults.check("search_interests")?;
        let needle = query.to_lowercase();
        Ok(self
            .interests
            .iter()
            .filter(|i| i.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn create_ad_set(&self, session: &PlatformSession, spec: &AdSetSpec) -> anyhow::Result<String> {
        self.authorize(session)?;
        self.create(
            "create_ad_set",
            KIND_AD_SET,
            Some(&spec.campaign_id),
            &spec.name,
            spec.status,
            serde_json::to_value(spec)?,
        )
    }

    async fn upload_image(&self, session: &PlatformSession, asset: &MediaAsset) -> anyhow::Result<String> {
        self.authorize(session)?;
        self.create(
            "upload_image",
            KIND_IMAGE,
            None,
            &asset.file_name,
            EntityStatus::Active,
            serde_json::json!({ "url": asset.url }),
        )
    }

    async fn upload_video(&self, session: &PlatformSession, asset: &MediaAsset) -> anyhow::Result<String> {
        self.authorize(session)?;
        self.create(
            "upload_video",
            KIND_VIDEO,
            None,
            &asset.file_name,
            EntityStatus::Active,
            serde_json::json!({ "url": asset.url }),
        )
    }

    async fn create_creative(&self, session: &PlatformSession, spec: &CreativeSpec) -> anyhow::Result<String> {
        self.authorize(session)?;
        self.create(
            "create_creative",
            KIND_CREATIVE,
            None,
            &spec.name,
            EntityStatus::Active,
            serde_json::to_value(spec)?,
        )
    }

    async fn create_ad(&self, session: &PlatformSession, spec: &AdSpec) -> anyhow::Result<String> {
        self.authorize(session)?;
        if self.store.get(&spec.creative_id).is_none() {
            anyhow::bail!("creative {} does not exist", spec.creative_id);
        }
        self.create(
            "create_ad",
            KIND_AD,
            Some(&spec.ad_set_id),
            &spec.name,
            spec.status,
            serde_json::to_value(spec)?,
        )
    }

    async fn delete_object(&self, session: &PlatformSession, object_id: &str) -> anyhow::Result<()> {
        self.authorize(session)?;
        self.faults.check("delete_object")?;
        self.store.set_status(object_id, EntityStatus::Deleted)
    }
}
