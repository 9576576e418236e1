//! In-memory short-video backend for the sandbox CLI and tests.

use async_trait::async_trait;
use campaign_core::MediaAsset;
use tracing::debug;

use super::api::{
    AdGroupSpec, AdSpec, CampaignSpec, InterestCategory, ObjectType, OperationStatus, ShortVideoApi,
};
use crate::launcher::PlatformSession;
use crate::platforms::sandbox::{EntityStatus, FaultInjector, SandboxStore};

pub const KIND_CAMPAIGN: &str = "campaign";
pub const KIND_AD_GROUP: &str = "adgroup";
pub const KIND_AD: &str = "ad";
pub const KIND_IMAGE: &str = "image";
pub const KIND_VIDEO: &str = "video";

#[derive(Debug)]
pub struct InMemoryShortVideoApi {
    store: SandboxStore,
    faults: FaultInjector,
    categories: Vec<InterestCategory>,
}

impl Default for InMemoryShortVideoApi {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryShortVideoApi {
    pub fn new() -> Self {
        let catalog = [
            ("25101", "Fitness"),
            ("25102", "Running"),
            ("25201", "Shopping"),
            ("25301", "Travel"),
            ("25401", "Food & Cooking"),
            ("25501", "Finance"),
        ];
        Self {
            store: SandboxStore::new("sv"),
            faults: FaultInjector::default(),
            categories: catalog
                .iter()
                .map(|(id, name)| InterestCategory {
                    id: id.to_string(),
                    name: name.to_string(),
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
            anyhow::bail!("40001: access token is missing");
        }
        Ok(())
    }

    fn require_live(&self, id: &str, kind: &str) -> anyhow::Result<()> {
        match self.store.get(id) {
            Some(entity) if entity.kind == kind && entity.status != EntityStatus::Deleted => Ok(()),
            _ => anyhow::bail!("40002: {kind} {id} does not exist"),
        }
    }
}

#[async_trait]
impl ShortVideoApi for InMemoryShortVideoApi {
    async fn create_campaign(&self, session: &PlatformSession, spec: &CampaignSpec) -> anyhow::Result<String> {
        self.authorize(session)?;
        self.faults.check("create_campaign")?;
        let id = self.store.insert(
            KIND_CAMPAIGN,
            None,
            &spec.campaign_name,
            EntityStatus::Active,
            serde_json::to_value(spec)?,
        );
        debug!(id = %id, "Sandbox short-video campaign created");
        Ok(id)
    }

    async fn search_locations(&self, session: &PlatformSession, country: &str) -> anyhow::Result<Vec<String>> {
        self.authorize(session)?;
        self.faults.check("search_locations")?;
        let code = country.trim().to_uppercase();
        if code.len() != 2 {
            return Ok(Vec::new());
        }
        Ok(vec![format!("loc_{code}")])
    }

    async fn search_interest_categories(
        &self,
        session: &PlatformSession,
        keyword: &str,
    ) -> anyhow::Result<Vec<InterestCategory>> {
        self.authorize(session)?;
        self.faults.check("search_interest_categories")?;
        let needle = keyword.to_lowercase();
        Ok(self
            .categories
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn create_ad_group(&self, session: &PlatformSession, spec: &AdGroupSpec) -> anyhow::Result<String> {
        self.authorize(session)?;
        self.faults.check("create_ad_group")?;
        self.require_live(&spec.campaign_id, KIND_CAMPAIGN)?;
        if spec.location_ids.is_empty() {
            anyhow::bail!("40002: location_ids is required");
        }
        Ok(self.store.insert(
            KIND_AD_GROUP,
            Some(&spec.campaign_id),
            &spec.adgroup_name,
            EntityStatus::Active,
            serde_json::to_value(spec)?,
        ))
    }

    async fn upload_video(&self, session: &PlatformSession, asset: &MediaAsset) -> anyhow::Result<String> {
        self.authorize(session)?;
        self.faults.check("upload_video")?;
        Ok(self.store.insert(
            KIND_VIDEO,
            None,
            &asset.file_name,
            EntityStatus::Active,
            serde_json::json!({ "video_url": asset.url }),
        ))
    }

    async fn upload_image(&self, session: &PlatformSession, asset: &MediaAsset) -> anyhow::Result<String> {
        self.authorize(session)?;
        self.faults.check("upload_image")?;
        Ok(self.store.insert(
            KIND_IMAGE,
            None,
            &asset.file_name,
            EntityStatus::Active,
            serde_json::json!({ "image_url": asset.url }),
        ))
    }

    async fn create_ad(&self, session: &PlatformSession, spec: &AdSpec) -> anyhow::Result<String> {
        self.authorize(session)?;
        self.faults.check("create_ad")?;
        self.require_live(&spec.adgroup_id, KIND_AD_GROUP)?;
        self.require_live(&spec.video_id, KIND_VIDEO)?;
        Ok(self.store.insert(
            KIND_AD,
            Some(&spec.adgroup_id),
            &spec.ad_name,
            EntityStatus::Active,
            serde_json::to_value(spec)?,
        ))
    }

    async fn update_status(
        &self,
        session: &PlatformSession,
        object_type: ObjectType,
        ids: &[String],
        status: OperationStatus,
    ) -> anyhow::Result<()> {
        self.authorize(session)?;
        self.faults.check("update_status")?;
        let target = match status {
            OperationStatus::Enable => EntityStatus::Active,
            OperationStatus::Disable => EntityStatus::Disabled,
            OperationStatus::Delete => EntityStatus::Deleted,
        };
        for id in ids {
            debug!(?object_type, id = %id, ?status, "Sandbox short-video status update");
            self.store.set_status(id, target)?;
        }
        Ok(())
    }
}
