//! Short-video business API port.

use async_trait::async_trait;
use campaign_core::{IdentityType, MediaAsset};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::allocation::MinorUnits;
use crate::launcher::PlatformSession;

pub const OBJECTIVE_CONVERSIONS: &str = "WEB_CONVERSIONS";
pub const OPTIMIZATION_EVENT: &str = "COMPLETE_PAYMENT";
pub const PLACEMENT: &str = "PLACEMENT_SHORT_VIDEO";
pub const CALL_TO_ACTION: &str = "LEARN_MORE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetModeTag {
    BudgetModeDay,
    BudgetModeInfinite,
}

/// Object families accepted by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Campaign,
    AdGroup,
    Ad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Enable,
    Disable,
    Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignSpec {
    pub advertiser_id: String,
    pub campaign_name: String,
    pub objective_type: String,
    pub budget_mode: BudgetModeTag,
    pub budget: Option<MinorUnits>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdGroupSpec {
    pub advertiser_id: String,
    pub campaign_id: String,
    pub adgroup_name: String,
    pub placement: String,
    pub location_ids: Vec<String>,
    pub languages: Vec<String>,
    pub age_groups: Vec<String>,
    pub interest_category_ids: Vec<String>,
    pub budget_mode: BudgetModeTag,
    pub budget: Option<MinorUnits>,
    pub schedule_start_time: DateTime<Utc>,
    pub pixel_id: String,
    pub optimization_event: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdSpec {
    pub advertiser_id: String,
    pub adgroup_id: String,
    pub ad_name: String,
    pub identity_id: String,
    pub identity_type: IdentityType,
    pub video_id: String,
    /// Cover image; empty when the platform picks a frame.
    pub image_ids: Vec<String>,
    pub ad_text: String,
    pub call_to_action: String,
    pub landing_page_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestCategory {
    pub id: String,
    pub name: String,
}

#[async_trait]
pub trait ShortVideoApi: Send + Sync {
    async fn create_campaign(&self, session: &PlatformSession, spec: &CampaignSpec) -> anyhow::Result<String>;

    /// Location IDs covering an ISO country code.
    async fn search_locations(&self, session: &PlatformSession, country: &str) -> anyhow::Result<Vec<String>>;

    async fn search_interest_categories(
        &self,
        session: &PlatformSession,
        keyword: &str,
    ) -> anyhow::Result<Vec<InterestCategory>>;

    async fn create_ad_group(&self, session: &PlatformSession, spec: &AdGroupSpec) -> anyhow::Result<String>;

    /// Returns the video ID.
    async fn upload_video(&self, session: &PlatformSession, asset: &MediaAsset) -> anyhow::Result<String>;

    /// Returns the image ID.
    async fn upload_image(&self, session: &PlatformSession, asset: &MediaAsset) -> anyhow::Result<String>;

    async fn create_ad(&self, session: &PlatformSession, spec: &AdSpec) -> anyhow::Result<String>;

    async fn update_status(
        &self,
        session: &PlatformSession,
        object_type: ObjectType,
        ids: &[String],
        status: OperationStatus,
    ) -> anyhow::Result<()>;
}
