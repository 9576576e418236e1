//! Social-graph marketing API port.

use async_trait::async_trait;
use campaign_core::{MediaAsset, SpecialAdCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::allocation::MinorUnits;
use crate::launcher::PlatformSession;
use crate::platforms::sandbox::EntityStatus;

pub const OBJECTIVE_SALES: &str = "OUTCOME_SALES";
pub const OPTIMIZATION_GOAL: &str = "OFFSITE_CONVERSIONS";
pub const BILLING_EVENT: &str = "IMPRESSIONS";
pub const CONVERSION_EVENT: &str = "PURCHASE";
pub const BID_STRATEGY: &str = "LOWEST_COST_WITHOUT_CAP";
pub const CALL_TO_ACTION: &str = "LEARN_MORE";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignSpec {
    pub name: String,
    pub objective: String,
    pub status: EntityStatus,
    pub special_ad_categories: Vec<SpecialAdCategory>,
    /// Countries the special-category declaration covers.
    pub special_ad_category_country: Vec<String>,
    /// Set in campaign-level budget mode only.
    pub daily_budget: Option<MinorUnits>,
    pub bid_strategy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestMatch {
    pub id: String,
    pub name: String,
    pub audience_size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Targeting {
    pub countries: Vec<String>,
    pub age_min: u8,
    pub age_max: u8,
    pub interests: Vec<InterestMatch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdSetSpec {
    pub campaign_id: String,
    pub name: String,
    /// Set in set-level budget mode only.
    pub daily_budget: Option<MinorUnits>,
    pub targeting: Targeting,
    pub pixel_id: String,
    pub custom_event_type: String,
    pub optimization_goal: String,
    pub billing_event: String,
    pub start_time: DateTime<Utc>,
    pub status: EntityStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CreativeMedia {
    Image { image_hash: String },
    Video { video_id: String, thumbnail_hash: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreativeSpec {
    pub name: String,
    pub page_id: String,
    pub media: CreativeMedia,
    pub headline: String,
    pub message: String,
    pub description: Option<String>,
    pub link: String,
    pub call_to_action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdSpec {
    pub name: String,
    pub ad_set_id: String,
    pub creative_id: String,
    pub status: EntityStatus,
}

#[async_trait]
pub trait SocialGraphApi: Send + Sync {
    async fn create_campaign(&self, session: &PlatformSession, spec: &CampaignSpec) -> anyhow::Result<String>;

    async fn search_interests(&self, session: &PlatformSession, query: &str) -> anyhow::Result<Vec<InterestMatch>>;

    async fn create_ad_set(&self, session: &PlatformSession, spec: &AdSetSpec) -> anyhow::Result<String>;

    /// Returns the image hash.
    async fn upload_image(&self, session: &PlatformSession, asset: &MediaAsset) -> anyhow::Result<String>;

    /// Returns the video ID.
    async fn upload_video(&self, session: &PlatformSession, asset: &MediaAsset) -> anyhow::Result<String>;

    async fn create_creative(&self, session: &PlatformSession, spec: &CreativeSpec) -> anyhow::Result<String>;

    async fn create_ad(&self, session: &PlatformSession, spec: &AdSpec) -> anyhow::Result<String>;

    /// Delete any campaign, ad set, creative, or ad.
    async fn delete_object(&self, session: &PlatformSession, object_id: &str) -> anyhow::Result<()>;
}
