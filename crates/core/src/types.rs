//! Campaign-side domain types consumed by the platform launchers.
//!
//! Everything here is owned by the campaign authoring side and is read-only
//! for the duration of a launch attempt.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CampaignError;

/// Third-party advertising platforms a campaign can be launched on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Campaign -> AdSet -> Creative -> Ad.
    SocialGraph,
    /// Campaign -> AdGroup -> Ad, video only.
    ShortVideo,
}

impl Platform {
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::SocialGraph => "Social-Graph",
            Platform::ShortVideo => "Short-Video",
        }
    }

    /// Stable identifier used for metric labels and registry keys.
    pub fn slug(&self) -> &'static str {
        match self {
            Platform::SocialGraph => "social_graph",
            Platform::ShortVideo => "short_video",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Platform {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "social_graph" => Ok(Platform::SocialGraph),
            "short_video" => Ok(Platform::ShortVideo),
            other => Err(CampaignError::UnsupportedPlatform(other.to_string())),
        }
    }
}

/// How budget and grouping units are laid out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetMode {
    /// One shared budget, one grouping unit (CBO).
    #[default]
    CampaignLevel,
    /// Budget duplicated per grouping unit, media fanned out (ABO).
    SetLevel,
}

/// The campaign aggregate root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub budget_mode: BudgetMode,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    /// ISO 639-1 language code.
    pub language: String,
    /// Destination / tracking link every ad points at.
    #[serde(default)]
    pub destination_url: Option<String>,
}

/// Regulated ad categories that restrict targeting on the social-graph platform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecialAdCategory {
    Credit,
    Housing,
    Employment,
    IssuesElectionsPolitics,
}

/// Kind of identity a short-video ad is published under.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentityType {
    CustomizedUser,
    AuthCode,
    TtUser,
    BcAuthTt,
}

/// Persona an ad is attributed to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityRef {
    pub id: String,
    pub identity_type: IdentityType,
}

/// Manually authored or generated ad copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdCopy {
    pub headline: String,
    pub primary_text: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Per-platform launch configuration attached to a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformLaunchConfig {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub platform: Platform,
    /// Reference resolved to [`AccountCredentials`] at launch time.
    pub account_id: String,
    /// Daily budget in host currency.
    pub daily_budget: f64,
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub generate_with_ai: bool,
    #[serde(default)]
    pub manual_copy: Option<AdCopy>,
    /// Media items per grouping unit in set-level mode.
    #[serde(default)]
    pub creatives_per_set: Option<u32>,
    #[serde(default)]
    pub special_ad_categories: Vec<SpecialAdCategory>,
    #[serde(default)]
    pub identity: Option<IdentityRef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// MIME family prefix, e.g. `image/`.
    pub fn mime_prefix(&self) -> &'static str {
        match self {
            MediaType::Image => "image/",
            MediaType::Video => "video/",
        }
    }
}

/// An image or video owned by a campaign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaAsset {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub media_type: MediaType,
    pub file_name: String,
    pub url: String,
    pub mime_type: String,
    pub size_bytes: u64,
    /// Linked thumbnail image, videos only.
    #[serde(default)]
    pub thumbnail_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Platform credentials resolved from an account reference.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccountCredentials {
    pub account_id: String,
    pub platform: Platform,
    /// Ad account / advertiser ID on the platform side.
    pub platform_account_id: String,
    #[serde(default)]
    pub access_token: Option<String>,
    /// Pixel / event-tracking ID.
    #[serde(default)]
    pub pixel_id: Option<String>,
    /// Page / persona ID.
    #[serde(default)]
    pub page_id: Option<String>,
}

impl fmt::Debug for AccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountCredentials")
            .field("account_id", &self.account_id)
            .field("platform", &self.platform)
            .field("platform_account_id", &self.platform_account_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("pixel_id", &self.pixel_id)
            .field("page_id", &self.page_id)
            .finish()
    }
}

/// Targeting hints from the copy/targeting generator. Advisory only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetingSuggestions {
    #[serde(default)]
    pub interests: Vec<String>,
    /// Age range such as `"25-54"` or `"18+"`.
    #[serde(default)]
    pub age_range: Option<String>,
}

/// Output of the generator collaborator handed to `launch`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedContent {
    #[serde(default)]
    pub ad_copy: Option<AdCopy>,
    #[serde(default)]
    pub targeting: TargetingSuggestions,
}
