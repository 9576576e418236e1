use serde::{Deserialize, Serialize};

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_LAUNCH__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub launcher: LauncherConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LauncherConfig {
    /// Media items per grouping unit in set-level mode when the launch
    /// config does not specify one.
    #[serde(default = "default_creatives_per_set")]
    pub default_creatives_per_set: u32,
    #[serde(default)]
    pub social_graph: SocialGraphSettings,
    #[serde(default)]
    pub short_video: ShortVideoSettings,
}

/// Status newly created ads are given.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InitialAdStatus {
    Active,
    Paused,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SocialGraphSettings {
    #[serde(default = "default_social_min_budget")]
    pub min_daily_budget: f64,
    /// Process-wide token used when an account has none configured.
    #[serde(default)]
    pub fallback_access_token: Option<String>,
    #[serde(default = "default_initial_ad_status")]
    pub initial_ad_status: InitialAdStatus,
    #[serde(default = "default_social_api_version")]
    pub api_version: String,
    #[serde(default = "default_social_max_image_bytes")]
    pub max_image_bytes: u64,
    #[serde(default = "default_social_max_video_bytes")]
    pub max_video_bytes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShortVideoSettings {
    #[serde(default = "default_short_min_budget")]
    pub min_daily_budget: f64,
    #[serde(default)]
    pub fallback_access_token: Option<String>,
    /// Ad groups must start at least this far in the future.
    #[serde(default = "default_min_start_lead_minutes")]
    pub min_start_lead_minutes: i64,
    #[serde(default = "default_ad_text_max_chars")]
    pub ad_text_max_chars: usize,
    /// Upper bound for images fed to the image-to-video fallback.
    #[serde(default = "default_short_max_image_bytes")]
    pub max_image_bytes: u64,
    #[serde(default = "default_short_max_video_bytes")]
    pub max_video_bytes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Emit step-level launch events to the audit sink.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
}

// Default functions
fn default_node_id() -> String {
    "launcher-01".to_string()
}
fn default_creatives_per_set() -> u32 {
    1
}
fn default_social_min_budget() -> f64 {
    5.0
}
fn default_initial_ad_status() -> InitialAdStatus {
    InitialAdStatus::Paused
}
fn default_social_api_version() -> String {
    "v21.0".to_string()
}
fn default_social_max_image_bytes() -> u64 {
    30 * 1024 * 1024
}
fn default_social_max_video_bytes() -> u64 {
    4 * 1024 * 1024 * 1024
}
fn default_short_min_budget() -> f64 {
    50.0
}
fn default_min_start_lead_minutes() -> i64 {
    15
}
fn default_ad_text_max_chars() -> usize {
    100
}
fn default_short_max_image_bytes() -> u64 {
    10 * 1024 * 1024
}
fn default_short_max_video_bytes() -> u64 {
    500 * 1024 * 1024
}
fn default_audit_enabled() -> bool {
    true
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            default_creatives_per_set: default_creatives_per_set(),
            social_graph: SocialGraphSettings::default(),
            short_video: ShortVideoSettings::default(),
        }
    }
}

impl Default for SocialGraphSettings {
    fn default() -> Self {
        Self {
            min_daily_budget: default_social_min_budget(),
            fallback_access_token: None,
            initial_ad_status: default_initial_ad_status(),
            api_version: default_social_api_version(),
            max_image_bytes: default_social_max_image_bytes(),
            max_video_bytes: default_social_max_video_bytes(),
        }
    }
}

impl Default for ShortVideoSettings {
    fn default() -> Self {
        Self {
            min_daily_budget: default_short_min_budget(),
            fallback_access_token: None,
            min_start_lead_minutes: default_min_start_lead_minutes(),
            ad_text_max_chars: default_ad_text_max_chars(),
            max_image_bytes: default_short_max_image_bytes(),
            max_video_bytes: default_short_max_video_bytes(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            launcher: LauncherConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and optional config file.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("CAMPAIGN_LAUNCH")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
