//! Prerequisite validation shared by the platform launchers.
//!
//! Checks run in a fixed order and every failure is collected, so the
//! caller sees all problems at once. Nothing here creates remote state.

use campaign_core::{Campaign, Platform, PlatformLaunchConfig};
use url::Url;

use crate::launcher::{LaunchServices, PlatformSession};
use crate::media::MediaPolicy;
use crate::result::ValidationReport;

/// Media a platform can accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaRequirement {
    ImageOrVideo,
    /// Video only, but a lone image is acceptable because it can be
    /// converted.
    VideoWithImageFallback,
}

/// Platform-specific inputs to the shared checks.
#[derive(Debug, Clone)]
pub struct PlatformRules {
    pub platform: Platform,
    pub min_daily_budget: f64,
    pub media: MediaRequirement,
    pub media_policy: MediaPolicy,
    pub fallback_access_token: Option<String>,
    pub require_pixel: bool,
    pub require_page: bool,
    pub require_identity: bool,
}

pub async fn validate_prerequisites(
    services: &LaunchServices,
    rules: &PlatformRules,
    campaign: &Campaign,
    config: &PlatformLaunchConfig,
) -> ValidationReport {
    let mut errors = Vec::new();
    let platform = rules.platform.display_name();

    if config.platform != rules.platform {
        errors.push(format!(
            "launch config targets {} but was sent to the {platform} launcher",
            config.platform.display_name()
        ));
    }

    // 1. Account and credentials.
    match services.accounts.resolve(&config.account_id, rules.platform).await {
        Ok(credentials) => {
            match PlatformSession::open(&credentials, rules.fallback_access_token.as_deref()) {
                Ok(session) => {
                    if rules.require_pixel && session.pixel_id.is_none() {
                        errors.push(format!(
                            "{platform} account {} has no pixel / event-tracking ID",
                            config.account_id
                        ));
                    }
                    if rules.require_page && session.page_id.is_none() {
                        errors.push(format!(
                            "{platform} account {} has no page ID",
                            config.account_id
                        ));
                    }
                }
                Err(_) => errors.push(format!(
                    "{platform} account {} has no access token and no fallback token is configured",
                    config.account_id
                )),
            }
        }
        Err(e) => errors.push(format!("{platform} account could not be resolved: {e}")),
    }
    if rules.require_identity
        && config
            .identity
            .as_ref()
            .map_or(true, |identity| identity.id.trim().is_empty())
    {
        errors.push(format!("{platform} launch config has no identity reference"));
    }

    // 2. Minimum daily budget.
    if config.daily_budget.is_nan() || config.daily_budget < rules.min_daily_budget {
        errors.push(format!(
            "daily budget {:.2} is below the {platform} minimum of {:.2}",
            config.daily_budget, rules.min_daily_budget
        ));
    }

    // 3. Media.
    match services.media.inventory(campaign.id, &rules.media_policy).await {
        Ok(inventory) => match rules.media {
            MediaRequirement::ImageOrVideo if inventory.is_empty() => {
                errors.push("campaign has no usable images or videos".to_string());
            }
            MediaRequirement::ImageOrVideo
                if inventory.images.is_empty()
                    && inventory.videos.iter().any(|v| v.thumbnail_id.is_none()) =>
            {
                errors.push("video creatives need a thumbnail image and the campaign has none".to_string());
            }
            MediaRequirement::VideoWithImageFallback if inventory.is_empty() => {
                errors.push(format!(
                    "{platform} needs a video and the campaign has no usable videos or images to convert"
                ));
            }
            _ => {}
        },
        Err(e) => errors.push(format!("campaign media could not be loaded: {e}")),
    }

    // 4. Destination link.
    match campaign.destination_url.as_deref().map(str::trim) {
        None | Some("") => errors.push("campaign has no destination / tracking link".to_string()),
        Some(link) => match Url::parse(link) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => errors.push(format!("campaign destination link {link:?} is not a valid http(s) URL")),
        },
    }

    ValidationReport::from_errors(errors)
}
