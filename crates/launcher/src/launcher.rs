//! Platform launcher capability contract and the pieces every variant shares.

use std::sync::Arc;

use async_trait::async_trait;
use campaign_core::{
    AccountCredentials, AdCopy, Campaign, CampaignError, CampaignResult, Clock, GeneratedContent,
    Platform, PlatformLaunchConfig,
};
use chrono::{DateTime, Duration, Utc};

use crate::audit::AuditSink;
use crate::ledger::ResourceLedger;
use crate::media::MediaResolver;
use crate::ports::AccountResolver;
use crate::result::{LaunchResult, RollbackResult, ValidationReport};

/// One implementation per advertising platform.
#[async_trait]
pub trait PlatformLauncher: Send + Sync {
    fn platform(&self) -> Platform;

    /// Read-only checks. Never issues a creating call.
    async fn validate_prerequisites(
        &self,
        campaign: &Campaign,
        config: &PlatformLaunchConfig,
    ) -> ValidationReport;

    /// Full creation sequence. Either succeeds with IDs or fails after
    /// rolling back everything it created.
    async fn launch(
        &self,
        campaign: &Campaign,
        config: &PlatformLaunchConfig,
        content: &GeneratedContent,
    ) -> LaunchResult;

    /// Best-effort compensation of a previously returned ledger.
    async fn rollback(&self, config: &PlatformLaunchConfig, ledger: &ResourceLedger) -> RollbackResult;
}

/// Collaborators injected into each launcher.
#[derive(Clone)]
pub struct LaunchServices {
    pub accounts: Arc<dyn AccountResolver>,
    pub media: Arc<MediaResolver>,
    pub audit: Arc<dyn AuditSink>,
    pub clock: Arc<dyn Clock>,
}

/// Credentials narrowed to what remote calls need, with the access token
/// already resolved.
#[derive(Clone)]
pub struct PlatformSession {
    pub platform_account_id: String,
    pub access_token: String,
    pub pixel_id: Option<String>,
    pub page_id: Option<String>,
}

impl std::fmt::Debug for PlatformSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformSession")
            .field("platform_account_id", &self.platform_account_id)
            .field("pixel_id", &self.pixel_id)
            .field("page_id", &self.page_id)
            .finish_non_exhaustive()
    }
}

impl PlatformSession {
    /// Falls back to the process-wide token when the account has none.
    pub fn open(credentials: &AccountCredentials, fallback_token: Option<&str>) -> CampaignResult<Self> {
        let access_token = credentials
            .access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or(fallback_token.filter(|t| !t.trim().is_empty()))
            .ok_or_else(|| {
                CampaignError::Config(format!(
                    "no access token for account {} and no fallback configured",
                    credentials.account_id
                ))
            })?;

        Ok(Self {
            platform_account_id: credentials.platform_account_id.clone(),
            access_token: access_token.to_string(),
            pixel_id: non_blank(credentials.pixel_id.as_deref()),
            page_id: non_blank(credentials.page_id.as_deref()),
        })
    }

    pub fn require_pixel(&self) -> CampaignResult<&str> {
        self.pixel_id
            .as_deref()
            .ok_or_else(|| CampaignError::Config("account has no pixel / event-tracking ID".to_string()))
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Pick the copy for this launch: generated copy when AI generation is on
/// (manual copy as fallback), otherwise the manual copy.
pub fn select_ad_copy(config: &PlatformLaunchConfig, content: &GeneratedContent) -> CampaignResult<AdCopy> {
    let generated = config
        .generate_with_ai
        .then(|| content.ad_copy.clone())
        .flatten();

    generated
        .or_else(|| config.manual_copy.clone())
        .filter(|copy| !copy.headline.trim().is_empty() || !copy.primary_text.trim().is_empty())
        .ok_or_else(|| {
            CampaignError::MissingContent(if config.generate_with_ai {
                "no generated or manual ad copy available".to_string()
            } else {
                "AI generation is off and no manual ad copy was provided".to_string()
            })
        })
}

/// Requested start, or now when unset. With `min_lead`, anything sooner
/// than `now + min_lead` is pushed out to exactly that.
pub fn schedule_start(requested: Option<DateTime<Utc>>, now: DateTime<Utc>, min_lead: Option<Duration>) -> DateTime<Utc> {
    let start = requested.unwrap_or(now);
    match min_lead {
        Some(lead) if start < now + lead => now + lead,
        _ => start,
    }
}

/// Ad names are `<start date>_<n>`, numbered from 1 across the launch.
pub fn ad_name(start: DateTime<Utc>, number: usize) -> String {
    format!("{}_{}", start.format("%Y-%m-%d"), number)
}

/// Truncate to `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn config(generate_with_ai: bool, manual: Option<AdCopy>) -> PlatformLaunchConfig {
        PlatformLaunchConfig {
            id: Uuid::new_v4(),
            campaign_id: Uuid::new_v4(),
            platform: Platform::SocialGraph,
            account_id: "acc-1".to_string(),
            daily_budget: 20.0,
            start_at: None,
            generate_with_ai,
            manual_copy: manual,
            creatives_per_set: None,
            special_ad_categories: Vec::new(),
            identity: None,
        }
    }

    fn copy(headline: &str) -> AdCopy {
        AdCopy {
            headline: headline.to_string(),
            primary_text: "Body".to_string(),
            description: None,
        }
    }

    #[test]
    fn test_select_ad_copy_precedence() {
        let content = GeneratedContent {
            ad_copy: Some(copy("Generated")),
            ..Default::default()
        };

        let ai = select_ad_copy(&config(true, Some(copy("Manual"))), &content).unwrap();
        assert_eq!(ai.headline, "Generated");

        let manual = select_ad_copy(&config(false, Some(copy("Manual"))), &content).unwrap();
        assert_eq!(manual.headline, "Manual");

        let fallback =
            select_ad_copy(&config(true, Some(copy("Manual"))), &GeneratedContent::default()).unwrap();
        assert_eq!(fallback.headline, "Manual");

        assert!(matches!(
            select_ad_copy(&config(false, None), &content),
            Err(CampaignError::MissingContent(_))
        ));
    }

    #[test]
    fn test_schedule_start_clamps_to_lead() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let lead = Some(Duration::minutes(15));

        assert_eq!(schedule_start(None, now, lead), now + Duration::minutes(15));
        assert_eq!(
            schedule_start(Some(now + Duration::minutes(5)), now, lead),
            now + Duration::minutes(15)
        );
        let later = now + Duration::hours(3);
        assert_eq!(schedule_start(Some(later), now, lead), later);
        assert_eq!(schedule_start(None, now, None), now);
    }

    #[test]
    fn test_ad_name_format() {
        let start = Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap();
        assert_eq!(ad_name(start, 3), "2026-05-04_3");
    }

    #[test]
    fn test_session_token_fallback() {
        let mut creds = AccountCredentials {
            account_id: "acc-1".to_string(),
            platform: Platform::ShortVideo,
            platform_account_id: "adv-1".to_string(),
            access_token: None,
            pixel_id: Some(" ".to_string()),
            page_id: None,
        };
        assert!(PlatformSession::open(&creds, None).is_err());

        let session = PlatformSession::open(&creds, Some("global")).unwrap();
        assert_eq!(session.access_token, "global");
        assert!(session.pixel_id.is_none());
        assert!(session.require_pixel().is_err());

        creds.access_token = Some("own".to_string());
        assert_eq!(PlatformSession::open(&creds, Some("global")).unwrap().access_token, "own");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo");
        assert_eq!(truncate_chars("short", 100), "short");
    }
}
