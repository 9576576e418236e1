//! Short-video launcher: Campaign -> AdGroup -> Ad.
//!
//! Video only. The creative is part of the ad, so there is nothing to
//! remove on its own. Ad groups must start in the future.

pub mod api;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use campaign_core::config::{LauncherConfig, ShortVideoSettings};
use campaign_core::{
    AdCopy, Campaign, CampaignError, CampaignResult, GeneratedContent, IdentityRef,
    Platform, PlatformLaunchConfig,
};
use chrono::Duration;
use tracing::{debug, info, warn};

use self::api::{
    AdGroupSpec, AdSpec, BudgetModeTag, CampaignSpec, ObjectType, OperationStatus, ShortVideoApi,
    CALL_TO_ACTION, OBJECTIVE_CONVERSIONS, OPTIMIZATION_EVENT, PLACEMENT,
};
use crate::allocation::{FanOutPlan, MinorUnits};
use crate::audit::LaunchEventKind;
use crate::launcher::{
    ad_name, schedule_start, select_ad_copy, truncate_chars, LaunchServices, PlatformLauncher, PlatformSession,
};
use crate::ledger::{ResourceKind, ResourceLedger};
use crate::media::{MediaPolicy, ResolvedMedia};
use crate::result::{LaunchResult, RollbackResult, ValidationReport};
use crate::saga::{session_unavailable, unwind, Compensator, CreativeRemoval, Saga};
use crate::targeting::{normalize_interest_names, AgeRange};
use crate::validation::{self, MediaRequirement, PlatformRules};

pub struct ShortVideoLauncher {
    api: Arc<dyn ShortVideoApi>,
    services: LaunchServices,
    settings: ShortVideoSettings,
    default_creatives_per_set: u32,
}

/// Inputs settled before any remote call.
struct LaunchInputs {
    identity: IdentityRef,
    ad_text: String,
    pixel_id: String,
    landing_page_url: String,
}

/// Targeting for one ad group.
struct AdGroupTargeting {
    location_ids: Vec<String>,
    age_groups: Vec<String>,
    interest_category_ids: Vec<String>,
}

impl ShortVideoLauncher {
    pub fn new(api: Arc<dyn ShortVideoApi>, services: LaunchServices, config: &LauncherConfig) -> Self {
        info!(
            min_daily_budget = config.short_video.min_daily_budget,
            min_start_lead_minutes = config.short_video.min_start_lead_minutes,
            "Short-video launcher initialized"
        );
        Self {
            api,
            services,
            settings: config.short_video.clone(),
            default_creatives_per_set: config.default_creatives_per_set,
        }
    }

    fn media_policy(&self) -> MediaPolicy {
        MediaPolicy {
            max_image_bytes: self.settings.max_image_bytes,
            max_video_bytes: self.settings.max_video_bytes,
        }
    }

    fn rules(&self) -> PlatformRules {
        PlatformRules {
            platform: Platform::ShortVideo,
            min_daily_budget: self.settings.min_daily_budget,
            media: MediaRequirement::VideoWithImageFallback,
            media_policy: self.media_policy(),
            fallback_access_token: self.settings.fallback_access_token.clone(),
            require_pixel: true,
            require_page: false,
            require_identity: true,
        }
    }

    async fn open_session(&self, config: &PlatformLaunchConfig) -> CampaignResult<PlatformSession> {
        let credentials = self
            .services
            .accounts
            .resolve(&config.account_id, Platform::ShortVideo)
            .await?;
        PlatformSession::open(&credentials, self.settings.fallback_access_token.as_deref())
    }

    fn prepare(
        &self,
        session: &PlatformSession,
        campaign: &Campaign,
        config: &PlatformLaunchConfig,
        content: &GeneratedContent,
    ) -> CampaignResult<LaunchInputs> {
        let identity = config
            .identity
            .clone()
            .filter(|identity| !identity.id.trim().is_empty())
            .ok_or_else(|| CampaignError::Config("launch config has no identity reference".to_string()))?;
        let copy = select_ad_copy(config, content)?;
        let landing_page_url = campaign
            .destination_url
            .clone()
            .ok_or_else(|| CampaignError::MissingContent("campaign has no destination link".to_string()))?;

        Ok(LaunchInputs {
            identity,
            ad_text: truncate_chars(ad_text(&copy), self.settings.ad_text_max_chars),
            pixel_id: session.require_pixel()?.to_string(),
            landing_page_url,
        })
    }

    async fn resolve_targeting(
        &self,
        saga: &Saga<'_>,
        session: &PlatformSession,
        campaign: &Campaign,
        content: &GeneratedContent,
    ) -> CampaignResult<AdGroupTargeting> {
        let location_ids = saga
            .call("search_locations", self.api.search_locations(session, &campaign.country))
            .await?;
        if location_ids.is_empty() {
            return Err(CampaignError::MissingContent(format!(
                "no short-video location matches country {}",
                campaign.country
            )));
        }

        let ages = AgeRange::parse(content.targeting.age_range.as_deref());
        let mut interest_category_ids = Vec::new();
        for name in normalize_interest_names(&content.targeting.interests) {
            let found = match saga
                .call(
                    "search_interest_categories",
                    self.api.search_interest_categories(session, &name),
                )
                .await
            {
                Ok(found) => found,
                Err(e) => {
                    warn!(interest = %name, error = %e, "Interest category lookup failed, dropping");
                    continue;
                }
            };
            match found.into_iter().next() {
                Some(category) => interest_category_ids.push(category.id),
                None => debug!(interest = %name, "Interest category did not resolve, dropping"),
            }
        }

        let targeting = AdGroupTargeting {
            location_ids,
            age_groups: ages.short_video_groups().into_iter().map(str::to_string).collect(),
            interest_category_ids,
        };
        saga.note(
            LaunchEventKind::TargetingResolved,
            format!(
                "{} locations, age groups {:?}, {} interest categories",
                targeting.location_ids.len(),
                targeting.age_groups,
                targeting.interest_category_ids.len()
            ),
        );
        Ok(targeting)
    }

    #[allow(clippy::too_many_arguments)]
    async fn create_resources(
        &self,
        saga: &mut Saga<'_>,
        session: &PlatformSession,
        campaign: &Campaign,
        config: &PlatformLaunchConfig,
        content: &GeneratedContent,
        inputs: &LaunchInputs,
        media: &ResolvedMedia,
    ) -> CampaignResult<()> {
        let per_set = config.creatives_per_set.unwrap_or(self.default_creatives_per_set);
        let plan = FanOutPlan::build(campaign.budget_mode, config.daily_budget, media.len(), per_set);
        let lead = Duration::minutes(self.settings.min_start_lead_minutes);
        let start = schedule_start(config.start_at, self.services.clock.now(), Some(lead));
        if config.start_at.is_some_and(|requested| requested != start) {
            debug!(requested = ?config.start_at, start = %start, "Start time pushed out to minimum lead");
        }

        info!(
            campaign_id = %campaign.id,
            media = media.len(),
            ad_groups = plan.units.len(),
            mode = ?plan.mode,
            start = %start,
            "Short-video fan-out planned"
        );

        let (budget_mode, budget) = budget_fields(plan.campaign_budget);
        let campaign_spec = CampaignSpec {
            advertiser_id: session.platform_account_id.clone(),
            campaign_name: format!("{} - {}", campaign.name, start.format("%Y-%m-%d")),
            objective_type: OBJECTIVE_CONVERSIONS.to_string(),
            budget_mode,
            budget,
        };
        let remote_campaign_id = saga
            .create(
                ResourceKind::Campaign,
                "create_campaign",
                self.api.create_campaign(session, &campaign_spec),
            )
            .await?;

        let mut ad_number = 0usize;
        for unit in &plan.units {
            let targeting = self.resolve_targeting(saga, session, campaign, content).await?;
            let (budget_mode, budget) = budget_fields(unit.daily_budget);
            let ad_group_spec = AdGroupSpec {
                advertiser_id: session.platform_account_id.clone(),
                campaign_id: remote_campaign_id.clone(),
                adgroup_name: format!("{} - Set {}", campaign.name, unit.ordinal),
                placement: PLACEMENT.to_string(),
                location_ids: targeting.location_ids,
                languages: vec![campaign.language.clone()],
                age_groups: targeting.age_groups,
                interest_category_ids: targeting.interest_category_ids,
                budget_mode,
                budget,
                schedule_start_time: start,
                pixel_id: inputs.pixel_id.clone(),
                optimization_event: OPTIMIZATION_EVENT.to_string(),
            };
            let ad_group_id = saga
                .create(
                    ResourceKind::GroupingUnit,
                    "create_ad_group",
                    self.api.create_ad_group(session, &ad_group_spec),
                )
                .await?;

            for source in &media.items[unit.media.clone()] {
                ad_number += 1;
                let video_id = saga
                    .call("upload_video", self.api.upload_video(session, &source.asset))
                    .await?;
                let mut image_ids = Vec::new();
                if let Some(thumbnail) = &source.thumbnail {
                    image_ids.push(
                        saga.call("upload_image", self.api.upload_image(session, thumbnail))
                            .await?,
                    );
                }

                let ad_spec = AdSpec {
                    advertiser_id: session.platform_account_id.clone(),
                    adgroup_id: ad_group_id.clone(),
                    ad_name: ad_name(start, ad_number),
                    identity_id: inputs.identity.id.clone(),
                    identity_type: inputs.identity.identity_type,
                    video_id,
                    image_ids,
                    ad_text: inputs.ad_text.clone(),
                    call_to_action: CALL_TO_ACTION.to_string(),
                    landing_page_url: inputs.landing_page_url.clone(),
                };
                saga.create(ResourceKind::Ad, "create_ad", self.api.create_ad(session, &ad_spec))
                    .await?;
            }
        }

        Ok(())
    }
}

/// Primary text, or the headline when the body is blank.
fn ad_text(copy: &AdCopy) -> &str {
    if copy.primary_text.trim().is_empty() {
        &copy.headline
    } else {
        &copy.primary_text
    }
}

fn budget_fields(budget: Option<MinorUnits>) -> (BudgetModeTag, Option<MinorUnits>) {
    match budget {
        Some(amount) => (BudgetModeTag::BudgetModeDay, Some(amount)),
        None => (BudgetModeTag::BudgetModeInfinite, None),
    }
}

/// Disables short-video objects. Creatives go away with their ad.
struct ShortVideoCompensator<'a> {
    api: &'a dyn ShortVideoApi,
    session: &'a PlatformSession,
}

#[async_trait]
impl Compensator for ShortVideoCompensator<'_> {
    fn creative_removal(&self) -> CreativeRemoval {
        CreativeRemoval::WithAd
    }

    async fn compensate(&self, kind: ResourceKind, remote_id: &str) -> anyhow::Result<()> {
        let object_type = match kind {
            ResourceKind::Campaign => ObjectType::Campaign,
            ResourceKind::GroupingUnit => ObjectType::AdGroup,
            ResourceKind::Ad => ObjectType::Ad,
            ResourceKind::Creative => anyhow::bail!("short-video creatives cannot be removed on their own"),
        };
        self.api
            .update_status(
                self.session,
                object_type,
                &[remote_id.to_string()],
                OperationStatus::Disable,
            )
            .await
    }
}

#[async_trait]
impl PlatformLauncher for ShortVideoLauncher {
    fn platform(&self) -> Platform {
        Platform::ShortVideo
    }

    async fn validate_prerequisites(
        &self,
        campaign: &Campaign,
        config: &PlatformLaunchConfig,
    ) -> ValidationReport {
        validation::validate_prerequisites(&self.services, &self.rules(), campaign, config).await
    }

    async fn launch(
        &self,
        campaign: &Campaign,
        config: &PlatformLaunchConfig,
        content: &GeneratedContent,
    ) -> LaunchResult {
        let mut saga = Saga::new(Platform::ShortVideo, campaign.id, self.services.audit.as_ref());
        saga.note(LaunchEventKind::LaunchStarted, format!("launching {}", campaign.name));

        let session = match self.open_session(config).await {
            Ok(session) => session,
            Err(e) => return saga.abort(e),
        };
        let inputs = match self.prepare(&session, campaign, config, content) {
            Ok(inputs) => inputs,
            Err(e) => return saga.abort(e),
        };
        let media = match self
            .services
            .media
            .resolve_video_only(campaign, &self.media_policy())
            .await
        {
            Ok(media) => media,
            Err(e) => return saga.abort(e),
        };
        let converted_media_id = media.converted.as_ref().map(|asset| asset.id);
        if let Some(converted) = &media.converted {
            saga.note(
                LaunchEventKind::MediaConverted,
                format!("converted image to {} ({})", converted.file_name, converted.id),
            );
        }

        let compensator = ShortVideoCompensator {
            api: self.api.as_ref(),
            session: &session,
        };
        let outcome = self
            .create_resources(&mut saga, &session, campaign, config, content, &inputs, &media)
            .await;
        saga.conclude(outcome, &compensator)
            .await
            .with_converted_media(converted_media_id)
    }

    async fn rollback(&self, config: &PlatformLaunchConfig, ledger: &ResourceLedger) -> RollbackResult {
        let session = match self.open_session(config).await {
            Ok(session) => session,
            Err(e) => return session_unavailable(Platform::ShortVideo, &e, self.services.audit.as_ref()),
        };
        let compensator = ShortVideoCompensator {
            api: self.api.as_ref(),
            session: &session,
        };
        unwind(Platform::ShortVideo, ledger, &compensator, self.services.audit.as_ref()).await
    }
}
