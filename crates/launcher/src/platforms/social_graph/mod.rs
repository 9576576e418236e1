//! Social-graph launcher: Campaign -> AdSet -> Creative -> Ad.
//!
//! Accepts images or videos. Every ad set carries the account pixel and
//! every creative is published under the account's page.

pub mod api;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use campaign_core::config::{InitialAdStatus, LauncherConfig, SocialGraphSettings};
use campaign_core::{
    Campaign, CampaignError, CampaignResult, GeneratedContent, MediaType, Platform,
    PlatformLaunchConfig,
};
use tracing::{debug, info, warn};

use self::api::{
    AdSetSpec, AdSpec, CampaignSpec, CreativeMedia, CreativeSpec, InterestMatch, SocialGraphApi,
    Targeting, BID_STRATEGY, BILLING_EVENT, CALL_TO_ACTION, CONVERSION_EVENT, OBJECTIVE_SALES,
    OPTIMIZATION_GOAL,
};
use crate::allocation::FanOutPlan;
use crate::audit::LaunchEventKind;
use crate::launcher::{
    ad_name, schedule_start, select_ad_copy, LaunchServices, PlatformLauncher, PlatformSession,
};
use crate::ledger::{ResourceKind, ResourceLedger};
use crate::media::{CreativeSource, MediaPolicy};
use crate::platforms::sandbox::EntityStatus;
use crate::result::{LaunchResult, RollbackResult, ValidationReport};
use crate::saga::{session_unavailable, unwind, Compensator, CreativeRemoval, Saga};
use crate::targeting::{normalize_interest_names, AgeRange};
use crate::validation::{self, MediaRequirement, PlatformRules};

pub struct SocialGraphLauncher {
    api: Arc<dyn SocialGraphApi>,
    services: LaunchServices,
    settings: SocialGraphSettings,
    default_creatives_per_set: u32,
}

impl SocialGraphLauncher {
    pub fn new(api: Arc<dyn SocialGraphApi>, services: LaunchServices, config: &LauncherConfig) -> Self {
        info!(
            api_version = %config.social_graph.api_version,
            min_daily_budget = config.social_graph.min_daily_budget,
            "Social-graph launcher initialized"
        );
        Self {
            api,
            services,
            settings: config.social_graph.clone(),
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
            platform: Platform::SocialGraph,
            min_daily_budget: self.settings.min_daily_budget,
            media: MediaRequirement::ImageOrVideo,
            media_policy: self.media_policy(),
            fallback_access_token: self.settings.fallback_access_token.clone(),
            require_pixel: true,
            require_page: true,
            require_identity: false,
        }
    }

    fn ad_status(&self) -> EntityStatus {
        match self.settings.initial_ad_status {
            InitialAdStatus::Active => EntityStatus::Active,
            InitialAdStatus::Paused => EntityStatus::Paused,
        }
    }

    async fn open_session(&self, config: &PlatformLaunchConfig) -> CampaignResult<PlatformSession> {
        let credentials = self
            .services
            .accounts
            .resolve(&config.account_id, Platform::SocialGraph)
            .await?;
        PlatformSession::open(&credentials, self.settings.fallback_access_token.as_deref())
    }

    async fn create_resources(
        &self,
        saga: &mut Saga<'_>,
        session: &PlatformSession,
        campaign: &Campaign,
        config: &PlatformLaunchConfig,
        content: &GeneratedContent,
    ) -> CampaignResult<()> {
        // Everything that can fail locally is settled before the first
        // creating call.
        let copy = select_ad_copy(config, content)?;
        let pixel_id = session.require_pixel()?.to_string();
        let page_id = session
            .page_id
            .clone()
            .ok_or_else(|| CampaignError::Config("account has no page ID".to_string()))?;
        let link = campaign
            .destination_url
            .clone()
            .ok_or_else(|| CampaignError::MissingContent("campaign has no destination link".to_string()))?;
        let media = self
            .services
            .media
            .resolve_image_or_video(campaign, &self.media_policy())
            .await?;
        let per_set = config.creatives_per_set.unwrap_or(self.default_creatives_per_set);
        let plan = FanOutPlan::build(campaign.budget_mode, config.daily_budget, media.len(), per_set);
        let start = schedule_start(config.start_at, self.services.clock.now(), None);
        let date = start.format("%Y-%m-%d").to_string();

        info!(
            campaign_id = %campaign.id,
            media_type = ?media.media_type,
            media = media.len(),
            ad_sets = plan.units.len(),
            mode = ?plan.mode,
            "Social-graph fan-out planned"
        );

        let special = !config.special_ad_categories.is_empty();
        let campaign_spec = CampaignSpec {
            name: format!("{} - {}", campaign.name, date),
            objective: OBJECTIVE_SALES.to_string(),
            status: EntityStatus::Active,
            special_ad_categories: config.special_ad_categories.clone(),
            special_ad_category_country: if special {
                vec![campaign.country.clone()]
            } else {
                Vec::new()
            },
            daily_budget: plan.campaign_budget,
            bid_strategy: plan.campaign_budget.map(|_| BID_STRATEGY.to_string()),
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
            let targeting = self.resolve_targeting(saga, session, campaign, config, content).await?;

            let ad_set_spec = AdSetSpec {
                campaign_id: remote_campaign_id.clone(),
                name: format!("{} - Set {}", campaign.name, unit.ordinal),
                daily_budget: unit.daily_budget,
                targeting,
                pixel_id: pixel_id.clone(),
                custom_event_type: CONVERSION_EVENT.to_string(),
                optimization_goal: OPTIMIZATION_GOAL.to_string(),
                billing_event: BILLING_EVENT.to_string(),
                start_time: start,
                status: EntityStatus::Active,
            };
            let ad_set_id = saga
                .create(
                    ResourceKind::GroupingUnit,
                    "create_ad_set",
                    self.api.create_ad_set(session, &ad_set_spec),
                )
                .await?;

            for source in &media.items[unit.media.clone()] {
                ad_number += 1;
                let creative_media = self.upload_media(saga, session, media.media_type, source).await?;
                let creative_spec = CreativeSpec {
                    name: format!("{} - Creative {}", campaign.name, ad_number),
                    page_id: page_id.clone(),
                    media: creative_media,
                    headline: copy.headline.clone(),
                    message: copy.primary_text.clone(),
                    description: copy.description.clone(),
                    link: link.clone(),
                    call_to_action: CALL_TO_ACTION.to_string(),
                };
                let creative_id = saga
                    .create(
                        ResourceKind::Creative,
                        "create_creative",
                        self.api.create_creative(session, &creative_spec),
                    )
                    .await?;

                let ad_spec = AdSpec {
                    name: ad_name(start, ad_number),
                    ad_set_id: ad_set_id.clone(),
                    creative_id,
                    status: self.ad_status(),
                };
                saga.create(ResourceKind::Ad, "create_ad", self.api.create_ad(session, &ad_spec))
                    .await?;
            }
        }

        Ok(())
    }

    async fn upload_media(
        &self,
        saga: &Saga<'_>,
        session: &PlatformSession,
        media_type: MediaType,
        source: &CreativeSource,
    ) -> CampaignResult<CreativeMedia> {
        match media_type {
            MediaType::Image => {
                let image_hash = saga
                    .call("upload_image", self.api.upload_image(session, &source.asset))
                    .await?;
                Ok(CreativeMedia::Image { image_hash })
            }
            MediaType::Video => {
                let thumbnail = source.thumbnail.as_ref().ok_or_else(|| {
                    CampaignError::MissingContent(format!(
                        "video {} has no thumbnail",
                        source.asset.file_name
                    ))
                })?;
                let video_id = saga
                    .call("upload_video", self.api.upload_video(session, &source.asset))
                    .await?;
                let thumbnail_hash = saga
                    .call("upload_image", self.api.upload_image(session, thumbnail))
                    .await?;
                Ok(CreativeMedia::Video {
                    video_id,
                    thumbnail_hash,
                })
            }
        }
    }

    /// Country, age, and interest targeting for one ad set. Interest names
    /// that fail to resolve are dropped.
    async fn resolve_targeting(
        &self,
        saga: &Saga<'_>,
        session: &PlatformSession,
        campaign: &Campaign,
        config: &PlatformLaunchConfig,
        content: &GeneratedContent,
    ) -> CampaignResult<Targeting> {
        let special = !config.special_ad_categories.is_empty();
        let ages = if special {
            AgeRange::default()
        } else {
            AgeRange::parse(content.targeting.age_range.as_deref())
        };

        let mut interests = Vec::new();
        for name in normalize_interest_names(&content.targeting.interests) {
            let matches = match saga
                .call("search_interests", self.api.search_interests(session, &name))
                .await
            {
                Ok(matches) => matches,
                Err(e) => {
                    warn!(interest = %name, error = %e, "Interest lookup failed, dropping");
                    continue;
                }
            };
            match best_interest_match(&name, matches) {
                Some(found) => interests.push(found),
                None => debug!(interest = %name, "Interest did not resolve, dropping"),
            }
        }

        saga.note(
            LaunchEventKind::TargetingResolved,
            format!(
                "{} ages {}-{}, {} interests",
                campaign.country,
                ages.min,
                ages.max,
                interests.len()
            ),
        );

        Ok(Targeting {
            countries: vec![campaign.country.clone()],
            age_min: ages.min,
            age_max: ages.max,
            interests,
        })
    }
}

/// Exact (case-insensitive) name match first, otherwise the top result.
fn best_interest_match(name: &str, matches: Vec<InterestMatch>) -> Option<InterestMatch> {
    let exact = matches
        .iter()
        .position(|m| m.name.eq_ignore_ascii_case(name));
    match exact {
        Some(idx) => matches.into_iter().nth(idx),
        None => matches.into_iter().next(),
    }
}

/// Deletes social-graph objects; creatives are removed on their own.
struct SocialGraphCompensator<'a> {
    api: &'a dyn SocialGraphApi,
    session: &'a PlatformSession,
}

#[async_trait]
impl Compensator for SocialGraphCompensator<'_> {
    fn creative_removal(&self) -> CreativeRemoval {
        CreativeRemoval::Independent
    }

    async fn compensate(&self, _kind: ResourceKind, remote_id: &str) -> anyhow::Result<()> {
        self.api.delete_object(self.session, remote_id).await
    }
}

#[async_trait]
impl PlatformLauncher for SocialGraphLauncher {
    fn platform(&self) -> Platform {
        Platform::SocialGraph
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
        let mut saga = Saga::new(Platform::SocialGraph, campaign.id, self.services.audit.as_ref());
        saga.note(LaunchEventKind::LaunchStarted, format!("launching {}", campaign.name));

        let session = match self.open_session(config).await {
            Ok(session) => session,
            Err(e) => return saga.abort(e),
        };
        let compensator = SocialGraphCompensator {
            api: self.api.as_ref(),
            session: &session,
        };

        let outcome = self
            .create_resources(&mut saga, &session, campaign, config, content)
            .await;
        saga.conclude(outcome, &compensator).await
    }

    async fn rollback(&self, config: &PlatformLaunchConfig, ledger: &ResourceLedger) -> RollbackResult {
        let session = match self.open_session(config).await {
            Ok(session) => session,
            Err(e) => return session_unavailable(Platform::SocialGraph, &e, self.services.audit.as_ref()),
        };
        let compensator = SocialGraphCompensator {
            api: self.api.as_ref(),
            session: &session,
        };
        unwind(Platform::SocialGraph, ledger, &compensator, self.services.audit.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interest(id: &str, name: &str) -> InterestMatch {
        InterestMatch {
            id: id.to_string(),
            name: name.to_string(),
            audience_size: None,
        }
    }

    #[test]
    fn test_best_interest_match_prefers_exact() {
        let matches = vec![interest("1", "Running shoes"), interest("2", "Running")];
        assert_eq!(best_interest_match("running", matches).unwrap().id, "2");

        let partial = vec![interest("3", "Trail running")];
        assert_eq!(best_interest_match("running", partial).unwrap().id, "3");

        assert!(best_interest_match("knitting", Vec::new()).is_none());
    }
}
