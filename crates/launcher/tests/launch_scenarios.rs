//! End-to-end launch scenarios against the in-memory platform backends.

use std::sync::Arc;

use campaign_core::config::LauncherConfig;
use campaign_core::{
    AccountCredentials, AdCopy, BudgetMode, Campaign, FixedClock, GeneratedContent, IdentityRef,
    IdentityType, MediaAsset, MediaType, Platform, PlatformLaunchConfig, SpecialAdCategory,
    TargetingSuggestions,
};
use campaign_launcher::media::MediaResolver;
use campaign_launcher::memory::{InMemoryAccountResolver, InMemoryMediaRepository, StaticVideoConverter};
use campaign_launcher::platforms::short_video::api::AdGroupSpec;
use campaign_launcher::platforms::short_video::memory::InMemoryShortVideoApi;
use campaign_launcher::platforms::social_graph::memory::InMemorySocialGraphApi;
use campaign_launcher::platforms::{ShortVideoLauncher, SocialGraphLauncher};
use campaign_launcher::{
    AuditSink, InMemoryAuditSink, LaunchEvent, LaunchEventKind, LaunchServices, LauncherRegistry,
    ResourceKind,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

struct Harness {
    social: Arc<InMemorySocialGraphApi>,
    short: Arc<InMemoryShortVideoApi>,
    media: Arc<InMemoryMediaRepository>,
    converter: Arc<StaticVideoConverter>,
    audit: Arc<InMemoryAuditSink>,
    registry: LauncherRegistry,
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap()
}

/// Sink that refuses every event.
struct RejectingAuditSink;

impl AuditSink for RejectingAuditSink {
    fn record(&self, _event: &LaunchEvent) -> anyhow::Result<()> {
        anyhow::bail!("audit store unavailable")
    }
}

fn harness() -> Harness {
    harness_with_sink(None)
}

/// Launchers record into `sink` when given, else into the harness's
/// in-memory sink.
fn harness_with_sink(sink: Option<Arc<dyn AuditSink>>) -> Harness {
    let social = Arc::new(InMemorySocialGraphApi::new());
    let short = Arc::new(InMemoryShortVideoApi::new());
    let accounts = Arc::new(InMemoryAccountResolver::new());
    let media = Arc::new(InMemoryMediaRepository::new());
    let converter = Arc::new(StaticVideoConverter::default());
    let audit = Arc::new(InMemoryAuditSink::new());

    accounts.insert(AccountCredentials {
        account_id: "acc-sg".to_string(),
        platform: Platform::SocialGraph,
        platform_account_id: "act_100".to_string(),
        access_token: Some("sg-token".to_string()),
        pixel_id: Some("px-sg".to_string()),
        page_id: Some("page-1".to_string()),
    });
    accounts.insert(AccountCredentials {
        account_id: "acc-sv".to_string(),
        platform: Platform::ShortVideo,
        platform_account_id: "adv_200".to_string(),
        access_token: Some("sv-token".to_string()),
        pixel_id: Some("px-sv".to_string()),
        page_id: None,
    });

    let clock = Arc::new(FixedClock(now()));
    let services = LaunchServices {
        accounts,
        media: Arc::new(MediaResolver::new(media.clone(), clock.clone()).with_converter(converter.clone())),
        audit: sink.unwrap_or_else(|| audit.clone() as Arc<dyn AuditSink>),
        clock,
    };
    let config = LauncherConfig::default();
    let registry = LauncherRegistry::new()
        .with(Arc::new(SocialGraphLauncher::new(social.clone(), services.clone(), &config)))
        .with(Arc::new(ShortVideoLauncher::new(short.clone(), services, &config)));

    Harness {
        social,
        short,
        media,
        converter,
        audit,
        registry,
    }
}

fn campaign(budget_mode: BudgetMode) -> Campaign {
    Campaign {
        id: Uuid::new_v4(),
        name: "Spring Sale".to_string(),
        budget_mode,
        country: "US".to_string(),
        language: "en".to_string(),
        destination_url: Some("https://shop.example.com/spring".to_string()),
    }
}

fn launch_config(campaign: &Campaign, platform: Platform, daily_budget: f64) -> PlatformLaunchConfig {
    let (account_id, identity) = match platform {
        Platform::SocialGraph => ("acc-sg", None),
        Platform::ShortVideo => (
            "acc-sv",
            Some(IdentityRef {
                id: "ident-7".to_string(),
                identity_type: IdentityType::CustomizedUser,
            }),
        ),
    };
    PlatformLaunchConfig {
        id: Uuid::new_v4(),
        campaign_id: campaign.id,
        platform,
        account_id: account_id.to_string(),
        daily_budget,
        start_at: None,
        generate_with_ai: false,
        manual_copy: Some(AdCopy {
            headline: "Spring Sale".to_string(),
            primary_text: "Up to 40% off running gear this week only.".to_string(),
            description: Some("Free shipping".to_string()),
        }),
        creatives_per_set: None,
        special_ad_categories: Vec::new(),
        identity,
    }
}

fn add_media(h: &Harness, campaign: &Campaign, media_type: MediaType, count: usize) -> Vec<MediaAsset> {
    let (ext, mime) = match media_type {
        MediaType::Image => ("jpg", "image/jpeg"),
        MediaType::Video => ("mp4", "video/mp4"),
    };
    (0..count)
        .map(|i| {
            let asset = MediaAsset {
                id: Uuid::new_v4(),
                campaign_id: campaign.id,
                media_type,
                file_name: format!("asset_{i:02}.{ext}"),
                url: format!("https://cdn.example.com/asset_{i:02}.{ext}"),
                mime_type: mime.to_string(),
                size_bytes: 250_000,
                thumbnail_id: None,
                created_at: now() - Duration::minutes(100 - i as i64),
            };
            h.media.insert(asset.clone());
            asset
        })
        .collect()
}

fn content() -> GeneratedContent {
    GeneratedContent::default()
}

#[tokio::test]
async fn test_social_campaign_level_three_images() {
    let h = harness();
    let c = campaign(BudgetMode::CampaignLevel);
    add_media(&h, &c, MediaType::Image, 3);
    let config = launch_config(&c, Platform::SocialGraph, 50.0);

    let outcomes = h.registry.launch_campaign(&c, &[config], &content()).await;
    let result = outcomes[0].launch.as_ref().unwrap();

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.grouping_unit_count(), 1);
    assert_eq!(result.ad_count(), 3);
    assert_eq!(result.additional_ids.ad_ids.len(), 2);
    assert_eq!(result.additional_ids.creative_ids.len(), 2);

    let store = h.social.store();
    let campaigns = store.live("campaign");
    assert_eq!(campaigns.len(), 1);
    assert_eq!(campaigns[0].name, "Spring Sale - 2026-06-01");
    assert_eq!(campaigns[0].payload["daily_budget"], 5000);
    assert_eq!(store.live("adset")[0].payload["daily_budget"], serde_json::Value::Null);

    let mut ad_names: Vec<String> = store.live("ad").into_iter().map(|ad| ad.name).collect();
    ad_names.sort();
    assert_eq!(ad_names, ["2026-06-01_1", "2026-06-01_2", "2026-06-01_3"]);
    assert!(store
        .live("ad")
        .iter()
        .all(|ad| ad.payload["status"] == "PAUSED"));
    assert_eq!(h.audit.count(&LaunchEventKind::LaunchSucceeded), 1);
}

#[tokio::test]
async fn test_social_set_level_fan_out_sizes() {
    let h = harness();
    let c = campaign(BudgetMode::SetLevel);
    add_media(&h, &c, MediaType::Image, 10);
    let mut config = launch_config(&c, Platform::SocialGraph, 50.0);
    config.creatives_per_set = Some(3);

    let outcomes = h.registry.launch_campaign(&c, &[config], &content()).await;
    let result = outcomes[0].launch.as_ref().unwrap();

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.grouping_unit_count(), 4);
    assert_eq!(result.ad_count(), 10);

    let store = h.social.store();
    let ads = store.live("ad");
    let sizes: Vec<usize> = store
        .live("adset")
        .iter()
        .map(|set| {
            assert_eq!(set.payload["daily_budget"], 5000);
            ads.iter()
                .filter(|ad| ad.parent_id.as_deref() == Some(set.id.as_str()))
                .count()
        })
        .collect();
    assert_eq!(sizes, [3, 3, 3, 1]);
    assert_eq!(store.live("campaign")[0].payload["daily_budget"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_short_video_converts_lone_image() {
    let h = harness();
    let c = campaign(BudgetMode::CampaignLevel);
    let images = add_media(&h, &c, MediaType::Image, 1);
    let config = launch_config(&c, Platform::ShortVideo, 60.0);

    let outcomes = h.registry.launch_campaign(&c, &[config], &content()).await;
    assert!(outcomes[0].validation.valid, "{:?}", outcomes[0].validation.errors);
    let result = outcomes[0].launch.as_ref().unwrap();

    assert!(result.success, "{:?}", result.error);
    assert_eq!(h.converter.calls(), 1);
    assert_eq!(result.ad_count(), 1);
    assert!(result.creative_id.is_none());
    let converted_id = result.converted_media_id.unwrap();
    assert_eq!(h.media.len(), 2);

    let store = h.short.store();
    let videos = store.by_kind("video");
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].name, "asset_00_video.mp4");
    let ads = store.live("ad");
    assert_eq!(ads.len(), 1);
    assert_eq!(ads[0].payload["video_id"], videos[0].id.as_str());
    assert_eq!(ads[0].payload["image_ids"].as_array().unwrap().len(), 1);
    assert_ne!(converted_id, images[0].id);
    assert_eq!(h.audit.count(&LaunchEventKind::MediaConverted), 1);
}

#[tokio::test]
async fn test_short_video_without_media_never_launches() {
    let h = harness();
    let c = campaign(BudgetMode::CampaignLevel);
    let config = launch_config(&c, Platform::ShortVideo, 60.0);

    let outcomes = h.registry.launch_campaign(&c, &[config], &content()).await;

    assert!(!outcomes[0].validation.valid);
    assert!(outcomes[0].launch.is_none());
    assert!(h.short.store().log().is_empty());
    assert_eq!(h.converter.calls(), 0);
}

#[tokio::test]
async fn test_social_failure_on_second_set_rolls_back_everything() {
    let h = harness();
    let c = campaign(BudgetMode::SetLevel);
    add_media(&h, &c, MediaType::Image, 3);
    let config = launch_config(&c, Platform::SocialGraph, 50.0);
    h.social.faults().fail_on("create_ad", 2);

    let outcomes = h.registry.launch_campaign(&c, &[config], &content()).await;
    let result = outcomes[0].launch.as_ref().unwrap();

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("create_ad"));
    let rollback = result.rollback.as_ref().unwrap();
    assert!(rollback.success, "{:?}", rollback.errors);
    assert_eq!(rollback.compensated(ResourceKind::Campaign).len(), 1);
    assert_eq!(rollback.compensated(ResourceKind::GroupingUnit).len(), 2);
    assert_eq!(rollback.compensated(ResourceKind::Creative).len(), 2);
    assert_eq!(rollback.compensated(ResourceKind::Ad).len(), 1);

    // Every entity created during the attempt was compensated.
    let store = h.social.store();
    for (kind, store_kind) in [
        (ResourceKind::Campaign, "campaign"),
        (ResourceKind::GroupingUnit, "adset"),
        (ResourceKind::Creative, "creative"),
        (ResourceKind::Ad, "ad"),
    ] {
        for entity in store.by_kind(store_kind) {
            assert!(
                rollback.compensated.contains(kind, &entity.id),
                "{} {} left behind",
                kind,
                entity.id
            );
        }
        assert!(store.live(store_kind).is_empty());
    }
    assert_eq!(h.audit.count(&LaunchEventKind::LaunchFailed), 1);
}

#[tokio::test]
async fn test_short_video_budget_below_minimum() {
    let h = harness();
    let c = campaign(BudgetMode::CampaignLevel);
    add_media(&h, &c, MediaType::Video, 1);
    let config = launch_config(&c, Platform::ShortVideo, 20.0);

    let outcomes = h.registry.launch_campaign(&c, &[config], &content()).await;

    let validation = &outcomes[0].validation;
    assert!(!validation.valid);
    assert_eq!(validation.errors.len(), 1);
    assert!(validation.errors[0].contains("minimum of 50.00"));
    assert!(outcomes[0].launch.is_none());
    assert!(h.short.store().log().is_empty());
}

#[tokio::test]
async fn test_partial_rollback_reports_errors_and_continues() {
    let h = harness();
    let c = campaign(BudgetMode::SetLevel);
    add_media(&h, &c, MediaType::Video, 2);
    let config = launch_config(&c, Platform::ShortVideo, 60.0);
    h.short.faults().fail_on("create_ad", 2);
    // Second disable call hits the newest ad group.
    h.short.faults().fail_on("update_status", 2);

    let outcomes = h.registry.launch_campaign(&c, &[config], &content()).await;
    let result = outcomes[0].launch.as_ref().unwrap();
    let rollback = result.rollback.as_ref().unwrap();

    assert!(!result.success);
    assert!(!rollback.success);
    assert_eq!(rollback.errors.len(), 1);
    assert_eq!(rollback.compensated(ResourceKind::Ad).len(), 1);
    assert_eq!(rollback.compensated(ResourceKind::GroupingUnit).len(), 1);
    assert_eq!(rollback.compensated(ResourceKind::Campaign).len(), 1);
    assert_eq!(h.short.store().live("adgroup").len(), 1);
    assert_eq!(h.short.store().live("campaign").len(), 0);
}

#[tokio::test]
async fn test_validation_collects_every_problem() {
    let h = harness();
    let mut c = campaign(BudgetMode::CampaignLevel);
    c.destination_url = Some("ftp://shop.example.com".to_string());
    let mut config = launch_config(&c, Platform::SocialGraph, 1.0);
    config.account_id = "acc-missing".to_string();

    let report = h.registry.validate(&c, &config).await;

    assert!(!report.valid);
    assert_eq!(report.errors.len(), 4, "{:?}", report.errors);
    assert!(report.errors.iter().any(|e| e.contains("could not be resolved")));
    assert!(report.errors.iter().any(|e| e.contains("minimum of 5.00")));
    assert!(report.errors.iter().any(|e| e.contains("no usable images or videos")));
    assert!(report.errors.iter().any(|e| e.contains("not a valid http(s) URL")));
    assert!(h.social.store().log().is_empty());
    assert_eq!(h.social.faults().calls("search_interests"), 0);
}

#[tokio::test]
async fn test_special_category_forces_broad_targeting() {
    let h = harness();
    let c = campaign(BudgetMode::CampaignLevel);
    add_media(&h, &c, MediaType::Image, 1);
    let mut config = launch_config(&c, Platform::SocialGraph, 25.0);
    config.special_ad_categories = vec![SpecialAdCategory::Housing];
    config.generate_with_ai = true;
    let generated = GeneratedContent {
        ad_copy: Some(AdCopy {
            headline: "New homes".to_string(),
            primary_text: "Find your next place.".to_string(),
            description: None,
        }),
        targeting: TargetingSuggestions {
            interests: vec!["running".to_string(), "Knitting".to_string()],
            age_range: Some("30-40".to_string()),
        },
    };

    let outcomes = h.registry.launch_campaign(&c, &[config], &generated).await;
    assert!(outcomes[0].succeeded());

    let store = h.social.store();
    let campaign_payload = &store.live("campaign")[0].payload;
    assert_eq!(campaign_payload["special_ad_categories"][0], "HOUSING");
    assert_eq!(campaign_payload["special_ad_category_country"][0], "US");

    let targeting = &store.live("adset")[0].payload["targeting"];
    assert_eq!(targeting["age_min"], 18);
    assert_eq!(targeting["age_max"], 65);
    let interests = targeting["interests"].as_array().unwrap();
    assert_eq!(interests.len(), 1);
    assert_eq!(interests[0]["name"], "Running");

    let creative = &store.live("creative")[0].payload;
    assert_eq!(creative["headline"], "New homes");
    assert_eq!(creative["call_to_action"], "LEARN_MORE");
}

#[tokio::test]
async fn test_short_video_start_is_clamped_into_the_future() {
    let h = harness();
    let c = campaign(BudgetMode::CampaignLevel);
    add_media(&h, &c, MediaType::Video, 1);
    let mut config = launch_config(&c, Platform::ShortVideo, 75.0);
    config.start_at = Some(now() + Duration::minutes(5));

    let outcomes = h.registry.launch_campaign(&c, &[config], &content()).await;
    assert!(outcomes[0].succeeded());

    let group = &h.short.store().live("adgroup")[0];
    let spec: AdGroupSpec = serde_json::from_value(group.payload.clone()).unwrap();
    assert_eq!(spec.schedule_start_time, now() + Duration::minutes(15));
    assert_eq!(spec.age_groups.len(), 5);
    assert_eq!(spec.location_ids, ["loc_US"]);
    assert_eq!(spec.pixel_id, "px-sv");
}

#[tokio::test]
async fn test_missing_copy_fails_before_any_creation() {
    let h = harness();
    let c = campaign(BudgetMode::CampaignLevel);
    add_media(&h, &c, MediaType::Image, 2);
    let mut config = launch_config(&c, Platform::SocialGraph, 50.0);
    config.manual_copy = None;

    let outcomes = h.registry.launch_campaign(&c, &[config], &content()).await;
    let result = outcomes[0].launch.as_ref().unwrap();

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("ad copy"));
    assert!(result.rollback.as_ref().unwrap().compensated.is_empty());
    assert!(h.social.store().log().is_empty());
}

#[tokio::test]
async fn test_both_platforms_launch_independently() {
    let h = harness();
    let c = campaign(BudgetMode::CampaignLevel);
    add_media(&h, &c, MediaType::Image, 2);
    add_media(&h, &c, MediaType::Video, 1);
    let social = launch_config(&c, Platform::SocialGraph, 50.0);
    let short = launch_config(&c, Platform::ShortVideo, 50.0);
    h.short.faults().fail_always("create_ad");

    let outcomes = h.registry.launch_campaign(&c, &[social, short], &content()).await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].platform, Platform::SocialGraph);
    assert!(outcomes[0].succeeded());
    assert!(!outcomes[1].succeeded());
    // The short-video rollback leaves the social-graph launch untouched.
    assert_eq!(h.social.store().live("ad").len(), 1);
    assert!(h.short.store().live("campaign").is_empty());
}

#[tokio::test]
async fn test_independent_rollback_of_successful_launch() {
    let h = harness();
    let c = campaign(BudgetMode::SetLevel);
    add_media(&h, &c, MediaType::Image, 2);
    let config = launch_config(&c, Platform::SocialGraph, 50.0);

    let outcomes = h.registry.launch_campaign(&c, &[config.clone()], &content()).await;
    let result = outcomes[0].launch.as_ref().unwrap();
    assert!(result.success);

    let rollback = h.registry.rollback(&config, &result.ledger()).await.unwrap();
    assert!(rollback.success);
    assert_eq!(rollback.compensated.len(), result.ledger().len());
    assert!(h.social.store().live("ad").is_empty());
    assert!(h.social.store().live("campaign").is_empty());
}

#[tokio::test]
async fn test_interest_lookup_failure_drops_interests() {
    let h = harness();
    let c = campaign(BudgetMode::CampaignLevel);
    add_media(&h, &c, MediaType::Image, 1);
    add_media(&h, &c, MediaType::Video, 1);
    let mut social = launch_config(&c, Platform::SocialGraph, 50.0);
    social.generate_with_ai = true;
    let mut short = launch_config(&c, Platform::ShortVideo, 60.0);
    short.generate_with_ai = true;
    let generated = GeneratedContent {
        ad_copy: None,
        targeting: TargetingSuggestions {
            interests: vec!["Running".to_string()],
            age_range: None,
        },
    };
    h.social.faults().fail_always("search_interests");
    h.short.faults().fail_always("search_interest_categories");

    let outcomes = h.registry.launch_campaign(&c, &[social, short], &generated).await;

    for outcome in &outcomes {
        let result = outcome.launch.as_ref().unwrap();
        assert!(result.success, "{}: {:?}", outcome.platform, result.error);
    }
    assert_eq!(h.social.faults().calls("search_interests"), 1);
    let targeting = &h.social.store().live("adset")[0].payload["targeting"];
    assert!(targeting["interests"].as_array().unwrap().is_empty());

    assert_eq!(h.short.faults().calls("search_interest_categories"), 1);
    let group = &h.short.store().live("adgroup")[0];
    let spec: AdGroupSpec = serde_json::from_value(group.payload.clone()).unwrap();
    assert!(spec.interest_category_ids.is_empty());
    assert_eq!(spec.location_ids, ["loc_US"]);
}

#[tokio::test]
async fn test_short_video_targeting_resolved_per_ad_group() {
    let h = harness();
    let c = campaign(BudgetMode::SetLevel);
    add_media(&h, &c, MediaType::Video, 3);
    let mut config = launch_config(&c, Platform::ShortVideo, 60.0);
    config.creatives_per_set = Some(1);
    config.generate_with_ai = true;
    let generated = GeneratedContent {
        ad_copy: None,
        targeting: TargetingSuggestions {
            interests: vec!["Running".to_string()],
            age_range: Some("25-34".to_string()),
        },
    };

    let outcomes = h.registry.launch_campaign(&c, &[config], &generated).await;
    let result = outcomes[0].launch.as_ref().unwrap();

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.grouping_unit_count(), 3);
    assert_eq!(h.short.faults().calls("search_locations"), 3);
    assert_eq!(h.short.faults().calls("search_interest_categories"), 3);
    for group in h.short.store().live("adgroup") {
        let spec: AdGroupSpec = serde_json::from_value(group.payload).unwrap();
        assert_eq!(spec.interest_category_ids, ["25102"]);
    }
    assert_eq!(h.audit.count(&LaunchEventKind::TargetingResolved), 3);
}

#[tokio::test]
async fn test_short_video_targeting_follows_campaign_creation() {
    let h = harness();
    let c = campaign(BudgetMode::CampaignLevel);
    add_media(&h, &c, MediaType::Video, 1);
    let config = launch_config(&c, Platform::ShortVideo, 60.0);
    h.short.faults().fail_always("search_locations");

    let outcomes = h.registry.launch_campaign(&c, &[config], &content()).await;
    let result = outcomes[0].launch.as_ref().unwrap();

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("search_locations"));
    let rollback = result.rollback.as_ref().unwrap();
    assert_eq!(rollback.compensated(ResourceKind::Campaign).len(), 1);
    assert!(h.short.store().live("campaign").is_empty());
    assert!(h.short.store().by_kind("adgroup").is_empty());
}

#[tokio::test]
async fn test_short_video_conversion_failure_creates_nothing() {
    let h = harness();
    let c = campaign(BudgetMode::CampaignLevel);
    add_media(&h, &c, MediaType::Image, 1);
    let config = launch_config(&c, Platform::ShortVideo, 60.0);
    h.converter.fail_conversions(true);

    let outcomes = h.registry.launch_campaign(&c, &[config], &content()).await;
    assert!(outcomes[0].validation.valid, "{:?}", outcomes[0].validation.errors);
    let result = outcomes[0].launch.as_ref().unwrap();

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("conversion"));
    assert!(result.converted_media_id.is_none());
    let rollback = result.rollback.as_ref().unwrap();
    assert!(rollback.success);
    assert!(rollback.compensated.is_empty());
    assert!(h.short.store().log().is_empty());
    assert_eq!(h.media.len(), 1);
}

#[tokio::test]
async fn test_rejecting_audit_sink_does_not_abort_launch() {
    let h = harness_with_sink(Some(Arc::new(RejectingAuditSink)));
    let c = campaign(BudgetMode::SetLevel);
    add_media(&h, &c, MediaType::Image, 2);
    let config = launch_config(&c, Platform::SocialGraph, 50.0);

    let outcomes = h.registry.launch_campaign(&c, &[config], &content()).await;
    let result = outcomes[0].launch.as_ref().unwrap();

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.ad_count(), 2);
    assert_eq!(h.social.store().live("ad").len(), 2);
    assert!(h.audit.events().is_empty());
}
