//! Campaign Launch — operator CLI for the platform launch orchestrator.
//!
//! Reads a launch request (campaign, launch configs, media, accounts, and
//! generated content) and runs it against the in-memory sandbox backends.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use campaign_core::config::AppConfig;
use campaign_core::{
    AccountCredentials, Campaign, Clock, GeneratedContent, MediaAsset, Platform, PlatformLaunchConfig,
    SystemClock,
};
use campaign_launcher::audit::{AuditSink, NoopAuditSink, TracingAuditSink};
use campaign_launcher::media::MediaResolver;
use campaign_launcher::memory::{InMemoryAccountResolver, InMemoryMediaRepository, StaticVideoConverter};
use campaign_launcher::platforms::short_video::memory::InMemoryShortVideoApi;
use campaign_launcher::platforms::social_graph::memory::InMemorySocialGraphApi;
use campaign_launcher::platforms::{ShortVideoLauncher, SocialGraphLauncher};
use campaign_launcher::{LaunchServices, LauncherRegistry, ValidationReport};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "campaign-launch")]
#[command(about = "Launch campaigns on advertising platforms with saga rollback")]
#[command(version)]
struct Cli {
    /// Optional TOML config file
    #[arg(long, env = "CAMPAIGN_LAUNCH_CONFIG")]
    config: Option<String>,

    /// Node identifier (overrides config)
    #[arg(long, env = "CAMPAIGN_LAUNCH__NODE_ID")]
    node_id: Option<String>,

    /// Creatives per grouping unit when a launch config sets none (overrides config)
    #[arg(long)]
    creatives_per_set: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run prerequisite checks only; no remote resources are created
    Validate {
        /// Path to the launch request JSON
        #[arg(short, long)]
        request: String,
    },

    /// Validate, then launch every valid config concurrently
    Launch {
        /// Path to the launch request JSON
        #[arg(short, long)]
        request: String,

        /// Fail a sandbox call, as <platform>:<operation>:<nth> (0 = every call)
        #[arg(long = "inject-failure", value_parser = FailureSpec::from_str)]
        inject_failure: Vec<FailureSpec>,
    },
}

/// Everything a launch needs, as one JSON document.
#[derive(Debug, Deserialize)]
struct LaunchRequest {
    campaign: Campaign,
    configs: Vec<PlatformLaunchConfig>,
    #[serde(default)]
    media: Vec<MediaAsset>,
    accounts: Vec<AccountCredentials>,
    #[serde(default)]
    generated: GeneratedContent,
}

impl LaunchRequest {
    fn load(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
        let request: Self = serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;
        if let Some(stray) = request
            .configs
            .iter()
            .find(|config| config.campaign_id != request.campaign.id)
        {
            anyhow::bail!(
                "launch config {} belongs to campaign {}, not {}",
                stray.id,
                stray.campaign_id,
                request.campaign.id
            );
        }
        Ok(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FailureSpec {
    platform: Platform,
    operation: String,
    nth_call: usize,
}

impl FromStr for FailureSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(platform), Some(operation), Some(nth)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(format!("expected <platform>:<operation>:<nth>, got {s:?}"));
        };
        let platform = Platform::from_str(platform).map_err(|e| e.to_string())?;
        let operation = operation.trim();
        if operation.is_empty() {
            return Err("operation name is empty".to_string());
        }
        let nth_call = nth
            .trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid call number {nth:?}: {e}"))?;
        Ok(Self {
            platform,
            operation: operation.to_string(),
            nth_call,
        })
    }
}

#[derive(Debug, Serialize)]
struct ValidationOutput {
    config_id: Uuid,
    platform: Platform,
    validation: ValidationReport,
}

/// Sandbox backends wired into a registry.
struct Sandbox {
    social: Arc<InMemorySocialGraphApi>,
    short: Arc<InMemoryShortVideoApi>,
    registry: LauncherRegistry,
}

impl Sandbox {
    fn new(config: &AppConfig, request: &LaunchRequest) -> Self {
        let accounts = Arc::new(InMemoryAccountResolver::new());
        for credentials in &request.accounts {
            accounts.insert(credentials.clone());
        }
        let media = Arc::new(InMemoryMediaRepository::new());
        for asset in &request.media {
            media.insert(asset.clone());
        }
        let audit: Arc<dyn AuditSink> = if config.audit.enabled {
            Arc::new(TracingAuditSink)
        } else {
            Arc::new(NoopAuditSink)
        };

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let services = LaunchServices {
            accounts,
            media: Arc::new(
                MediaResolver::new(media, clock.clone()).with_converter(Arc::new(StaticVideoConverter::default())),
            ),
            audit,
            clock,
        };

        let social = Arc::new(InMemorySocialGraphApi::new());
        let short = Arc::new(InMemoryShortVideoApi::new());
        let registry = LauncherRegistry::new()
            .with(Arc::new(SocialGraphLauncher::new(
                social.clone(),
                services.clone(),
                &config.launcher,
            )))
            .with(Arc::new(ShortVideoLauncher::new(
                short.clone(),
                services,
                &config.launcher,
            )));

        Self {
            social,
            short,
            registry,
        }
    }

    fn inject(&self, failure: &FailureSpec) {
        warn!(
            platform = %failure.platform,
            operation = %failure.operation,
            nth_call = failure.nth_call,
            "Injecting sandbox failure"
        );
        let faults = match failure.platform {
            Platform::SocialGraph => self.social.faults(),
            Platform::ShortVideo => self.short.faults(),
        };
        faults.fail_on(&failure.operation, failure.nth_call);
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campaign_launch=info,campaign_launcher=info".into()),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(per_set) = cli.creatives_per_set {
        config.launcher.default_creatives_per_set = per_set;
    }

    info!(
        node_id = %config.node_id,
        social_min_budget = config.launcher.social_graph.min_daily_budget,
        short_min_budget = config.launcher.short_video.min_daily_budget,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Validate { request } => {
            let request = LaunchRequest::load(&request)?;
            let sandbox = Sandbox::new(&config, &request);

            let mut reports = Vec::with_capacity(request.configs.len());
            for launch_config in &request.configs {
                reports.push(ValidationOutput {
                    config_id: launch_config.id,
                    platform: launch_config.platform,
                    validation: sandbox.registry.validate(&request.campaign, launch_config).await,
                });
            }
            print_json(&reports)?;

            if reports.iter().any(|r| !r.validation.valid) {
                std::process::exit(2);
            }
        }
        Commands::Launch {
            request,
            inject_failure,
        } => {
            let request = LaunchRequest::load(&request)?;
            let sandbox = Sandbox::new(&config, &request);
            for failure in &inject_failure {
                sandbox.inject(failure);
            }

            let outcomes = sandbox
                .registry
                .launch_campaign(&request.campaign, &request.configs, &request.generated)
                .await;
            print_json(&outcomes)?;

            info!(
                social_graph_entities = sandbox.social.store().log().len(),
                short_video_entities = sandbox.short.store().log().len(),
                "Sandbox activity"
            );
            if !outcomes.iter().all(|o| o.succeeded()) {
                std::process::exit(2);
            }
        }
    }

    Ok(())
}
