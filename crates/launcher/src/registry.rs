//! Launcher registry: dispatches by platform and fans a campaign's launch
//! configs out to their launchers.

use std::collections::HashMap;
use std::sync::Arc;

use campaign_core::{
    Campaign, CampaignError, CampaignResult, GeneratedContent, Platform, PlatformLaunchConfig,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::launcher::PlatformLauncher;
use crate::ledger::ResourceLedger;
use crate::result::{LaunchResult, RollbackResult, ValidationReport};

/// Validation and launch outcome for one launch config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformOutcome {
    pub config_id: Uuid,
    pub platform: Platform,
    pub validation: ValidationReport,
    /// `None` when validation failed and nothing was launched.
    pub launch: Option<LaunchResult>,
}

impl PlatformOutcome {
    pub fn succeeded(&self) -> bool {
        self.launch.as_ref().is_some_and(|result| result.success)
    }
}

/// Maps each platform to its launcher.
#[derive(Default, Clone)]
pub struct LauncherRegistry {
    launchers: HashMap<Platform, Arc<dyn PlatformLauncher>>,
}

impl LauncherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a launcher under the platform it reports, replacing any
    /// previous one.
    pub fn register(&mut self, launcher: Arc<dyn PlatformLauncher>) {
        let platform = launcher.platform();
        if self.launchers.insert(platform, launcher).is_some() {
            warn!(platform = %platform, "Replaced existing launcher");
        }
    }

    pub fn with(mut self, launcher: Arc<dyn PlatformLauncher>) -> Self {
        self.register(launcher);
        self
    }

    pub fn get(&self, platform: Platform) -> CampaignResult<Arc<dyn PlatformLauncher>> {
        self.launchers
            .get(&platform)
            .cloned()
            .ok_or_else(|| CampaignError::UnsupportedPlatform(platform.display_name().to_string()))
    }

    /// Validate one config. An unregistered platform is reported as a
    /// validation failure.
    pub async fn validate(&self, campaign: &Campaign, config: &PlatformLaunchConfig) -> ValidationReport {
        match self.get(config.platform) {
            Ok(launcher) => launcher.validate_prerequisites(campaign, config).await,
            Err(e) => ValidationReport::from_errors(vec![e.to_string()]),
        }
    }

    /// Compensate a ledger returned by an earlier launch.
    pub async fn rollback(
        &self,
        config: &PlatformLaunchConfig,
        ledger: &ResourceLedger,
    ) -> CampaignResult<RollbackResult> {
        let launcher = self.get(config.platform)?;
        Ok(launcher.rollback(config, ledger).await)
    }

    /// Validate every config, then launch the valid ones concurrently.
    /// Launches share no mutable state; each owns its ledger.
    pub async fn launch_campaign(
        &self,
        campaign: &Campaign,
        configs: &[PlatformLaunchConfig],
        content: &GeneratedContent,
    ) -> Vec<PlatformOutcome> {
        info!(
            campaign_id = %campaign.id,
            configs = configs.len(),
            "Launching campaign"
        );

        let mut pending = Vec::with_capacity(configs.len());
        for config in configs {
            let validation = self.validate(campaign, config).await;
            if let Err(e) = validation.clone().into_result() {
                warn!(
                    campaign_id = %campaign.id,
                    platform = %config.platform,
                    error = %e,
                    "Launch config failed validation"
                );
                pending.push((config.id, config.platform, validation, None));
                continue;
            }

            // Validation succeeded, so the launcher is registered.
            let handle = match self.get(config.platform) {
                Ok(launcher) => {
                    let campaign = campaign.clone();
                    let config = config.clone();
                    let content = content.clone();
                    Some(tokio::spawn(async move {
                        launcher.launch(&campaign, &config, &content).await
                    }))
                }
                Err(_) => None,
            };
            pending.push((config.id, config.platform, validation, handle));
        }

        let mut outcomes = Vec::with_capacity(pending.len());
        for (config_id, platform, validation, handle) in pending {
            let launch = match handle {
                Some(handle) => Some(match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        let error = CampaignError::Internal(anyhow::anyhow!("launch task failed: {e}"));
                        LaunchResult::failed(platform, &error, RollbackResult::nothing_to_undo())
                    }
                }),
                None => None,
            };
            outcomes.push(PlatformOutcome {
                config_id,
                platform,
                validation,
                launch,
            });
        }

        let launched = outcomes.iter().filter(|o| o.launch.is_some()).count();
        let succeeded = outcomes.iter().filter(|o| o.succeeded()).count();
        info!(
            campaign_id = %campaign.id,
            launched,
            succeeded,
            "Campaign launch finished"
        );
        outcomes
    }
}
