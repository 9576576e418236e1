//! Saga step-runner.
//!
//! Every creating call goes through [`Saga::create`], which records the new
//! remote ID in the ledger before the caller can issue the next dependent
//! call. Compensation is derived mechanically from the ledger by [`unwind`]:
//! ads, creatives, grouping units, campaign, newest first within each kind.

use std::future::Future;

use async_trait::async_trait;
use campaign_core::{CampaignError, CampaignResult, Platform};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::audit::{emit, AuditSink, LaunchEvent, LaunchEventKind};
use crate::ledger::{ResourceKind, ResourceLedger};
use crate::result::{LaunchResult, RollbackResult};

/// How a platform gets rid of creatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreativeRemoval {
    /// Creatives are deleted through their own call.
    Independent,
    /// Creatives disappear with their ad; they are only recorded.
    WithAd,
}

/// Undo operations for one platform account.
#[async_trait]
pub trait Compensator: Send + Sync {
    fn creative_removal(&self) -> CreativeRemoval;

    /// Disable or delete one remote entity.
    async fn compensate(&self, kind: ResourceKind, remote_id: &str) -> anyhow::Result<()>;
}

/// Sweep the whole ledger in reverse dependency order. Individual failures
/// are collected, never short-circuit the sweep.
pub async fn unwind(
    platform: Platform,
    ledger: &ResourceLedger,
    compensator: &dyn Compensator,
    audit: &dyn AuditSink,
) -> RollbackResult {
    if ledger.is_empty() {
        debug!(platform = %platform, "Nothing to roll back");
        return RollbackResult::nothing_to_undo();
    }

    info!(platform = %platform, entities = ledger.len(), "Rolling back launch");
    metrics::counter!("launcher.rollbacks", "platform" => platform.slug()).increment(1);

    let mut compensated = ResourceLedger::new();
    let mut errors = Vec::new();

    for (kind, remote_id) in ledger.rollback_sequence() {
        if kind == ResourceKind::Creative && compensator.creative_removal() == CreativeRemoval::WithAd {
            compensated.record(kind, remote_id);
            continue;
        }

        match compensator.compensate(kind, remote_id).await {
            Ok(()) => {
                debug!(platform = %platform, kind = %kind, remote_id, "Compensated");
                compensated.record(kind, remote_id);
                emit(
                    audit,
                    LaunchEvent::new(platform, LaunchEventKind::ResourceCompensated, "compensated")
                        .with_resource(kind, remote_id),
                );
            }
            Err(e) => {
                warn!(
                    platform = %platform,
                    kind = %kind,
                    remote_id,
                    error = %e,
                    "Compensation failed, continuing sweep"
                );
                metrics::counter!("launcher.compensation_errors", "platform" => platform.slug())
                    .increment(1);
                errors.push(format!("{kind} {remote_id}: {e:#}"));
                emit(
                    audit,
                    LaunchEvent::new(platform, LaunchEventKind::CompensationFailed, e.to_string())
                        .with_resource(kind, remote_id),
                );
            }
        }
    }

    let result = RollbackResult::new(compensated, errors);
    emit(
        audit,
        LaunchEvent::new(
            platform,
            LaunchEventKind::RollbackFinished,
            format!(
                "rollback finished: {} compensated, {} errors",
                result.compensated.len(),
                result.errors.len()
            ),
        ),
    );
    result
}

/// Rollback that could not start because no session could be opened for
/// the account. Nothing is compensated; the ledger stays with the caller.
pub fn session_unavailable(platform: Platform, error: &CampaignError, audit: &dyn AuditSink) -> RollbackResult {
    warn!(platform = %platform, error = %error, "Cannot open session for rollback");
    metrics::counter!("launcher.compensation_errors", "platform" => platform.slug()).increment(1);
    emit(
        audit,
        LaunchEvent::new(platform, LaunchEventKind::CompensationFailed, error.to_string()),
    );
    RollbackResult::new(
        ResourceLedger::new(),
        vec![format!("cannot open {} session for rollback: {error}", platform.display_name())],
    )
}

/// One launch attempt's creation sequence.
pub struct Saga<'a> {
    platform: Platform,
    campaign_id: Uuid,
    ledger: ResourceLedger,
    audit: &'a dyn AuditSink,
}

impl<'a> Saga<'a> {
    pub fn new(platform: Platform, campaign_id: Uuid, audit: &'a dyn AuditSink) -> Self {
        Self {
            platform,
            campaign_id,
            ledger: ResourceLedger::new(),
            audit,
        }
    }

    /// Run a creating call and record its ID.
    pub async fn create<F>(&mut self, kind: ResourceKind, step: &str, call: F) -> CampaignResult<String>
    where
        F: Future<Output = anyhow::Result<String>>,
    {
        match call.await {
            Ok(remote_id) => {
                self.ledger.record(kind, remote_id.clone());
                info!(
                    platform = %self.platform,
                    campaign_id = %self.campaign_id,
                    kind = %kind,
                    remote_id = %remote_id,
                    step,
                    "Remote resource created"
                );
                emit(
                    self.audit,
                    LaunchEvent::new(self.platform, LaunchEventKind::ResourceCreated, step)
                        .for_campaign(self.campaign_id)
                        .with_resource(kind, remote_id.clone()),
                );
                Ok(remote_id)
            }
            Err(e) => {
                warn!(
                    platform = %self.platform,
                    campaign_id = %self.campaign_id,
                    step,
                    error = %e,
                    "Creating call failed"
                );
                Err(CampaignError::remote(step, &e))
            }
        }
    }

    /// Run a call that creates nothing compensable (targeting lookups,
    /// media uploads).
    pub async fn call<T, F>(&self, step: &str, call: F) -> CampaignResult<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        call.await.map_err(|e| {
            warn!(platform = %self.platform, step, error = %e, "Remote call failed");
            CampaignError::remote(step, &e)
        })
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// Emit an informational event for this launch.
    pub fn note(&self, kind: LaunchEventKind, message: impl Into<String>) {
        emit(
            self.audit,
            LaunchEvent::new(self.platform, kind, message).for_campaign(self.campaign_id),
        );
    }

    /// Turn the creation outcome into a [`LaunchResult`], rolling back the
    /// ledger on failure.
    pub async fn conclude(
        self,
        outcome: CampaignResult<()>,
        compensator: &dyn Compensator,
    ) -> LaunchResult {
        match outcome {
            Ok(()) => {
                metrics::counter!("launcher.launches", "platform" => self.platform.slug())
                    .increment(1);
                emit(
                    self.audit,
                    LaunchEvent::new(
                        self.platform,
                        LaunchEventKind::LaunchSucceeded,
                        format!("{} remote entities created", self.ledger.len()),
                    )
                    .for_campaign(self.campaign_id),
                );
                LaunchResult::succeeded(self.platform, &self.ledger)
            }
            Err(e) => {
                self.report_failure(&e);
                let rollback = unwind(self.platform, &self.ledger, compensator, self.audit).await;
                LaunchResult::failed(self.platform, &e, rollback)
            }
        }
    }

    /// Fail before any creating call was issued, e.g. when credentials
    /// cannot be opened. There is nothing to compensate.
    pub fn abort(self, error: CampaignError) -> LaunchResult {
        debug_assert!(self.ledger.is_empty(), "abort called after resources were created");
        self.report_failure(&error);
        LaunchResult::failed(self.platform, &error, RollbackResult::nothing_to_undo())
    }

    fn report_failure(&self, e: &CampaignError) {
        error!(
            platform = %self.platform,
            campaign_id = %self.campaign_id,
            created = self.ledger.len(),
            error = %e,
            "Launch failed"
        );
        metrics::counter!("launcher.launch_failures", "platform" => self.platform.slug())
            .increment(1);
        emit(
            self.audit,
            LaunchEvent::new(self.platform, LaunchEventKind::LaunchFailed, e.to_string())
                .for_campaign(self.campaign_id),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::InMemoryAuditSink;
    use parking_lot::Mutex;

    struct ScriptedCompensator {
        removal: CreativeRemoval,
        fail_ids: Vec<&'static str>,
        calls: Mutex<Vec<(ResourceKind, String)>>,
    }

    impl ScriptedCompensator {
        fn new(removal: CreativeRemoval, fail_ids: Vec<&'static str>) -> Self {
            Self {
                removal,
                fail_ids,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Compensator for ScriptedCompensator {
        fn creative_removal(&self) -> CreativeRemoval {
            self.removal
        }

        async fn compensate(&self, kind: ResourceKind, remote_id: &str) -> anyhow::Result<()> {
            self.calls.lock().push((kind, remote_id.to_string()));
            if self.fail_ids.contains(&remote_id) {
                anyhow::bail!("entity locked");
            }
            Ok(())
        }
    }

    fn sample_ledger() -> ResourceLedger {
        let mut ledger = ResourceLedger::new();
        ledger.record(ResourceKind::Campaign, "c-1");
        ledger.record(ResourceKind::GroupingUnit, "g-1");
        ledger.record(ResourceKind::Creative, "cr-1");
        ledger.record(ResourceKind::Ad, "a-1");
        ledger
    }

    #[tokio::test]
    async fn test_unwind_continues_past_failures() {
        let compensator = ScriptedCompensator::new(CreativeRemoval::Independent, vec!["g-1"]);
        let audit = InMemoryAuditSink::new();

        let result = unwind(Platform::SocialGraph, &sample_ledger(), &compensator, &audit).await;

        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("g-1"));
        // The campaign is still compensated after the grouping unit failed.
        assert_eq!(result.compensated(ResourceKind::Campaign), ["c-1".to_string()]);
        let calls = compensator.calls.lock();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0].0, ResourceKind::Ad);
        assert_eq!(calls[3].0, ResourceKind::Campaign);
    }

    #[tokio::test]
    async fn test_unwind_records_implicit_creatives() {
        let compensator = ScriptedCompensator::new(CreativeRemoval::WithAd, vec![]);
        let audit = InMemoryAuditSink::new();

        let result = unwind(Platform::ShortVideo, &sample_ledger(), &compensator, &audit).await;

        assert!(result.success);
        assert_eq!(result.compensated(ResourceKind::Creative), ["cr-1".to_string()]);
        assert!(compensator
            .calls
            .lock()
            .iter()
            .all(|(kind, _)| *kind != ResourceKind::Creative));
    }

    #[tokio::test]
    async fn test_unwind_empty_ledger_is_noop() {
        let compensator = ScriptedCompensator::new(CreativeRemoval::Independent, vec![]);
        let audit = InMemoryAuditSink::new();
        let result = unwind(Platform::ShortVideo, &ResourceLedger::new(), &compensator, &audit).await;
        assert!(result.success);
        assert!(result.compensated.is_empty());
        assert!(compensator.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_failed_step_rolls_back_recorded_ids() {
        let compensator = ScriptedCompensator::new(CreativeRemoval::Independent, vec![]);
        let audit = InMemoryAuditSink::new();
        let mut saga = Saga::new(Platform::SocialGraph, Uuid::new_v4(), &audit);

        let outcome = async {
            saga.create(ResourceKind::Campaign, "create_campaign", async {
                Ok("c-9".to_string())
            })
            .await?;
            saga.create(ResourceKind::GroupingUnit, "create_ad_set", async {
                Err(anyhow::anyhow!("invalid targeting"))
            })
            .await?;
            Ok::<(), CampaignError>(())
        }
        .await;

        let result = saga.conclude(outcome, &compensator).await;
        assert!(!result.success);
        assert!(result.error.as_deref().unwrap().contains("create_ad_set"));
        let rollback = result.rollback.unwrap();
        assert_eq!(rollback.compensated(ResourceKind::Campaign), ["c-9".to_string()]);
        assert_eq!(audit.count(&LaunchEventKind::LaunchFailed), 1);
    }
}
