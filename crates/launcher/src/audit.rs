//! Step-level audit events emitted while launching and rolling back.
//!
//! The sink is never on the critical path: a failing sink is logged and
//! otherwise ignored.

use campaign_core::Platform;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::ledger::ResourceKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchEventKind {
    LaunchStarted,
    MediaConverted,
    ResourceCreated,
    TargetingResolved,
    LaunchSucceeded,
    LaunchFailed,
    ResourceCompensated,
    CompensationFailed,
    RollbackFinished,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchEvent {
    pub id: Uuid,
    pub platform: Platform,
    pub campaign_id: Option<Uuid>,
    pub kind: LaunchEventKind,
    pub resource_kind: Option<ResourceKind>,
    pub remote_id: Option<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl LaunchEvent {
    pub fn new(platform: Platform, kind: LaunchEventKind, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            platform,
            campaign_id: None,
            kind,
            resource_kind: None,
            remote_id: None,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn for_campaign(mut self, campaign_id: Uuid) -> Self {
        self.campaign_id = Some(campaign_id);
        self
    }

    pub fn with_resource(mut self, kind: ResourceKind, remote_id: impl Into<String>) -> Self {
        self.resource_kind = Some(kind);
        self.remote_id = Some(remote_id.into());
        self
    }
}

/// Receives structured launch events.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &LaunchEvent) -> anyhow::Result<()>;
}

/// Forward an event, swallowing sink failures.
pub fn emit(sink: &dyn AuditSink, event: LaunchEvent) {
    if let Err(e) = sink.record(&event) {
        warn!(
            platform = %event.platform,
            event = ?event.kind,
            error = %e,
            "Audit sink rejected launch event"
        );
        metrics::counter!("launcher.audit_errors", "platform" => event.platform.slug())
            .increment(1);
    }
}

/// Default sink: structured tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &LaunchEvent) -> anyhow::Result<()> {
        info!(
            target: "campaign_launcher::audit",
            platform = %event.platform,
            campaign_id = ?event.campaign_id,
            event = ?event.kind,
            resource_kind = ?event.resource_kind,
            remote_id = ?event.remote_id,
            "{}",
            event.message
        );
        Ok(())
    }
}

/// Sink that drops everything, for when auditing is switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &LaunchEvent) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Keeps events in memory for inspection.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    events: Mutex<Vec<LaunchEvent>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LaunchEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, kind: &LaunchEventKind) -> usize {
        self.events.lock().iter().filter(|e| &e.kind == kind).count()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: &LaunchEvent) -> anyhow::Result<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenSink;

    impl AuditSink for BrokenSink {
        fn record(&self, _event: &LaunchEvent) -> anyhow::Result<()> {
            anyhow::bail!("audit store unavailable")
        }
    }

    #[test]
    fn test_in_memory_sink_collects() {
        let sink = InMemoryAuditSink::new();
        emit(
            &sink,
            LaunchEvent::new(Platform::SocialGraph, LaunchEventKind::ResourceCreated, "created")
                .with_resource(ResourceKind::Campaign, "c-1"),
        );
        emit(
            &sink,
            LaunchEvent::new(Platform::SocialGraph, LaunchEventKind::LaunchSucceeded, "done"),
        );

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].remote_id.as_deref(), Some("c-1"));
        assert_eq!(sink.count(&LaunchEventKind::LaunchSucceeded), 1);
    }

    #[test]
    fn test_broken_sink_does_not_panic() {
        emit(
            &BrokenSink,
            LaunchEvent::new(Platform::ShortVideo, LaunchEventKind::LaunchStarted, "start"),
        );
    }
}
