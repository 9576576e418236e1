//! Shared machinery for the in-memory platform backends: an entity store
//! that mimics remote object lifecycles, and fault injection so rollback
//! paths can be rehearsed.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a sandbox entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    Active,
    Paused,
    Disabled,
    Deleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxEntity {
    pub id: String,
    pub kind: String,
    pub parent_id: Option<String>,
    pub name: String,
    pub status: EntityStatus,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Fails selected operations on a chosen call.
#[derive(Debug, Default)]
pub struct FaultInjector {
    /// Operation -> 1-based call number to fail; 0 fails every call.
    faults: DashMap<String, usize>,
    calls: DashMap<String, usize>,
}

impl FaultInjector {
    pub fn fail_on(&self, operation: &str, nth_call: usize) {
        self.faults.insert(operation.to_string(), nth_call);
    }

    pub fn fail_always(&self, operation: &str) {
        self.faults.insert(operation.to_string(), 0);
    }

    pub fn clear(&self) {
        self.faults.clear();
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls.get(operation).map(|c| *c).unwrap_or(0)
    }

    /// Count the call and fail it if a fault is armed for it.
    pub fn check(&self, operation: &str) -> anyhow::Result<()> {
        let call = {
            let mut count = self.calls.entry(operation.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        if let Some(target) = self.faults.get(operation) {
            if *target == 0 || *target == call {
                anyhow::bail!("injected failure on {operation} call #{call}");
            }
        }
        Ok(())
    }
}

/// Remote objects held by a sandbox backend.
#[derive(Debug)]
pub struct SandboxStore {
    prefix: &'static str,
    entities: DashMap<String, SandboxEntity>,
    sequence: AtomicU64,
    log: Mutex<Vec<String>>,
}

impl SandboxStore {
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            entities: DashMap::new(),
            sequence: AtomicU64::new(1000),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn insert(
        &self,
        kind: &str,
        parent_id: Option<&str>,
        name: &str,
        status: EntityStatus,
        payload: serde_json::Value,
    ) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let id = format!("{}_{}_{}", self.prefix, kind, seq);
        self.entities.insert(
            id.clone(),
            SandboxEntity {
                id: id.clone(),
                kind: kind.to_string(),
                parent_id: parent_id.map(str::to_string),
                name: name.to_string(),
                status,
                payload,
                created_at: Utc::now(),
            },
        );
        self.log.lock().push(format!("create {kind} {id}"));
        id
    }

    pub fn set_status(&self, id: &str, status: EntityStatus) -> anyhow::Result<()> {
        let mut entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| anyhow::anyhow!("object {id} does not exist"))?;
        if entity.status == EntityStatus::Deleted {
            anyhow::bail!("object {id} was already deleted");
        }
        entity.status = status;
        self.log.lock().push(format!("status {id} {status:?}"));
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<SandboxEntity> {
        self.entities.get(id).map(|e| e.clone())
    }

    pub fn by_kind(&self, kind: &str) -> Vec<SandboxEntity> {
        let mut found: Vec<SandboxEntity> = self
            .entities
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.clone())
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }

    /// Entities of `kind` not deleted or disabled.
    pub fn live(&self, kind: &str) -> Vec<SandboxEntity> {
        self.by_kind(kind)
            .into_iter()
            .filter(|e| matches!(e.status, EntityStatus::Active | EntityStatus::Paused))
            .collect()
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}
