//! Resource ledger: append-only record of remote IDs created during one
//! launch attempt, partitioned by resource kind.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Layers of the platform resource hierarchy, in creation order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Campaign,
    GroupingUnit,
    Creative,
    Ad,
}

impl ResourceKind {
    /// Compensation order: dependents before the things they hang off.
    pub const ROLLBACK_ORDER: [ResourceKind; 4] = [
        ResourceKind::Ad,
        ResourceKind::Creative,
        ResourceKind::GroupingUnit,
        ResourceKind::Campaign,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Campaign => "campaign",
            ResourceKind::GroupingUnit => "grouping_unit",
            ResourceKind::Creative => "creative",
            ResourceKind::Ad => "ad",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered remote IDs per resource kind. IDs are opaque platform-native
/// strings and are never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    #[serde(default)]
    pub campaigns: Vec<String>,
    #[serde(default)]
    pub grouping_units: Vec<String>,
    #[serde(default)]
    pub creatives: Vec<String>,
    #[serde(default)]
    pub ads: Vec<String>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a freshly created remote ID.
    pub fn record(&mut self, kind: ResourceKind, id: impl Into<String>) {
        self.slot_mut(kind).push(id.into());
    }

    pub fn ids(&self, kind: ResourceKind) -> &[String] {
        match kind {
            ResourceKind::Campaign => &self.campaigns,
            ResourceKind::GroupingUnit => &self.grouping_units,
            ResourceKind::Creative => &self.creatives,
            ResourceKind::Ad => &self.ads,
        }
    }

    fn slot_mut(&mut self, kind: ResourceKind) -> &mut Vec<String> {
        match kind {
            ResourceKind::Campaign => &mut self.campaigns,
            ResourceKind::GroupingUnit => &mut self.grouping_units,
            ResourceKind::Creative => &mut self.creatives,
            ResourceKind::Ad => &mut self.ads,
        }
    }

    pub fn len(&self) -> usize {
        self.campaigns.len() + self.grouping_units.len() + self.creatives.len() + self.ads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, kind: ResourceKind, id: &str) -> bool {
        self.ids(kind).iter().any(|existing| existing == id)
    }

    /// Every recorded entry in compensation order: kinds per
    /// [`ResourceKind::ROLLBACK_ORDER`], newest first within a kind.
    pub fn rollback_sequence(&self) -> impl Iterator<Item = (ResourceKind, &str)> + '_ {
        ResourceKind::ROLLBACK_ORDER.into_iter().flat_map(move |kind| {
            self.ids(kind)
                .iter()
                .rev()
                .map(move |id| (kind, id.as_str()))
        })
    }
}
