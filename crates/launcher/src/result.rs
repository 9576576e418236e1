//! Result shapes handed back to the outer caller.

use campaign_core::{CampaignError, Platform};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::{ResourceKind, ResourceLedger};

/// Outcome of `validate_prerequisites`. All failed checks are collected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn into_result(self) -> Result<(), CampaignError> {
        if self.valid {
            Ok(())
        } else {
            Err(CampaignError::Validation(self.errors))
        }
    }
}

/// Where a launch failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LaunchPhase {
    Validation,
    Launch,
}

/// IDs beyond the first of each kind, produced by multi-unit fan-out.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdditionalIds {
    pub grouping_unit_ids: Vec<String>,
    pub creative_ids: Vec<String>,
    pub ad_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchResult {
    pub success: bool,
    pub platform: Platform,
    pub campaign_id: Option<String>,
    pub grouping_unit_id: Option<String>,
    /// `None` on platforms where the creative is implicit in the ad.
    pub creative_id: Option<String>,
    pub ad_id: Option<String>,
    pub additional_ids: AdditionalIds,
    /// Video produced by the image-to-video fallback, if it ran.
    pub converted_media_id: Option<Uuid>,
    pub error: Option<String>,
    pub phase: Option<LaunchPhase>,
    /// Compensation report when a failed launch was rolled back.
    pub rollback: Option<RollbackResult>,
}

impl LaunchResult {
    pub fn succeeded(platform: Platform, ledger: &ResourceLedger) -> Self {
        let (grouping_unit_id, grouping_unit_ids) = split_first(ledger.ids(ResourceKind::GroupingUnit));
        let (creative_id, creative_ids) = split_first(ledger.ids(ResourceKind::Creative));
        let (ad_id, ad_ids) = split_first(ledger.ids(ResourceKind::Ad));

        Self {
            success: true,
            platform,
            campaign_id: ledger.ids(ResourceKind::Campaign).first().cloned(),
            grouping_unit_id,
            creative_id,
            ad_id,
            additional_ids: AdditionalIds {
                grouping_unit_ids,
                creative_ids,
                ad_ids,
            },
            converted_media_id: None,
            error: None,
            phase: None,
            rollback: None,
        }
    }

    pub fn failed(platform: Platform, error: &CampaignError, rollback: RollbackResult) -> Self {
        Self {
            success: false,
            platform,
            campaign_id: None,
            grouping_unit_id: None,
            creative_id: None,
            ad_id: None,
            additional_ids: AdditionalIds::default(),
            converted_media_id: None,
            error: Some(error.to_string()),
            phase: Some(LaunchPhase::Launch),
            rollback: Some(rollback),
        }
    }

    pub fn with_converted_media(mut self, media_id: Option<Uuid>) -> Self {
        self.converted_media_id = media_id;
        self
    }

    /// Total ads created, primary plus additional.
    pub fn ad_count(&self) -> usize {
        usize::from(self.ad_id.is_some()) + self.additional_ids.ad_ids.len()
    }

    pub fn grouping_unit_count(&self) -> usize {
        usize::from(self.grouping_unit_id.is_some()) + self.additional_ids.grouping_unit_ids.len()
    }

    /// Rebuild the ledger of a successful launch, for a later `rollback`.
    pub fn ledger(&self) -> ResourceLedger {
        let mut ledger = ResourceLedger::new();
        let grouped = [
            (ResourceKind::Campaign, self.campaign_id.as_ref(), &[][..]),
            (
                ResourceKind::GroupingUnit,
                self.grouping_unit_id.as_ref(),
                &self.additional_ids.grouping_unit_ids[..],
            ),
            (
                ResourceKind::Creative,
                self.creative_id.as_ref(),
                &self.additional_ids.creative_ids[..],
            ),
            (ResourceKind::Ad, self.ad_id.as_ref(), &self.additional_ids.ad_ids[..]),
        ];
        for (kind, first, rest) in grouped {
            for id in first.into_iter().chain(rest) {
                ledger.record(kind, id.clone());
            }
        }
        ledger
    }
}

fn split_first(ids: &[String]) -> (Option<String>, Vec<String>) {
    match ids.split_first() {
        Some((first, rest)) => (Some(first.clone()), rest.to_vec()),
        None => (None, Vec::new()),
    }
}

/// Best-effort compensation report. Partial failure is data for operator
/// follow-up, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RollbackResult {
    /// True iff `errors` is empty.
    pub success: bool,
    /// Entities disabled or deleted, per kind.
    #[serde(flatten)]
    pub compensated: ResourceLedger,
    pub errors: Vec<String>,
}

impl RollbackResult {
    pub fn new(compensated: ResourceLedger, errors: Vec<String>) -> Self {
        Self {
            success: errors.is_empty(),
            compensated,
            errors,
        }
    }

    /// Nothing had been created, so nothing needed compensating.
    pub fn nothing_to_undo() -> Self {
        Self::new(ResourceLedger::new(), Vec::new())
    }

    pub fn compensated(&self, kind: ResourceKind) -> &[String] {
        self.compensated.ids(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_succeeded_splits_primary_and_additional() {
        let mut ledger = ResourceLedger::new();
        ledger.record(ResourceKind::Campaign, "c-1");
        ledger.record(ResourceKind::GroupingUnit, "g-1");
        for i in 1..=3 {
            ledger.record(ResourceKind::Creative, format!("cr-{i}"));
            ledger.record(ResourceKind::Ad, format!("a-{i}"));
        }

        let result = LaunchResult::succeeded(Platform::SocialGraph, &ledger);
        assert!(result.success);
        assert_eq!(result.campaign_id.as_deref(), Some("c-1"));
        assert_eq!(result.ad_id.as_deref(), Some("a-1"));
        assert_eq!(result.additional_ids.ad_ids, vec!["a-2", "a-3"]);
        assert!(result.additional_ids.grouping_unit_ids.is_empty());
        assert_eq!(result.ad_count(), 3);
        assert_eq!(result.grouping_unit_count(), 1);
        assert_eq!(result.ledger(), ledger);
    }

    #[test]
    fn test_failed_carries_error_and_phase() {
        let err = CampaignError::RemoteApi {
            step: "create_ad".to_string(),
            message: "rate limited".to_string(),
        };
        let result = LaunchResult::failed(
            Platform::ShortVideo,
            &err,
            RollbackResult::nothing_to_undo(),
        );
        assert!(!result.success);
        assert_eq!(result.phase, Some(LaunchPhase::Launch));
        assert!(result.error.as_deref().unwrap().contains("rate limited"));
        assert!(result.rollback.as_ref().unwrap().success);
    }

    #[test]
    fn test_rollback_success_tracks_errors() {
        let mut compensated = ResourceLedger::new();
        compensated.record(ResourceKind::Ad, "a-1");
        let clean = RollbackResult::new(compensated.clone(), Vec::new());
        assert!(clean.success);

        let partial = RollbackResult::new(compensated, vec!["campaign c-1: timeout".to_string()]);
        assert!(!partial.success);
        assert_eq!(partial.compensated(ResourceKind::Ad), ["a-1".to_string()]);
    }

    #[test]
    fn test_validation_report() {
        assert!(ValidationReport::from_errors(Vec::new()).valid);
        let report = ValidationReport::from_errors(vec!["budget too low".to_string()]);
        assert!(!report.valid);
        assert!(matches!(report.into_result(), Err(CampaignError::Validation(e)) if e.len() == 1));
    }
}
