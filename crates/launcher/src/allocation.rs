//! Fan-out and budget allocation.
//!
//! Decides how many grouping units a launch creates, which media items go
//! into each, and where the daily budget is attached.

use std::ops::Range;

use campaign_core::BudgetMode;
use serde::{Deserialize, Serialize};

/// A daily budget in the platform's minor unit (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MinorUnits(pub i64);

impl MinorUnits {
    /// Convert a host-currency amount, rounding to the nearest cent.
    pub fn from_major(amount: f64) -> Self {
        Self((amount * 100.0).round() as i64)
    }
}

/// Media slice and budget for one grouping unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitPlan {
    /// 1-based position, used in names.
    pub ordinal: usize,
    /// Indices into the resolved media list.
    pub media: Range<usize>,
    /// Unit-level daily budget; `None` when the campaign carries it.
    pub daily_budget: Option<MinorUnits>,
}

impl UnitPlan {
    pub fn len(&self) -> usize {
        self.media.len()
    }

    pub fn is_empty(&self) -> bool {
        self.media.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanOutPlan {
    pub mode: BudgetMode,
    /// Campaign-level daily budget; `None` in set-level mode.
    pub campaign_budget: Option<MinorUnits>,
    pub units: Vec<UnitPlan>,
}

impl FanOutPlan {
    /// Lay out `media_count` items.
    ///
    /// Campaign-level mode always yields one unit holding every item.
    /// Set-level mode yields `ceil(M/K)` units of size K, the last one
    /// holding the remainder, each with a full copy of the daily budget.
    /// The budget is converted to minor units once and reused everywhere.
    pub fn build(mode: BudgetMode, daily_budget: f64, media_count: usize, per_set: u32) -> Self {
        let budget = MinorUnits::from_major(daily_budget);

        match mode {
            BudgetMode::CampaignLevel => Self {
                mode,
                campaign_budget: Some(budget),
                units: vec![UnitPlan {
                    ordinal: 1,
                    media: 0..media_count,
                    daily_budget: None,
                }],
            },
            BudgetMode::SetLevel => {
                let per_set = per_set.max(1) as usize;
                let units = (0..media_count)
                    .step_by(per_set)
                    .enumerate()
                    .map(|(i, start)| UnitPlan {
                        ordinal: i + 1,
                        media: start..(start + per_set).min(media_count),
                        daily_budget: Some(budget),
                    })
                    .collect();
                Self {
                    mode,
                    campaign_budget: None,
                    units,
                }
            }
        }
    }

    pub fn unit_sizes(&self) -> Vec<usize> {
        self.units.iter().map(UnitPlan::len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_unit_conversion() {
        assert_eq!(MinorUnits::from_major(50.0), MinorUnits(5000));
        assert_eq!(MinorUnits::from_major(19.999), MinorUnits(2000));
        assert_eq!(MinorUnits::from_major(0.29), MinorUnits(29));
    }

    #[test]
    fn test_campaign_level_single_unit() {
        for media in 1..=12 {
            let plan = FanOutPlan::build(BudgetMode::CampaignLevel, 50.0, media, 3);
            assert_eq!(plan.units.len(), 1);
            assert_eq!(plan.units[0].len(), media);
            assert_eq!(plan.units[0].daily_budget, None);
            assert_eq!(plan.campaign_budget, Some(MinorUnits(5000)));
        }
    }

    #[test]
    fn test_set_level_buckets() {
        let plan = FanOutPlan::build(BudgetMode::SetLevel, 50.0, 10, 3);
        assert_eq!(plan.unit_sizes(), vec![3, 3, 3, 1]);
        assert_eq!(plan.campaign_budget, None);
        assert!(plan
            .units
            .iter()
            .all(|u| u.daily_budget == Some(MinorUnits(5000))));
        assert_eq!(plan.units[3].media, 9..10);
        assert_eq!(plan.units[3].ordinal, 4);
    }

    #[test]
    fn test_set_level_sizes_sum_to_media_count() {
        for media in 1..=20usize {
            for per_set in 1..=6u32 {
                let plan = FanOutPlan::build(BudgetMode::SetLevel, 10.0, media, per_set);
                let k = per_set as usize;
                assert_eq!(plan.units.len(), media.div_ceil(k));
                assert_eq!(plan.unit_sizes().iter().sum::<usize>(), media);
                let (last, rest) = plan.units.split_last().unwrap();
                assert!(rest.iter().all(|u| u.len() == k));
                let expected_last = if media % k == 0 { k } else { media % k };
                assert_eq!(last.len(), expected_last);
            }
        }
    }

    #[test]
    fn test_zero_per_set_treated_as_one() {
        let plan = FanOutPlan::build(BudgetMode::SetLevel, 10.0, 3, 0);
        assert_eq!(plan.unit_sizes(), vec![1, 1, 1]);
    }
}
