//! Targeting helpers shared by both platforms.
//!
//! Generator suggestions are advisory: malformed age ranges fall back to the
//! platform-wide default and interest names that do not resolve are dropped.

use serde::{Deserialize, Serialize};

pub const MIN_AGE: u8 = 18;
pub const MAX_AGE: u8 = 65;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: u8,
    pub max: u8,
}

impl Default for AgeRange {
    fn default() -> Self {
        Self {
            min: MIN_AGE,
            max: MAX_AGE,
        }
    }
}

impl AgeRange {
    /// Parse `"25-54"`, `"18+"`, or `"30"`, clamped to 18..=65.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };

        let (min, max) = if let Some(lower) = raw.strip_suffix('+') {
            (lower.trim().parse::<u8>().ok(), Some(MAX_AGE))
        } else if let Some((lower, upper)) = raw.split_once('-') {
            (lower.trim().parse::<u8>().ok(), upper.trim().parse::<u8>().ok())
        } else {
            let single = raw.parse::<u8>().ok();
            (single, Some(MAX_AGE))
        };

        match (min, max) {
            (Some(min), Some(max)) => {
                let min = min.clamp(MIN_AGE, MAX_AGE);
                let max = max.clamp(MIN_AGE, MAX_AGE);
                if min <= max {
                    Self { min, max }
                } else {
                    Self::default()
                }
            }
            _ => Self::default(),
        }
    }

    /// Short-video fixed age buckets overlapping this range.
    pub fn short_video_groups(&self) -> Vec<&'static str> {
        const BUCKETS: [(u8, u8, &str); 5] = [
            (18, 24, "AGE_18_24"),
            (25, 34, "AGE_25_34"),
            (35, 44, "AGE_35_44"),
            (45, 54, "AGE_45_54"),
            (55, u8::MAX, "AGE_55_100"),
        ];
        BUCKETS
            .iter()
            .filter(|(lo, hi, _)| self.min <= *hi && self.max >= *lo)
            .map(|(_, _, name)| *name)
            .collect()
    }
}

/// Trim, drop empties, and de-duplicate case-insensitively, keeping order.
pub fn normalize_interest_names(names: &[String]) -> Vec<String> {
    let mut seen = Vec::<String>::new();
    let mut out = Vec::new();
    for name in names {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = trimmed.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(trimmed.to_string());
    }
    out
}
