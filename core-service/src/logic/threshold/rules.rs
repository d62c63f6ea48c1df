//! Severity Rules & Margins
//!
//! Margins that decide when a single flagged metric escalates straight to
//! danger. No evaluation logic here, only constants and the configurable
//! struct.

use serde::{Deserialize, Serialize};

/// Extra bpm beyond `hr_high` (or below `hr_low`) that makes a lone
/// heart-rate flag a danger instead of a warning.
pub const SEVERE_HR_MARGIN: i32 = 20;

/// Extra mmHg beyond `sbp_high` that makes a lone systolic flag a danger.
pub const SEVERE_SBP_MARGIN: i32 = 20;

/// Deviation (percent of the nearest personal-baseline bound) that makes a
/// baseline-compared metric a danger.
pub const SEVERE_DEVIATION_PERCENT: f64 = 20.0;

/// Escalation margins (configurable at runtime).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeverityRules {
    /// bpm beyond the threshold before a single HR flag becomes danger
    pub severe_hr_margin: i32,
    /// mmHg beyond the threshold before a single systolic flag becomes danger
    pub severe_sbp_margin: i32,
    /// percent deviation from a personal baseline bound treated as severe
    pub severe_deviation_percent: f64,
}

impl Default for SeverityRules {
    fn default() -> Self {
        Self {
            severe_hr_margin: SEVERE_HR_MARGIN,
            severe_sbp_margin: SEVERE_SBP_MARGIN,
            severe_deviation_percent: SEVERE_DEVIATION_PERCENT,
        }
    }
}

impl SeverityRules {
    /// Tighter margins, more danger-level alerts
    pub fn high_sensitivity() -> Self {
        Self {
            severe_hr_margin: 10,
            severe_sbp_margin: 10,
            severe_deviation_percent: 10.0,
        }
    }

    /// Wider margins, fewer danger-level alerts
    pub fn low_sensitivity() -> Self {
        Self {
            severe_hr_margin: 30,
            severe_sbp_margin: 30,
            severe_deviation_percent: 30.0,
        }
    }
}
