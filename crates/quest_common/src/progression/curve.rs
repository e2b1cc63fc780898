//! XP Curve
//!
//! Pure mapping between levels and cumulative experience.
//!
//! ## Curve
//!
//! XP required to leave level L: floor(base_xp * max(1, L)^growth_factor)
//! - base_xp = 15 (XP to go from level 1 to 2)
//! - growth_factor = 1.2
//!
//! This means:
//! - Level 2 starts at 15 XP
//! - Level 3 starts at 49 XP
//! - Level 4 starts at 105 XP

use serde::{Deserialize, Serialize};

/// XP needed to go from level 1 to level 2
pub const BASE_XP: f64 = 15.0;

/// Exponent applied to the level when computing its cost
pub const GROWTH_FACTOR: f64 = 1.2;

/// XP required to go from `level` to `level + 1`.
///
/// This is the incremental cost of leaving a level, not a cumulative value.
/// Levels below 1 cost the same as level 1.
pub fn xp_to_reach_level(level: u32) -> u64 {
    let level = level.max(1) as f64;
    (BASE_XP * level.powf(GROWTH_FACTOR)).floor() as u64
}

/// Total XP required to stand at the start of `level`.
///
/// Zero for levels 1 and below.
pub fn cumulative_xp_for_level(level: u32) -> u64 {
    if level <= 1 {
        return 0;
    }
    (1..level).fold(0u64, |total, i| total.saturating_add(xp_to_reach_level(i)))
}

/// Largest level whose cumulative XP does not exceed `total_xp`.
///
/// Scans upward from level 1 and stops as soon as the next threshold is out
/// of reach or stops increasing. Zero, negative and non-finite totals map to
/// level 1.
pub fn level_from_total_xp(total_xp: f64) -> u32 {
    if !total_xp.is_finite() || total_xp <= 0.0 {
        return 1;
    }

    let mut level = 1u32;
    let mut reached = 0u64;
    loop {
        let next = match reached.checked_add(xp_to_reach_level(level)) {
            Some(next) if next > reached => next,
            _ => break,
        };
        if next as f64 > total_xp {
            break;
        }
        level += 1;
        reached = next;
    }
    level
}

/// Position of a total XP value inside its level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    /// Level the XP total belongs to
    pub level: u32,
    /// XP earned since the start of the level
    pub xp_into_level: f64,
    /// XP span of the level (start of next level minus start of this one)
    pub xp_needed_for_level: f64,
    /// Progress through the level, clamped to 0-100
    pub percent: f64,
}

impl LevelProgress {
    /// Compute progress for an XP total at a given level
    pub fn new(total_xp: f64, level: u32) -> Self {
        let start = cumulative_xp_for_level(level) as f64;
        let end = cumulative_xp_for_level(level.saturating_add(1)) as f64;
        let xp_into_level = (total_xp - start).max(0.0);
        let xp_needed_for_level = end - start;

        let percent = if xp_needed_for_level <= 0.0 {
            100.0
        } else {
            (xp_into_level / xp_needed_for_level * 100.0).clamp(0.0, 100.0)
        };

        Self {
            level,
            xp_into_level,
            xp_needed_for_level,
            percent,
        }
    }

    /// Progress derived from the XP total alone
    pub fn from_total_xp(total_xp: f64) -> Self {
        Self::new(total_xp, level_from_total_xp(total_xp))
    }

    /// True when the level has no further XP span
    pub fn is_max(&self) -> bool {
        self.xp_needed_for_level <= 0.0
    }

    /// Short label such as `12/34 XP`, or `MAX`
    pub fn label(&self) -> String {
        if self.is_max() {
            "MAX".to_string()
        } else {
            format!(
                "{}/{} XP",
                format_xp(self.xp_into_level),
                format_xp(self.xp_needed_for_level)
            )
        }
    }
}

/// Render an XP amount without a trailing `.0` for whole values
pub fn format_xp(xp: f64) -> String {
    if xp.fract() == 0.0 {
        format!("{:.0}", xp)
    } else {
        let text = format!("{:.2}", xp);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
