//! Presentation helpers shared by front ends.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse band for a completion percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressTier {
    Low,
    Medium,
    High,
    Complete,
}

impl ProgressTier {
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            p if p >= 100 => Self::Complete,
            p if p >= 80 => Self::High,
            p if p >= 30 => Self::Medium,
            _ => Self::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for ProgressTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a duration as `1d 2h 3m 4s`, dropping leading zero units.
///
/// Negative durations count as zero.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let seconds = total % 60;
    let minutes = (total / 60) % 60;
    let hours = (total / 3600) % 24;
    let days = total / 86_400;

    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
