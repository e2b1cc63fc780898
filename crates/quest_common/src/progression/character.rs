//! Character
//!
//! The player's avatar. Consumes signed XP deltas and keeps its level in
//! step with the XP total.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::curve::{cumulative_xp_for_level, level_from_total_xp, LevelProgress};
use crate::display::format_duration;
use crate::error::{require_name, QuestError, Result};
use crate::events::{EventSink, QuestEvent};
use crate::lenient;

/// Title given to a fresh character
pub const DEFAULT_TITLE: &str = "Novice Adventurer";

/// Avatar given to a fresh character
pub const DEFAULT_AVATAR: &str = "hero";

/// Avatars the character can cycle through, in order
pub const AVATARS: &[&str] = &[
    "mario",
    "ash",
    "pokeball",
    "bulbasaur",
    "charmander",
    "squirtle",
    "kirby",
    "octocat",
];

/// Roster entry the legacy default avatar stands for
const LEGACY_AVATAR_ALIAS: &str = "ash";

/// Creation time of a fresh character
pub fn default_created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 5, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "CharacterRecord")]
pub struct Character {
    /// Always `level_from_total_xp(total_xp)`
    level: u32,
    /// Non-negative XP accumulator
    total_xp: f64,
    pub title: String,
    pub avatar: String,
    /// `None` when the creation time is unknown
    pub created_at: Option<DateTime<Utc>>,
}

impl Default for Character {
    fn default() -> Self {
        Self {
            level: 1,
            total_xp: 0.0,
            title: DEFAULT_TITLE.to_string(),
            avatar: DEFAULT_AVATAR.to_string(),
            created_at: Some(default_created_at()),
        }
    }
}

impl Character {
    /// Fresh character with a custom title and avatar
    pub fn with_identity(title: &str, avatar: &str) -> Self {
        let mut character = Self::default();
        if !title.trim().is_empty() {
            character.title = title.trim().to_string();
        }
        if !avatar.trim().is_empty() {
            character.avatar = avatar.trim().to_string();
        }
        character
    }

    /// Stand-in for a character record that could not be read.
    ///
    /// Same as the default except the creation time is unknown.
    pub fn recovered() -> Self {
        Self {
            created_at: None,
            ..Self::default()
        }
    }

    /// Character holding a given XP total
    pub fn from_total_xp(total_xp: f64) -> Self {
        let total_xp = if total_xp.is_finite() { total_xp.max(0.0) } else { 0.0 };
        Self {
            level: level_from_total_xp(total_xp),
            total_xp,
            ..Self::default()
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn total_xp(&self) -> f64 {
        self.total_xp
    }

    /// Apply a signed XP change and recompute the level.
    ///
    /// The total never drops below zero. A rise in level is reported to
    /// `events`; losing a level is silent.
    pub fn apply_xp_delta(&mut self, delta: f64, events: &mut dyn EventSink) {
        if !delta.is_finite() {
            warn!(delta, "Ignoring non-finite XP delta");
            return;
        }

        let from = self.level;
        self.total_xp = (self.total_xp + delta).max(0.0);
        self.level = level_from_total_xp(self.total_xp);

        if self.level > from {
            events.emit(QuestEvent::LevelUp {
                from,
                to: self.level,
            });
        }
    }

    /// Where the XP total sits inside the current level
    pub fn progress_within_level(&self) -> LevelProgress {
        LevelProgress::new(self.total_xp, self.level)
    }

    /// Time since creation, `None` when the creation time is unknown
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.created_at.map(|created| now - created)
    }

    /// Elapsed time as `1d 2h 3m 4s`, or `ERROR` when unknown
    pub fn elapsed_label(&self, now: DateTime<Utc>) -> String {
        match self.elapsed(now) {
            Some(duration) => format_duration(duration),
            None => "ERROR".to_string(),
        }
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        self.title = require_name("Title", title)?;
        Ok(())
    }

    /// Pick an avatar from the roster (case-insensitive)
    pub fn set_avatar(&mut self, avatar: &str) -> Result<()> {
        let wanted = avatar.trim();
        let found = AVATARS
            .iter()
            .find(|a| a.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                QuestError::Validation(format!(
                    "unknown avatar '{}' (choose from: {})",
                    wanted,
                    AVATARS.join(", ")
                ))
            })?;
        self.avatar = found.to_string();
        Ok(())
    }

    /// Move to the next roster avatar, wrapping around
    pub fn cycle_avatar(&mut self) -> &str {
        let current = if self.avatar == DEFAULT_AVATAR {
            LEGACY_AVATAR_ALIAS
        } else {
            self.avatar.as_str()
        };
        let next = match AVATARS.iter().position(|a| *a == current) {
            Some(index) => AVATARS[(index + 1) % AVATARS.len()],
            None => AVATARS[0],
        };
        self.avatar = next.to_string();
        &self.avatar
    }
}

/// On-disk shape of a character, read leniently
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CharacterRecord {
    #[serde(default, deserialize_with = "lenient::optional_number")]
    level: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    total_xp: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    avatar: String,
    #[serde(default, deserialize_with = "lenient::optional_timestamp")]
    created_at: Option<DateTime<Utc>>,
}

impl From<CharacterRecord> for Character {
    fn from(record: CharacterRecord) -> Self {
        let stored_level = record
            .level
            .filter(|l| *l >= 1.0)
            .map(|l| l.floor().min(u32::MAX as f64) as u32);

        let total_xp = match (record.total_xp, stored_level) {
            (Some(xp), _) if xp >= 0.0 => xp,
            (Some(xp), _) => {
                warn!(total_xp = xp, "Negative totalXp, resetting to 0");
                0.0
            }
            (None, Some(level)) => {
                let seeded = cumulative_xp_for_level(level) as f64;
                warn!(level, seeded, "Character has no totalXp, seeding from level");
                seeded
            }
            (None, None) => 0.0,
        };

        let level = level_from_total_xp(total_xp);
        if let Some(stored) = stored_level {
            if stored != level {
                warn!(stored, derived = level, "Stored level disagrees with totalXp, recomputing");
            }
        }

        if record.created_at.is_none() {
            warn!("Character createdAt is missing or unreadable");
        }

        let title = match record.title.trim() {
            "" => DEFAULT_TITLE.to_string(),
            t => t.to_string(),
        };
        let avatar = match record.avatar.trim() {
            "" => DEFAULT_AVATAR.to_string(),
            a => a.to_string(),
        };

        Self {
            level,
            total_xp,
            title,
            avatar,
            created_at: record.created_at,
        }
    }
}
