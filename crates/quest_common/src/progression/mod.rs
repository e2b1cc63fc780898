//! Progression Module
//!
//! Levelling for the quest log's character.
//!
//! ## Level System
//!
//! - Levels start at 1 and have no upper bound
//! - Level is always derived from the accumulated XP total
//! - XP is granted and taken back by quest completion transitions

pub mod character;
pub mod curve;

pub use character::{Character, AVATARS, DEFAULT_AVATAR, DEFAULT_TITLE};
pub use curve::{
    cumulative_xp_for_level, format_xp, level_from_total_xp, xp_to_reach_level, LevelProgress,
    BASE_XP, GROWTH_FACTOR,
};
