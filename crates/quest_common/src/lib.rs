//! Quest Common - Core library for questlog
//!
//! Quests, quest chains, ideas and a levelling character, persisted to a
//! single JSON document.
//!
//! ## Layout
//!
//! - `progression`: XP curve and the character that consumes XP deltas
//! - `ledger`: quest and chain collections, aggregates, filter and sort
//! - `quest_log`: aggregate root routing completions into XP
//! - `store`: lenient JSON persistence
//! - `config`: TOML configuration

pub mod chain;
pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod idea;
pub mod ledger;
pub mod lenient;
pub mod progression;
pub mod quest;
pub mod quest_log;
pub mod store;

pub use chain::{ChainInput, DueStatus, QuestChain, SIDE_QUESTS_NAME};
pub use config::{ColorMode, QuestConfig};
pub use display::{format_duration, ProgressTier};
pub use error::{QuestError, Result};
pub use events::{EventSink, NullSink, QuestEvent, TracingSink};
pub use idea::Idea;
pub use ledger::{ObjectiveAdded, QuestFilter, QuestLedger, QuestSort, QuestSummary};
pub use progression::{Character, LevelProgress};
pub use quest::{CompletionChange, Difficulty, Objective, Quest, QuestInput, QuestType, QuestValue};
pub use quest_log::QuestLog;
pub use store::QuestStore;

/// Fresh random identifier for a new entity
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
