//! Domain events emitted while the quest log changes.
//!
//! Events are reported out-of-band through an injected [`EventSink`] so that
//! callers can celebrate a level-up or log a completion without the core
//! knowing how they are surfaced.

use serde::{Deserialize, Serialize};

use crate::progression::format_xp;

/// Something observable happened to the quest log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestEvent {
    /// A quest transitioned to completed and granted XP
    QuestCompleted {
        quest_id: String,
        text: String,
        xp: f64,
    },
    /// A completed quest was re-opened and its XP taken back
    QuestReopened {
        quest_id: String,
        text: String,
        xp: f64,
    },
    /// The character reached a higher level
    LevelUp { from: u32, to: u32 },
}

impl QuestEvent {
    /// One-line human readable description
    pub fn describe(&self) -> String {
        match self {
            QuestEvent::QuestCompleted { text, xp, .. } => {
                format!("Quest complete: {} (+{} XP)", text, format_xp(*xp))
            }
            QuestEvent::QuestReopened { text, xp, .. } => {
                format!("Quest re-opened: {} (-{} XP)", text, format_xp(*xp))
            }
            QuestEvent::LevelUp { to, .. } => format!("Level up! Now level {}", to),
        }
    }
}

/// Receiver for quest log events
pub trait EventSink {
    fn emit(&mut self, event: QuestEvent);
}

/// Collects events in memory
impl EventSink for Vec<QuestEvent> {
    fn emit(&mut self, event: QuestEvent) {
        self.push(event);
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: QuestEvent) {}
}

/// Forwards events to `tracing` at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: QuestEvent) {
        tracing::info!(event = ?event, "{}", event.describe());
    }
}
