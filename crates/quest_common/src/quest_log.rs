//! Quest Log
//!
//! Aggregate root of the persisted document. Every quest mutation goes
//! through here so that completion transitions turn into XP for the
//! character and into events for the observer.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chain::ChainInput;
use crate::error::Result;
use crate::events::{EventSink, QuestEvent};
use crate::idea::Idea;
use crate::ledger::{ObjectiveAdded, QuestLedger};
use crate::lenient;
use crate::progression::Character;
use crate::quest::{CompletionChange, Quest, QuestInput};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestLog {
    #[serde(flatten)]
    pub ledger: QuestLedger,
    #[serde(default = "Character::recovered", deserialize_with = "lenient::character")]
    pub character: Character,
    #[serde(default, deserialize_with = "lenient::skip_invalid")]
    pub ideas: Vec<Idea>,
}

impl QuestLog {
    /// Empty log around a given character
    pub fn with_character(character: Character) -> Self {
        Self {
            character,
            ..Self::default()
        }
    }

    pub fn quests(&self) -> &[Quest] {
        &self.ledger.quests
    }

    /// Turn a completion transition into XP and events
    fn settle(&mut self, quest_id: &str, change: CompletionChange, events: &mut dyn EventSink) {
        let Some(reward) = self.ledger.quest(quest_id).map(Quest::xp_reward) else {
            return;
        };
        self.credit(quest_id, change, change.xp_delta(reward), events);
    }

    /// Apply an already computed XP delta for a completion transition
    fn credit(&mut self, quest_id: &str, change: CompletionChange, delta: f64, events: &mut dyn EventSink) {
        if change == CompletionChange::Unchanged {
            return;
        }
        let Some(quest) = self.ledger.quest(quest_id) else {
            return;
        };

        let (id, text, xp) = (quest.id.clone(), quest.text.clone(), delta.abs());
        let event = match change {
            CompletionChange::Completed => QuestEvent::QuestCompleted { quest_id: id, text, xp },
            _ => QuestEvent::QuestReopened { quest_id: id, text, xp },
        };
        events.emit(event);
        self.character.apply_xp_delta(delta, events);
        debug!(
            quest_id,
            ?change,
            total_xp = self.character.total_xp(),
            level = self.character.level(),
            "XP settled"
        );
    }

    pub fn add_quest(&mut self, input: QuestInput) -> Result<String> {
        self.ledger.add_quest(input)
    }

    /// Flip a quest and settle its XP; returns the new completion state
    pub fn toggle_quest(&mut self, id: &str, events: &mut dyn EventSink) -> Option<bool> {
        let delta = self.ledger.toggle_quest(id)?;
        let completed = self.ledger.quest(id)?.completed;
        let change = if completed {
            CompletionChange::Completed
        } else {
            CompletionChange::Reopened
        };
        self.credit(id, change, delta, events);
        Some(completed)
    }

    pub fn toggle_objective(
        &mut self,
        quest_id: &str,
        objective_id: &str,
        events: &mut dyn EventSink,
    ) -> Option<CompletionChange> {
        let change = self.ledger.toggle_objective(quest_id, objective_id)?;
        self.settle(quest_id, change, events);
        Some(change)
    }

    pub fn add_objective(
        &mut self,
        quest_id: &str,
        text: &str,
        events: &mut dyn EventSink,
    ) -> Result<Option<ObjectiveAdded>> {
        let added = self.ledger.add_objective(quest_id, text)?;
        if let Some(added) = &added {
            self.settle(quest_id, added.change, events);
        }
        Ok(added)
    }

    pub fn edit_quest(
        &mut self,
        id: &str,
        input: QuestInput,
        events: &mut dyn EventSink,
    ) -> Result<Option<CompletionChange>> {
        let change = self.ledger.edit_quest(id, input)?;
        if let Some(change) = change {
            self.settle(id, change, events);
        }
        Ok(change)
    }

    /// Remove a quest. XP already earned is kept.
    pub fn delete_quest(&mut self, id: &str) -> Option<Quest> {
        self.ledger.delete_quest(id)
    }

    pub fn add_chain(&mut self, input: ChainInput) -> Result<String> {
        self.ledger.add_chain(input)
    }

    pub fn edit_chain(&mut self, id: &str, input: ChainInput) -> Result<bool> {
        self.ledger.edit_chain(id, input)
    }

    pub fn delete_chain(&mut self, id: &str) -> Option<usize> {
        self.ledger.delete_chain(id)
    }

    pub fn idea(&self, id: &str) -> Option<&Idea> {
        self.ideas.iter().find(|i| i.id == id)
    }

    pub fn add_idea(&mut self, name: &str, description: &str) -> Result<String> {
        let idea = Idea::new(name, description, Utc::now())?;
        let id = idea.id.clone();
        debug!(idea_id = %id, "Idea added");
        self.ideas.push(idea);
        Ok(id)
    }

    /// Replace an idea's name and description; `false` when the id is unknown
    pub fn edit_idea(&mut self, id: &str, name: &str, description: &str) -> Result<bool> {
        match self.ideas.iter_mut().find(|i| i.id == id) {
            Some(idea) => {
                idea.apply_edit(name, description)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn delete_idea(&mut self, id: &str) -> Option<Idea> {
        let index = self.ideas.iter().position(|i| i.id == id)?;
        Some(self.ideas.remove(index))
    }

    /// Restore cross-entity invariants after loading
    pub(crate) fn repair(&mut self) -> usize {
        self.ledger.repair()
    }
}
