//! Quests and their objectives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{require_name, QuestError, Result};
use crate::lenient;
use crate::new_id;

/// Quest difficulty: 0-4 in half steps
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Difficulty(f64);

impl Difficulty {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 4.0;

    /// Create a difficulty, clamped to 0-4 and snapped to the nearest 0.5
    pub fn new(raw: f64) -> Self {
        if !raw.is_finite() {
            return Self(Self::MIN);
        }
        let clamped = raw.clamp(Self::MIN, Self::MAX);
        Self((clamped * 2.0).round() / 2.0)
    }

    /// Get the raw difficulty
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Difficulty {
    fn from(raw: f64) -> Self {
        Self::new(raw)
    }
}

impl From<Difficulty> for f64 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.0
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Quest value: integer 0-4
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "u8")]
pub struct QuestValue(u8);

impl QuestValue {
    pub const MAX: u8 = 4;

    /// Create a value, clamped to 0-4
    pub fn new(raw: u8) -> Self {
        Self(raw.min(Self::MAX))
    }

    /// Get the raw value
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl From<f64> for QuestValue {
    fn from(raw: f64) -> Self {
        if !raw.is_finite() || raw <= 0.0 {
            return Self(0);
        }
        Self::new(raw.round().min(QuestValue::MAX as f64) as u8)
    }
}

impl From<QuestValue> for u8 {
    fn from(value: QuestValue) -> Self {
        value.0
    }
}

impl fmt::Display for QuestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of quest
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuestType {
    Main,
    #[default]
    Side,
    Extra,
}

impl QuestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Side => "side",
            Self::Extra => "extra",
        }
    }

    /// Fixed display order: main < side < extra
    pub fn rank(&self) -> u8 {
        match self {
            Self::Main => 0,
            Self::Side => 1,
            Self::Extra => 2,
        }
    }
}

impl FromStr for QuestType {
    type Err = QuestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main" => Ok(Self::Main),
            "side" => Ok(Self::Side),
            "extra" => Ok(Self::Extra),
            other => Err(QuestError::Validation(format!(
                "unknown quest type '{}' (expected main, side or extra)",
                other
            ))),
        }
    }
}

impl fmt::Display for QuestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single step of a quest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    #[serde(default = "new_id", deserialize_with = "lenient::id_or_new")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub text: String,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub completed: bool,
}

impl Objective {
    /// Create an incomplete objective with a fresh id
    pub fn new(text: &str) -> Result<Self> {
        Ok(Self {
            id: new_id(),
            text: require_name("Objective text", text)?,
            completed: false,
        })
    }
}

/// How a quest's completion moved during an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionChange {
    Completed,
    Reopened,
    Unchanged,
}

impl CompletionChange {
    fn between(before: bool, after: bool) -> Self {
        match (before, after) {
            (false, true) => Self::Completed,
            (true, false) => Self::Reopened,
            _ => Self::Unchanged,
        }
    }

    /// Signed XP for this change given the quest's reward
    pub fn xp_delta(&self, reward: f64) -> f64 {
        match self {
            Self::Completed => reward,
            Self::Reopened => -reward,
            Self::Unchanged => 0.0,
        }
    }
}

/// A unit of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    #[serde(default = "new_id", deserialize_with = "lenient::id_or_new")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub text: String,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub completed: bool,
    #[serde(default, deserialize_with = "lenient::difficulty")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, deserialize_with = "lenient::quest_value")]
    pub value: QuestValue,
    #[serde(default, deserialize_with = "lenient::quest_type")]
    pub quest_type: QuestType,
    #[serde(default, deserialize_with = "lenient::skip_invalid")]
    pub objectives: Vec<Objective>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_id"
    )]
    pub chain_id: Option<String>,
    #[serde(
        default = "lenient::missing_epoch",
        deserialize_with = "lenient::timestamp_or_epoch"
    )]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient::optional_timestamp")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::optional_timestamp")]
    pub due_date: Option<DateTime<Utc>>,
}

impl Quest {
    /// Build a new, incomplete quest from user input.
    ///
    /// Supplied objectives start incomplete so creation never counts as a
    /// completion.
    pub fn new(input: QuestInput, now: DateTime<Utc>) -> Result<Self> {
        let mut objectives = input.objectives;
        for objective in &mut objectives {
            objective.completed = false;
        }
        Ok(Self {
            id: new_id(),
            text: require_name("Quest name", &input.text)?,
            completed: false,
            difficulty: input.difficulty,
            value: input.value,
            quest_type: input.quest_type,
            objectives,
            chain_id: input.chain_id.filter(|id| !id.is_empty()),
            created_at: now,
            completed_at: None,
            due_date: input.due_date,
        })
    }

    /// XP granted for completing this quest: (value + difficulty) * difficulty
    pub fn xp_reward(&self) -> f64 {
        let difficulty = self.difficulty.map(|d| d.value()).unwrap_or(0.0);
        (self.value.value() as f64 + difficulty) * difficulty
    }

    /// Completion implied by the objectives, if there are any
    pub fn derived_completion(&self) -> Option<bool> {
        if self.objectives.is_empty() {
            None
        } else {
            Some(self.objectives.iter().all(|o| o.completed))
        }
    }

    /// Percentage of completed objectives, 0 when there are none
    pub fn objective_progress(&self) -> u8 {
        if self.objectives.is_empty() {
            return 0;
        }
        let done = self.objectives.iter().filter(|o| o.completed).count();
        (done as f64 / self.objectives.len() as f64 * 100.0).round() as u8
    }

    /// Progress shown for the quest: objective progress, or 0/100 without objectives
    pub fn progress_percent(&self) -> u8 {
        match self.derived_completion() {
            Some(_) => self.objective_progress(),
            None if self.completed => 100,
            None => 0,
        }
    }

    /// Flip the whole quest, forcing every objective to match
    pub(crate) fn toggle(&mut self, now: DateTime<Utc>) -> CompletionChange {
        let completing = !self.completed;
        for objective in &mut self.objectives {
            objective.completed = completing;
        }
        self.completed = completing;
        self.completed_at = if completing { Some(now) } else { None };
        CompletionChange::between(!completing, completing)
    }

    /// Re-derive completion from the objectives after a structural change.
    ///
    /// A quest without objectives keeps its own flag. `completed_at` keeps a
    /// prior value when the quest stays or becomes complete.
    pub(crate) fn reconcile(&mut self, now: DateTime<Utc>) -> CompletionChange {
        let before = self.completed;
        if let Some(all_done) = self.derived_completion() {
            self.completed = all_done;
        }
        self.completed_at = if self.completed {
            Some(self.completed_at.unwrap_or(now))
        } else {
            None
        };
        CompletionChange::between(before, self.completed)
    }

    /// Replace every mutable field from user input
    pub(crate) fn apply_edit(&mut self, input: QuestInput, now: DateTime<Utc>) -> Result<CompletionChange> {
        self.text = require_name("Quest name", &input.text)?;
        self.difficulty = input.difficulty;
        self.value = input.value;
        self.quest_type = input.quest_type;
        self.objectives = input.objectives;
        self.chain_id = input.chain_id.filter(|id| !id.is_empty());
        self.due_date = input.due_date;
        Ok(self.reconcile(now))
    }
}

/// User-supplied quest fields, used for both add and edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestInput {
    pub text: String,
    pub difficulty: Option<Difficulty>,
    pub value: QuestValue,
    pub quest_type: QuestType,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    pub chain_id: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl QuestInput {
    /// Default difficulty for new quests
    pub const DEFAULT_DIFFICULTY: f64 = 2.5;
    /// Default value for new quests
    pub const DEFAULT_VALUE: u8 = 2;

    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            difficulty: Some(Difficulty::new(Self::DEFAULT_DIFFICULTY)),
            value: QuestValue::new(Self::DEFAULT_VALUE),
            quest_type: QuestType::Side,
            objectives: Vec::new(),
            chain_id: None,
            due_date: None,
        }
    }

    pub fn with_difficulty(mut self, difficulty: f64) -> Self {
        self.difficulty = Some(Difficulty::new(difficulty));
        self
    }

    pub fn with_value(mut self, value: u8) -> Self {
        self.value = QuestValue::new(value);
        self
    }

    pub fn with_type(mut self, quest_type: QuestType) -> Self {
        self.quest_type = quest_type;
        self
    }

    pub fn with_chain(mut self, chain_id: &str) -> Self {
        self.chain_id = Some(chain_id.to_string());
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objectives.push(objective);
        self
    }
}

impl From<&Quest> for QuestInput {
    fn from(quest: &Quest) -> Self {
        Self {
            text: quest.text.clone(),
            difficulty: quest.difficulty,
            value: quest.value,
            quest_type: quest.quest_type,
            objectives: quest.objectives.clone(),
            chain_id: quest.chain_id.clone(),
            due_date: quest.due_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objective(done: bool) -> Objective {
        let mut o = Objective::new("step").unwrap();
        o.completed = done;
        o
    }

    #[test]
    fn test_difficulty_clamp_and_snap() {
        assert_eq!(Difficulty::new(2.5).value(), 2.5);
        assert_eq!(Difficulty::new(2.3).value(), 2.5);
        assert_eq!(Difficulty::new(2.2).value(), 2.0);
        assert_eq!(Difficulty::new(9.0).value(), 4.0);
        assert_eq!(Difficulty::new(-1.0).value(), 0.0);
        assert_eq!(Difficulty::new(f64::NAN).value(), 0.0);
    }

    #[test]
    fn test_value_clamp() {
        assert_eq!(QuestValue::new(7).value(), 4);
        assert_eq!(QuestValue::from(2.6).value(), 3);
        assert_eq!(QuestValue::from(-3.0).value(), 0);
    }

    #[test]
    fn test_quest_type_parse_and_rank() {
        assert_eq!("MAIN".parse::<QuestType>().unwrap(), QuestType::Main);
        assert!("epic".parse::<QuestType>().is_err());
        assert!(QuestType::Main.rank() < QuestType::Side.rank());
        assert!(QuestType::Side.rank() < QuestType::Extra.rank());
    }

    #[test]
    fn test_xp_reward_formula() {
        let quest = Quest::new(
            QuestInput::new("Slay").with_value(2).with_difficulty(3.0),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(quest.xp_reward(), 15.0);

        let mut no_difficulty = quest.clone();
        no_difficulty.difficulty = None;
        assert_eq!(no_difficulty.xp_reward(), 0.0);
    }

    #[test]
    fn test_new_quest_requires_name() {
        assert!(Quest::new(QuestInput::new("  "), Utc::now()).is_err());
    }

    #[test]
    fn test_new_quest_starts_incomplete() {
        let quest = Quest::new(
            QuestInput::new("Prepared")
                .with_objective(objective(true))
                .with_objective(objective(true)),
            Utc::now(),
        )
        .unwrap();
        assert!(!quest.completed);
        assert_eq!(quest.completed_at, None);
        assert!(quest.objectives.iter().all(|o| !o.completed));
    }

    #[test]
    fn test_toggle_forces_objectives() {
        let now = Utc::now();
        let mut quest = Quest::new(
            QuestInput::new("Quest")
                .with_objective(objective(true))
                .with_objective(objective(false)),
            now,
        )
        .unwrap();

        assert_eq!(quest.toggle(now), CompletionChange::Completed);
        assert!(quest.objectives.iter().all(|o| o.completed));
        assert_eq!(quest.completed_at, Some(now));

        assert_eq!(quest.toggle(now), CompletionChange::Reopened);
        assert!(quest.objectives.iter().all(|o| !o.completed));
        assert_eq!(quest.completed_at, None);
    }

    #[test]
    fn test_reconcile_preserves_prior_completed_at() {
        let earlier = Utc::now() - chrono::Duration::days(1);
        let mut quest = Quest::new(QuestInput::new("Quest").with_objective(objective(false)), earlier)
            .unwrap();
        assert_eq!(quest.toggle(earlier), CompletionChange::Completed);
        assert_eq!(quest.reconcile(Utc::now()), CompletionChange::Unchanged);
        assert_eq!(quest.completed_at, Some(earlier));
    }

    #[test]
    fn test_objective_progress() {
        let mut quest = Quest::new(QuestInput::new("Quest"), Utc::now()).unwrap();
        assert_eq!(quest.objective_progress(), 0);
        assert_eq!(quest.progress_percent(), 0);

        quest.objectives = vec![objective(true), objective(false), objective(false)];
        assert_eq!(quest.objective_progress(), 33);
        assert_eq!(quest.progress_percent(), 33);
    }

    #[test]
    fn test_completion_change_delta() {
        assert_eq!(CompletionChange::Completed.xp_delta(15.0), 15.0);
        assert_eq!(CompletionChange::Reopened.xp_delta(15.0), -15.0);
        assert_eq!(CompletionChange::Unchanged.xp_delta(15.0), 0.0);
    }
}
