//! Quest chains: named groupings of quests.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{require_name, Result};
use crate::lenient;
use crate::new_id;
use crate::quest::{Difficulty, QuestValue};

/// Display name of the pseudo-chain holding quests without a chain
pub const SIDE_QUESTS_NAME: &str = "Side Quests";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestChain {
    #[serde(default = "new_id", deserialize_with = "lenient::id_or_new")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::difficulty")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, deserialize_with = "lenient::optional_quest_value")]
    pub value: Option<QuestValue>,
    #[serde(
        default = "lenient::missing_now",
        deserialize_with = "lenient::timestamp_or_now"
    )]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient::optional_timestamp")]
    pub due_date: Option<DateTime<Utc>>,
}

impl QuestChain {
    pub fn new(input: ChainInput, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            id: new_id(),
            name: require_name("Chain name", &input.name)?,
            difficulty: input.difficulty,
            value: input.value,
            created_at: now,
            due_date: input.due_date,
        })
    }

    pub(crate) fn apply_edit(&mut self, input: ChainInput) -> Result<()> {
        self.name = require_name("Chain name", &input.name)?;
        self.difficulty = input.difficulty;
        self.value = input.value;
        self.due_date = input.due_date;
        Ok(())
    }

    /// Deadline status relative to `today`
    pub fn due_status(&self, today: NaiveDate) -> DueStatus {
        DueStatus::from_due(self.due_date, today)
    }
}

/// User-supplied chain fields, used for both add and edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInput {
    pub name: String,
    pub difficulty: Option<Difficulty>,
    pub value: Option<QuestValue>,
    pub due_date: Option<DateTime<Utc>>,
}

impl ChainInput {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            difficulty: None,
            value: None,
            due_date: None,
        }
    }

    pub fn with_difficulty(mut self, difficulty: f64) -> Self {
        self.difficulty = Some(Difficulty::new(difficulty));
        self
    }

    pub fn with_value(mut self, value: u8) -> Self {
        self.value = Some(QuestValue::new(value));
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }
}

impl From<&QuestChain> for ChainInput {
    fn from(chain: &QuestChain) -> Self {
        Self {
            name: chain.name.clone(),
            difficulty: chain.difficulty,
            value: chain.value,
            due_date: chain.due_date,
        }
    }
}

/// How a chain stands against its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "days", rename_all = "snake_case")]
pub enum DueStatus {
    /// No deadline
    FreePlay,
    DueToday,
    /// Whole days left
    Remaining(i64),
    /// Whole days past the deadline
    Overdue(i64),
}

impl DueStatus {
    /// Compare calendar days of a deadline against today
    pub fn from_due(due: Option<DateTime<Utc>>, today: NaiveDate) -> Self {
        let Some(due) = due else {
            return Self::FreePlay;
        };
        let days = (due.date_naive() - today).num_days();
        match days {
            d if d < 0 => Self::Overdue(-d),
            0 => Self::DueToday,
            d => Self::Remaining(d),
        }
    }

    pub fn is_overdue(&self) -> bool {
        matches!(self, Self::Overdue(_))
    }
}

impl fmt::Display for DueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FreePlay => write!(f, "Free Play!"),
            Self::DueToday => write!(f, "Due today"),
            Self::Remaining(days) => write!(f, "{} days remaining", days),
            Self::Overdue(days) => write!(f, "{} days overdue", days),
        }
    }
}
