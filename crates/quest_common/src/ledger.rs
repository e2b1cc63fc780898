//! Quest Ledger
//!
//! Owns the quest and quest-chain collections. Mutations report completion
//! transitions and XP deltas; they never touch the character or the disk.
//!
//! ## Aggregates
//!
//! - Per chain, or for the side-quest pseudo-group: total, completed,
//!   progress %, total value, average difficulty
//! - Filtering: all | completed | active | chained | side | extra
//! - Sorting: difficulty (desc), due date (asc, undated last), quest type

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::chain::{ChainInput, QuestChain};
use crate::error::{QuestError, Result};
use crate::lenient;
use crate::quest::{CompletionChange, Objective, Quest, QuestInput, QuestType};

// ============================================================================
// Filtering and sorting
// ============================================================================

/// Which quests to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuestFilter {
    #[default]
    All,
    Completed,
    Active,
    Chained,
    Side,
    Extra,
}

impl QuestFilter {
    pub const ALL: [QuestFilter; 6] = [
        Self::All,
        Self::Completed,
        Self::Active,
        Self::Chained,
        Self::Side,
        Self::Extra,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Active => "active",
            Self::Chained => "chained",
            Self::Side => "side",
            Self::Extra => "extra",
        }
    }

    pub fn matches(&self, quest: &Quest) -> bool {
        match self {
            Self::All => true,
            Self::Completed => quest.completed,
            Self::Active => !quest.completed,
            Self::Chained => quest.chain_id.is_some(),
            Self::Side => quest.chain_id.is_none(),
            Self::Extra => quest.quest_type == QuestType::Extra,
        }
    }
}

impl FromStr for QuestFilter {
    type Err = QuestError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| QuestError::Validation(format!("unknown filter '{}'", s)))
    }
}

impl fmt::Display for QuestFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort key for quest listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum QuestSort {
    /// Hardest first
    #[default]
    Difficulty,
    /// Soonest first, undated last
    DueDate,
    /// main, then side, then extra
    QuestType,
}

impl QuestSort {
    pub const ALL: [QuestSort; 3] = [Self::Difficulty, Self::DueDate, Self::QuestType];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Difficulty => "difficulty",
            Self::DueDate => "dueDate",
            Self::QuestType => "questType",
        }
    }

    pub fn compare(&self, a: &Quest, b: &Quest) -> Ordering {
        match self {
            Self::Difficulty => {
                let da = a.difficulty.map(|d| d.value()).unwrap_or(-1.0);
                let db = b.difficulty.map(|d| d.value()).unwrap_or(-1.0);
                db.total_cmp(&da)
            }
            Self::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::QuestType => a.quest_type.rank().cmp(&b.quest_type.rank()),
        }
    }

    /// Stable sort in place
    pub fn sort(&self, quests: &mut [&Quest]) {
        quests.sort_by(|a, b| self.compare(a, b));
    }
}

impl FromStr for QuestSort {
    type Err = QuestError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().replace(['-', '_'], "");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| QuestError::Validation(format!("unknown sort key '{}'", s)))
    }
}

impl fmt::Display for QuestSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Aggregates
// ============================================================================

/// Derived numbers for a group of quests
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestSummary {
    pub total: usize,
    pub completed: usize,
    /// round(100 * completed / total), 0 for an empty group
    pub progress_percent: u8,
    pub total_value: u32,
    /// Mean over quests that define a difficulty, 0 if none do
    pub average_difficulty: f64,
}

impl QuestSummary {
    pub fn from_quests<'a>(quests: impl IntoIterator<Item = &'a Quest>) -> Self {
        let mut summary = Self::default();
        let mut difficulty_sum = 0.0;
        let mut rated = 0usize;

        for quest in quests {
            summary.total += 1;
            if quest.completed {
                summary.completed += 1;
            }
            summary.total_value += quest.value.value() as u32;
            if let Some(d) = quest.difficulty {
                difficulty_sum += d.value();
                rated += 1;
            }
        }

        if summary.total > 0 {
            summary.progress_percent =
                (summary.completed as f64 / summary.total as f64 * 100.0).round() as u8;
        }
        if rated > 0 {
            summary.average_difficulty = difficulty_sum / rated as f64;
        }
        summary
    }
}

/// Result of appending an objective to a quest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectiveAdded {
    pub objective_id: String,
    pub change: CompletionChange,
}

// ============================================================================
// Ledger
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestLedger {
    #[serde(default, deserialize_with = "lenient::skip_invalid")]
    pub quests: Vec<Quest>,
    #[serde(default, deserialize_with = "lenient::skip_invalid")]
    pub quest_chains: Vec<QuestChain>,
}

impl QuestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quest(&self, id: &str) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == id)
    }

    fn quest_mut(&mut self, id: &str) -> Option<&mut Quest> {
        self.quests.iter_mut().find(|q| q.id == id)
    }

    pub fn chain(&self, id: &str) -> Option<&QuestChain> {
        self.quest_chains.iter().find(|c| c.id == id)
    }

    fn check_chain(&self, chain_id: Option<&str>) -> Result<()> {
        match chain_id {
            Some(id) if !id.is_empty() && self.chain(id).is_none() => Err(
                QuestError::Validation(format!("no quest chain with id '{}'", id)),
            ),
            _ => Ok(()),
        }
    }

    /// Append a new quest. No XP is granted on creation.
    pub fn add_quest(&mut self, input: QuestInput) -> Result<String> {
        self.check_chain(input.chain_id.as_deref())?;
        let quest = Quest::new(input, Utc::now())?;
        let id = quest.id.clone();
        debug!(quest_id = %id, text = %quest.text, "Quest added");
        self.quests.push(quest);
        Ok(id)
    }

    /// Flip a quest's completion and return the XP delta.
    ///
    /// Completing grants `(value + difficulty) * difficulty`, re-opening takes
    /// the same amount back, both computed from the current fields. `None`
    /// when the id is unknown.
    pub fn toggle_quest(&mut self, id: &str) -> Option<f64> {
        let quest = self.quest_mut(id)?;
        let change = quest.toggle(Utc::now());
        let delta = change.xp_delta(quest.xp_reward());
        debug!(quest_id = %id, completed = quest.completed, delta, "Quest toggled");
        Some(delta)
    }

    /// Flip one objective and re-derive the parent quest's completion.
    ///
    /// Returns how the parent moved; XP is left to the caller.
    pub fn toggle_objective(&mut self, quest_id: &str, objective_id: &str) -> Option<CompletionChange> {
        let quest = self.quest_mut(quest_id)?;
        let objective = quest.objectives.iter_mut().find(|o| o.id == objective_id)?;
        objective.completed = !objective.completed;
        let change = quest.reconcile(Utc::now());
        debug!(quest_id, objective_id, ?change, "Objective toggled");
        Some(change)
    }

    /// Append an incomplete objective, which re-opens a completed quest
    pub fn add_objective(&mut self, quest_id: &str, text: &str) -> Result<Option<ObjectiveAdded>> {
        let objective = Objective::new(text)?;
        let Some(quest) = self.quest_mut(quest_id) else {
            return Ok(None);
        };
        let objective_id = objective.id.clone();
        quest.objectives.push(objective);
        let change = quest.reconcile(Utc::now());
        Ok(Some(ObjectiveAdded {
            objective_id,
            change,
        }))
    }

    /// Replace every mutable field except `id` and `createdAt`
    pub fn edit_quest(&mut self, id: &str, input: QuestInput) -> Result<Option<CompletionChange>> {
        self.check_chain(input.chain_id.as_deref())?;
        let Some(quest) = self.quest_mut(id) else {
            return Ok(None);
        };
        let change = quest.apply_edit(input, Utc::now())?;
        debug!(quest_id = %id, ?change, "Quest edited");
        Ok(Some(change))
    }

    /// Remove a quest; nothing cascades
    pub fn delete_quest(&mut self, id: &str) -> Option<Quest> {
        let index = self.quests.iter().position(|q| q.id == id)?;
        let quest = self.quests.remove(index);
        debug!(quest_id = %id, "Quest deleted");
        Some(quest)
    }

    pub fn add_chain(&mut self, input: ChainInput) -> Result<String> {
        let chain = QuestChain::new(input, Utc::now())?;
        let id = chain.id.clone();
        debug!(chain_id = %id, name = %chain.name, "Chain added");
        self.quest_chains.push(chain);
        Ok(id)
    }

    /// Replace a chain's fields in place; `false` when the id is unknown
    pub fn edit_chain(&mut self, id: &str, input: ChainInput) -> Result<bool> {
        match self.quest_chains.iter_mut().find(|c| c.id == id) {
            Some(chain) => {
                chain.apply_edit(input)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove a chain and demote its quests to side quests.
    ///
    /// Returns the number of demoted quests, `None` when the id is unknown.
    pub fn delete_chain(&mut self, id: &str) -> Option<usize> {
        let index = self.quest_chains.iter().position(|c| c.id == id)?;
        self.quest_chains.remove(index);

        let mut demoted = 0;
        for quest in self.quests.iter_mut() {
            if quest.chain_id.as_deref() == Some(id) {
                quest.chain_id = None;
                demoted += 1;
            }
        }
        debug!(chain_id = %id, demoted, "Chain deleted");
        Some(demoted)
    }

    /// Quests of a chain, or the side quests for `None`
    pub fn quests_in(&self, chain_id: Option<&str>) -> impl Iterator<Item = &Quest> + '_ {
        let chain_id = chain_id.map(str::to_string);
        self.quests
            .iter()
            .filter(move |q| q.chain_id.as_deref() == chain_id.as_deref())
    }

    /// Summary of one chain, or of the side quests for `None`
    pub fn aggregate(&self, chain_id: Option<&str>) -> QuestSummary {
        QuestSummary::from_quests(self.quests_in(chain_id))
    }

    /// Summary over every quest
    pub fn overall(&self) -> QuestSummary {
        QuestSummary::from_quests(&self.quests)
    }

    pub fn filter(&self, filter: QuestFilter) -> Vec<&Quest> {
        self.quests.iter().filter(|q| filter.matches(q)).collect()
    }

    /// Filter, then optionally sort (insertion order otherwise)
    pub fn view(&self, filter: QuestFilter, sort: Option<QuestSort>) -> Vec<&Quest> {
        let mut quests = self.filter(filter);
        if let Some(key) = sort {
            key.sort(&mut quests);
        }
        quests
    }

    /// Restore invariants on data read from disk; returns the number of fixes
    pub(crate) fn repair(&mut self) -> usize {
        let chain_ids: Vec<String> = self.quest_chains.iter().map(|c| c.id.clone()).collect();
        let mut fixes = 0;

        for quest in self.quests.iter_mut() {
            if let Some(chain_id) = &quest.chain_id {
                if !chain_ids.contains(chain_id) {
                    warn!(quest_id = %quest.id, %chain_id, "Quest references a missing chain, demoting to side quest");
                    quest.chain_id = None;
                    fixes += 1;
                }
            }

            if let Some(all_done) = quest.derived_completion() {
                if quest.completed != all_done {
                    warn!(quest_id = %quest.id, "Quest completion disagrees with its objectives, re-deriving");
                    quest.completed = all_done;
                    fixes += 1;
                }
            }

            if !quest.completed && quest.completed_at.is_some() {
                warn!(quest_id = %quest.id, "Quest is not completed but has completedAt, clearing it");
                quest.completed_at = None;
                fixes += 1;
            }
        }
        fixes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ledger_with(texts: &[&str]) -> (QuestLedger, Vec<String>) {
        let mut ledger = QuestLedger::new();
        let ids = texts
            .iter()
            .map(|t| ledger.add_quest(QuestInput::new(t)).unwrap())
            .collect();
        (ledger, ids)
    }

    #[test]
    fn test_add_quest_starts_incomplete() {
        let (ledger, ids) = ledger_with(&["Find the sword"]);
        let quest = ledger.quest(&ids[0]).unwrap();
        assert!(!quest.completed);
        assert!(quest.completed_at.is_none());
        assert_eq!(quest.text, "Find the sword");
    }

    #[test]
    fn test_add_quest_rejects_unknown_chain() {
        let mut ledger = QuestLedger::new();
        let result = ledger.add_quest(QuestInput::new("Orphan").with_chain("missing"));
        assert!(matches!(result, Err(QuestError::Validation(_))));
        assert!(ledger.quests.is_empty());
    }

    #[test]
    fn test_toggle_quest_xp_round_trip() {
        let mut ledger = QuestLedger::new();
        let id = ledger
            .add_quest(QuestInput::new("Dragon").with_value(2).with_difficulty(3.0))
            .unwrap();

        let gain = ledger.toggle_quest(&id).unwrap();
        assert_eq!(gain, 15.0);
        assert!(ledger.quest(&id).unwrap().completed);
        assert!(ledger.quest(&id).unwrap().completed_at.is_some());

        let loss = ledger.toggle_quest(&id).unwrap();
        assert_eq!(loss, -15.0);
        assert_eq!(gain + loss, 0.0);
        let quest = ledger.quest(&id).unwrap();
        assert!(!quest.completed);
        assert!(quest.completed_at.is_none());
    }

    #[test]
    fn test_toggle_uses_current_values() {
        let mut ledger = QuestLedger::new();
        let id = ledger
            .add_quest(QuestInput::new("Shifting").with_value(1).with_difficulty(1.0))
            .unwrap();
        assert_eq!(ledger.toggle_quest(&id), Some(2.0));

        let input = QuestInput::from(ledger.quest(&id).unwrap()).with_value(4);
        ledger.edit_quest(&id, input).unwrap();
        assert_eq!(ledger.toggle_quest(&id), Some(-5.0));
    }

    #[test]
    fn test_toggle_unknown_is_noop() {
        let (mut ledger, _) = ledger_with(&["a"]);
        let before = ledger.clone();
        assert_eq!(ledger.toggle_quest("nope"), None);
        assert_eq!(ledger.toggle_objective("nope", "x"), None);
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_objectives_drive_completion() {
        let mut ledger = QuestLedger::new();
        let input = QuestInput::new("Three steps")
            .with_objective(Objective::new("one").unwrap())
            .with_objective(Objective::new("two").unwrap())
            .with_objective(Objective::new("three").unwrap());
        let id = ledger.add_quest(input).unwrap();
        let objective_ids: Vec<String> = ledger
            .quest(&id)
            .unwrap()
            .objectives
            .iter()
            .map(|o| o.id.clone())
            .collect();

        assert_eq!(ledger.toggle_objective(&id, &objective_ids[0]), Some(CompletionChange::Unchanged));
        assert_eq!(ledger.toggle_objective(&id, &objective_ids[1]), Some(CompletionChange::Unchanged));
        assert!(!ledger.quest(&id).unwrap().completed);
        assert!(ledger.quest(&id).unwrap().completed_at.is_none());

        assert_eq!(ledger.toggle_objective(&id, &objective_ids[2]), Some(CompletionChange::Completed));
        let quest = ledger.quest(&id).unwrap();
        assert!(quest.completed);
        assert!(quest.completed_at.is_some());

        assert_eq!(ledger.toggle_objective(&id, &objective_ids[0]), Some(CompletionChange::Reopened));
        assert!(ledger.quest(&id).unwrap().completed_at.is_none());
    }

    #[test]
    fn test_add_objective_reopens_quest() {
        let (mut ledger, ids) = ledger_with(&["Done already"]);
        ledger.toggle_quest(&ids[0]);

        let added = ledger.add_objective(&ids[0], "one more thing").unwrap().unwrap();
        assert_eq!(added.change, CompletionChange::Reopened);
        let quest = ledger.quest(&ids[0]).unwrap();
        assert!(!quest.completed);
        assert_eq!(quest.objectives.len(), 1);
        assert_eq!(quest.objectives[0].id, added.objective_id);

        assert!(ledger.add_objective("missing", "x").unwrap().is_none());
        assert!(ledger.add_objective(&ids[0], "   ").is_err());
    }

    #[test]
    fn test_edit_quest_keeps_identity() {
        let (mut ledger, ids) = ledger_with(&["Old"]);
        let created = ledger.quest(&ids[0]).unwrap().created_at;

        let changed = ledger
            .edit_quest(&ids[0], QuestInput::new("New").with_type(QuestType::Main))
            .unwrap();
        assert_eq!(changed, Some(CompletionChange::Unchanged));

        let quest = ledger.quest(&ids[0]).unwrap();
        assert_eq!(quest.id, ids[0]);
        assert_eq!(quest.created_at, created);
        assert_eq!(quest.text, "New");
        assert_eq!(quest.quest_type, QuestType::Main);

        assert_eq!(ledger.edit_quest("missing", QuestInput::new("x")).unwrap(), None);
    }

    #[test]
    fn test_delete_quest() {
        let (mut ledger, ids) = ledger_with(&["a", "b"]);
        assert_eq!(ledger.delete_quest(&ids[0]).unwrap().text, "a");
        assert!(ledger.delete_quest(&ids[0]).is_none());
        assert_eq!(ledger.quests.len(), 1);
    }

    #[test]
    fn test_delete_chain_demotes_quests() {
        let mut ledger = QuestLedger::new();
        let chain = ledger.add_chain(ChainInput::new("Story")).unwrap();
        let a = ledger.add_quest(QuestInput::new("a").with_chain(&chain)).unwrap();
        let b = ledger.add_quest(QuestInput::new("b").with_chain(&chain)).unwrap();
        let c = ledger.add_quest(QuestInput::new("c")).unwrap();

        assert_eq!(ledger.delete_chain(&chain), Some(2));
        assert!(ledger.chain(&chain).is_none());
        assert_eq!(ledger.quests.len(), 3);
        for id in [&a, &b, &c] {
            assert!(ledger.quest(id).unwrap().chain_id.is_none());
        }
        assert_eq!(ledger.delete_chain(&chain), None);
    }

    #[test]
    fn test_edit_chain() {
        let mut ledger = QuestLedger::new();
        let chain = ledger.add_chain(ChainInput::new("Story")).unwrap();
        assert!(ledger.edit_chain(&chain, ChainInput::new("Saga")).unwrap());
        assert_eq!(ledger.chain(&chain).unwrap().name, "Saga");
        assert!(!ledger.edit_chain("missing", ChainInput::new("x")).unwrap());
        assert!(ledger.edit_chain(&chain, ChainInput::new("")).is_err());
    }

    #[test]
    fn test_side_quest_aggregate() {
        let (mut ledger, ids) = ledger_with(&["a", "b", "c"]);
        ledger.toggle_quest(&ids[0]);

        let summary = ledger.aggregate(None);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.progress_percent, 33);
        assert_eq!(summary.total_value, 6);
        assert_eq!(summary.average_difficulty, 2.5);
    }

    #[test]
    fn test_chain_aggregate() {
        let mut ledger = QuestLedger::new();
        let chain = ledger.add_chain(ChainInput::new("Story")).unwrap();
        let a = ledger
            .add_quest(QuestInput::new("a").with_chain(&chain).with_difficulty(1.0).with_value(1))
            .unwrap();
        ledger
            .add_quest(QuestInput::new("b").with_chain(&chain).with_difficulty(4.0).with_value(3))
            .unwrap();
        let mut unrated = QuestInput::new("c").with_chain(&chain);
        unrated.difficulty = None;
        ledger.add_quest(unrated).unwrap();
        ledger.add_quest(QuestInput::new("side")).unwrap();
        ledger.toggle_quest(&a);

        let summary = ledger.aggregate(Some(&chain));
        assert_eq!(summary.total, 3);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.progress_percent, 33);
        assert_eq!(summary.total_value, 1 + 3 + 2);
        assert_eq!(summary.average_difficulty, 2.5);

        assert_eq!(ledger.overall().total, 4);
    }

    #[test]
    fn test_empty_aggregate() {
        let ledger = QuestLedger::new();
        let summary = ledger.aggregate(Some("nothing"));
        assert_eq!(summary, QuestSummary::default());
        assert_eq!(summary.progress_percent, 0);
        assert_eq!(summary.average_difficulty, 0.0);
    }

    #[test]
    fn test_filters() {
        let mut ledger = QuestLedger::new();
        let chain = ledger.add_chain(ChainInput::new("Story")).unwrap();
        let done = ledger.add_quest(QuestInput::new("done")).unwrap();
        ledger.add_quest(QuestInput::new("chained").with_chain(&chain)).unwrap();
        ledger
            .add_quest(QuestInput::new("extra").with_type(QuestType::Extra))
            .unwrap();
        ledger.toggle_quest(&done);

        let texts = |f: QuestFilter| -> Vec<String> {
            ledger.filter(f).iter().map(|q| q.text.clone()).collect()
        };
        assert_eq!(texts(QuestFilter::All).len(), 3);
        assert_eq!(texts(QuestFilter::Completed), vec!["done"]);
        assert_eq!(texts(QuestFilter::Active), vec!["chained", "extra"]);
        assert_eq!(texts(QuestFilter::Chained), vec!["chained"]);
        assert_eq!(texts(QuestFilter::Side), vec!["done", "extra"]);
        assert_eq!(texts(QuestFilter::Extra), vec!["extra"]);
    }

    #[test]
    fn test_sort_due_date_undated_last() {
        let mut ledger = QuestLedger::new();
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        ledger.add_quest(QuestInput::new("undated")).unwrap();
        ledger
            .add_quest(QuestInput::new("later").with_due_date(base + Duration::days(5)))
            .unwrap();
        ledger.add_quest(QuestInput::new("also undated")).unwrap();
        ledger
            .add_quest(QuestInput::new("sooner").with_due_date(base))
            .unwrap();

        let sorted: Vec<&str> = ledger
            .view(QuestFilter::All, Some(QuestSort::DueDate))
            .iter()
            .map(|q| q.text.as_str())
            .collect();
        assert_eq!(sorted, vec!["sooner", "later", "undated", "also undated"]);
    }

    #[test]
    fn test_sort_difficulty_desc_stable() {
        let mut ledger = QuestLedger::new();
        ledger.add_quest(QuestInput::new("easy").with_difficulty(1.0)).unwrap();
        ledger.add_quest(QuestInput::new("hard").with_difficulty(4.0)).unwrap();
        ledger.add_quest(QuestInput::new("easy too").with_difficulty(1.0)).unwrap();

        let sorted: Vec<&str> = ledger
            .view(QuestFilter::All, Some(QuestSort::Difficulty))
            .iter()
            .map(|q| q.text.as_str())
            .collect();
        assert_eq!(sorted, vec!["hard", "easy", "easy too"]);
    }

    #[test]
    fn test_sort_quest_type() {
        let mut ledger = QuestLedger::new();
        ledger.add_quest(QuestInput::new("x").with_type(QuestType::Extra)).unwrap();
        ledger.add_quest(QuestInput::new("s").with_type(QuestType::Side)).unwrap();
        ledger.add_quest(QuestInput::new("m").with_type(QuestType::Main)).unwrap();

        let sorted: Vec<&str> = ledger
            .view(QuestFilter::All, Some(QuestSort::QuestType))
            .iter()
            .map(|q| q.text.as_str())
            .collect();
        assert_eq!(sorted, vec!["m", "s", "x"]);
    }

    #[test]
    fn test_filter_and_sort_parse() {
        assert_eq!("Completed".parse::<QuestFilter>().unwrap(), QuestFilter::Completed);
        assert!("weird".parse::<QuestFilter>().is_err());
        assert_eq!("due-date".parse::<QuestSort>().unwrap(), QuestSort::DueDate);
        assert_eq!("dueDate".parse::<QuestSort>().unwrap(), QuestSort::DueDate);
        assert_eq!("quest_type".parse::<QuestSort>().unwrap(), QuestSort::QuestType);
        assert!("updatedAt".parse::<QuestSort>().is_err());
    }

    #[test]
    fn test_repair_fixes_inconsistencies() {
        let mut ledger = QuestLedger::new();
        let id = ledger.add_quest(QuestInput::new("a")).unwrap();
        {
            let quest = ledger.quests.iter_mut().find(|q| q.id == id).unwrap();
            quest.completed_at = Some(Utc::now());
            quest.chain_id = Some("gone".to_string());
        }
        assert_eq!(ledger.repair(), 2);
        let quest = ledger.quest(&id).unwrap();
        assert!(quest.completed_at.is_none());
        assert!(quest.chain_id.is_none());
        assert_eq!(ledger.repair(), 0);
    }
}
