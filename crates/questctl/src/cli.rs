//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap.
//! Keeps argument parsing separate from execution logic.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use quest_common::lenient::parse_timestamp;
use quest_common::{QuestFilter, QuestSort, QuestType};
use std::path::PathBuf;

/// Questlog CLI
#[derive(Debug, Parser)]
#[command(name = "questctl")]
#[command(about = "Questlog - quests, chains and a character that levels up", long_about = None)]
#[command(version = env!("QUESTCTL_VERSION"))]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Data file (overrides $QUESTLOG_DATA and the config file)
    #[arg(long, global = true, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the character: level, XP and time on the road
    Status,

    /// Progress per quest chain and for side quests
    Summary,

    /// Manage quests
    Quest {
        #[command(subcommand)]
        action: QuestCommands,
    },

    /// Manage quest objectives
    Objective {
        #[command(subcommand)]
        action: ObjectiveCommands,
    },

    /// Manage quest chains
    Chain {
        #[command(subcommand)]
        action: ChainCommands,
    },

    /// Capture and manage ideas
    Idea {
        #[command(subcommand)]
        action: IdeaCommands,
    },

    /// Change the character's title or avatar
    Character {
        #[command(subcommand)]
        action: CharacterCommands,
    },

    /// Write a dated snapshot of the whole quest log
    Export {
        /// Target file or directory (default: current directory)
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub enum QuestCommands {
    /// Add a new quest
    Add {
        /// Quest name
        text: String,

        #[command(flatten)]
        fields: QuestFields,

        /// Objective to add (repeatable)
        #[arg(long = "objective", value_name = "TEXT")]
        objectives: Vec<String>,
    },

    /// Edit a quest; omitted fields keep their value
    Edit {
        /// Quest id or unique prefix
        id: String,

        /// New quest name
        #[arg(long)]
        text: Option<String>,

        #[command(flatten)]
        fields: QuestFields,

        /// Remove the quest from its chain
        #[arg(long, conflicts_with = "chain")]
        no_chain: bool,

        /// Clear the due date
        #[arg(long, conflicts_with = "due")]
        no_due: bool,
    },

    /// Complete or re-open a quest
    Toggle {
        /// Quest id or unique prefix
        id: String,
    },

    /// Delete a quest
    Rm {
        /// Quest id or unique prefix
        id: String,
    },

    /// List quests
    List {
        /// all, completed, active, chained, side or extra
        #[arg(long, default_value = "all", value_parser = parse_filter)]
        filter: QuestFilter,

        /// difficulty, due-date or quest-type
        #[arg(long, value_parser = parse_sort)]
        sort: Option<QuestSort>,
    },
}

/// Quest fields shared by add and edit
#[derive(Debug, Args)]
pub struct QuestFields {
    /// Difficulty 0-4 in half steps
    #[arg(long)]
    pub difficulty: Option<f64>,

    /// Value 0-4
    #[arg(long)]
    pub value: Option<u8>,

    /// main, side or extra
    #[arg(long = "type", value_parser = parse_quest_type)]
    pub quest_type: Option<QuestType>,

    /// Chain id or unique prefix
    #[arg(long)]
    pub chain: Option<String>,

    /// Due date (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_parser = parse_date)]
    pub due: Option<DateTime<Utc>>,
}

#[derive(Debug, Subcommand)]
pub enum ObjectiveCommands {
    /// Append an objective to a quest
    Add {
        /// Quest id or unique prefix
        quest: String,
        /// Objective text
        text: String,
    },

    /// Complete or re-open an objective
    Toggle {
        /// Quest id or unique prefix
        quest: String,
        /// Objective id, unique prefix, or 1-based position
        objective: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ChainCommands {
    /// Add a new quest chain
    Add {
        /// Chain name
        name: String,

        #[command(flatten)]
        fields: ChainFields,
    },

    /// Edit a chain; omitted fields keep their value
    Edit {
        /// Chain id or unique prefix
        id: String,

        /// New chain name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: ChainFields,

        /// Clear the due date
        #[arg(long, conflicts_with = "due")]
        no_due: bool,
    },

    /// Delete a chain; its quests become side quests
    Rm {
        /// Chain id or unique prefix
        id: String,
    },

    /// List chains with their progress
    List,
}

/// Chain fields shared by add and edit
#[derive(Debug, Args)]
pub struct ChainFields {
    /// Difficulty 0-4 in half steps
    #[arg(long)]
    pub difficulty: Option<f64>,

    /// Value 0-4
    #[arg(long)]
    pub value: Option<u8>,

    /// Due date (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_parser = parse_date)]
    pub due: Option<DateTime<Utc>>,
}

#[derive(Debug, Subcommand)]
pub enum IdeaCommands {
    /// Capture an idea
    Add {
        /// Idea name
        name: String,

        /// Longer description
        #[arg(long, short, default_value = "")]
        description: String,
    },

    /// Edit an idea
    Edit {
        /// Idea id or unique prefix
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, short)]
        description: Option<String>,
    },

    /// Delete an idea
    Rm {
        /// Idea id or unique prefix
        id: String,
    },

    /// List ideas
    List,
}

#[derive(Debug, Subcommand)]
pub enum CharacterCommands {
    /// Set the character's title
    Title {
        title: String,
    },

    /// Pick an avatar, or cycle to the next one when no name is given
    Avatar {
        name: Option<String>,
    },
}

fn parse_filter(raw: &str) -> Result<QuestFilter, String> {
    raw.parse().map_err(|e: quest_common::QuestError| e.to_string())
}

fn parse_sort(raw: &str) -> Result<QuestSort, String> {
    raw.parse().map_err(|e: quest_common::QuestError| e.to_string())
}

fn parse_quest_type(raw: &str) -> Result<QuestType, String> {
    raw.parse().map_err(|e: quest_common::QuestError| e.to_string())
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw).ok_or_else(|| format!("invalid date '{}' (expected YYYY-MM-DD)", raw))
}
