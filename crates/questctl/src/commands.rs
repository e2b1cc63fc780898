//! Command implementations
//!
//! One invocation: load the quest log, run one command, save if it changed.

use anyhow::{Context, Result};
use chrono::Utc;
use quest_common::{
    ChainInput, Difficulty, Objective, QuestConfig, QuestInput, QuestLog, QuestStore, QuestValue,
};
use serde_json::{json, Value};
use std::path::Path;
use tracing::{debug, error};

use crate::cli::{
    ChainCommands, ChainFields, CharacterCommands, Cli, Commands, IdeaCommands, ObjectiveCommands,
    QuestCommands, QuestFields,
};
use crate::errors::{LookupError, EXIT_SUCCESS};
use crate::output::{self, ConsoleSink, Palette};
use crate::resolve::{resolve, resolve_positional, short_id};

/// Run a parsed command line against a loaded config and return the exit code
pub fn run(cli: Cli, config: &QuestConfig) -> Result<i32> {
    let path = config.data_path(cli.data.as_deref());
    debug!(path = %path.display(), "Using quest log");

    let store = QuestStore::new(&path).with_defaults(config.new_character());
    let log = store
        .load()
        .with_context(|| format!("Failed to load quest log from {}", path.display()))?;

    let palette = if cli.json {
        Palette::plain()
    } else {
        Palette::new(config.output.color)
    };

    let mut session = Session {
        store,
        log,
        palette,
        json: cli.json,
        sink: ConsoleSink::new(palette, cli.json),
    };

    if session.dispatch(cli.command)? {
        session.persist();
    }
    Ok(EXIT_SUCCESS)
}

/// State for one invocation
struct Session {
    store: QuestStore,
    log: QuestLog,
    palette: Palette,
    json: bool,
    sink: ConsoleSink,
}

impl Session {
    /// Returns true when the quest log changed
    fn dispatch(&mut self, command: Commands) -> Result<bool> {
        match command {
            Commands::Status => self.status(),
            Commands::Summary => self.summary(),
            Commands::Quest { action } => self.quest(action),
            Commands::Objective { action } => self.objective(action),
            Commands::Chain { action } => self.chain(action),
            Commands::Idea { action } => self.idea(action),
            Commands::Character { action } => self.character(action),
            Commands::Export { path } => self.export(path.as_deref()),
        }
    }

    /// Save failures are reported but do not change the outcome
    fn persist(&self) {
        if let Err(e) = self.store.save(&self.log) {
            error!(path = %self.store.path().display(), "Failed to save quest log: {}", e);
            output::display_warning(&self.palette, &format!("Changes were not saved: {}", e));
        }
    }

    fn print_json(&self, value: &Value) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Confirm a mutation in text or JSON
    fn report(&self, message: &str, mut value: Value) -> Result<()> {
        if self.json {
            value["events"] = serde_json::to_value(&self.sink.events)?;
            self.print_json(&value)
        } else {
            output::display_success(&self.palette, message);
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    fn quest_id(&self, wanted: &str) -> Result<String, LookupError> {
        resolve("quest", self.log.quests().iter().map(|q| q.id.as_str()), wanted)
    }

    fn chain_id(&self, wanted: &str) -> Result<String, LookupError> {
        resolve(
            "chain",
            self.log.ledger.quest_chains.iter().map(|c| c.id.as_str()),
            wanted,
        )
    }

    fn idea_id(&self, wanted: &str) -> Result<String, LookupError> {
        resolve("idea", self.log.ideas.iter().map(|i| i.id.as_str()), wanted)
    }

    fn apply_quest_fields(&self, input: &mut QuestInput, fields: QuestFields) -> Result<()> {
        if let Some(difficulty) = fields.difficulty {
            input.difficulty = Some(Difficulty::new(difficulty));
        }
        if let Some(value) = fields.value {
            input.value = QuestValue::new(value);
        }
        if let Some(quest_type) = fields.quest_type {
            input.quest_type = quest_type;
        }
        if let Some(chain) = fields.chain {
            input.chain_id = Some(self.chain_id(&chain)?);
        }
        if let Some(due) = fields.due {
            input.due_date = Some(due);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Character overview
    // ------------------------------------------------------------------

    fn status(&mut self) -> Result<bool> {
        let now = Utc::now();
        if self.json {
            let character = &self.log.character;
            self.print_json(&json!({
                "character": character,
                "progress": character.progress_within_level(),
                "elapsed": character.elapsed_label(now),
                "elapsedSeconds": character.elapsed(now).map(|d| d.num_seconds()),
                "quests": self.log.ledger.overall(),
                "ideas": self.log.ideas.len(),
            }))?;
        } else {
            output::print_status(&self.log, &self.palette, now);
        }
        Ok(false)
    }

    fn summary(&mut self) -> Result<bool> {
        let today = Utc::now().date_naive();
        let ledger = &self.log.ledger;
        if self.json {
            let chains: Vec<Value> = ledger
                .quest_chains
                .iter()
                .map(|chain| {
                    json!({
                        "chain": chain,
                        "dueStatus": chain.due_status(today),
                        "summary": ledger.aggregate(Some(&chain.id)),
                    })
                })
                .collect();
            self.print_json(&json!({
                "chains": chains,
                "sideQuests": ledger.aggregate(None),
                "overall": ledger.overall(),
            }))?;
        } else {
            output::print_summary(ledger, &self.palette, today);
        }
        Ok(false)
    }

    // ------------------------------------------------------------------
    // Quests
    // ------------------------------------------------------------------

    fn quest(&mut self, action: QuestCommands) -> Result<bool> {
        match action {
            QuestCommands::Add {
                text,
                fields,
                objectives,
            } => {
                let mut input = QuestInput::new(&text);
                self.apply_quest_fields(&mut input, fields)?;
                for objective in &objectives {
                    input.objectives.push(Objective::new(objective)?);
                }
                let id = self.log.add_quest(input)?;
                self.report(
                    &format!("Quest added ({})", short_id(&id)),
                    json!({ "id": id }),
                )?;
                Ok(true)
            }

            QuestCommands::Edit {
                id,
                text,
                fields,
                no_chain,
                no_due,
            } => {
                let id = self.quest_id(&id)?;
                let quest = self
                    .log
                    .ledger
                    .quest(&id)
                    .ok_or_else(|| LookupError::not_found("quest", &id))?;
                let mut input = QuestInput::from(quest);
                if let Some(text) = text {
                    input.text = text;
                }
                self.apply_quest_fields(&mut input, fields)?;
                if no_chain {
                    input.chain_id = None;
                }
                if no_due {
                    input.due_date = None;
                }

                let change = self
                    .log
                    .edit_quest(&id, input, &mut self.sink)?
                    .ok_or_else(|| LookupError::not_found("quest", &id))?;
                self.report(
                    &format!("Quest updated ({})", short_id(&id)),
                    json!({ "id": id, "change": change }),
                )?;
                Ok(true)
            }

            QuestCommands::Toggle { id } => {
                let id = self.quest_id(&id)?;
                let completed = self
                    .log
                    .toggle_quest(&id, &mut self.sink)
                    .ok_or_else(|| LookupError::not_found("quest", &id))?;
                let message = if completed { "Quest completed" } else { "Quest re-opened" };
                self.report(
                    message,
                    json!({ "id": id, "completed": completed, "totalXp": self.log.character.total_xp() }),
                )?;
                Ok(true)
            }

            QuestCommands::Rm { id } => {
                let id = self.quest_id(&id)?;
                let removed = self
                    .log
                    .delete_quest(&id)
                    .ok_or_else(|| LookupError::not_found("quest", &id))?;
                self.report(
                    &format!("Quest deleted: {}", removed.text),
                    json!({ "id": id }),
                )?;
                Ok(true)
            }

            QuestCommands::List { filter, sort } => {
                let quests = self.log.ledger.view(filter, sort);
                if self.json {
                    self.print_json(&serde_json::to_value(&quests)?)?;
                } else {
                    output::print_quests(&quests, &self.log.ledger, &self.palette);
                }
                Ok(false)
            }
        }
    }

    fn objective(&mut self, action: ObjectiveCommands) -> Result<bool> {
        match action {
            ObjectiveCommands::Add { quest, text } => {
                let quest_id = self.quest_id(&quest)?;
                let added = self
                    .log
                    .add_objective(&quest_id, &text, &mut self.sink)?
                    .ok_or_else(|| LookupError::not_found("quest", &quest_id))?;
                self.report(
                    &format!("Objective added ({})", short_id(&added.objective_id)),
                    json!({ "questId": quest_id, "id": added.objective_id, "change": added.change }),
                )?;
                Ok(true)
            }

            ObjectiveCommands::Toggle { quest, objective } => {
                let quest_id = self.quest_id(&quest)?;
                let objective_ids: Vec<String> = self
                    .log
                    .ledger
                    .quest(&quest_id)
                    .map(|q| q.objectives.iter().map(|o| o.id.clone()).collect())
                    .unwrap_or_default();
                let ids: Vec<&str> = objective_ids.iter().map(String::as_str).collect();
                let objective_id = resolve_positional("objective", &ids, &objective)?;

                let change = self
                    .log
                    .toggle_objective(&quest_id, &objective_id, &mut self.sink)
                    .ok_or_else(|| LookupError::not_found("objective", &objective_id))?;
                self.report(
                    "Objective toggled",
                    json!({ "questId": quest_id, "id": objective_id, "change": change }),
                )?;
                Ok(true)
            }
        }
    }

    // ------------------------------------------------------------------
    // Chains
    // ------------------------------------------------------------------

    fn chain(&mut self, action: ChainCommands) -> Result<bool> {
        match action {
            ChainCommands::Add { name, fields } => {
                let mut input = ChainInput::new(&name);
                apply_chain_fields(&mut input, fields);
                let id = self.log.add_chain(input)?;
                self.report(
                    &format!("Chain added ({})", short_id(&id)),
                    json!({ "id": id }),
                )?;
                Ok(true)
            }

            ChainCommands::Edit {
                id,
                name,
                fields,
                no_due,
            } => {
                let id = self.chain_id(&id)?;
                let chain = self
                    .log
                    .ledger
                    .chain(&id)
                    .ok_or_else(|| LookupError::not_found("chain", &id))?;
                let mut input = ChainInput::from(chain);
                if let Some(name) = name {
                    input.name = name;
                }
                apply_chain_fields(&mut input, fields);
                if no_due {
                    input.due_date = None;
                }
                if !self.log.edit_chain(&id, input)? {
                    return Err(LookupError::not_found("chain", &id).into());
                }
                self.report(
                    &format!("Chain updated ({})", short_id(&id)),
                    json!({ "id": id }),
                )?;
                Ok(true)
            }

            ChainCommands::Rm { id } => {
                let id = self.chain_id(&id)?;
                let demoted = self
                    .log
                    .delete_chain(&id)
                    .ok_or_else(|| LookupError::not_found("chain", &id))?;
                self.report(
                    &format!("Chain deleted, {} quest(s) moved to side quests", demoted),
                    json!({ "id": id, "demoted": demoted }),
                )?;
                Ok(true)
            }

            ChainCommands::List => {
                let today = Utc::now().date_naive();
                if self.json {
                    self.print_json(&serde_json::to_value(&self.log.ledger.quest_chains)?)?;
                } else {
                    output::print_chains(&self.log.ledger, &self.palette, today);
                }
                Ok(false)
            }
        }
    }

    // ------------------------------------------------------------------
    // Ideas
    // ------------------------------------------------------------------

    fn idea(&mut self, action: IdeaCommands) -> Result<bool> {
        match action {
            IdeaCommands::Add { name, description } => {
                let id = self.log.add_idea(&name, &description)?;
                self.report(
                    &format!("Idea saved ({})", short_id(&id)),
                    json!({ "id": id }),
                )?;
                Ok(true)
            }

            IdeaCommands::Edit {
                id,
                name,
                description,
            } => {
                let id = self.idea_id(&id)?;
                let idea = self
                    .log
                    .idea(&id)
                    .ok_or_else(|| LookupError::not_found("idea", &id))?;
                let name = name.unwrap_or_else(|| idea.name.clone());
                let description = description.unwrap_or_else(|| idea.description.clone());
                if !self.log.edit_idea(&id, &name, &description)? {
                    return Err(LookupError::not_found("idea", &id).into());
                }
                self.report(
                    &format!("Idea updated ({})", short_id(&id)),
                    json!({ "id": id }),
                )?;
                Ok(true)
            }

            IdeaCommands::Rm { id } => {
                let id = self.idea_id(&id)?;
                let removed = self
                    .log
                    .delete_idea(&id)
                    .ok_or_else(|| LookupError::not_found("idea", &id))?;
                self.report(
                    &format!("Idea deleted: {}", removed.name),
                    json!({ "id": id }),
                )?;
                Ok(true)
            }

            IdeaCommands::List => {
                if self.json {
                    self.print_json(&serde_json::to_value(&self.log.ideas)?)?;
                } else {
                    output::print_ideas(&self.log.ideas, &self.palette);
                }
                Ok(false)
            }
        }
    }

    // ------------------------------------------------------------------
    // Character and export
    // ------------------------------------------------------------------

    fn character(&mut self, action: CharacterCommands) -> Result<bool> {
        let character = &mut self.log.character;
        match action {
            CharacterCommands::Title { title } => character.set_title(&title)?,
            CharacterCommands::Avatar { name: Some(name) } => character.set_avatar(&name)?,
            CharacterCommands::Avatar { name: None } => {
                character.cycle_avatar();
            }
        }
        let message = format!("{} ({})", character.title, character.avatar);
        let value = json!({ "title": character.title, "avatar": character.avatar });
        self.report(&message, value)?;
        Ok(true)
    }

    fn export(&mut self, target: Option<&Path>) -> Result<bool> {
        let today = Utc::now().date_naive();
        let path = QuestStore::export(&self.log, target, today)
            .context("Failed to export quest log")?;
        self.report(
            &format!("Exported to {}", path.display()),
            json!({ "path": path }),
        )?;
        Ok(false)
    }
}

fn apply_chain_fields(input: &mut ChainInput, fields: ChainFields) {
    if let Some(difficulty) = fields.difficulty {
        input.difficulty = Some(Difficulty::new(difficulty));
    }
    if let Some(value) = fields.value {
        input.value = Some(QuestValue::new(value));
    }
    if let Some(due) = fields.due {
        input.due_date = Some(due);
    }
}
