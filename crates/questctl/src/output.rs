//! Output formatting - plain terminal output with optional colors
//!
//! Everything here writes to stdout; diagnostics go through tracing.

use chrono::{DateTime, NaiveDate, Utc};
use owo_colors::OwoColorize;
use quest_common::progression::format_xp;
use quest_common::{
    ColorMode, EventSink, Idea, ProgressTier, Quest, QuestConfig, QuestEvent, QuestLedger,
    QuestLog, QuestSummary, TracingSink, SIDE_QUESTS_NAME,
};
use std::io::IsTerminal;

use crate::resolve::short_id;

/// Horizontal rule under headers
pub const HR: &str = "------------------------------------------------------------";

/// Width of progress bars
const BAR_WIDTH: usize = 20;

/// Key column width for key/value blocks
const KEY_WIDTH: usize = 12;

/// Color switch for one run
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    color: bool,
}

impl Palette {
    pub fn new(mode: ColorMode) -> Self {
        let color = match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        };
        Self { color }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    /// Palette for error lines: the configured mode once the config is known
    pub fn for_errors(config: Option<&QuestConfig>) -> Self {
        Self::new(config.map(|c| c.output.color).unwrap_or_default())
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> String) -> String {
        if self.color {
            style(text)
        } else {
            text.to_string()
        }
    }

    pub fn ok(&self, text: &str) -> String {
        self.paint(text, |t| t.green().to_string())
    }

    pub fn warn(&self, text: &str) -> String {
        self.paint(text, |t| t.yellow().to_string())
    }

    pub fn err(&self, text: &str) -> String {
        self.paint(text, |t| t.bright_red().to_string())
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(text, |t| t.dimmed().to_string())
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint(text, |t| t.bold().to_string())
    }

    pub fn accent(&self, text: &str) -> String {
        self.paint(text, |t| t.cyan().to_string())
    }

    /// Color text by how far along it is
    pub fn tier(&self, tier: ProgressTier, text: &str) -> String {
        match tier {
            ProgressTier::Complete => self.paint(text, |t| t.bright_green().bold().to_string()),
            ProgressTier::High => self.ok(text),
            ProgressTier::Medium => self.warn(text),
            ProgressTier::Low => self.err(text),
        }
    }
}

/// `[=======-------------]`
pub fn progress_bar(percent: f64, width: usize) -> String {
    let percent = if percent.is_finite() { percent.clamp(0.0, 100.0) } else { 0.0 };
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "=".repeat(filled), "-".repeat(width - filled))
}

fn print_kv(key: &str, value: &str) {
    println!("  {:width$} {}", key, value, width = KEY_WIDTH);
}

fn print_header(p: &Palette, title: &str) {
    println!();
    println!("{}", p.bold(title));
    println!("{}", p.dim(HR));
}

/// Character sheet
pub fn print_status(log: &QuestLog, p: &Palette, now: DateTime<Utc>) {
    let character = &log.character;
    let progress = character.progress_within_level();
    let overall = log.ledger.overall();

    print_header(p, &format!("questctl status v{}", env!("QUESTCTL_VERSION")));
    print_kv("Character", &format!("{} ({})", character.title, character.avatar));
    print_kv("Level", &p.accent(&character.level().to_string()));
    print_kv(
        "XP",
        &format!(
            "{} {} ({:.0}%)",
            p.ok(&progress_bar(progress.percent, BAR_WIDTH)),
            progress.label(),
            progress.percent
        ),
    );
    print_kv("Total XP", &format_xp(character.total_xp()));
    print_kv("Adventuring", &character.elapsed_label(now));
    print_kv(
        "Quests",
        &format!("{}/{} completed", overall.completed, overall.total),
    );
    print_kv("Ideas", &log.ideas.len().to_string());
    println!();
}

fn summary_line(p: &Palette, summary: &QuestSummary) -> String {
    let tier = ProgressTier::from_percent(summary.progress_percent);
    format!(
        "{} {:>3}%  {}/{} done  value {}  avg difficulty {:.1}",
        p.tier(tier, &progress_bar(summary.progress_percent as f64, BAR_WIDTH)),
        summary.progress_percent,
        summary.completed,
        summary.total,
        summary.total_value,
        summary.average_difficulty
    )
}

/// Progress per chain, side quests and overall
pub fn print_summary(ledger: &QuestLedger, p: &Palette, today: NaiveDate) {
    print_header(p, "Quest chains");
    if ledger.quest_chains.is_empty() {
        println!("  {}", p.dim("No quest chains yet"));
    }
    for chain in &ledger.quest_chains {
        let status = chain.due_status(today);
        let status_text = if status.is_overdue() {
            p.err(&status.to_string())
        } else {
            p.dim(&status.to_string())
        };
        println!("  {}  {}", p.bold(&chain.name), status_text);
        println!("    {}", summary_line(p, &ledger.aggregate(Some(&chain.id))));
    }

    print_header(p, SIDE_QUESTS_NAME);
    println!("    {}", summary_line(p, &ledger.aggregate(None)));

    print_header(p, "Overall");
    println!("    {}", summary_line(p, &ledger.overall()));
    println!();
}

fn quest_line(quest: &Quest, ledger: &QuestLedger, p: &Palette) -> String {
    let mark = if quest.completed { p.ok("[x]") } else { "[ ]".to_string() };
    let difficulty = quest
        .difficulty
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut line = format!(
        "  {} {}  {}  {}  D{} V{}  {}",
        mark,
        p.dim(short_id(&quest.id)),
        quest.text,
        p.accent(quest.quest_type.as_str()),
        difficulty,
        quest.value,
        p.warn(&format!("{} XP", format_xp(quest.xp_reward()))),
    );

    if !quest.objectives.is_empty() {
        let tier = ProgressTier::from_percent(quest.objective_progress());
        line.push_str(&format!(
            "  {}",
            p.tier(tier, &format!("{}%", quest.objective_progress()))
        ));
    }
    if let Some(due) = quest.due_date {
        line.push_str(&format!("  due {}", due.format("%Y-%m-%d")));
    }
    if let Some(chain) = quest.chain_id.as_deref().and_then(|id| ledger.chain(id)) {
        line.push_str(&format!("  {}", p.dim(&format!("chain: {}", chain.name))));
    }
    line
}

/// Quests with their objectives
pub fn print_quests(quests: &[&Quest], ledger: &QuestLedger, p: &Palette) {
    if quests.is_empty() {
        println!("{}", p.dim("No quests match"));
        return;
    }
    for quest in quests {
        println!("{}", quest_line(quest, ledger, p));
        for (i, objective) in quest.objectives.iter().enumerate() {
            let mark = if objective.completed { p.ok("[x]") } else { "[ ]".to_string() };
            println!(
                "        {}. {} {}  {}",
                i + 1,
                mark,
                objective.text,
                p.dim(short_id(&objective.id))
            );
        }
    }
}

/// Chains with deadline and progress
pub fn print_chains(ledger: &QuestLedger, p: &Palette, today: NaiveDate) {
    if ledger.quest_chains.is_empty() {
        println!("{}", p.dim("No quest chains yet"));
        return;
    }
    for chain in &ledger.quest_chains {
        let summary = ledger.aggregate(Some(&chain.id));
        println!(
            "  {}  {}  {}  {}",
            p.dim(short_id(&chain.id)),
            p.bold(&chain.name),
            chain.due_status(today),
            summary_line(p, &summary)
        );
    }
}

pub fn print_ideas(ideas: &[Idea], p: &Palette) {
    if ideas.is_empty() {
        println!("{}", p.dim("No ideas yet"));
        return;
    }
    for idea in ideas {
        println!(
            "  {}  {}  {}",
            p.dim(short_id(&idea.id)),
            p.bold(&idea.name),
            p.dim(&idea.created_at.format("%Y-%m-%d").to_string())
        );
        if !idea.description.is_empty() {
            println!("        {}", idea.description);
        }
    }
}

pub fn display_success(p: &Palette, message: &str) {
    println!("[OK] {}", p.ok(message));
}

pub fn display_warning(p: &Palette, message: &str) {
    eprintln!("[WARNING] {}", p.warn(message));
}

pub fn display_error(p: &Palette, message: &str) {
    eprintln!("[ERROR] {}", p.err(message));
}

/// Prints quest events as they happen and keeps them for JSON output
pub struct ConsoleSink {
    palette: Palette,
    quiet: bool,
    pub events: Vec<QuestEvent>,
}

impl ConsoleSink {
    pub fn new(palette: Palette, quiet: bool) -> Self {
        Self {
            palette,
            quiet,
            events: Vec::new(),
        }
    }
}

impl EventSink for ConsoleSink {
    fn emit(&mut self, event: QuestEvent) {
        TracingSink.emit(event.clone());
        if !self.quiet {
            let p = &self.palette;
            match &event {
                QuestEvent::LevelUp { .. } => {
                    println!("*** {} ***", p.ok(&p.bold(&event.describe())));
                }
                QuestEvent::QuestCompleted { .. } => println!("[XP] {}", p.ok(&event.describe())),
                QuestEvent::QuestReopened { .. } => println!("[XP] {}", p.warn(&event.describe())),
            }
        }
        self.events.push(event);
    }
}
