//! CLI integration tests for questctl
//!
//! Runs the built binary against a data file in a temp directory:
//! - questctl status            fresh character, file created
//! - questctl quest ...         add, toggle by prefix, edit, rm, list filters
//! - questctl objective ...     objective-driven completion
//! - questctl chain ...         chain removal demotes quests
//! - questctl idea ...          capture and list
//! - questctl export            dated snapshot
//! - error exit codes           unknown ids, empty names

use serde_json::Value;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

// ============================================================================
// Harness
// ============================================================================

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    fn data(&self) -> PathBuf {
        self.dir.path().join("data.json")
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_questctl"))
            .arg("--data")
            .arg(self.data())
            .args(args)
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env("XDG_DATA_HOME", self.dir.path().join("share"))
            .env("NO_COLOR", "1")
            .env_remove("QUESTLOG_DATA")
            .env_remove("QUESTLOG_LOG")
            .env_remove("RUST_LOG")
            .current_dir(self.dir.path())
            .output()
            .expect("Failed to run questctl")
    }

    fn json(&self, args: &[&str]) -> Value {
        let mut full = vec!["--json"];
        full.extend_from_slice(args);
        let output = self.run(&full);
        assert!(
            output.status.success(),
            "questctl {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is JSON")
    }

    fn add_quest(&self, args: &[&str]) -> String {
        let mut full = vec!["quest", "add"];
        full.extend_from_slice(args);
        self.json(&full)["id"].as_str().unwrap().to_string()
    }
}

// ============================================================================
// Status
// ============================================================================

#[test]
fn test_status_on_fresh_log() {
    let sandbox = Sandbox::new();
    let status = sandbox.json(&["status"]);

    assert_eq!(status["character"]["level"], 1);
    assert_eq!(status["character"]["totalXp"], 0.0);
    assert_eq!(status["character"]["title"], "Novice Adventurer");
    assert_eq!(status["progress"]["xpNeededForLevel"], 15.0);
    assert!(sandbox.data().exists());
}

#[test]
fn test_status_text_output() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["status"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Novice Adventurer"));
    assert!(stdout.contains("0/15 XP"));
}

// ============================================================================
// Quests
// ============================================================================

#[test]
fn test_toggle_by_prefix_grants_xp() {
    let sandbox = Sandbox::new();
    let id = sandbox.add_quest(&["Slay the dragon", "--value", "2", "--difficulty", "3"]);

    let toggled = sandbox.json(&["quest", "toggle", &id[..8]]);
    assert_eq!(toggled["completed"], true);
    assert_eq!(toggled["totalXp"], 15.0);
    let kinds: Vec<&str> = toggled["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["quest_completed", "level_up"]);

    let status = sandbox.json(&["status"]);
    assert_eq!(status["character"]["level"], 2);

    let reopened = sandbox.json(&["quest", "toggle", &id]);
    assert_eq!(reopened["completed"], false);
    assert_eq!(reopened["totalXp"], 0.0);
}

#[test]
fn test_list_filter_and_sort() {
    let sandbox = Sandbox::new();
    sandbox.add_quest(&["undated"]);
    sandbox.add_quest(&["later", "--due", "2030-01-02"]);
    sandbox.add_quest(&["sooner", "--due", "2030-01-01"]);
    let done = sandbox.add_quest(&["done", "--type", "extra"]);
    sandbox.json(&["quest", "toggle", &done]);

    let active = sandbox.json(&["quest", "list", "--filter", "active", "--sort", "due-date"]);
    let texts: Vec<&str> = active
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["sooner", "later", "undated"]);

    let extra = sandbox.json(&["quest", "list", "--filter", "extra"]);
    assert_eq!(extra.as_array().unwrap().len(), 1);
    assert_eq!(extra[0]["completed"], true);
}

#[test]
fn test_edit_and_remove_quest() {
    let sandbox = Sandbox::new();
    let id = sandbox.add_quest(&["Old name"]);

    sandbox.json(&["quest", "edit", &id, "--text", "New name", "--type", "main"]);
    let quests = sandbox.json(&["quest", "list"]);
    assert_eq!(quests[0]["text"], "New name");
    assert_eq!(quests[0]["questType"], "main");
    assert_eq!(quests[0]["difficulty"], 2.5);

    sandbox.json(&["quest", "rm", &id]);
    assert_eq!(sandbox.json(&["quest", "list"]).as_array().unwrap().len(), 0);
}

// ============================================================================
// Objectives and chains
// ============================================================================

#[test]
fn test_objectives_complete_quest() {
    let sandbox = Sandbox::new();
    let id = sandbox.add_quest(&["Two steps", "--objective", "first", "--objective", "second"]);

    let first = sandbox.json(&["objective", "toggle", &id, "1"]);
    assert_eq!(first["change"], "unchanged");

    let second = sandbox.json(&["objective", "toggle", &id, "2"]);
    assert_eq!(second["change"], "completed");

    let added = sandbox.json(&["objective", "add", &id, "third"]);
    assert_eq!(added["change"], "reopened");
}

#[test]
fn test_chain_removal_demotes_quests() {
    let sandbox = Sandbox::new();
    let chain = sandbox.json(&["chain", "add", "Main Story"])["id"]
        .as_str()
        .unwrap()
        .to_string();
    sandbox.add_quest(&["a", "--chain", &chain[..8]]);
    sandbox.add_quest(&["b", "--chain", &chain]);

    let chained = sandbox.json(&["quest", "list", "--filter", "chained"]);
    assert_eq!(chained.as_array().unwrap().len(), 2);

    let removed = sandbox.json(&["chain", "rm", &chain]);
    assert_eq!(removed["demoted"], 2);

    let side = sandbox.json(&["quest", "list", "--filter", "side"]);
    assert_eq!(side.as_array().unwrap().len(), 2);

    let summary = sandbox.json(&["summary"]);
    assert_eq!(summary["sideQuests"]["total"], 2);
    assert_eq!(summary["chains"].as_array().unwrap().len(), 0);
}

// ============================================================================
// Ideas, character, export
// ============================================================================

#[test]
fn test_ideas() {
    let sandbox = Sandbox::new();
    let id = sandbox.json(&["idea", "add", "Castle", "-d", "with a moat"])["id"]
        .as_str()
        .unwrap()
        .to_string();
    sandbox.json(&["idea", "edit", &id, "--name", "Fortress"]);

    let ideas = sandbox.json(&["idea", "list"]);
    assert_eq!(ideas[0]["name"], "Fortress");
    assert_eq!(ideas[0]["description"], "with a moat");
}

#[test]
fn test_character_cosmetics() {
    let sandbox = Sandbox::new();
    let titled = sandbox.json(&["character", "title", "Dragon Slayer"]);
    assert_eq!(titled["title"], "Dragon Slayer");

    let cycled = sandbox.json(&["character", "avatar"]);
    assert_eq!(cycled["avatar"], "pokeball");

    let picked = sandbox.json(&["character", "avatar", "kirby"]);
    assert_eq!(picked["avatar"], "kirby");
}

#[test]
fn test_export_to_directory() {
    let sandbox = Sandbox::new();
    sandbox.add_quest(&["Exported"]);
    let out_dir = sandbox.dir.path().join("exports");
    std::fs::create_dir_all(&out_dir).unwrap();

    let exported = sandbox.json(&["export", out_dir.to_str().unwrap()]);
    let path = PathBuf::from(exported["path"].as_str().unwrap());
    assert!(path.exists());
    assert!(path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("questlog-export-"));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unknown_quest_exit_code() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["quest", "toggle", "does-not-exist"]);
    assert_eq!(output.status.code(), Some(66));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No quest matches"));
}

#[test]
fn test_empty_name_is_rejected() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["quest", "add", "   "]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Quest name is required"));
}

#[test]
fn test_corrupt_log_is_backed_up() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.data(), "not json at all").unwrap();

    let status = sandbox.json(&["status"]);
    assert_eq!(status["character"]["level"], 1);

    let mut backup = sandbox.data().into_os_string();
    backup.push(".bak");
    assert!(PathBuf::from(backup).exists());
}
