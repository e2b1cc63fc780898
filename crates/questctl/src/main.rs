//! Questctl - command-line front end for questlog
//!
//! Loads the quest log, runs one command and saves the result.

use anyhow::Context;
use clap::Parser;
use quest_common::QuestConfig;
use questctl::cli::Cli;
use questctl::output::{self, Palette};
use questctl::{commands, errors, logging};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match QuestConfig::load().context("Failed to load config") {
        Ok(config) => config,
        Err(e) => std::process::exit(fail(None, &e)),
    };

    let code = match commands::run(cli, &config) {
        Ok(code) => code,
        Err(e) => fail(Some(&config), &e),
    };
    std::process::exit(code);
}

fn fail(config: Option<&QuestConfig>, e: &anyhow::Error) -> i32 {
    output::display_error(&Palette::for_errors(config), &format!("{:#}", e));
    errors::exit_code(e)
}
