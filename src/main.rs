mod candidate;
mod cli;
mod commands;
mod config;
mod engine;
mod history;
mod installation;
mod paths;
mod progress;
mod ui;
mod updates;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    match cli.command {
        Command::Init {
            installation,
            force,
        } => commands::init::run(&ctx, &installation, force),
        Command::Status {
            installation,
            candidate,
            operation,
        } => commands::status::run(&ctx, &installation, candidate.as_deref(), operation),
        Command::Updates { installation, jobs } => {
            commands::updates::run(&ctx, &installation, jobs)
        }
        Command::Stamp {
            candidate,
            installation,
        } => commands::stamp::run(&ctx, &installation, &candidate),
        Command::Conflicts {
            candidate,
            installation,
            diff,
        } => commands::conflicts::run(&ctx, &installation, &candidate, diff),
        Command::Apply {
            candidate,
            installation,
            yes,
            backup,
        } => commands::apply::run(&ctx, &installation, &candidate, yes, backup),
        Command::History { installation } => commands::history::run(&ctx, &installation),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "ferry", &mut io::stdout());
            Ok(())
        }
    }
}
