//! Game save snapshot manager entry point

mod config;
mod confirm;
mod entry;
mod fsutil;
mod locate;
mod logging;
mod manager;
mod output;
mod registry;
mod shell;

use std::{io::Write, path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::{
    config::AppConfig,
    confirm::{AssumeYes, Confirm, StdinLines, TerminalConfirm},
    manager::{Outcome, SaveManager},
    registry::Registry,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(version, about = "Snapshot, list, restore and delete copies of a game save")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file (default: <config dir>/savevault/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the registry and the save copies
    #[arg(long, global = true, value_name = "DIR")]
    store: Option<PathBuf>,

    /// The game's save file (default: discovered in the game's app data folder)
    #[arg(long, global = true, value_name = "FILE")]
    live_save: Option<PathBuf>,

    /// Answer yes to confirmation prompts
    #[arg(short, long, global = true, default_value_t = false)]
    yes: bool,

    /// Log more to stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Snapshot the live save
    Create {
        /// Label for the snapshot (default: the creation time)
        name: Option<String>,
    },
    /// List snapshots
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Show when a snapshot was created
    Show {
        /// Snapshot id or list key
        key: String,
    },
    /// Restore a snapshot over the live save
    Load {
        /// Snapshot id or list key
        key: String,
    },
    /// Delete a snapshot
    Remove {
        /// Snapshot id or list key
        key: String,
    },
    /// Interactive session (default)
    Shell,
}

fn main() -> ExitCode {
    match wrapped_main() {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            if tracing::dispatcher::has_been_set() {
                tracing::error!(?error);
            } else {
                eprintln!("Error: {error:?}");
            }
            ExitCode::FAILURE
        }
    }
}

/// We want to log errors before exiting so this wrapper function exists.
fn wrapped_main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = config::load_config(args.config.as_deref()).context("loading config failed")?;

    logging::set_up_logging(args.verbose, config.log_path.as_deref())
        .context("logging setup failed")?;

    let config = config.with_overrides(args.store, args.live_save);
    let registry = Registry::open(config.resolve_store_dir()?)
        .context("loading the save registry failed")?;

    tracing::debug!(store_dir = ?registry.dir(), count = registry.len(), "opened store");

    let mut stdout = std::io::stdout();

    match args.command.unwrap_or(Command::Shell) {
        // Listing works without a live save
        Command::List { json } => {
            if json {
                output::write_json(&mut stdout, registry.entries())?;
            } else {
                output::write_table(&mut stdout, registry.entries(), None)?;
            }
        }
        Command::Create { name } => {
            let mut manager = open_manager(&config, registry, args.yes)?;
            let entry = manager
                .create(name.as_deref())
                .context("creating the save failed")?;
            writeln!(stdout, "{}\t{}\t{}", entry.name, entry.created_at, entry.id)?;
        }
        Command::Show { key } => {
            let mut manager = open_manager(&config, registry, args.yes)?;
            let entry = manager.select(&key)?;
            writeln!(stdout, "\"{}\" ({})", entry.name, entry.id)?;
            writeln!(stdout, "Created at {}", entry.created_at)?;
        }
        Command::Load { key } => {
            let mut manager = open_manager(&config, registry, args.yes)?;
            manager.select(&key)?;

            match manager.load().context("loading the save failed")? {
                Outcome::Done => writeln!(stdout, "Success")?,
                Outcome::Declined => writeln!(stdout, "Cancelled")?,
            }
        }
        Command::Remove { key } => {
            let mut manager = open_manager(&config, registry, args.yes)?;
            manager.select(&key)?;

            match manager.remove().context("removing the save failed")? {
                Outcome::Done => writeln!(stdout, "Removed")?,
                Outcome::Declined => writeln!(stdout, "Cancelled")?,
            }
        }
        Command::Shell => {
            let manager = open_manager(&config, registry, args.yes)?;
            shell::Shell::new(manager, StdinLines, stdout).run()?;
        }
    }

    Ok(())
}

fn open_manager(
    config: &AppConfig,
    registry: Registry,
    assume_yes: bool,
) -> anyhow::Result<SaveManager<Box<dyn Confirm>>> {
    let live_save = config.resolve_live_save()?;

    tracing::debug!(?live_save, "using live save");

    let confirm: Box<dyn Confirm> = if assume_yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalConfirm::stdio())
    };

    Ok(SaveManager::new(registry, live_save, confirm))
}
