//! bibkeep CLI
//!
//! Command-line interface for formatting bibliography files and managing
//! their history. Each invocation performs one store operation.

use bibkeep_core::errors::ExError;
use bibkeep_core::logging_facility::{self, Profile};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "bibkeep")]
#[command(about = "bibkeep - Versioned bibliography files", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// History root (overrides the config file)
    #[arg(long, global = true)]
    history_root: Option<PathBuf>,

    /// Log output on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rewrite a file in canonical layout
    Fmt(commands::fmt::FmtArgs),
    /// Start tracking a file
    Init(commands::history::FileArgs),
    /// Record the current content of a file
    Commit(commands::history::CommitArgs),
    /// Step back to an ancestor commit
    Undo(commands::history::StepArgs),
    /// Step forward along the newest branch
    Redo(commands::history::StepArgs),
    /// Restore any commit
    Checkout(commands::history::CommitRefArgs),
    /// Annotate a commit
    Comment(commands::history::CommentArgs),
    /// Show the commit tree
    History(commands::history::FileArgs),
    /// Show the commits leading to the current one
    Log(commands::history::FileArgs),
    /// Print a commit's snapshot
    Show(commands::history::CommitRefArgs),
    /// Remove all history of a file
    Delete(commands::history::FileArgs),
    /// List bibliography files in the working directory
    Ls,
}

fn main() {
    let cli = Cli::parse();

    logging_facility::init(match cli.log_format {
        LogFormat::Pretty => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let result = commands::open_store(cli.config.as_deref(), cli.history_root).and_then(|store| {
        match cli.command {
            Commands::Fmt(args) => commands::fmt::execute(args, &store),
            Commands::Init(args) => commands::history::init(args, &store),
            Commands::Commit(args) => commands::history::commit(args, &store),
            Commands::Undo(args) => commands::history::undo(args, &store),
            Commands::Redo(args) => commands::history::redo(args, &store),
            Commands::Checkout(args) => commands::history::checkout(args, &store),
            Commands::Comment(args) => commands::history::comment(args, &store),
            Commands::History(args) => commands::history::history(args, &store),
            Commands::Log(args) => commands::history::log(args, &store),
            Commands::Show(args) => commands::history::show(args, &store),
            Commands::Delete(args) => commands::history::delete(args, &store),
            Commands::Ls => commands::ls::execute(&store),
        }
    });

    if let Err(e) = result {
        let non_fatal = e
            .downcast_ref::<ExError>()
            .is_some_and(ExError::is_non_fatal);
        if non_fatal {
            eprintln!("Warning: {}", e);
            return;
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
