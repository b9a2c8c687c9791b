//! History commands: init, commit, navigation and inspection

use super::CommandResult;
use bibkeep_store::history::render_rows;
use bibkeep_store::{CommitOutcome, DeleteOutcome, DocumentStore, InitOutcome, Navigation};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct FileArgs {
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct CommitArgs {
    pub file: PathBuf,

    /// Comment stored with the new commit
    #[arg(short, long)]
    pub message: Option<String>,
}

#[derive(Debug, Args)]
pub struct StepArgs {
    pub file: PathBuf,

    /// Number of steps
    #[arg(short = 'n', long, default_value_t = 1)]
    pub steps: usize,
}

#[derive(Debug, Args)]
pub struct CommitRefArgs {
    pub file: PathBuf,

    pub commit_id: String,
}

#[derive(Debug, Args)]
pub struct CommentArgs {
    pub file: PathBuf,

    pub commit_id: String,

    pub text: String,
}

pub fn init(args: FileArgs, store: &DocumentStore) -> CommandResult {
    match store.init(&args.file)? {
        InitOutcome::Initialized { commit_id } => {
            println!("Initialized history of {} at {}", args.file.display(), commit_id);
        }
        InitOutcome::AlreadyTracked { current } => {
            println!("{} is already tracked (current: {})", args.file.display(), current);
        }
    }
    Ok(())
}

pub fn commit(args: CommitArgs, store: &DocumentStore) -> CommandResult {
    let document = store.load(&args.file)?;

    match store.save_and_commit(&document, args.message.as_deref())? {
        CommitOutcome::Initialized { commit_id } => {
            println!("Initialized history of {} at {}", args.file.display(), commit_id);
        }
        CommitOutcome::NoChanges { current } => {
            println!("No changes since {}", current);
        }
        CommitOutcome::Committed {
            commit_id,
            parent,
            branched,
        } => {
            println!("Committed {} (parent: {})", commit_id, parent);
            if branched {
                println!("Started a new branch at {}", parent);
            }
        }
    }
    Ok(())
}

pub fn undo(args: StepArgs, store: &DocumentStore) -> CommandResult {
    let moved = store.undo(&args.file, args.steps)?;
    print_navigation(&moved);
    Ok(())
}

pub fn redo(args: StepArgs, store: &DocumentStore) -> CommandResult {
    let moved = store.redo(&args.file, args.steps)?;
    print_navigation(&moved);
    Ok(())
}

pub fn checkout(args: CommitRefArgs, store: &DocumentStore) -> CommandResult {
    let moved = store.checkout(&args.file, &args.commit_id)?;
    print_navigation(&moved);
    Ok(())
}

pub fn comment(args: CommentArgs, store: &DocumentStore) -> CommandResult {
    store.comment(&args.file, &args.commit_id, &args.text)?;
    println!("Comment saved on {}", args.commit_id);
    Ok(())
}

pub fn history(args: FileArgs, store: &DocumentStore) -> CommandResult {
    let report = store.history(&args.file)?;
    print!("{}", report.render_tree());
    println!();
    print!("{}", report.render_table());
    Ok(())
}

pub fn log(args: FileArgs, store: &DocumentStore) -> CommandResult {
    let rows = store.log(&args.file)?;
    print!("{}", render_rows(&rows));
    Ok(())
}

pub fn show(args: CommitRefArgs, store: &DocumentStore) -> CommandResult {
    let document = store.show(&args.file, &args.commit_id)?;
    print!("{}", store.render(&document));
    Ok(())
}

pub fn delete(args: FileArgs, store: &DocumentStore) -> CommandResult {
    match store.delete(&args.file)? {
        DeleteOutcome::Deleted => println!("Deleted history of {}", args.file.display()),
        DeleteOutcome::NothingToDelete => {
            println!("No history to delete for {}", args.file.display())
        }
    }
    Ok(())
}

fn print_navigation(moved: &Navigation) {
    println!(
        "Moved {} step(s) from {} to {}",
        moved.steps, moved.from, moved.to
    );
}
