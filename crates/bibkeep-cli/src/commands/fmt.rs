//! Canonical formatting command

use super::CommandResult;
use bibkeep_store::DocumentStore;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct FmtArgs {
    pub file: PathBuf,

    /// Only report whether the file is already canonical
    #[arg(long)]
    pub check: bool,
}

pub fn execute(args: FmtArgs, store: &DocumentStore) -> CommandResult {
    let document = store.load(&args.file)?;
    let rendered = store.render(&document);

    if args.check {
        let current = std::fs::read_to_string(&document.path)?;
        if current != rendered {
            return Err(format!("{} is not formatted", args.file.display()).into());
        }
        println!("{} is formatted", args.file.display());
        return Ok(());
    }

    store.save(&document)?;
    println!(
        "Formatted {} ({} items)",
        args.file.display(),
        document.len()
    );
    Ok(())
}
