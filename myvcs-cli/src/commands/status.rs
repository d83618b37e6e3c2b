use anyhow::Result;
use colored::Colorize;
use myvcs_core::FileStatus;
use std::path::Path;

pub fn run(root: &Path) -> Result<()> {
    let repo = super::open_repo(root)?;
    let status = repo.status()?;

    if let Some(head) = &status.head {
        println!("{}: {}", "HEAD".bold(), head);
    }

    if status.has_pending_changes() {
        println!("{}", "Changes to be committed:".cyan());
        for file in &status.staged {
            print_file(file);
        }
    } else {
        println!("{}", "No changes to be committed.".yellow());
    }

    if !status.unstaged.is_empty() {
        println!();
        println!("{}", "Changes not staged for commit:".cyan());
        for file in &status.unstaged {
            print_file(file);
        }
        println!("Run {} to stage them", "myvcs add <file>".cyan());
    }

    Ok(())
}

fn print_file(file: &FileStatus) {
    match &file.current {
        Some(hash) => println!("- {} : {}", file.path, hash),
        None => println!("- {} : {}", file.path, "deleted".red()),
    }

    if file.is_new() {
        println!("  {}", "new file".green());
    }

    if let Some(changes) = &file.changes {
        if !changes.is_empty() {
            println!("Diff for {}:", file.path);
            super::print_changes(changes);
        }
    }
}
