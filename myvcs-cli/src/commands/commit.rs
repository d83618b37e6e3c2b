use anyhow::Result;
use colored::Colorize;
use std::path::Path;

pub fn run(root: &Path, message: &str) -> Result<()> {
    let repo = super::open_repo(root)?;
    let commit = repo.commit(message)?;

    println!("{} {}", "Committed as".cyan(), commit.id.cyan().bold());
    for entry in &commit.files {
        println!("  {} {}", entry.hash.short().dimmed(), entry.path);
    }

    Ok(())
}
