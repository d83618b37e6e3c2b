use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use std::path::Path;

pub fn run(root: &Path) -> Result<()> {
    let repo = super::open_repo(root)?;
    let history = repo.log()?;
    let head = repo.head()?;

    if history.is_empty() {
        println!("{}", "No commits yet.".yellow());
        return Ok(());
    }

    for commit in &history {
        let marker = if head.as_deref() == Some(commit.id.as_str()) {
            format!(" {}", "(HEAD)".cyan().bold())
        } else {
            String::new()
        };

        println!("{} {}{}", "Commit".green(), commit.id.green(), marker);
        println!(
            "Date: {}",
            commit.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        );
        println!("Message: {}", commit.message);
        for entry in &commit.files {
            println!("  {} {}", entry.hash.short().dimmed(), entry.path);
        }
        println!();
    }

    Ok(())
}
