use anyhow::Result;
use colored::Colorize;
use myvcs_core::RestoreOutcome;
use std::path::Path;

pub fn run(root: &Path, fragment: &str) -> Result<()> {
    let repo = super::open_repo(root)?;
    let report = repo.checkout(fragment)?;

    for file in &report.files {
        match file {
            RestoreOutcome::Restored { path, .. } => {
                println!("{} {}", "Restored".green(), path);
            }
            RestoreOutcome::MissingObject { path, hash } => {
                println!(
                    "{}",
                    format!("Object file {hash} not found, {path} left unchanged.").red()
                );
            }
        }
    }

    println!(
        "{} {}",
        "Checked out commit".green(),
        report.commit.id.green().bold()
    );

    if !report.is_complete() {
        println!(
            "{}",
            format!(
                "Restored {}/{} file(s)",
                report.restored().count(),
                report.files.len()
            )
            .yellow()
            .bold()
        );
    }

    Ok(())
}
