use anyhow::Result;
use colored::Colorize;
use std::path::Path;

pub fn run(root: &Path, file: &str) -> Result<()> {
    let repo = super::open_repo(root)?;
    repo.add(file)?;

    println!("{} {}", "Added".green(), file);
    Ok(())
}
