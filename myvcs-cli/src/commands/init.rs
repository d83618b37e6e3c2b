use anyhow::Result;
use colored::Colorize;
use myvcs_core::{InitOutcome, Repository};
use std::path::Path;

pub fn run(root: &Path) -> Result<()> {
    let (repo, outcome) = Repository::init(root)?;

    match outcome {
        InitOutcome::Created => println!(
            "{} {}",
            "Repository initialized in".green(),
            repo.layout().control_dir().display()
        ),
        InitOutcome::AlreadyExists => println!("{}", "Repository already exists.".yellow()),
    }

    Ok(())
}
