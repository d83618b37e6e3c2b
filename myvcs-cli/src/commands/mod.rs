pub mod add;
pub mod checkout;
pub mod commit;
pub mod init;
pub mod log;
pub mod status;

use anyhow::{Context, Result};
use colored::Colorize;
use myvcs_core::{LineChange, Repository};
use std::path::Path;
use tracing::debug;

pub fn open_repo(root: &Path) -> Result<Repository> {
    debug!("Opening repository at {}", root.display());
    Repository::open(root)
        .with_context(|| format!("cannot open repository at {}", root.display()))
}

/// Prints line changes the way `status` shows them.
pub fn print_changes(changes: &[LineChange]) {
    for change in changes {
        let rendered = change.to_string();
        let mut lines = rendered.lines();
        if let Some(header) = lines.next() {
            println!("{}", header.yellow());
        }
        for line in lines {
            if line.starts_with('-') {
                println!("{}", line.red());
            } else {
                println!("{}", line.green());
            }
        }
    }
}
