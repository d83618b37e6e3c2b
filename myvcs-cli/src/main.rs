use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{add, checkout, commit, init, log, status};

#[derive(Parser)]
#[command(name = "myvcs")]
#[command(version, about = "A minimal version control system", long_about = None)]
struct Cli {
    /// Repository root (defaults to the current directory)
    #[arg(short = 'C', long = "repo", global = true, default_value = ".")]
    repo: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a repository
    Init,

    /// Stage a file for the next commit
    Add {
        /// File to stage, relative to the repository root
        file: String,
    },

    /// Commit staged files
    Commit {
        /// Commit message
        message: String,
    },

    /// Show commit history
    Log,

    /// Show staged files and their changes
    Status,

    /// Restore the files of a commit
    Checkout {
        /// Commit id or a unique part of it
        commit: String,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => init::run(&cli.repo),
        Commands::Add { file } => add::run(&cli.repo, &file),
        Commands::Commit { message } => commit::run(&cli.repo, &message),
        Commands::Log => log::run(&cli.repo),
        Commands::Status => status::run(&cli.repo),
        Commands::Checkout { commit } => checkout::run(&cli.repo, &commit),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli) {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}
