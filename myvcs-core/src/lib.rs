//! # myvcs-core
//!
//! Core library for myvcs - a minimal version control system.
//!
//! This crate provides the content-addressed object store, the staging index,
//! the append-only commit log with its in-memory history, the positional line
//! diff and the checkout engine. [`Repository`] ties them together into the
//! `init` / `add` / `commit` / `log` / `status` / `checkout` command surface.

pub mod checkout;
pub mod config;
pub mod diff;
pub mod error;
pub mod fsutil;
pub mod hash;
pub mod head;
pub mod history;
pub mod index;
pub mod journal;
pub mod layout;
pub mod lock;
pub mod log;
pub mod models;
pub mod object_store;
pub mod repository;
pub mod status;

pub use checkout::{CheckoutReport, RestoreOutcome};
pub use config::Config;
pub use diff::{diff, LineChange};
pub use error::{Error, Result};
pub use hash::ObjectId;
pub use history::{CommitHistory, FileVersionMap};
pub use models::{Commit, FileEntry};
pub use object_store::ObjectStore;
pub use repository::{InitOutcome, Repository};
pub use status::{FileStatus, Status};
