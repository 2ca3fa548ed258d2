//! CLI module for stashdb
//!
//! Provides command-line interface for:
//! - roles: Decompose a role level
//! - requests: Query a seeded request stash
//! - presign: Sign a download URL for a proxy dataset

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    open_request_stash, presign, presign_dataset, requests, roles, run, run_command,
    select_requests, PresignReport, RoleReport,
};
pub use errors::{CliError, CliErrorCode, CliResult};
