//! stashdb - Role levels and credentialed document stashes
//!
//! - `roles`: additive role-level codec and capability flags
//! - `store`: indexed, access-controlled document partitions
//! - `stash`: typed repositories over partitions

pub mod cli;
pub mod config;
pub mod credentials;
pub mod observability;
pub mod roles;
pub mod stash;
pub mod store;
