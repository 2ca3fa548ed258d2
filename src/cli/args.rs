//! CLI argument definitions using clap
//!
//! Commands:
//! - stashdb roles <level>
//! - stashdb requests --config <path> [--verify-key <key>] [--status <status>]
//! - stashdb presign --config <path> --base-url <url> --node-id <uid> --dataset <name> --asset <name> [--public]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::credentials::VerifyKey;
use crate::stash::RequestStatus;
use crate::store::Uid;

/// stashdb - Credentialed document stashes and role levels
#[derive(Parser, Debug)]
#[command(name = "stashdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decompose a role level into roles and capabilities
    Roles {
        /// Sum of role weights
        level: u64,
    },

    /// Seed a request stash from config and print matching requests
    Requests {
        /// Path to configuration file
        #[arg(long, default_value = "./stashdb.json")]
        config: PathBuf,

        /// Only requests submitted by this verify key
        #[arg(long)]
        verify_key: Option<VerifyKey>,

        /// Only requests in this status
        #[arg(long)]
        status: Option<RequestStatus>,

        /// Act as this verify key instead of root
        #[arg(long = "as")]
        acting_key: Option<VerifyKey>,
    },

    /// Presign a download URL for a proxy dataset's blob
    Presign {
        /// Path to configuration file
        #[arg(long, default_value = "./stashdb.json")]
        config: PathBuf,

        /// Blob store base URL
        #[arg(long)]
        base_url: String,

        /// Node owning the bucket
        #[arg(long)]
        node_id: Uid,

        #[arg(long)]
        dataset: String,

        #[arg(long)]
        asset: String,

        /// Serve the object under `/blob`
        #[arg(long)]
        public: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roles() {
        let cli = Cli::try_parse_from(["stashdb", "roles", "163"]).unwrap();
        assert!(matches!(cli.command, Command::Roles { level: 163 }));
    }

    #[test]
    fn test_parse_requests_filters() {
        let key = VerifyKey::generate();
        let key_text = key.to_string();
        let cli = Cli::try_parse_from([
            "stashdb",
            "requests",
            "--config",
            "conf.json",
            "--verify-key",
            key_text.as_str(),
            "--status",
            "approved",
        ])
        .unwrap();

        match cli.command {
            Command::Requests {
                config,
                verify_key,
                status,
                acting_key,
            } => {
                assert_eq!(config, PathBuf::from("conf.json"));
                assert_eq!(verify_key, Some(key));
                assert_eq!(status, Some(RequestStatus::Approved));
                assert_eq!(acting_key, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_presign() {
        let node = Uid::new();
        let node_text = node.to_string();
        let cli = Cli::try_parse_from([
            "stashdb",
            "presign",
            "--base-url",
            "http://blob.local",
            "--node-id",
            node_text.as_str(),
            "--dataset",
            "mnist",
            "--asset",
            "train",
            "--public",
        ])
        .unwrap();

        match cli.command {
            Command::Presign {
                config,
                node_id,
                public,
                ..
            } => {
                assert_eq!(config, PathBuf::from("./stashdb.json"));
                assert_eq!(node_id, node);
                assert!(public);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_status() {
        assert!(Cli::try_parse_from(["stashdb", "requests", "--status", "lost"]).is_err());
    }
}
