//! CLI command implementations
//!
//! Commands are one-shot: load what they need, print JSON to stdout, exit.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::config::StoreConfig;
use crate::credentials::VerifyKey;
use crate::observability::{log_event, Event};
use crate::roles::{capabilities_for_level, decompose, sum_weights, ServiceRole};
use crate::stash::request::{REQUESTING_USER_VERIFY_KEY_PARTITION_KEY, STATUS_PARTITION_KEY};
use crate::stash::{Request, RequestStash, RequestStatus};
use crate::store::{InMemoryPartition, PartitionSettings, ProxyDataset, QueryKeys, Uid};

use super::args::{Cli, Command};
use super::errors::CliResult;
use super::io::{read_json_lines, write_json, write_json_lines};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Roles { level } => roles(level),
        Command::Requests {
            config,
            verify_key,
            status,
            acting_key,
        } => requests(&config, verify_key, status, acting_key),
        Command::Presign {
            config,
            base_url,
            node_id,
            dataset,
            asset,
            public,
        } => presign(&config, &base_url, node_id, &dataset, &asset, public),
    }
}

/// Decomposition of a role level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleReport {
    pub level: u64,
    pub roles: Vec<ServiceRole>,
    pub capabilities: Vec<&'static str>,
    /// Whether the roles sum back to `level`
    pub exact: bool,
}

impl RoleReport {
    pub fn for_level(level: u64) -> Self {
        let roles = decompose(level);
        let exact = sum_weights(&roles) == level;
        Self {
            level,
            capabilities: capabilities_for_level(level).names(),
            roles,
            exact,
        }
    }
}

/// Print the roles and capabilities a level resolves to
pub fn roles(level: u64) -> CliResult<()> {
    write_json(&RoleReport::for_level(level))
}

/// Print requests from the configured stash as JSON lines
pub fn requests(
    config_path: &Path,
    verify_key: Option<VerifyKey>,
    status: Option<RequestStatus>,
    acting_key: Option<VerifyKey>,
) -> CliResult<()> {
    let config = StoreConfig::load(config_path)?;
    let stash = open_request_stash(&config)?;
    let credentials = match acting_key {
        Some(key) => key,
        None => config.root_verify_key()?,
    };

    let found = select_requests(&stash, &credentials, verify_key.as_ref(), status)?;
    write_json_lines(&mut std::io::stdout(), &found)
}

/// Build the configured request stash and seed it from `requests_file`
pub fn open_request_stash(config: &StoreConfig) -> CliResult<RequestStash> {
    let root = config.root_verify_key()?;
    let settings = PartitionSettings::for_document::<Request>(config.partition.clone());
    let stash = RequestStash::new(Arc::new(InMemoryPartition::new(
        settings,
        config.access_policy()?,
    )));

    if let Some(path) = &config.requests_file {
        let seed: Vec<Request> = read_json_lines(path)?;
        let count = seed.len();
        for request in seed {
            stash.set(&root, request)?;
        }
        log_event(
            Event::PartitionSeeded,
            &config.partition,
            &format!("{} requests from {}", count, path.display()),
        );
    }

    Ok(stash)
}

/// Requests matching the given filters; no filter returns everything
pub fn select_requests(
    stash: &RequestStash,
    credentials: &VerifyKey,
    verify_key: Option<&VerifyKey>,
    status: Option<RequestStatus>,
) -> CliResult<Vec<Request>> {
    let found = match (verify_key, status) {
        (Some(key), Some(status)) => {
            let qks = QueryKeys::new(vec![
                REQUESTING_USER_VERIFY_KEY_PARTITION_KEY.with_obj(key),
                STATUS_PARTITION_KEY.with_obj(status),
            ]);
            stash.stash().query_all(credentials, &qks)?
        }
        (Some(key), None) => stash.get_all_for_verify_key(credentials, key)?,
        (None, Some(status)) => stash.get_all_for_status(credentials, status)?,
        (None, None) => stash.get_all(credentials)?,
    };
    Ok(found)
}

/// A presigned download URL for one proxy dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresignReport {
    pub bucket: String,
    pub key: String,
    pub url: String,
    pub expires_in: i64,
}

/// Print a presigned URL for the dataset's blob
pub fn presign(
    config_path: &Path,
    base_url: &str,
    node_id: Uid,
    dataset: &str,
    asset: &str,
    public: bool,
) -> CliResult<()> {
    let config = StoreConfig::load(config_path)?;
    let mut proxy = ProxyDataset::new(asset, dataset, Vec::new(), "", "", node_id);
    write_json(&presign_dataset(&config, base_url, &mut proxy, public)?)
}

/// Presign `proxy` with the configured secret and expiry
pub fn presign_dataset(
    config: &StoreConfig,
    base_url: &str,
    proxy: &mut ProxyDataset,
    public: bool,
) -> CliResult<PresignReport> {
    let store = config.blob_store(base_url)?;
    let url = proxy
        .generate_presigned_url(&store, config.presign_expiry_secs, public)?
        .to_string();
    Ok(PresignReport {
        bucket: proxy.bucket(),
        key: proxy.name(),
        url,
        expires_in: config.presign_expiry_secs,
    })
}
