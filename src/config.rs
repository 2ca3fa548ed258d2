//! Store configuration
//!
//! Loaded from a JSON file:
//!
//! ```json
//! {
//!   "root_verify_key": "<base64>",
//!   "partition": "Request",
//!   "read_access": "anyone",
//!   "write_access": "root",
//!   "row_ownership": false,
//!   "requests_file": "requests.jsonl",
//!   "presign_secret": "change-me",
//!   "presign_expiry_secs": 3600
//! }
//! ```
//!
//! Only `root_verify_key` is required. Presigning blob URLs needs
//! `presign_secret`; when it is absent the `presign` command refuses to run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::credentials::{CredentialError, VerifyKey};
use crate::observability::{log_event, Event};
use crate::store::{Access, AccessPolicy, InMemoryBlobStore};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid root_verify_key: {0}")]
    RootVerifyKey(#[from] CredentialError),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Who may perform an operation class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    #[default]
    Anyone,
    Root,
}

impl From<AccessMode> for Access {
    fn from(mode: AccessMode) -> Self {
        match mode {
            AccessMode::Anyone => Access::Anyone,
            AccessMode::Root => Access::RootOnly,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root verify key, base64
    pub root_verify_key: String,

    /// Partition name (default "Request")
    #[serde(default = "default_partition")]
    pub partition: String,

    #[serde(default)]
    pub read_access: AccessMode,

    #[serde(default = "default_write_access")]
    pub write_access: AccessMode,

    #[serde(default)]
    pub row_ownership: bool,

    /// JSON-lines file of requests to seed the partition with
    #[serde(default)]
    pub requests_file: Option<PathBuf>,

    /// Signing secret for presigned blob URLs
    #[serde(default)]
    pub presign_secret: Option<String>,

    #[serde(default = "default_presign_expiry_secs")]
    pub presign_expiry_secs: i64,
}

fn default_partition() -> String {
    "Request".to_string()
}
fn default_write_access() -> AccessMode {
    AccessMode::Root
}
fn default_presign_expiry_secs() -> i64 {
    3600
}

impl StoreConfig {
    /// Open configuration with the given root and every default
    pub fn new(root_verify_key: &VerifyKey) -> Self {
        Self {
            root_verify_key: root_verify_key.to_base64(),
            partition: default_partition(),
            read_access: AccessMode::default(),
            write_access: default_write_access(),
            row_ownership: false,
            requests_file: None,
            presign_secret: None,
            presign_expiry_secs: default_presign_expiry_secs(),
        }
    }

    /// Load and validate a config file.
    ///
    /// A relative `requests_file` resolves against the config's directory.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_json(&content)?;
        if let (Some(file), Some(dir)) = (config.requests_file.as_mut(), path.parent()) {
            if file.is_relative() {
                *file = dir.join(&*file);
            }
        }

        log_event(Event::ConfigLoaded, &config.partition, &path.display().to_string());
        Ok(config)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: StoreConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.root_verify_key()?;

        if self.partition.trim().is_empty() {
            return Err(ConfigError::Invalid("partition must not be empty".to_string()));
        }

        if self.presign_secret.as_deref().is_some_and(|s| s.is_empty()) {
            return Err(ConfigError::Invalid(
                "presign_secret must not be empty".to_string(),
            ));
        }

        if self.presign_expiry_secs <= 0 {
            return Err(ConfigError::Invalid(format!(
                "presign_expiry_secs must be > 0, got {}",
                self.presign_expiry_secs
            )));
        }

        Ok(())
    }

    pub fn root_verify_key(&self) -> ConfigResult<VerifyKey> {
        Ok(self.root_verify_key.parse::<VerifyKey>()?)
    }

    /// Access policy for the configured partition
    pub fn access_policy(&self) -> ConfigResult<AccessPolicy> {
        Ok(AccessPolicy::new(self.root_verify_key()?)
            .with_read(self.read_access.into())
            .with_write(self.write_access.into())
            .with_row_ownership(self.row_ownership))
    }

    /// Blob store at `base_url` signing with the configured secret
    pub fn blob_store(&self, base_url: &str) -> ConfigResult<InMemoryBlobStore> {
        match self.presign_secret.as_deref() {
            Some(secret) if !secret.is_empty() => {
                Ok(InMemoryBlobStore::new(base_url, secret.as_bytes()))
            }
            _ => Err(ConfigError::Invalid(
                "presign_secret is required to presign URLs".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_defaults() {
        let root = VerifyKey::generate();
        let json = format!("{{\"root_verify_key\":\"{}\"}}", root);
        let config = StoreConfig::from_json(&json).unwrap();

        assert_eq!(config, StoreConfig::new(&root));
        assert_eq!(config.partition, "Request");
        assert_eq!(config.read_access, AccessMode::Anyone);
        assert_eq!(config.write_access, AccessMode::Root);
        assert_eq!(config.presign_secret, None);
        assert_eq!(config.presign_expiry_secs, 3600);
    }

    #[test]
    fn test_access_policy() {
        let root = VerifyKey::generate();
        let outsider = VerifyKey::generate();
        let policy = StoreConfig::new(&root).access_policy().unwrap();

        assert!(policy.can_read(&outsider));
        assert!(!policy.can_write(&outsider));
        assert!(policy.can_write(&root));
    }

    #[test]
    fn test_bad_root_key() {
        let err = StoreConfig::from_json("{\"root_verify_key\":\"not base64!\"}").unwrap_err();
        assert!(matches!(err, ConfigError::RootVerifyKey(_)));
    }

    #[test]
    fn test_missing_root_key() {
        let err = StoreConfig::from_json("{}").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_non_positive_expiry() {
        let root = VerifyKey::generate();
        let json = format!(
            "{{\"root_verify_key\":\"{}\",\"presign_expiry_secs\":0}}",
            root
        );
        assert!(matches!(
            StoreConfig::from_json(&json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_empty_presign_secret_rejected() {
        let root = VerifyKey::generate();
        let json = format!("{{\"root_verify_key\":\"{}\",\"presign_secret\":\"\"}}", root);
        let err = StoreConfig::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("presign_secret"));
    }

    #[test]
    fn test_blob_store_requires_secret() {
        let root = VerifyKey::generate();
        let mut config = StoreConfig::new(&root);
        assert!(matches!(
            config.blob_store("http://blob.local"),
            Err(ConfigError::Invalid(_))
        ));

        config.presign_secret = Some("change-me".to_string());
        let store = config.blob_store("http://blob.local/").unwrap();
        assert_eq!(store.base_url(), "http://blob.local");
    }

    #[test]
    fn test_load_resolves_requests_file() {
        let dir = tempdir().unwrap();
        let root = VerifyKey::generate();
        let path = dir.path().join("stashdb.json");
        fs::write(
            &path,
            format!(
                "{{\"root_verify_key\":\"{}\",\"requests_file\":\"requests.jsonl\"}}",
                root
            ),
        )
        .unwrap();

        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.requests_file, Some(dir.path().join("requests.jsonl")));
    }

    #[test]
    fn test_load_missing_file() {
        let err = StoreConfig::load(Path::new("/nonexistent/stashdb.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(matches!(
            StoreConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
