//! # Partition Access Policy
//!
//! Credential gating for partitions.
//!
//! ## Rules
//! - The root verify key passes every check, read or write
//! - Checks are pure functions of the policy and the caller's key
//! - With row ownership on, non-root callers only see and delete rows they registered

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::credentials::VerifyKey;

use super::errors::{StoreError, StoreResult};

/// Who may perform one class of operation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// Any credential
    #[default]
    Anyone,
    /// Only the root credential
    RootOnly,
    /// Root plus an explicit allow list
    Only(BTreeSet<VerifyKey>),
}

impl Access {
    fn permits(&self, credentials: &VerifyKey) -> bool {
        match self {
            Access::Anyone => true,
            Access::RootOnly => false,
            Access::Only(keys) => keys.contains(credentials),
        }
    }
}

/// Read/write access rules for one partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    root_verify_key: VerifyKey,
    read: Access,
    write: Access,
    row_ownership: bool,
}

impl AccessPolicy {
    /// Open policy: anyone reads and writes, no row ownership
    pub fn new(root_verify_key: VerifyKey) -> Self {
        Self {
            root_verify_key,
            read: Access::Anyone,
            write: Access::Anyone,
            row_ownership: false,
        }
    }

    pub fn with_read(mut self, read: Access) -> Self {
        self.read = read;
        self
    }

    pub fn with_write(mut self, write: Access) -> Self {
        self.write = write;
        self
    }

    pub fn with_row_ownership(mut self, row_ownership: bool) -> Self {
        self.row_ownership = row_ownership;
        self
    }

    pub fn root_verify_key(&self) -> &VerifyKey {
        &self.root_verify_key
    }

    pub fn is_root(&self, credentials: &VerifyKey) -> bool {
        *credentials == self.root_verify_key
    }

    pub fn row_ownership(&self) -> bool {
        self.row_ownership
    }

    pub fn can_read(&self, credentials: &VerifyKey) -> bool {
        self.is_root(credentials) || self.read.permits(credentials)
    }

    pub fn can_write(&self, credentials: &VerifyKey) -> bool {
        self.is_root(credentials) || self.write.permits(credentials)
    }

    /// Whether `credentials` may see or remove a row registered by `owner`
    pub fn owns_row(&self, credentials: &VerifyKey, owner: &VerifyKey) -> bool {
        !self.row_ownership || self.is_root(credentials) || credentials == owner
    }

    pub fn check_read(&self, credentials: &VerifyKey, partition: &str) -> StoreResult<()> {
        if self.can_read(credentials) {
            Ok(())
        } else {
            Err(StoreError::permission_denied(format!(
                "{} may not read partition {}",
                credentials, partition
            )))
        }
    }

    pub fn check_write(&self, credentials: &VerifyKey, partition: &str) -> StoreResult<()> {
        if self.can_write(credentials) {
            Ok(())
        } else {
            Err(StoreError::permission_denied(format!(
                "{} may not write partition {}",
                credentials, partition
            )))
        }
    }
}
