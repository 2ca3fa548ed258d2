//! Data access requests and their stash

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::credentials::VerifyKey;
use crate::store::{
    AccessPolicy, Document, DocumentStorePartition, FieldType, FieldValue, PartitionKey, QueryKeys,
    StoreResult, Uid,
};

use super::Stash;

pub const REQUESTING_USER_VERIFY_KEY_PARTITION_KEY: PartitionKey =
    PartitionKey::new("requesting_user_verify_key", FieldType::VerifyKey);

pub const STATUS_PARTITION_KEY: PartitionKey = PartitionKey::new("status", FieldType::String);

/// Review state of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown request status: {0}")]
pub struct RequestStatusError(pub String);

impl FromStr for RequestStatus {
    type Err = RequestStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            _ => Err(RequestStatusError(s.to_string())),
        }
    }
}

impl From<RequestStatus> for FieldValue {
    fn from(status: RequestStatus) -> Self {
        FieldValue::String(status.as_str().to_string())
    }
}

/// A user's request for changes to data they do not own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Uid,
    pub requesting_user_verify_key: VerifyKey,
    pub status: RequestStatus,
    #[serde(default = "Utc::now")]
    pub request_time: DateTime<Utc>,
    #[serde(default)]
    pub changes: Vec<String>,
}

impl Request {
    /// New pending request
    pub fn new(requesting_user_verify_key: VerifyKey, changes: Vec<String>) -> Self {
        Self {
            id: Uid::new(),
            requesting_user_verify_key,
            status: RequestStatus::Pending,
            request_time: Utc::now(),
            changes,
        }
    }

    pub fn with_status(mut self, status: RequestStatus) -> Self {
        self.status = status;
        self
    }

    pub fn approve(&mut self) {
        self.status = RequestStatus::Approved;
    }

    pub fn reject(&mut self) {
        self.status = RequestStatus::Rejected;
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

impl Document for Request {
    const KIND: &'static str = "Request";

    fn id(&self) -> Uid {
        self.id
    }

    fn searchable_keys() -> &'static [PartitionKey] {
        &[REQUESTING_USER_VERIFY_KEY_PARTITION_KEY, STATUS_PARTITION_KEY]
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "requesting_user_verify_key" => Some(self.requesting_user_verify_key.into()),
            "status" => Some(self.status.into()),
            _ => None,
        }
    }
}

/// Stash of requests, searchable by submitter and status
#[derive(Clone)]
pub struct RequestStash {
    stash: Stash<Request>,
}

impl RequestStash {
    pub fn new(partition: Arc<dyn DocumentStorePartition<Request>>) -> Self {
        Self {
            stash: Stash::new(partition),
        }
    }

    pub fn in_memory(policy: AccessPolicy) -> Self {
        Self {
            stash: Stash::in_memory(policy),
        }
    }

    pub fn stash(&self) -> &Stash<Request> {
        &self.stash
    }

    pub fn partition(&self) -> &Arc<dyn DocumentStorePartition<Request>> {
        self.stash.partition()
    }

    /// Every request submitted by `verify_key`
    pub fn get_all_for_verify_key(
        &self,
        credentials: &VerifyKey,
        verify_key: &VerifyKey,
    ) -> StoreResult<Vec<Request>> {
        let qks = QueryKeys::from_obj(&REQUESTING_USER_VERIFY_KEY_PARTITION_KEY, verify_key);
        self.stash.query_all(credentials, &qks)
    }

    /// Every request in `status`
    pub fn get_all_for_status(
        &self,
        credentials: &VerifyKey,
        status: RequestStatus,
    ) -> StoreResult<Vec<Request>> {
        let qks = QueryKeys::from_obj(&STATUS_PARTITION_KEY, status);
        self.stash.query_all(credentials, &qks)
    }

    pub fn set(&self, credentials: &VerifyKey, request: Request) -> StoreResult<Request> {
        self.stash.set(credentials, request)
    }

    pub fn get_by_uid(&self, credentials: &VerifyKey, uid: &Uid) -> StoreResult<Option<Request>> {
        self.stash.get_by_uid(credentials, uid)
    }

    pub fn delete_by_uid(&self, credentials: &VerifyKey, uid: &Uid) -> StoreResult<()> {
        self.stash.delete_by_uid(credentials, uid)
    }

    pub fn get_all(&self, credentials: &VerifyKey) -> StoreResult<Vec<Request>> {
        self.stash.get_all(credentials)
    }
}
