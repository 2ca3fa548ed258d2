//! # Stashes
//!
//! Typed repositories over one document partition.
//!
//! A stash turns domain questions ("requests submitted by this key",
//! "requests with this status") into `QueryKeys` and hands them to the
//! partition. Partition errors are returned unchanged; an empty match is
//! `Ok(vec![])`.

pub mod request;

use std::sync::Arc;

use crate::credentials::VerifyKey;
use crate::store::{
    AccessPolicy, Document, DocumentStorePartition, InMemoryPartition, QueryKeys, StoreResult, Uid,
};

pub use request::{Request, RequestStash, RequestStatus, RequestStatusError};

/// Repository over a partition of `T`
pub struct Stash<T: Document> {
    partition: Arc<dyn DocumentStorePartition<T>>,
}

impl<T: Document> Clone for Stash<T> {
    fn clone(&self) -> Self {
        Self {
            partition: Arc::clone(&self.partition),
        }
    }
}

impl<T: Document> Stash<T> {
    pub fn new(partition: Arc<dyn DocumentStorePartition<T>>) -> Self {
        Self { partition }
    }

    /// Stash over a fresh in-memory partition named after `T::KIND`
    pub fn in_memory(policy: AccessPolicy) -> Self {
        Self::new(Arc::new(InMemoryPartition::<T>::for_document(policy)))
    }

    pub fn partition(&self) -> &Arc<dyn DocumentStorePartition<T>> {
        &self.partition
    }

    /// Store `obj`, replacing any document it collides with on a unique key.
    ///
    /// Never fails with `DuplicateKey`.
    pub fn set(&self, credentials: &VerifyKey, obj: T) -> StoreResult<T> {
        self.partition.replace(credentials, obj)
    }

    pub fn get_by_uid(&self, credentials: &VerifyKey, uid: &Uid) -> StoreResult<Option<T>> {
        self.partition.get(credentials, uid)
    }

    pub fn delete_by_uid(&self, credentials: &VerifyKey, uid: &Uid) -> StoreResult<()> {
        self.partition.delete(credentials, uid)
    }

    pub fn get_all(&self, credentials: &VerifyKey) -> StoreResult<Vec<T>> {
        self.partition.get_all(credentials)
    }

    pub fn query_all(&self, credentials: &VerifyKey, qks: &QueryKeys) -> StoreResult<Vec<T>> {
        self.partition.query_all(credentials, qks)
    }

    pub fn query_one(&self, credentials: &VerifyKey, qks: &QueryKeys) -> StoreResult<Option<T>> {
        self.partition.query_one(credentials, qks)
    }

    /// Matches for `qks`, kept only where `predicate` holds
    pub fn find_all<F>(&self, credentials: &VerifyKey, qks: &QueryKeys, predicate: F) -> StoreResult<Vec<T>>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self
            .query_all(credentials, qks)?
            .into_iter()
            .filter(|obj| predicate(obj))
            .collect())
    }
}
