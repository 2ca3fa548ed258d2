//! Key-value facade
//!
//! `PartitionKvStore` exposes a partition as a mapping from primary id to
//! document, bound to a single credential. `InMemoryKeyValueStore` is the
//! plain map used where no partition is involved.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::credentials::VerifyKey;

use super::document::Document;
use super::errors::{StoreError, StoreResult};
use super::partition::DocumentStorePartition;
use super::uid::Uid;

/// Mapping contract
pub trait KeyValueStore<K, V>: Send + Sync {
    /// Value under `key`. Fails with `NotFound` if absent.
    fn get(&self, key: &K) -> StoreResult<V>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: K, value: V) -> StoreResult<()>;

    /// Remove `key`. Fails with `NotFound` if absent.
    fn delete(&self, key: &K) -> StoreResult<()>;

    fn contains(&self, key: &K) -> bool;

    /// Every key. Fails if the store cannot be listed.
    fn keys(&self) -> StoreResult<Vec<K>>;

    fn len(&self) -> StoreResult<usize> {
        Ok(self.keys()?.len())
    }

    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// Ordered in-process map
#[derive(Debug)]
pub struct InMemoryKeyValueStore<K, V> {
    data: RwLock<BTreeMap<K, V>>,
}

impl<K: Ord, V> InMemoryKeyValueStore<K, V> {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<K: Ord, V> Default for InMemoryKeyValueStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> KeyValueStore<K, V> for InMemoryKeyValueStore<K, V>
where
    K: Ord + Clone + std::fmt::Display + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> StoreResult<V> {
        self.data
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("Key {} not found", key)))
    }

    fn set(&self, key: K, value: V) -> StoreResult<()> {
        self.data.write().insert(key, value);
        Ok(())
    }

    fn delete(&self, key: &K) -> StoreResult<()> {
        self.data
            .write()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(format!("Key {} not found", key)))
    }

    fn contains(&self, key: &K) -> bool {
        self.data.read().contains_key(key)
    }

    fn keys(&self) -> StoreResult<Vec<K>> {
        Ok(self.data.read().keys().cloned().collect())
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.data.read().len())
    }
}

/// Partition viewed as `Uid -> T` under one credential
pub struct PartitionKvStore<T: Document> {
    partition: Arc<dyn DocumentStorePartition<T>>,
    credentials: VerifyKey,
}

impl<T: Document> PartitionKvStore<T> {
    pub fn new(partition: Arc<dyn DocumentStorePartition<T>>, credentials: VerifyKey) -> Self {
        Self {
            partition,
            credentials,
        }
    }

    pub fn credentials(&self) -> &VerifyKey {
        &self.credentials
    }
}

impl<T: Document> KeyValueStore<Uid, T> for PartitionKvStore<T> {
    fn get(&self, key: &Uid) -> StoreResult<T> {
        self.partition
            .get(&self.credentials, key)?
            .ok_or_else(|| {
                StoreError::not_found(format!(
                    "{} {} not found in partition {}",
                    T::KIND,
                    key,
                    self.partition.settings().name()
                ))
            })
    }

    /// Delete any existing document under `key`, then register `value`.
    ///
    /// If `value` cannot be registered the previous document is put back.
    fn set(&self, key: Uid, value: T) -> StoreResult<()> {
        if value.id() != key {
            return Err(StoreError::query(format!(
                "Key {} does not match {} id {}",
                key,
                T::KIND,
                value.id()
            )));
        }
        let previous = if self.partition.contains(&self.credentials, &key) {
            self.partition.get(&self.credentials, &key)?
        } else {
            None
        };
        if previous.is_some() {
            self.partition.delete(&self.credentials, &key)?;
        }

        match self.partition.register(&self.credentials, value) {
            Ok(_) => Ok(()),
            Err(err) => {
                if let Some(old) = previous {
                    self.partition.register(&self.credentials, old)?;
                }
                Err(err)
            }
        }
    }

    fn delete(&self, key: &Uid) -> StoreResult<()> {
        self.partition.delete(&self.credentials, key)
    }

    fn contains(&self, key: &Uid) -> bool {
        self.partition.contains(&self.credentials, key)
    }

    fn keys(&self) -> StoreResult<Vec<Uid>> {
        Ok(self
            .partition
            .get_all(&self.credentials)?
            .iter()
            .map(|doc| doc.id())
            .collect())
    }
}
