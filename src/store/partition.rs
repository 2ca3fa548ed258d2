//! # Document Store Partition
//!
//! An indexed, credential-gated collection of documents of one kind.
//!
//! ## API
//!
//! - `register(credentials, doc)` - Insert, failing on any unique collision
//! - `delete(credentials, uid)` - Remove by primary id
//! - `find_index_or_search_keys(credentials, index_qks, search_qks)` - Resolve ids
//! - `query_all(credentials, qks)` - Resolve ids and materialize documents
//! - `replace(credentials, doc)` - Remove every colliding document, then insert
//!
//! ## Invariants
//! - Every successful write leaves the primary map and all indexes consistent
//! - Results are returned in insertion order
//! - Empty results are successes, never errors
//! - Credential checks run before the partition lock is taken
//! - The live document gauge changes under the same write lock as the data

use std::collections::{BTreeSet, HashMap};

use parking_lot::RwLock;

use crate::credentials::VerifyKey;
use crate::observability::{log_event, Event, MetricsRegistry};

use super::access::AccessPolicy;
use super::document::{field_value, Document, PartitionSettings};
use super::errors::{StoreError, StoreErrorKind, StoreResult};
use super::index::PartitionIndexes;
use super::keys::{QueryKey, QueryKeys};
use super::uid::Uid;

/// Storage contract shared by every partition implementation.
///
/// Stashes hold partitions as `Arc<dyn DocumentStorePartition<T>>`, so tests
/// substitute fakes by implementing this trait.
pub trait DocumentStorePartition<T: Document>: Send + Sync {
    /// Name and schema
    fn settings(&self) -> &PartitionSettings;

    /// Insert a document.
    ///
    /// Fails with `DuplicateKey` if the id or any unique value is taken.
    fn register(&self, credentials: &VerifyKey, obj: T) -> StoreResult<T>;

    /// Remove a document by primary id.
    ///
    /// Fails with `NotFound` if absent.
    fn delete(&self, credentials: &VerifyKey, uid: &Uid) -> StoreResult<()>;

    /// Whether a visible document with this id exists
    fn contains(&self, credentials: &VerifyKey, uid: &Uid) -> bool;

    /// Fetch one document by primary id
    fn get(&self, credentials: &VerifyKey, uid: &Uid) -> StoreResult<Option<T>>;

    /// Every visible document, in insertion order
    fn get_all(&self, credentials: &VerifyKey) -> StoreResult<Vec<T>>;

    /// Materialize ids into documents, skipping ids no longer present
    fn get_many(&self, credentials: &VerifyKey, uids: &[Uid]) -> StoreResult<Vec<T>>;

    /// Resolve index keys against unique indexes and search keys against
    /// searchable indexes, returning the intersection.
    ///
    /// An empty key group places no constraint. An index key with no entry
    /// contributes no ids.
    fn find_index_or_search_keys(
        &self,
        credentials: &VerifyKey,
        index_qks: &QueryKeys,
        search_qks: &QueryKeys,
    ) -> StoreResult<Vec<Uid>>;

    /// Documents matching every key in `qks`
    fn query_all(&self, credentials: &VerifyKey, qks: &QueryKeys) -> StoreResult<Vec<T>> {
        let (index_qks, search_qks) = split_query_keys(self.settings(), qks)?;
        let uids = self.find_index_or_search_keys(credentials, &index_qks, &search_qks)?;
        self.get_many(credentials, &uids)
    }

    /// First document matching every key in `qks`
    fn query_one(&self, credentials: &VerifyKey, qks: &QueryKeys) -> StoreResult<Option<T>> {
        Ok(self.query_all(credentials, qks)?.into_iter().next())
    }

    /// Remove every document colliding with `obj` on a unique key, then
    /// register `obj`.
    ///
    /// Fails with `PermissionDenied` if a colliding document is not visible
    /// to `credentials`. On any failure the removed documents are
    /// registered again.
    fn replace(&self, credentials: &VerifyKey, obj: T) -> StoreResult<T> {
        let mut colliding: Vec<T> = Vec::new();
        for key in self.settings().unique_keys() {
            let Some(value) = field_value(&obj, key) else {
                continue;
            };
            let index_qks = QueryKeys::from(key.with_obj(value));
            for uid in self.find_index_or_search_keys(credentials, &index_qks, &QueryKeys::empty())? {
                if colliding.iter().any(|doc| doc.id() == uid) {
                    continue;
                }
                if let Some(doc) = self.get(credentials, &uid)? {
                    colliding.push(doc);
                }
            }
        }

        let mut removed: Vec<T> = Vec::with_capacity(colliding.len());
        for doc in colliding {
            if let Err(err) = self.delete(credentials, &doc.id()) {
                restore(self, credentials, removed)?;
                return Err(err);
            }
            removed.push(doc);
        }

        let uid = obj.id();
        match self.register(credentials, obj) {
            Ok(obj) => Ok(obj),
            Err(err) => {
                restore(self, credentials, removed)?;
                // Visible collisions are gone, so what remains is owned by someone else
                if err.kind() == StoreErrorKind::DuplicateKey {
                    return Err(StoreError::permission_denied(format!(
                        "{} does not own every {} colliding with {}",
                        credentials,
                        T::KIND,
                        uid
                    )));
                }
                Err(err)
            }
        }
    }
}

/// Register documents removed by a failed replace
fn restore<T, P>(partition: &P, credentials: &VerifyKey, removed: Vec<T>) -> StoreResult<()>
where
    T: Document,
    P: DocumentStorePartition<T> + ?Sized,
{
    for doc in removed {
        partition.register(credentials, doc)?;
    }
    Ok(())
}

/// Split `qks` into keys on unique attributes and keys on searchable ones.
///
/// Fails with `QueryError` naming the first key declared as neither.
pub fn split_query_keys(
    settings: &PartitionSettings,
    qks: &QueryKeys,
) -> StoreResult<(QueryKeys, QueryKeys)> {
    let mut index_qks = Vec::new();
    let mut search_qks = Vec::new();

    for qk in qks {
        if settings.unique_key(qk.name()).is_some() {
            index_qks.push(qk.clone());
        } else if settings.searchable_key(qk.name()).is_some() {
            search_qks.push(qk.clone());
        } else {
            return Err(StoreError::query(format!(
                "Failed to query with {}: {} is not in the unique or searchable keys of partition {}",
                qk,
                qk.name(),
                settings.name()
            )));
        }
    }

    Ok((QueryKeys::new(index_qks), QueryKeys::new(search_qks)))
}

/// Which index a key resolves against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
    Unique,
    Search,
}

/// Check a key is declared for its group and bound to the declared type
fn validate_key(settings: &PartitionSettings, qk: &QueryKey, group: Lookup) -> StoreResult<Lookup> {
    let resolved = match group {
        Lookup::Unique => settings.unique_key(qk.name()).map(|key| (key, Lookup::Unique)),
        Lookup::Search => settings
            .searchable_key(qk.name())
            .map(|key| (key, Lookup::Search))
            .or_else(|| settings.unique_key(qk.name()).map(|key| (key, Lookup::Unique))),
    };

    let Some((declared, lookup)) = resolved else {
        let role = match group {
            Lookup::Unique => "unique",
            Lookup::Search => "searchable",
        };
        return Err(StoreError::query(format!(
            "Failed to query index or search with {}: not a {} key of partition {}",
            qk,
            role,
            settings.name()
        )));
    };

    if qk.value().field_type() != declared.field_type() {
        return Err(StoreError::query(format!(
            "Failed to query index or search with {}: expected {} value, got {}",
            qk,
            declared.field_type(),
            qk.value().field_type()
        )));
    }

    Ok(lookup)
}

/// Stored document with its registering credential and insertion order
#[derive(Debug, Clone)]
struct StoredDocument<T> {
    object: T,
    owner: VerifyKey,
    seq: u64,
}

#[derive(Debug)]
struct PartitionState<T> {
    documents: HashMap<Uid, StoredDocument<T>>,
    indexes: PartitionIndexes,
    next_seq: u64,
}

impl<T: Document> PartitionState<T> {
    fn insert(&mut self, settings: &PartitionSettings, obj: T, owner: VerifyKey) {
        self.indexes.apply_write(settings, &obj);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.documents.insert(obj.id(), StoredDocument { object: obj, owner, seq });
    }

    fn remove(&mut self, settings: &PartitionSettings, uid: &Uid) -> Option<StoredDocument<T>> {
        let stored = self.documents.remove(uid)?;
        self.indexes.apply_delete(settings, &stored.object);
        Some(stored)
    }
}

/// In-process partition guarded by a single read/write lock
pub struct InMemoryPartition<T: Document> {
    settings: PartitionSettings,
    policy: AccessPolicy,
    state: RwLock<PartitionState<T>>,
    metrics: MetricsRegistry,
}

impl<T: Document> InMemoryPartition<T> {
    pub fn new(settings: PartitionSettings, policy: AccessPolicy) -> Self {
        let indexes = PartitionIndexes::new(&settings);
        Self {
            settings,
            policy,
            state: RwLock::new(PartitionState {
                documents: HashMap::new(),
                indexes,
                next_seq: 0,
            }),
            metrics: MetricsRegistry::new(),
        }
    }

    /// Partition named after the document kind
    pub fn for_document(policy: AccessPolicy) -> Self {
        Self::new(PartitionSettings::for_document::<T>(T::KIND), policy)
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Number of stored documents, regardless of visibility
    pub fn len(&self) -> usize {
        self.state.read().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn name(&self) -> &str {
        self.settings.name()
    }

    /// Record a failed operation and hand the error back
    fn reject(&self, err: StoreError) -> StoreError {
        let event = match err.kind() {
            StoreErrorKind::PermissionDenied => {
                self.metrics.increment_permission_denials();
                Event::PermissionDenied
            }
            StoreErrorKind::Query => {
                self.metrics.increment_query_errors();
                Event::QueryRejected
            }
            StoreErrorKind::DuplicateKey => {
                self.metrics.increment_duplicate_keys();
                Event::DuplicateKey
            }
            StoreErrorKind::NotFound => return err,
        };
        log_event(event, self.name(), err.message());
        err
    }

    fn check_read(&self, credentials: &VerifyKey) -> StoreResult<()> {
        self.policy
            .check_read(credentials, self.name())
            .map_err(|e| self.reject(e))
    }

    fn check_write(&self, credentials: &VerifyKey) -> StoreResult<()> {
        self.policy
            .check_write(credentials, self.name())
            .map_err(|e| self.reject(e))
    }

    fn visible<'a>(&self, credentials: &VerifyKey, stored: &'a StoredDocument<T>) -> Option<&'a T> {
        self.policy
            .owns_row(credentials, &stored.owner)
            .then_some(&stored.object)
    }

    fn duplicate(&self, obj: &T, state: &PartitionState<T>) -> Option<StoreError> {
        let (key, existing) = state.indexes.collisions(&self.settings, obj).into_iter().next()?;
        Some(StoreError::duplicate_key(format!(
            "Duplicate {} for {} {}: already held by {}",
            key.name(),
            T::KIND,
            obj.id(),
            existing
        )))
    }

    /// Resolve validated key groups under an already-held read lock
    fn resolve(
        &self,
        state: &PartitionState<T>,
        credentials: &VerifyKey,
        index_qks: &[(Lookup, &QueryKey)],
        search_qks: &[(Lookup, &QueryKey)],
    ) -> Vec<Uid> {
        // None is the universal set
        let mut candidates: Option<BTreeSet<Uid>> = None;

        for (lookup, qk) in index_qks.iter().chain(search_qks.iter()) {
            let matched: BTreeSet<Uid> = match lookup {
                Lookup::Unique => state
                    .indexes
                    .lookup_unique(qk.name(), qk.value())
                    .into_iter()
                    .collect(),
                Lookup::Search => state.indexes.lookup_search(qk.name(), qk.value()),
            };

            candidates = Some(match candidates {
                None => matched,
                Some(current) => current.intersection(&matched).copied().collect(),
            });
        }

        let mut found: Vec<&StoredDocument<T>> = match candidates {
            None => state.documents.values().collect(),
            Some(uids) => uids.iter().filter_map(|uid| state.documents.get(uid)).collect(),
        };
        found.retain(|stored| self.visible(credentials, stored).is_some());
        found.sort_by_key(|stored| stored.seq);
        found.into_iter().map(|stored| stored.object.id()).collect()
    }

    fn validate_groups<'q>(
        &self,
        index_qks: &'q QueryKeys,
        search_qks: &'q QueryKeys,
    ) -> StoreResult<(Vec<(Lookup, &'q QueryKey)>, Vec<(Lookup, &'q QueryKey)>)> {
        let index = index_qks
            .iter()
            .map(|qk| validate_key(&self.settings, qk, Lookup::Unique).map(|l| (l, qk)))
            .collect::<StoreResult<Vec<_>>>()
            .map_err(|e| self.reject(e))?;
        let search = search_qks
            .iter()
            .map(|qk| validate_key(&self.settings, qk, Lookup::Search).map(|l| (l, qk)))
            .collect::<StoreResult<Vec<_>>>()
            .map_err(|e| self.reject(e))?;
        Ok((index, search))
    }
}

impl<T: Document> DocumentStorePartition<T> for InMemoryPartition<T> {
    fn settings(&self) -> &PartitionSettings {
        &self.settings
    }

    fn register(&self, credentials: &VerifyKey, obj: T) -> StoreResult<T> {
        self.check_write(credentials)?;

        let uid = obj.id();
        {
            let mut state = self.state.write();
            if let Some(err) = self.duplicate(&obj, &state) {
                drop(state);
                return Err(self.reject(err));
            }
            state.insert(&self.settings, obj.clone(), *credentials);
            self.metrics.increment_registers();
        }

        log_event(Event::PartitionRegister, self.name(), &uid.to_string());
        Ok(obj)
    }

    fn delete(&self, credentials: &VerifyKey, uid: &Uid) -> StoreResult<()> {
        self.check_write(credentials)?;

        {
            let mut state = self.state.write();
            let Some(stored) = state.documents.get(uid) else {
                return Err(StoreError::not_found(format!(
                    "{} {} not found in partition {}",
                    T::KIND,
                    uid,
                    self.name()
                )));
            };
            if !self.policy.owns_row(credentials, &stored.owner) {
                drop(state);
                return Err(self.reject(StoreError::permission_denied(format!(
                    "{} does not own {} {}",
                    credentials,
                    T::KIND,
                    uid
                ))));
            }
            state.remove(&self.settings, uid);
            self.metrics.increment_deletes();
        }

        log_event(Event::PartitionDelete, self.name(), &uid.to_string());
        Ok(())
    }

    fn contains(&self, credentials: &VerifyKey, uid: &Uid) -> bool {
        if !self.policy.can_read(credentials) {
            return false;
        }
        let state = self.state.read();
        state
            .documents
            .get(uid)
            .is_some_and(|stored| self.visible(credentials, stored).is_some())
    }

    fn get(&self, credentials: &VerifyKey, uid: &Uid) -> StoreResult<Option<T>> {
        self.check_read(credentials)?;
        let state = self.state.read();
        Ok(state
            .documents
            .get(uid)
            .and_then(|stored| self.visible(credentials, stored))
            .cloned())
    }

    fn get_all(&self, credentials: &VerifyKey) -> StoreResult<Vec<T>> {
        self.check_read(credentials)?;
        let state = self.state.read();
        let uids = self.resolve(&state, credentials, &[], &[]);
        Ok(uids
            .iter()
            .filter_map(|uid| state.documents.get(uid))
            .map(|stored| stored.object.clone())
            .collect())
    }

    fn get_many(&self, credentials: &VerifyKey, uids: &[Uid]) -> StoreResult<Vec<T>> {
        self.check_read(credentials)?;
        let state = self.state.read();
        Ok(uids
            .iter()
            .filter_map(|uid| state.documents.get(uid))
            .filter_map(|stored| self.visible(credentials, stored))
            .cloned()
            .collect())
    }

    fn find_index_or_search_keys(
        &self,
        credentials: &VerifyKey,
        index_qks: &QueryKeys,
        search_qks: &QueryKeys,
    ) -> StoreResult<Vec<Uid>> {
        self.check_read(credentials)?;
        let (index, search) = self.validate_groups(index_qks, search_qks)?;

        let uids = {
            let state = self.state.read();
            self.resolve(&state, credentials, &index, &search)
        };

        self.metrics.increment_queries();
        log_event(
            Event::PartitionQuery,
            self.name(),
            &format!("{} matches", uids.len()),
        );
        Ok(uids)
    }

    fn query_all(&self, credentials: &VerifyKey, qks: &QueryKeys) -> StoreResult<Vec<T>> {
        self.check_read(credentials)?;
        let (index_qks, search_qks) =
            split_query_keys(&self.settings, qks).map_err(|e| self.reject(e))?;
        let (index, search) = self.validate_groups(&index_qks, &search_qks)?;

        // Resolution and materialization share one read lock
        let found: Vec<T> = {
            let state = self.state.read();
            self.resolve(&state, credentials, &index, &search)
                .iter()
                .filter_map(|uid| state.documents.get(uid))
                .map(|stored| stored.object.clone())
                .collect()
        };

        self.metrics.increment_queries();
        log_event(
            Event::PartitionQuery,
            self.name(),
            &format!("{} matches", found.len()),
        );
        Ok(found)
    }

    fn replace(&self, credentials: &VerifyKey, obj: T) -> StoreResult<T> {
        self.check_write(credentials)?;

        let uid = obj.id();
        let replaced = {
            let mut state = self.state.write();
            let mut colliding: Vec<Uid> = Vec::new();
            for (_, existing) in state.indexes.collisions(&self.settings, &obj) {
                if !colliding.contains(&existing) {
                    colliding.push(existing);
                }
            }

            for existing in &colliding {
                let owned = state
                    .documents
                    .get(existing)
                    .is_some_and(|stored| self.policy.owns_row(credentials, &stored.owner));
                if !owned {
                    drop(state);
                    return Err(self.reject(StoreError::permission_denied(format!(
                        "{} does not own {} {}",
                        credentials,
                        T::KIND,
                        existing
                    ))));
                }
            }

            for existing in &colliding {
                state.remove(&self.settings, existing);
                self.metrics.increment_deletes();
            }
            state.insert(&self.settings, obj.clone(), *credentials);
            self.metrics.increment_registers();
            colliding.len()
        };

        if replaced > 0 {
            self.metrics.increment_replaces();
            log_event(
                Event::PartitionReplace,
                self.name(),
                &format!("{} replaced {} documents", uid, replaced),
            );
        } else {
            log_event(Event::PartitionRegister, self.name(), &uid.to_string());
        }
        Ok(obj)
    }
}
