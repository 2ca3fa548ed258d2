//! Request Stash Tests
//!
//! Tests for the request repository:
//! - Lookups by submitter and by status
//! - Empty matches are successes
//! - Partition failures pass through unchanged

use std::sync::Arc;

use stashdb::credentials::VerifyKey;
use stashdb::stash::request::{REQUESTING_USER_VERIFY_KEY_PARTITION_KEY, STATUS_PARTITION_KEY};
use stashdb::stash::{Request, RequestStash, RequestStatus};
use stashdb::store::{
    Access, AccessPolicy, DocumentStorePartition, InMemoryPartition, PartitionSettings, QueryKeys,
    StoreError, StoreErrorKind, StoreResult, Uid,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn stash(root: VerifyKey) -> RequestStash {
    RequestStash::in_memory(AccessPolicy::new(root))
}

/// Partition whose key resolution always fails
struct FailingPartition {
    settings: PartitionSettings,
}

impl FailingPartition {
    fn new() -> Self {
        Self {
            settings: PartitionSettings::for_document::<Request>("Request"),
        }
    }
}

impl DocumentStorePartition<Request> for FailingPartition {
    fn settings(&self) -> &PartitionSettings {
        &self.settings
    }

    fn register(&self, _credentials: &VerifyKey, obj: Request) -> StoreResult<Request> {
        Ok(obj)
    }

    fn delete(&self, _credentials: &VerifyKey, _uid: &Uid) -> StoreResult<()> {
        Ok(())
    }

    fn contains(&self, _credentials: &VerifyKey, _uid: &Uid) -> bool {
        false
    }

    fn get(&self, _credentials: &VerifyKey, _uid: &Uid) -> StoreResult<Option<Request>> {
        Ok(None)
    }

    fn get_all(&self, _credentials: &VerifyKey) -> StoreResult<Vec<Request>> {
        Ok(Vec::new())
    }

    fn get_many(&self, _credentials: &VerifyKey, _uids: &[Uid]) -> StoreResult<Vec<Request>> {
        Ok(Vec::new())
    }

    fn find_index_or_search_keys(
        &self,
        _credentials: &VerifyKey,
        _index_qks: &QueryKeys,
        search_qks: &QueryKeys,
    ) -> StoreResult<Vec<Uid>> {
        Err(StoreError::query(format!(
            "Failed to query index or search with {}",
            search_qks.all()[0]
        )))
    }
}

// =============================================================================
// Lookups
// =============================================================================

/// A stash with no requests returns empty lists, not errors.
#[test]
fn test_no_requests() {
    let root = VerifyKey::generate();
    let stash = stash(root);

    assert!(stash.get_all_for_verify_key(&root, &root).unwrap().is_empty());
    assert!(stash
        .get_all_for_status(&root, RequestStatus::Pending)
        .unwrap()
        .is_empty());
}

/// One pending request for K is found by K and by PENDING, not by APPROVED.
#[test]
fn test_pending_request_scenario() {
    let root = VerifyKey::generate();
    let submitter = VerifyKey::generate();
    let stash = stash(root);
    let request = stash.set(&root, Request::new(submitter, vec![])).unwrap();

    let by_key = stash.get_all_for_verify_key(&root, &submitter).unwrap();
    assert_eq!(by_key, vec![request.clone()]);

    let pending = stash.get_all_for_status(&root, RequestStatus::Pending).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].status, RequestStatus::Pending);

    let approved = stash.get_all_for_status(&root, RequestStatus::Approved).unwrap();
    assert!(approved.is_empty());
}

/// Requests are split by submitter.
#[test]
fn test_verify_key_isolation() {
    let root = VerifyKey::generate();
    let alice = VerifyKey::generate();
    let bob = VerifyKey::generate();
    let stash = stash(root);

    let a1 = stash.set(&root, Request::new(alice, vec!["a".to_string()])).unwrap();
    stash.set(&root, Request::new(bob, vec![])).unwrap();
    let a2 = stash.set(&root, Request::new(alice, vec!["b".to_string()])).unwrap();

    assert_eq!(stash.get_all_for_verify_key(&root, &alice).unwrap(), vec![a1, a2]);
    assert_eq!(stash.get_all_for_verify_key(&root, &bob).unwrap().len(), 1);
    assert!(stash
        .get_all_for_verify_key(&root, &VerifyKey::generate())
        .unwrap()
        .is_empty());
}

/// Deleted requests disappear from both lookups.
#[test]
fn test_delete_removes_from_lookups() {
    let root = VerifyKey::generate();
    let submitter = VerifyKey::generate();
    let stash = stash(root);
    let request = stash.set(&root, Request::new(submitter, vec![])).unwrap();

    stash.delete_by_uid(&root, &request.id).unwrap();
    assert!(stash.get_all_for_verify_key(&root, &submitter).unwrap().is_empty());
    assert!(stash
        .get_all_for_status(&root, RequestStatus::Pending)
        .unwrap()
        .is_empty());
    assert_eq!(stash.get_by_uid(&root, &request.id).unwrap(), None);
}

/// Explicit keys on both attributes intersect.
#[test]
fn test_combined_query() {
    let root = VerifyKey::generate();
    let submitter = VerifyKey::generate();
    let stash = stash(root);
    stash.set(&root, Request::new(submitter, vec![])).unwrap();
    let approved = stash
        .set(&root, Request::new(submitter, vec![]).with_status(RequestStatus::Approved))
        .unwrap();

    let qks = QueryKeys::new(vec![
        REQUESTING_USER_VERIFY_KEY_PARTITION_KEY.with_obj(submitter),
        STATUS_PARTITION_KEY.with_obj(RequestStatus::Approved),
    ]);
    assert_eq!(stash.stash().query_all(&root, &qks).unwrap(), vec![approved]);
}

// =============================================================================
// Error Pass-Through
// =============================================================================

/// A failing key lookup surfaces unchanged from get_all_for_verify_key.
#[test]
fn test_verify_key_lookup_failure_passes_through() {
    let root = VerifyKey::generate();
    let stash = RequestStash::new(Arc::new(FailingPartition::new()));

    let err = stash.get_all_for_verify_key(&root, &root).unwrap_err();
    let expected = StoreError::query(format!(
        "Failed to query index or search with {}",
        REQUESTING_USER_VERIFY_KEY_PARTITION_KEY.with_obj(root)
    ));
    assert_eq!(err, expected);
}

/// A failing key lookup surfaces unchanged from get_all_for_status.
#[test]
fn test_status_lookup_failure_passes_through() {
    let root = VerifyKey::generate();
    let stash = RequestStash::new(Arc::new(FailingPartition::new()));

    let err = stash
        .get_all_for_status(&root, RequestStatus::Pending)
        .unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::Query);
    assert_eq!(
        err.message(),
        "Failed to query index or search with QueryKey(key=status, value=\"pending\")"
    );
}

/// A denied reader gets the partition's permission error unchanged.
#[test]
fn test_permission_denied_passes_through() {
    let root = VerifyKey::generate();
    let outsider = VerifyKey::generate();
    let stash = RequestStash::in_memory(AccessPolicy::new(root).with_read(Access::RootOnly));
    stash.set(&root, Request::new(outsider, vec![])).unwrap();

    let err = stash.get_all_for_verify_key(&outsider, &outsider).unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::PermissionDenied);
}

/// With row ownership, submitters only see requests they registered.
#[test]
fn test_row_ownership() {
    let root = VerifyKey::generate();
    let alice = VerifyKey::generate();
    let bob = VerifyKey::generate();
    let policy = AccessPolicy::new(root).with_row_ownership(true);
    let partition: Arc<dyn DocumentStorePartition<Request>> =
        Arc::new(InMemoryPartition::for_document(policy));
    let stash = RequestStash::new(partition);

    stash.set(&alice, Request::new(alice, vec![])).unwrap();
    stash.set(&bob, Request::new(bob, vec![])).unwrap();

    assert_eq!(stash.get_all_for_status(&alice, RequestStatus::Pending).unwrap().len(), 1);
    assert_eq!(stash.get_all_for_status(&root, RequestStatus::Pending).unwrap().len(), 2);
    assert!(stash.get_all_for_verify_key(&alice, &bob).unwrap().is_empty());
}
