//! Scenario tests: assertion snapshots as the sync engine leaves them, and the
//! status each one must report.

use assertion_status::{
    classify, AccessGrant, Assertion, AssertionStatus, StatusReconciler, SyncError,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

const MEMBER: &str = "salesforceId";
const TOKEN: &str = "idToken";

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn at(offset_secs: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(offset_secs)
}

fn approved() -> Vec<AccessGrant> {
    vec![AccessGrant::approved(MEMBER, TOKEN)]
}

fn denied() -> Vec<AccessGrant> {
    vec![AccessGrant::denied(MEMBER, TOKEN, t0())]
}

fn revoked() -> Vec<AccessGrant> {
    vec![AccessGrant::revoked(MEMBER, TOKEN, t0())]
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Stored error document as the sync engine persists it.
fn stored_error(code: i64, message: &str) -> String {
    serde_json::json!({ "statusCode": code, "error": message }).to_string()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn not_added() -> Assertion {
    Assertion::new(MEMBER, t0())
}

fn first_sync_failed() -> Assertion {
    not_added()
        .with_last_sync_attempt(t0())
        .with_raw_error(stored_error(500, "dummy"))
}

fn added_to_registry() -> Assertion {
    not_added()
        .with_added_at(at(10))
        .with_last_sync_attempt(at(10))
        .with_external_ref("put-code")
}

fn updated_since_adding() -> Assertion {
    added_to_registry().with_modified(at(20))
}

fn updated_in_registry() -> Assertion {
    updated_since_adding()
        .with_modified(at(30))
        .with_updated_at(at(40))
        .with_last_sync_attempt(at(40))
}

fn updated_since_updating() -> Assertion {
    updated_in_registry().with_modified(at(50))
}

fn deleted_in_registry() -> Assertion {
    added_to_registry().with_deleted_at(at(20))
}

fn failed_after_update(error: String) -> Assertion {
    updated_in_registry()
        .with_last_sync_attempt(at(50))
        .with_raw_error(error)
}

// ---------------------------------------------------------------------------
// Failures on record
// ---------------------------------------------------------------------------

#[test]
fn user_deleted_record_from_registry() {
    let assertion = failed_after_update(stored_error(404, "dummy"));
    assert_eq!(classify(&assertion, &approved()), AssertionStatus::UserDeletedFromRegistry);
}

#[test]
fn invalid_scope_failure_means_revoked_access() {
    let assertion = failed_after_update(stored_error(400, "error: invalid_scope"));
    assert_eq!(classify(&assertion, &revoked()), AssertionStatus::UserRevokedAccess);
    assert_eq!(classify(&assertion, &approved()), AssertionStatus::UserRevokedAccess);
}

#[test]
fn first_write_failed() {
    assert_eq!(classify(&first_sync_failed(), &approved()), AssertionStatus::ErrorAdding);
}

#[test]
fn later_write_failed() {
    let assertion = failed_after_update(stored_error(600, "dummy"));
    assert_eq!(classify(&assertion, &approved()), AssertionStatus::ErrorUpdating);
}

#[test]
fn edit_after_failed_attempt_is_pending_retry() {
    let assertion = failed_after_update(stored_error(500, "dummy")).with_modified(at(55));
    assert_eq!(classify(&assertion, &approved()), AssertionStatus::PendingRetry);
}

#[test]
fn edit_after_not_found_is_pending_retry() {
    let assertion = failed_after_update(stored_error(404, "dummy")).with_modified(at(55));
    assert_eq!(classify(&assertion, &approved()), AssertionStatus::PendingRetry);
}

#[test]
fn structured_and_stored_errors_agree() {
    let structured = updated_in_registry()
        .with_last_sync_attempt(at(50))
        .with_last_error(SyncError::new(404, "dummy"));
    let stored = failed_after_update(stored_error(404, "dummy"));
    assert_eq!(
        classify(&structured, &approved()),
        classify(&stored, &approved())
    );
}

#[test]
fn corrupted_error_payload_degrades_to_generic_failure() {
    init_tracing();

    let never_added = not_added()
        .with_last_sync_attempt(t0())
        .with_raw_error("<html>502 Bad Gateway</html>");
    assert_eq!(classify(&never_added, &approved()), AssertionStatus::ErrorAdding);

    let added = failed_after_update("{\"statusCode\":".into());
    assert_eq!(classify(&added, &approved()), AssertionStatus::ErrorUpdating);
}

#[test]
fn stored_document_nested_in_assertion_json() {
    let json = serde_json::json!({
        "member_id": MEMBER,
        "modified": at(30),
        "last_sync_attempt": at(50),
        "added_at": at(10),
        "last_error": { "statusCode": 404, "error": "dummy" },
    });
    let assertion: Assertion = serde_json::from_value(json).unwrap();
    assert_eq!(classify(&assertion, &approved()), AssertionStatus::UserDeletedFromRegistry);
}

#[test]
fn non_document_error_value_degrades_to_generic_failure() {
    let json = serde_json::json!({
        "member_id": MEMBER,
        "modified": at(30),
        "last_sync_attempt": at(50),
        "added_at": at(10),
        "last_error": 42,
    });
    let added: Assertion = serde_json::from_value(json.clone()).unwrap();
    assert_eq!(classify(&added, &approved()), AssertionStatus::ErrorUpdating);

    let mut never_added = json;
    never_added.as_object_mut().unwrap().remove("added_at");
    let never_added: Assertion = serde_json::from_value(never_added).unwrap();
    assert_eq!(classify(&never_added, &approved()), AssertionStatus::ErrorAdding);
}

// ---------------------------------------------------------------------------
// No failure on record
// ---------------------------------------------------------------------------

#[test]
fn never_synced_denied() {
    assert_eq!(classify(&not_added(), &denied()), AssertionStatus::UserDeniedAccess);
}

#[test]
fn never_synced_approved() {
    assert_eq!(classify(&not_added(), &approved()), AssertionStatus::Pending);
}

#[test]
fn deleted_in_registry_reports_deleted() {
    assert_eq!(classify(&deleted_in_registry(), &approved()), AssertionStatus::DeletedInRegistry);
}

#[test]
fn added_and_untouched_is_in_registry() {
    assert_eq!(classify(&added_to_registry(), &approved()), AssertionStatus::InRegistry);
}

#[test]
fn updated_and_untouched_is_in_registry() {
    assert_eq!(classify(&updated_in_registry(), &approved()), AssertionStatus::InRegistry);
}

#[test]
fn edited_since_adding_is_pending_retry() {
    assert_eq!(classify(&updated_since_adding(), &approved()), AssertionStatus::PendingRetry);
}

#[test]
fn edited_since_updating_is_pending_retry() {
    assert_eq!(classify(&updated_since_updating(), &approved()), AssertionStatus::PendingRetry);
}

#[test]
fn revoked_grant_without_failure() {
    assert_eq!(classify(&added_to_registry(), &revoked()), AssertionStatus::UserRevokedAccess);
}

// ---------------------------------------------------------------------------
// Denial dominance
// ---------------------------------------------------------------------------

#[test]
fn denial_overrides_every_history() {
    let histories = [
        not_added(),
        first_sync_failed(),
        added_to_registry(),
        updated_in_registry(),
        updated_since_updating(),
        deleted_in_registry(),
        failed_after_update(stored_error(404, "dummy")),
        failed_after_update(stored_error(400, "error: invalid_scope")),
    ];
    for assertion in &histories {
        assert_eq!(classify(assertion, &denied()), AssertionStatus::UserDeniedAccess);
    }
}

#[test]
fn batch_classification_matches_single_calls() {
    init_tracing();
    let reconciler = StatusReconciler::default();
    let assertions = vec![
        not_added(),
        first_sync_failed(),
        added_to_registry(),
        deleted_in_registry(),
        updated_since_updating(),
    ];
    let report = assertion_status::StatusReport::build(&reconciler, &assertions, &approved());

    assert_eq!(report.total(), assertions.len());
    for status in AssertionStatus::ALL {
        let expected = assertions
            .iter()
            .filter(|a| reconciler.classify(a, &approved()) == status)
            .count();
        assert_eq!(report.count(status), expected, "count for {status:?}");
    }
}
