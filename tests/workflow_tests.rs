mod common;

use common::{ANN, ann, bob, boss, d, service};
use toil_ledger::core::workflow::{Transition, next_status, require_reason};
use toil_ledger::models::outcome::FailureKind;
use toil_ledger::models::status::{EntryStatus, SubmissionStatus};

#[test]
fn test_only_pending_submissions_can_move() {
    use SubmissionStatus::*;

    assert_eq!(next_status(Pending, Transition::Approve).unwrap(), Some(Approved));
    assert_eq!(next_status(Pending, Transition::Reject).unwrap(), Some(Rejected));
    assert_eq!(next_status(Pending, Transition::Cancel).unwrap(), None);

    for status in [Approved, Rejected] {
        for t in [Transition::Approve, Transition::Reject, Transition::Cancel] {
            let err = status.apply(t).unwrap_err();
            assert_eq!(err.kind, FailureKind::InvalidState);
        }
    }

    let err = next_status(Approved, Transition::Approve).unwrap_err();
    assert_eq!(err.message, "Cannot approve a submission that is already approved.");
}

#[test]
fn test_rejection_needs_a_reason() {
    assert_eq!(require_reason(Some("  too much  ")).unwrap(), "too much");
    assert_eq!(require_reason(Some("   ")).unwrap_err().kind, FailureKind::Validation);
    assert!(require_reason(None).is_err());
}

#[test]
fn test_submit_requires_entries_and_owner() {
    let mut svc = service();

    let empty = svc.submit(&ann(), ANN, d("2025-03-03")).unwrap();
    assert_eq!(empty.kind, Some(FailureKind::Validation));
    assert!(empty.message().contains("2025-03-03"));

    assert!(svc.upsert_entry(&ann(), ANN, d("2025-03-04"), "02:00", "00:00", None).unwrap().success);

    let by_admin = svc.submit(&boss(), ANN, d("2025-03-04")).unwrap();
    assert_eq!(by_admin.kind, Some(FailureKind::Unauthorized));

    let by_other = svc.submit(&bob(), ANN, d("2025-03-04")).unwrap();
    assert_eq!(by_other.kind, Some(FailureKind::Unauthorized));
}

#[test]
fn test_second_approval_is_refused() {
    let mut svc = service();
    assert!(svc.upsert_entry(&ann(), ANN, d("2025-03-03"), "04:00", "00:00", None).unwrap().success);
    let id = svc.submit(&ann(), ANN, d("2025-03-03")).unwrap().data.unwrap().id;

    assert!(svc.approve(&boss(), id, None).unwrap().success);

    let again = svc.approve(&boss(), id, None).unwrap();
    assert!(!again.success);
    assert_eq!(again.kind, Some(FailureKind::InvalidState));
    assert!(again.message().contains("already approved"));

    let reject = svc.reject(&boss(), id, Some("late")).unwrap();
    assert_eq!(reject.kind, Some(FailureKind::InvalidState));

    let list = svc.list_submissions(&boss(), Some(ANN), None).unwrap().data.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].status, SubmissionStatus::Approved);
    assert_eq!(svc.get_balance(&ann(), ANN).unwrap().data.unwrap().total_hours, "04:00");

    let resubmit = svc.submit(&ann(), ANN, d("2025-03-03")).unwrap();
    assert_eq!(resubmit.kind, Some(FailureKind::InvalidState));
    assert!(resubmit.message().contains("already approved"));
}

#[test]
fn test_review_checks_authorization_before_state() {
    let mut svc = service();
    assert!(svc.upsert_entry(&ann(), ANN, d("2025-03-03"), "04:00", "00:00", None).unwrap().success);
    let id = svc.submit(&ann(), ANN, d("2025-03-03")).unwrap().data.unwrap().id;

    let own = svc.approve(&ann(), id, None).unwrap();
    assert_eq!(own.kind, Some(FailureKind::Unauthorized));

    assert!(svc.approve(&boss(), id, None).unwrap().success);

    // a non-admin is refused even though the state is also wrong
    let late = svc.approve(&bob(), id, None).unwrap();
    assert_eq!(late.kind, Some(FailureKind::Unauthorized));

    let missing = svc.approve(&boss(), 999, None).unwrap();
    assert_eq!(missing.kind, Some(FailureKind::NotFound));
    assert_eq!(missing.message(), "Submission 999 not found.");
}

#[test]
fn test_cancel_returns_entries_to_draft() {
    let mut svc = service();
    assert!(svc.upsert_entry(&ann(), ANN, d("2025-03-03"), "04:00", "00:00", None).unwrap().success);
    let id = svc.submit(&ann(), ANN, d("2025-03-03")).unwrap().data.unwrap().id;

    // entries added to a pending week join the submission
    let late = svc
        .upsert_entry(&ann(), ANN, d("2025-03-05"), "01:00", "00:00", None)
        .unwrap()
        .data
        .unwrap();
    assert_eq!(late.status, EntryStatus::Pending);

    let denied = svc.cancel(&bob(), id).unwrap();
    assert_eq!(denied.kind, Some(FailureKind::Unauthorized));
    let by_admin = svc.cancel(&boss(), id).unwrap();
    assert_eq!(by_admin.kind, Some(FailureKind::Unauthorized));

    assert!(svc.cancel(&ann(), id).unwrap().success);

    let entries = svc.list_entries(&ann(), ANN, None, None).unwrap().data.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.status == EntryStatus::Draft));
    assert!(svc.list_submissions(&ann(), None, None).unwrap().data.unwrap().is_empty());

    let gone = svc.cancel(&ann(), id).unwrap();
    assert_eq!(gone.kind, Some(FailureKind::NotFound));
}

#[test]
fn test_rejected_week_can_be_resubmitted() {
    let mut svc = service();
    assert!(svc.upsert_entry(&ann(), ANN, d("2025-03-03"), "04:00", "00:00", None).unwrap().success);
    let id = svc.submit(&ann(), ANN, d("2025-03-03")).unwrap().data.unwrap().id;

    let no_reason = svc.reject(&boss(), id, Some("  ")).unwrap();
    assert_eq!(no_reason.kind, Some(FailureKind::Validation));

    let rejected = svc.reject(&boss(), id, Some("not agreed")).unwrap();
    assert!(rejected.success);
    assert_eq!(rejected.data.unwrap().status, SubmissionStatus::Rejected);

    let entries = svc.list_entries(&ann(), ANN, None, None).unwrap().data.unwrap();
    assert_eq!(entries[0].status, EntryStatus::Rejected);
    assert_eq!(entries[0].admin_comments.as_deref(), Some("not agreed"));
    assert_eq!(svc.get_balance(&ann(), ANN).unwrap().data.unwrap().total_hours, "00:00");

    let again = svc.submit(&ann(), ANN, d("2025-03-07")).unwrap();
    assert!(again.success, "{}", again.message());
    let again = again.data.unwrap();
    assert_eq!(again.id, id);
    assert_eq!(again.status, SubmissionStatus::Pending);
    assert_eq!(again.approved_by, None);

    let entries = svc.list_entries(&ann(), ANN, None, None).unwrap().data.unwrap();
    assert_eq!(entries[0].status, EntryStatus::Pending);
}

#[test]
fn test_approved_week_refuses_new_entries() {
    let mut svc = service();
    assert!(svc.upsert_entry(&ann(), ANN, d("2025-03-03"), "04:00", "00:00", None).unwrap().success);
    let id = svc.submit(&ann(), ANN, d("2025-03-03")).unwrap().data.unwrap().id;
    assert!(svc.approve(&boss(), id, None).unwrap().success);

    let late = svc
        .upsert_entry(&ann(), ANN, d("2025-03-05"), "03:00", "00:00", None)
        .unwrap();
    assert!(!late.success);
    assert_eq!(late.kind, Some(FailureKind::InvalidState));
    assert!(late.message().contains("2025-03-03"), "{}", late.message());

    let entries = svc.list_entries(&ann(), ANN, None, None).unwrap().data.unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries.iter().all(|e| e.status == EntryStatus::Approved));

    // the following week is open again
    let next = svc
        .upsert_entry(&ann(), ANN, d("2025-03-10"), "03:00", "00:00", None)
        .unwrap();
    assert!(next.success, "{}", next.message());
    assert_eq!(next.data.unwrap().status, EntryStatus::Draft);
    assert!(svc.submit(&ann(), ANN, d("2025-03-10")).unwrap().success);
}

#[test]
fn test_list_submissions_scoping() {
    let mut svc = service();
    assert!(svc.upsert_entry(&ann(), ANN, d("2025-03-03"), "01:00", "00:00", None).unwrap().success);
    assert!(svc.upsert_entry(&bob(), "bob@example.com", d("2025-03-03"), "01:00", "00:00", None).unwrap().success);
    assert!(svc.submit(&ann(), ANN, d("2025-03-03")).unwrap().success);
    assert!(svc.submit(&bob(), "bob@example.com", d("2025-03-03")).unwrap().success);

    let mine = svc.list_submissions(&ann(), None, None).unwrap().data.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].user_id, ANN);

    let denied = svc.list_submissions(&ann(), Some("bob@example.com"), None).unwrap();
    assert_eq!(denied.kind, Some(FailureKind::Unauthorized));

    let pending = svc
        .list_submissions(&boss(), None, Some(SubmissionStatus::Pending))
        .unwrap()
        .data
        .unwrap();
    assert_eq!(pending.len(), 2);
    let approved = svc
        .list_submissions(&boss(), None, Some(SubmissionStatus::Approved))
        .unwrap()
        .data
        .unwrap();
    assert!(approved.is_empty());
}
