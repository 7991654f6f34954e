mod common;

use common::{ANN, BOSS, ann, bob, boss, d, memory_pool};
use toil_ledger::TimesheetLogic;
use toil_ledger::db::timesheet::{TimeEntryFilter, find_timesheet};
use toil_ledger::models::outcome::FailureKind;
use toil_ledger::models::status::SubmissionStatus;
use toil_ledger::models::timesheet::NewTimeEntry;

fn hours(date: &str, project: &str, task: &str, hours: &str) -> NewTimeEntry {
    NewTimeEntry {
        user_id: ANN.to_string(),
        project: project.to_string(),
        task: task.to_string(),
        subtask: None,
        ticket: Some(" ".to_string()),
        date: d(date),
        hours: hours.to_string(),
        notes: None,
    }
}

fn logic_with_week() -> TimesheetLogic {
    let mut logic = TimesheetLogic::new(memory_pool());
    for (date, h) in [("2025-03-03", "07:30"), ("2025-03-04", "05:00")] {
        let out = logic
            .log_time(&ann(), hours(date, "Apollo", "Backend", h))
            .unwrap();
        assert!(out.success, "{}", out.message());
    }
    logic
}

#[test]
fn test_log_time_validates_input() {
    let mut logic = TimesheetLogic::new(memory_pool());

    let saved = logic
        .log_time(&ann(), hours("2025-03-03", " Apollo ", "Backend", "01:10"))
        .unwrap()
        .data
        .unwrap();
    assert_eq!(saved.project, "Apollo");
    assert_eq!(saved.hours, "01:15");
    assert_eq!(saved.ticket, None);

    let no_task = logic
        .log_time(&ann(), hours("2025-03-03", "Apollo", "  ", "01:00"))
        .unwrap();
    assert_eq!(no_task.kind, Some(FailureKind::Validation));

    let zero = logic
        .log_time(&ann(), hours("2025-03-03", "Apollo", "Backend", "00:00"))
        .unwrap();
    assert_eq!(zero.kind, Some(FailureKind::Validation));

    let foreign = logic
        .log_time(&bob(), hours("2025-03-03", "Apollo", "Backend", "01:00"))
        .unwrap();
    assert_eq!(foreign.kind, Some(FailureKind::Unauthorized));
}

#[test]
fn test_list_and_delete_time_entries() {
    let mut logic = logic_with_week();

    let filter = TimeEntryFilter {
        from: Some(d("2025-03-04")),
        ..TimeEntryFilter::default()
    };
    let listed = logic.list_time(&ann(), filter).unwrap().data.unwrap();
    assert_eq!(listed.len(), 1);

    let others = logic.list_time(&bob(), TimeEntryFilter::default()).unwrap().data.unwrap();
    assert!(others.is_empty());

    let id = listed[0].id;
    assert_eq!(
        logic.delete_time(&bob(), id).unwrap().kind,
        Some(FailureKind::Unauthorized)
    );
    assert!(logic.delete_time(&ann(), id).unwrap().success);
    assert!(logic.delete_time(&ann(), id).unwrap().success);
}

#[test]
fn test_submit_totals_hours_and_refuses_duplicates() {
    let mut logic = logic_with_week();

    let sheet = logic
        .submit(&ann(), ANN, d("2025-03-03"), d("2025-03-09"))
        .unwrap()
        .data
        .unwrap();
    assert_eq!(sheet.total_hours, "12:30");
    assert_eq!(sheet.status, SubmissionStatus::Pending);

    let dup = logic
        .submit(&ann(), ANN, d("2025-03-03"), d("2025-03-09"))
        .unwrap();
    assert_eq!(dup.kind, Some(FailureKind::InvalidState));
    assert!(dup.message().contains("already exists"));

    let backwards = logic
        .submit(&ann(), ANN, d("2025-03-09"), d("2025-03-03"))
        .unwrap();
    assert_eq!(backwards.kind, Some(FailureKind::Validation));

    let empty = logic
        .submit(&ann(), ANN, d("2025-04-01"), d("2025-04-07"))
        .unwrap();
    assert_eq!(empty.kind, Some(FailureKind::Validation));

    let by_admin = logic
        .submit(&boss(), ANN, d("2025-03-03"), d("2025-03-04"))
        .unwrap();
    assert_eq!(by_admin.kind, Some(FailureKind::Unauthorized));
}

#[test]
fn test_submit_refuses_overlapping_ranges() {
    let mut logic = logic_with_week();
    assert!(logic
        .log_time(&ann(), hours("2025-03-10", "Apollo", "Backend", "04:00"))
        .unwrap()
        .success);
    assert!(logic.submit(&ann(), ANN, d("2025-03-03"), d("2025-03-09")).unwrap().success);

    for (from, to) in [("2025-03-04", "2025-03-04"), ("2025-03-09", "2025-03-10"), ("2025-03-01", "2025-03-31")] {
        let out = logic.submit(&ann(), ANN, d(from), d(to)).unwrap();
        assert_eq!(out.kind, Some(FailureKind::InvalidState), "{from}..{to}");
        assert!(out.message().contains("already exists"), "{}", out.message());
    }

    let adjacent = logic
        .submit(&ann(), ANN, d("2025-03-10"), d("2025-03-16"))
        .unwrap();
    assert!(adjacent.success, "{}", adjacent.message());
    assert_eq!(adjacent.data.unwrap().total_hours, "04:00");
}

#[test]
fn test_approve_timesheet() {
    let mut logic = logic_with_week();
    let id = logic
        .submit(&ann(), ANN, d("2025-03-03"), d("2025-03-09"))
        .unwrap()
        .data
        .unwrap()
        .id;

    assert_eq!(
        logic.approve(&ann(), id, None).unwrap().kind,
        Some(FailureKind::Unauthorized)
    );

    let approved = logic.approve(&boss(), id, Some("ok")).unwrap().data.unwrap();
    assert_eq!(approved.status, SubmissionStatus::Approved);
    assert_eq!(approved.approved_by.as_deref(), Some(BOSS));
    assert_eq!(approved.comments.as_deref(), Some("ok"));

    let again = logic.approve(&boss(), id, None).unwrap();
    assert_eq!(again.kind, Some(FailureKind::InvalidState));
}

#[test]
fn test_reject_archives_and_notifies() {
    let mut logic = logic_with_week();
    let id = logic
        .submit(&ann(), ANN, d("2025-03-03"), d("2025-03-09"))
        .unwrap()
        .data
        .unwrap()
        .id;

    let no_reason = logic.reject(&boss(), id, None).unwrap();
    assert_eq!(no_reason.kind, Some(FailureKind::Validation));

    let archived = logic.reject(&boss(), id, Some("missing tickets")).unwrap();
    assert!(archived.success, "{}", archived.message());
    let archive_id = archived.data.unwrap();

    let active = logic.pool().run(|conn| find_timesheet(conn, id)).unwrap();
    assert!(active.is_none());

    let rejections = logic.rejections(&ann(), None).unwrap().data.unwrap();
    assert_eq!(rejections.len(), 1);
    let r = &rejections[0];
    assert_eq!(r.id, archive_id);
    assert_eq!(r.submission_id, id);
    assert_eq!(r.reason, "missing tickets");
    assert_eq!(r.rejected_by, BOSS);
    let payload: serde_json::Value = serde_json::from_str(&r.payload).unwrap();
    assert_eq!(payload["status"], "rejected");
    assert_eq!(payload["total_hours"], "12:30");

    let notes = logic.notifications(&ann(), true, true).unwrap().data.unwrap();
    assert_eq!(notes.len(), 1);
    assert!(notes[0].message.contains("missing tickets"));
    assert!(notes[0].message.contains(BOSS));

    let unread = logic.notifications(&ann(), true, false).unwrap().data.unwrap();
    assert!(unread.is_empty());
    let all = logic.notifications(&ann(), false, false).unwrap().data.unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].read);

    // the archived range can be submitted again
    let again = logic
        .submit(&ann(), ANN, d("2025-03-03"), d("2025-03-09"))
        .unwrap();
    assert!(again.success, "{}", again.message());
    assert_ne!(again.data.unwrap().id, id);

    let missing = logic.reject(&boss(), id, Some("again")).unwrap();
    assert_eq!(missing.kind, Some(FailureKind::NotFound));
}

#[test]
fn test_failed_notification_keeps_timesheet_active() {
    let mut logic = logic_with_week();
    let id = logic
        .submit(&ann(), ANN, d("2025-03-03"), d("2025-03-09"))
        .unwrap()
        .data
        .unwrap()
        .id;

    logic
        .pool()
        .conn
        .execute_batch("DROP TABLE notifications")
        .unwrap();

    assert!(logic.reject(&boss(), id, Some("missing tickets")).is_err());

    let active = logic.pool().run(|conn| find_timesheet(conn, id)).unwrap();
    assert_eq!(active.map(|s| s.status), Some(SubmissionStatus::Pending));
    assert!(logic.rejections(&boss(), None).unwrap().data.unwrap().is_empty());
}

#[test]
fn test_timesheet_listing_is_scoped() {
    let mut logic = logic_with_week();
    assert!(logic.submit(&ann(), ANN, d("2025-03-03"), d("2025-03-09")).unwrap().success);

    assert_eq!(logic.list(&ann(), None, None).unwrap().data.unwrap().len(), 1);
    assert!(logic.list(&bob(), None, None).unwrap().data.unwrap().is_empty());
    assert_eq!(
        logic.list(&bob(), Some(ANN), None).unwrap().kind,
        Some(FailureKind::Unauthorized)
    );
    assert_eq!(
        logic
            .list(&boss(), None, Some(SubmissionStatus::Pending))
            .unwrap()
            .data
            .unwrap()
            .len(),
        1
    );
}
