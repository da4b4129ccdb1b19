use progressctl::project::{ProjectId, ProjectProgressState};
use progressctl::update::{
    discard_draft, draft_path, load_draft, save_draft, AttachedFile, DraftError, DraftSession,
    FileKind, UploadLimits,
};
use tempfile::tempdir;

fn snapshot() -> ProjectProgressState {
    ProjectProgressState {
        id: ProjectId::parse("PRJ-55").expect("project id"),
        name: "Drainage upgrade".to_string(),
        progress: 62.0,
        bill_amount_submitted: 410_000.0,
        estimated_cost: 900_000.0,
    }
}

#[test]
fn a_fresh_session_mirrors_the_committed_snapshot() {
    let session = DraftSession::open(snapshot());
    assert_eq!(session.proposed.progress, Some(62.0));
    assert_eq!(session.proposed.new_bill_amount, Some(410_000.0));
    assert!(session.proposed.remarks.is_empty());
    assert!(!session.flags.any());
    assert_eq!(session.snapshot().estimated_cost, 900_000.0);
}

#[test]
fn a_session_with_no_active_flags_fails_validation_with_a_general_error() {
    let session = DraftSession::open(snapshot());
    let errors = session.validate(UploadLimits::default());
    assert_eq!(errors.len(), 1);
    assert!(errors.contains("general"));
}

#[test]
fn an_unchanged_draft_with_an_active_flag_is_valid() {
    let mut session = DraftSession::open(snapshot());
    session.flags.physical = true;
    assert!(session.validate(UploadLimits::default()).is_empty());
}

#[test]
fn submit_guard_blocks_concurrent_submissions_for_one_session() {
    let mut session = DraftSession::open(snapshot());
    session.begin_submit().expect("first submit");
    assert!(session.is_submitting());
    let err = session.begin_submit().expect_err("guard");
    assert!(matches!(err, DraftError::SubmitInFlight));
    session.finish_submit();
    assert!(!session.is_submitting());
}

#[test]
fn drafts_persist_under_the_state_root_and_are_discardable() {
    let temp = tempdir().expect("tempdir");
    let id = ProjectId::parse("PRJ-55").expect("project id");

    let mut session = DraftSession::open(snapshot());
    session.flags.financial = true;
    session.proposed.new_bill_amount = Some(450_000.0);
    session.proposed.remarks = "third running bill".to_string();
    session.attach_file(AttachedFile::new("rb3.xlsx", FileKind::Excel, vec![9; 256]));

    save_draft(temp.path(), &id, &session).expect("save");
    assert!(draft_path(temp.path(), &id).exists());

    let stored = load_draft(temp.path(), &id).expect("load").expect("present");
    assert_eq!(stored.proposed.new_bill_amount, Some(450_000.0));
    assert_eq!(stored.proposed.remarks, "third running bill");
    assert!(stored.flags.financial);
    assert!(!stored.flags.physical);
    assert_eq!(stored.file_names, vec!["rb3.xlsx".to_string()]);

    discard_draft(temp.path(), &id).expect("discard");
    assert!(load_draft(temp.path(), &id).expect("reload").is_none());
    // Discarding again is a no-op, not an error.
    discard_draft(temp.path(), &id).expect("double discard");
}

#[test]
fn stored_drafts_use_camel_case_field_names() {
    let temp = tempdir().expect("tempdir");
    let id = ProjectId::parse("PRJ-55").expect("project id");
    let mut session = DraftSession::open(snapshot());
    session.flags.financial = true;
    session.proposed.bill_details.bill_number = Some("RB-3".to_string());

    save_draft(temp.path(), &id, &session).expect("save");
    let raw = std::fs::read_to_string(draft_path(temp.path(), &id)).expect("read raw");
    assert!(raw.contains("newBillAmount"));
    assert!(raw.contains("billNumber"));
    assert!(raw.contains("fileNames"));
}
