//! End-to-end checks against files on disk.

use paramspy::query::Direction;
use paramspy::RecordingSession;
use paramspy_check::{load_expectations, run_checks, CheckError, Status};
use std::fs;

fn recorded_session() -> RecordingSession {
    let mut session = RecordingSession::new();
    session.search(["Post"], |s| {
        s.keywords("first");
    });
    session.search(["Post"], |s| {
        s.keywords_in("great pizza", ["title", "body"])
            .with("blog_id", 4)
            .without("published", false)
            .facet("category_ids")
            .order_by("created_at", Direction::Desc)
            .paginate(2, 15);
    });
    session
}

#[test]
fn test_yaml_expectations_against_saved_recording() {
    let dir = tempfile::tempdir().unwrap();
    let recording = dir.path().join("recording.json");
    let expectations = dir.path().join("expectations.yaml");

    recorded_session().save_to_file(&recording).unwrap();
    fs::write(
        &expectations,
        r#"
expectations:
  - kind: is_search_for
    class: Post
  - kind: is_not_search_for
    class: Comment
  - kind: has_search_params
    operation: keywords
    args: ["great pizza", {fields: [title, body]}]
  - kind: has_search_params
    operation: without
    args: [published, false]
  - kind: has_search_params
    operation: facet
    args: [category_ids]
  - kind: has_search_params
    operation: paginate
    args: [{page: 2, per_page: 15}]
  - kind: has_no_search_params
    operation: order_by
    args: [created_at, asc]
"#,
    )
    .unwrap();

    let session = RecordingSession::load_from_file(&recording).unwrap();
    let file = load_expectations(&expectations).unwrap();
    let report = run_checks(&session, &file);

    assert_eq!(report.checked, 7);
    assert!(report.is_success(), "{report:#?}");
}

#[test]
fn test_json_expectations_report_failures() {
    let dir = tempfile::tempdir().unwrap();
    let expectations = dir.path().join("expectations.json");
    fs::write(
        &expectations,
        r#"{"expectations": [
            {"kind": "has_search_params", "operation": "keywords", "args": ["first"]}
        ]}"#,
    )
    .unwrap();

    let file = load_expectations(&expectations).unwrap();
    let report = run_checks(&recorded_session(), &file);

    assert_eq!(report.outcomes[0].status, Status::Failed);
    let message = report.outcomes[0].message.as_deref().unwrap();
    assert!(message.starts_with("expected search params: q => great pizza"));
}

#[test]
fn test_missing_expectations_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_expectations(&dir.path().join("missing.yaml")).unwrap_err();
    assert!(matches!(err, CheckError::Read { .. }));
}

#[test]
fn test_malformed_expectations_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "expectations:\n  - kind: not_a_kind\n").unwrap();
    assert!(matches!(
        load_expectations(&path),
        Err(CheckError::Yaml(_))
    ));
}
