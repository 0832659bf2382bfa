mod common;

use datagrid::{CellEditController, EditState, EditStatus, EditTarget, RecordStore};

use common::people;

fn target(row: usize, store: &RecordStore) -> EditTarget {
    EditTarget {
        row,
        record: store.id_at(row).unwrap(),
        column: 1,
        column_name: "Age".to_string(),
    }
}

fn store() -> RecordStore {
    let mut store = RecordStore::new();
    for record in people() {
        store.add(record).unwrap();
    }
    store
}

#[test]
fn test_begin_enters_editing() {
    let store = store();
    let mut editor = CellEditController::new();
    assert_eq!(editor.state(), EditState::Idle);

    assert!(editor.begin(target(2, &store), "58".into()).is_none());

    assert_eq!(editor.state(), EditState::Editing);
    let session = editor.session().unwrap();
    assert_eq!(session.original, "58");
    assert_eq!(session.draft, "58");
    assert_eq!(session.status, EditStatus::Editing);
}

#[test]
fn test_commit_changed_draft() {
    let store = store();
    let mut editor = CellEditController::new();
    editor.begin(target(2, &store), "58".into());

    assert!(editor.begin_commit("59"));
    assert_eq!(editor.state(), EditState::Committing);

    let outcome = editor.finish_commit().unwrap();
    assert_eq!(outcome.old_value, "58");
    assert_eq!(outcome.new_value, "59");
    assert_eq!(outcome.target.row, 2);
    assert_eq!(editor.state(), EditState::Idle);
}

#[test]
fn test_commit_unchanged_draft_is_noop() {
    let store = store();
    let mut editor = CellEditController::new();
    editor.begin(target(2, &store), "58".into());
    editor.set_draft("60");
    editor.set_draft("58");

    assert!(editor.begin_commit("58"));
    assert!(editor.finish_commit().is_none());
    assert_eq!(editor.state(), EditState::Idle);
}

#[test]
fn test_second_begin_cancels_first() {
    let store = store();
    let mut editor = CellEditController::new();
    editor.begin(target(0, &store), "34".into());
    editor.set_draft("99");

    let cancelled = editor.begin(target(3, &store), "41".into()).unwrap();
    assert_eq!(cancelled.target.row, 0);
    assert_eq!(cancelled.draft, "99");

    let session = editor.session().unwrap();
    assert_eq!(session.target.row, 3);
    assert_eq!(session.draft, "41");
}

#[test]
fn test_cancel_returns_to_idle() {
    let store = store();
    let mut editor = CellEditController::new();
    editor.begin(target(1, &store), "27".into());
    editor.set_draft("28");

    assert!(editor.cancel().is_some());
    assert_eq!(editor.state(), EditState::Idle);
    assert!(editor.cancel().is_none());
}

#[test]
fn test_idle_transitions_are_rejected() {
    let mut editor = CellEditController::new();
    assert!(!editor.set_draft("x"));
    assert!(!editor.begin_commit("x"));
    assert!(editor.finish_commit().is_none());
}

#[test]
fn test_finish_requires_committing() {
    let store = store();
    let mut editor = CellEditController::new();
    editor.begin(target(1, &store), "27".into());
    editor.set_draft("30");

    assert!(editor.finish_commit().is_none());
    assert_eq!(editor.state(), EditState::Editing);
}

#[test]
fn test_retarget_moves_row_only() {
    let store = store();
    let mut editor = CellEditController::new();
    let t = target(2, &store);
    let record = t.record;
    editor.begin(t, "58".into());

    editor.retarget(5);
    let session = editor.session().unwrap();
    assert_eq!(session.target.row, 5);
    assert_eq!(session.target.record, record);
}
