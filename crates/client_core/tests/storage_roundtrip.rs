use std::sync::{Arc, Mutex};

use client_core::{
    MessageBus, NotificationSink, RecordCreationController, RemoteStore, RosterError, SaveOutcome,
    StudentTableController,
};
use shared::{
    domain::{FieldName, StudentFields, StudentId},
    error::ErrorCode,
    protocol::{Notification, RowAction, Severity},
};
use storage::Storage;

#[derive(Default)]
struct CollectingSink(Mutex<Vec<Notification>>);

impl NotificationSink for CollectingSink {
    fn notify(&self, notification: Notification) {
        self.0.lock().expect("lock").push(notification);
    }
}

fn ann() -> StudentFields {
    StudentFields::default()
        .with(FieldName::Name, "Ann")
        .with(FieldName::DateOfBirth, "2010-01-01")
        .with(FieldName::Hobbies, "Chess")
}

#[tokio::test]
async fn create_edit_delete_against_sqlite() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let store: Arc<dyn RemoteStore> = Arc::new(storage.clone());
    let sink = Arc::new(CollectingSink::default());
    let bus = MessageBus::new();

    let table = StudentTableController::new(store.clone(), sink.clone(), bus.clone());
    table.connect();
    let creation = RecordCreationController::new(store, sink.clone(), bus);

    creation.fill(ann());
    let created = creation.create().await.expect("create");
    assert_eq!(table.rows(), vec![created.clone()]);
    assert_eq!(storage.list_students().await.expect("list"), vec![created.clone()]);

    table
        .handle_row_action(RowAction::Edit(created.clone()))
        .await
        .expect("edit");
    table.edit_field(FieldName::Country, "Ireland").expect("field");
    let saved = match table.save().await.expect("save") {
        SaveOutcome::Applied(record) => record,
        other => panic!("unexpected outcome: {other:?}"),
    };
    let stored = storage
        .get_student(created.id())
        .await
        .expect("get")
        .expect("exists");
    assert_eq!(stored.student, saved);
    assert_eq!(table.rows(), vec![saved.clone()]);

    table
        .handle_row_action(RowAction::Delete(saved.clone()))
        .await
        .expect("delete");
    assert!(table.rows().is_empty());
    assert!(storage.list_students().await.expect("list").is_empty());

    let severities: Vec<_> = sink
        .0
        .lock()
        .expect("lock")
        .iter()
        .map(|note| note.severity)
        .collect();
    assert_eq!(
        severities,
        vec![
            Severity::Success,
            Severity::Info,
            Severity::Success,
            Severity::Success
        ]
    );
}

#[tokio::test]
async fn deleting_an_unknown_student_keeps_the_row() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let table = StudentTableController::new(
        Arc::new(storage),
        Arc::new(CollectingSink::default()),
        MessageBus::new(),
    );
    let ghost = shared::domain::Student::new(StudentId::new("ghost"), ann());
    table.load(vec![ghost.clone()]);

    match table.delete(&ghost).await {
        Err(RosterError::Remote(failure)) => assert_eq!(failure.code, ErrorCode::NotFound),
        other => panic!("expected not found, got {other:?}"),
    }
    assert_eq!(table.rows(), vec![ghost]);
}

#[tokio::test]
async fn rejects_foreign_object_types() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let failure = storage
        .create("Teacher__c", &ann())
        .await
        .expect_err("wrong object type");
    assert_eq!(failure.code, ErrorCode::Validation);
}
