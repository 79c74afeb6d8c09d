use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shared::{
    domain::{FieldName, Student, StudentFields, StudentId},
    error::{ErrorCode, RemoteFailure},
    protocol::{Notification, Severity},
};
use tokio::sync::oneshot;

use crate::{NotificationSink, RemoteStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Create {
        object_type: String,
        fields: StudentFields,
    },
    Update(Student),
    Delete(StudentId),
}

/// Record store double with failure injection and an optional gate that
/// holds `update` open until released.
#[derive(Default)]
pub struct TestRemoteStore {
    fail_with: Mutex<Option<String>>,
    next_id: Mutex<u64>,
    calls: Mutex<Vec<StoreCall>>,
    update_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl TestRemoteStore {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(message: impl Into<String>) -> Arc<Self> {
        let store = Self::default();
        *store.fail_with.lock().expect("lock") = Some(message.into());
        Arc::new(store)
    }

    pub fn recover(&self) {
        self.fail_with.lock().expect("lock").take();
    }

    pub fn hold_updates(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.update_gate.lock().expect("lock") = Some(rx);
        tx
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().expect("lock").clone()
    }

    fn record(&self, call: StoreCall) -> Result<(), RemoteFailure> {
        self.calls.lock().expect("lock").push(call);
        match self.fail_with.lock().expect("lock").clone() {
            Some(message) => Err(RemoteFailure::new(ErrorCode::Internal, message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteStore for TestRemoteStore {
    async fn create(
        &self,
        object_type: &str,
        fields: &StudentFields,
    ) -> Result<StudentId, RemoteFailure> {
        self.record(StoreCall::Create {
            object_type: object_type.to_string(),
            fields: fields.clone(),
        })?;
        let mut next_id = self.next_id.lock().expect("lock");
        *next_id += 1;
        Ok(StudentId::new(format!("a0{}", *next_id)))
    }

    async fn update(&self, record: &Student) -> Result<(), RemoteFailure> {
        let gate = self.update_gate.lock().expect("lock").take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.record(StoreCall::Update(record.clone()))
    }

    async fn delete(&self, id: &StudentId) -> Result<(), RemoteFailure> {
        self.record(StoreCall::Delete(id.clone()))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().expect("lock").clone()
    }

    pub fn severities(&self) -> Vec<Severity> {
        self.notifications()
            .into_iter()
            .map(|note| note.severity)
            .collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.notifications.lock().expect("lock").last().cloned()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().expect("lock").push(notification);
    }
}

pub fn ann_fields() -> StudentFields {
    StudentFields::default()
        .with(FieldName::Name, "Ann")
        .with(FieldName::DateOfBirth, "2010-01-01")
        .with(FieldName::Hobbies, "Chess")
}

pub fn student(id: &str, name: &str) -> Student {
    Student::new(StudentId::new(id), ann_fields().with(FieldName::Name, name))
}
