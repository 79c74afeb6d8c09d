use std::sync::Arc;

use anyhow::{anyhow, Result};
use client_core::{
    MessageBus, NotificationSink, RecordCreationController, RemoteStore, StudentTableController,
};
use shared::domain::{Student, StudentId};
use storage::Storage;
use tracing::info;

/// One client session: a creation form and a table view sharing a bus.
pub struct RosterApp {
    pub creation: RecordCreationController,
    pub table: StudentTableController,
}

impl RosterApp {
    pub fn new(store: Arc<dyn RemoteStore>, notifier: Arc<dyn NotificationSink>) -> Self {
        let bus = MessageBus::new();
        let table = StudentTableController::new(store.clone(), notifier.clone(), bus.clone());
        table.connect();
        let creation = RecordCreationController::new(store, notifier, bus);
        Self { creation, table }
    }

    /// Opens a session on `storage` with the table seeded from its listing.
    pub async fn open(storage: Storage, notifier: Arc<dyn NotificationSink>) -> Result<Self> {
        let rows = storage.list_students().await?;
        info!("roster: loaded {} students from storage", rows.len());
        let app = Self::new(Arc::new(storage), notifier);
        app.table.load(rows);
        Ok(app)
    }

    pub fn find_row(&self, id: &str) -> Result<Student> {
        self.table
            .row(&StudentId::new(id))
            .ok_or_else(|| anyhow!("student {id} not found"))
    }
}
