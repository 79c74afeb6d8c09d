use std::sync::{Arc, Mutex};

use shared::{
    domain::{FieldName, Student, StudentId},
    protocol::{Notification, RowAction},
};
use tracing::{debug, info, warn};

use crate::{
    bus::{MessageBus, Subscription, STUDENT_CREATED},
    edit_session::{EditSession, EditState},
    error::RosterError,
    lock,
    roster::{ApplyOutcome, RosterCache},
    NotificationSink, RemoteStore,
};

pub const EDIT_STARTED: &str = "Editing record, make changes in the form below.";
pub const EDIT_BUSY: &str = "Finish or cancel the current edit before editing another record.";
pub const UPDATE_SUCCEEDED: &str = "Record updated successfully";
pub const DELETE_SUCCEEDED: &str = "Record deleted successfully";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Applied(Student),
    /// The store accepted the update but the row had already left the roster.
    RowMissing(Student),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowActionOutcome {
    Editing(EditSession),
    Deleted(StudentId),
}

/// Table view state: the roster, the live edit and the bus subscription
/// that feeds newly created students in.
pub struct StudentTableController {
    store: Arc<dyn RemoteStore>,
    notifier: Arc<dyn NotificationSink>,
    bus: MessageBus,
    roster: Arc<Mutex<RosterCache>>,
    edit: Mutex<EditState>,
    subscription: Mutex<Option<Subscription>>,
}

impl StudentTableController {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        notifier: Arc<dyn NotificationSink>,
        bus: MessageBus,
    ) -> Self {
        Self {
            store,
            notifier,
            bus,
            roster: Arc::new(Mutex::new(RosterCache::new())),
            edit: Mutex::new(EditState::default()),
            subscription: Mutex::new(None),
        }
    }

    /// Subscribes to created-student messages. Repeated calls keep the
    /// existing subscription; returns whether a new one was made.
    pub fn connect(&self) -> bool {
        let mut subscription = lock(&self.subscription);
        if subscription.is_some() {
            debug!("table: already subscribed");
            return false;
        }
        let roster = Arc::clone(&self.roster);
        *subscription = Some(self.bus.subscribe(&STUDENT_CREATED, move |record: Student| {
            apply_created(&roster, record);
        }));
        true
    }

    pub fn disconnect(&self) {
        lock(&self.subscription).take();
    }

    pub fn is_connected(&self) -> bool {
        lock(&self.subscription).is_some()
    }

    /// Replaces the roster with `rows`, e.g. a listing from the store.
    pub fn load(&self, rows: Vec<Student>) {
        let cache = RosterCache::from_rows(rows);
        info!("table: loaded rows={}", cache.len());
        *lock(&self.roster) = cache;
    }

    pub fn on_message(&self, record: Student) -> ApplyOutcome {
        apply_created(&self.roster, record)
    }

    pub fn rows(&self) -> Vec<Student> {
        lock(&self.roster).rows().to_vec()
    }

    pub fn row(&self, id: &StudentId) -> Option<Student> {
        lock(&self.roster).get(id).cloned()
    }

    pub fn active_edit(&self) -> Option<EditSession> {
        lock(&self.edit).session().cloned()
    }

    pub async fn handle_row_action(
        &self,
        action: RowAction,
    ) -> Result<RowActionOutcome, RosterError> {
        debug!("table: row action={} id={}", action.tag(), action.row().id());
        match action {
            RowAction::Edit(row) => self.request_edit(&row).map(RowActionOutcome::Editing),
            RowAction::Delete(row) => {
                self.delete(&row).await?;
                Ok(RowActionOutcome::Deleted(row.id().clone()))
            }
        }
    }

    /// Opens an edit session on a copy of `row`. A different row cannot be
    /// opened until the live session is saved or cancelled.
    pub fn request_edit(&self, row: &Student) -> Result<EditSession, RosterError> {
        let mut edit = lock(&self.edit);
        match edit.begin(row) {
            Ok(session) => {
                info!("table: editing student id={}", session.id());
                self.notifier.notify(Notification::info(EDIT_STARTED));
                Ok(session)
            }
            Err(err) => {
                warn!("table: edit of id={} rejected: {err}", row.id());
                self.notifier.notify(Notification::error(EDIT_BUSY));
                Err(err)
            }
        }
    }

    pub fn edit_field(&self, field: FieldName, value: impl Into<String>) -> Result<(), RosterError> {
        let mut edit = lock(&self.edit);
        let session = edit.session_mut().ok_or(RosterError::NoActiveEdit)?;
        session.set_field(field, value);
        Ok(())
    }

    pub fn cancel_edit(&self) -> Option<EditSession> {
        let cancelled = lock(&self.edit).cancel();
        if let Some(session) = &cancelled {
            info!("table: edit cancelled id={}", session.id());
        }
        cancelled
    }

    /// Sends the live draft to the store. The roster row is replaced only
    /// after the store confirms; on failure the session stays open.
    pub async fn save(&self) -> Result<SaveOutcome, RosterError> {
        let record = {
            let mut edit = lock(&self.edit);
            let session = edit.session_mut().ok_or(RosterError::NoActiveEdit)?;
            let result = session.validate();
            if let Some(primary) = result.primary() {
                self.notifier.notify(Notification::error(primary.message.clone()));
                return Err(RosterError::ValidationFailed {
                    field: primary.field,
                    message: primary.message.clone(),
                });
            }
            session.to_record()
        };

        if let Err(failure) = self.store.update(&record).await {
            warn!("save: store rejected update id={}: {failure}", record.id());
            self.notifier.notify(Notification::error(format!(
                "Error updating record: {}",
                failure.message
            )));
            return Err(failure.into());
        }

        self.notifier.notify(Notification::success(UPDATE_SUCCEEDED));
        let applied = lock(&self.roster).replace_by_id(record.clone());
        {
            let mut edit = lock(&self.edit);
            if edit.finish_if(&record).is_none()
                && edit.session().is_some_and(|session| session.id() == record.id())
            {
                warn!(
                    "save: draft of student id={} changed while saving; keeping it open",
                    record.id()
                );
            }
        }

        if applied {
            info!("save: updated student id={}", record.id());
            Ok(SaveOutcome::Applied(record))
        } else {
            warn!(
                "save: student id={} updated remotely but no longer in roster",
                record.id()
            );
            Ok(SaveOutcome::RowMissing(record))
        }
    }

    /// Deletes remotely first and drops the row only once confirmed.
    pub async fn delete(&self, row: &Student) -> Result<Option<Student>, RosterError> {
        if let Err(failure) = self.store.delete(row.id()).await {
            warn!("delete: store rejected delete id={}: {failure}", row.id());
            self.notifier.notify(Notification::error(format!(
                "Error deleting record: {}",
                failure.message
            )));
            return Err(failure.into());
        }

        let removed = lock(&self.roster).remove_by_id(row.id());
        if removed.is_none() {
            debug!("delete: student id={} was not in roster", row.id());
        }
        if lock(&self.edit).finish(row.id()).is_some() {
            info!("delete: discarded edit of deleted student id={}", row.id());
        }
        self.notifier.notify(Notification::success(DELETE_SUCCEEDED));
        Ok(removed)
    }
}

fn apply_created(roster: &Mutex<RosterCache>, record: Student) -> ApplyOutcome {
    let id = record.id().clone();
    let outcome = lock(roster).prepend(record);
    debug!("table: applied created student id={id} outcome={outcome:?}");
    outcome
}

#[cfg(test)]
#[path = "tests/table_tests.rs"]
mod tests;
