use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use shared::{
    domain::{Student, StudentFields, StudentId},
    error::RemoteFailure,
    protocol::{Notification, Severity},
};
use tracing::{error, info};

pub mod bus;
pub mod creation;
pub mod edit_session;
pub mod error;
pub mod roster;
mod storage_store;
pub mod table;
pub mod validation;

pub use bus::{Channel, MessageBus, Subscription, STUDENT_CREATED};
pub use creation::{CreationForm, RecordCreationController};
pub use edit_session::{EditSession, EditState};
pub use error::RosterError;
pub use roster::{ApplyOutcome, RosterCache};
pub use table::{RowActionOutcome, SaveOutcome, StudentTableController};
pub use validation::{FieldError, FieldStatus, ValidationResult, ValidationState};

/// Persistent record store behind the roster. Implementations assign ids on
/// create and report rejections as [`RemoteFailure`].
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn create(
        &self,
        object_type: &str,
        fields: &StudentFields,
    ) -> Result<StudentId, RemoteFailure>;
    async fn update(&self, record: &Student) -> Result<(), RemoteFailure>;
    async fn delete(&self, id: &StudentId) -> Result<(), RemoteFailure>;
}

/// User-facing feedback channel. Fire-and-forget.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log instead of a UI.
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn notify(&self, notification: Notification) {
        let Notification {
            title,
            message,
            severity,
        } = notification;
        match severity {
            Severity::Error => error!("notify: {title}: {message}"),
            Severity::Info | Severity::Success => {
                info!("notify: severity={severity} {title}: {message}")
            }
        }
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
