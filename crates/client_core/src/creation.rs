use std::sync::{Arc, Mutex};

use shared::{
    domain::{FieldName, Student, StudentFields, STUDENT_OBJECT},
    protocol::Notification,
};
use tracing::{error, info, warn};

use crate::{
    bus::{MessageBus, STUDENT_CREATED},
    error::RosterError,
    lock,
    validation::{self, ValidationResult, ValidationState, FORM_INVALID, REQUIRED_FIELDS},
    NotificationSink, RemoteStore,
};

/// Current values and field flags of the creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreationForm {
    pub fields: StudentFields,
    pub validation: ValidationState,
}

impl CreationForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Drives the creation form: validates, creates the record remotely and
/// announces it on the bus once the store has confirmed it.
pub struct RecordCreationController {
    store: Arc<dyn RemoteStore>,
    notifier: Arc<dyn NotificationSink>,
    bus: MessageBus,
    form: Mutex<CreationForm>,
}

impl RecordCreationController {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        notifier: Arc<dyn NotificationSink>,
        bus: MessageBus,
    ) -> Self {
        Self {
            store,
            notifier,
            bus,
            form: Mutex::new(CreationForm::default()),
        }
    }

    pub fn set_field(&self, field: FieldName, value: impl Into<String>) {
        lock(&self.form).fields.set(field, value);
    }

    pub fn fill(&self, fields: StudentFields) {
        lock(&self.form).fields = fields;
    }

    pub fn form(&self) -> CreationForm {
        lock(&self.form).clone()
    }

    pub fn reset(&self) {
        lock(&self.form).reset();
    }

    /// Validates the required fields and creates the student.
    ///
    /// Nothing is published unless the store accepted the record. On a store
    /// failure the form keeps its values so the user can retry.
    pub async fn create(&self) -> Result<Student, RosterError> {
        let fields = {
            let mut form = lock(&self.form);
            let result = validation::validate(&form.fields);
            form.validation.record(&result, &REQUIRED_FIELDS);
            self.reject_if_invalid(&result, None)?;
            form.fields.clone()
        };
        self.persist(fields).await
    }

    /// Bulk submission: every field is checked and flagged before anything
    /// is sent.
    pub async fn submit(&self) -> Result<Student, RosterError> {
        let fields = {
            let mut form = lock(&self.form);
            let result = validation::validate_submission(&form.fields);
            form.validation.record(&result, &FieldName::ALL);
            self.reject_if_invalid(&result, Some(FORM_INVALID))?;
            form.fields.clone()
        };
        self.persist(fields).await
    }

    fn reject_if_invalid(
        &self,
        result: &ValidationResult,
        summary: Option<&str>,
    ) -> Result<(), RosterError> {
        let Some(primary) = result.primary() else {
            return Ok(());
        };
        info!(
            "create: validation failed field={} flagged={}",
            primary.field,
            result.errors().len()
        );
        let message = summary.unwrap_or(&primary.message);
        self.notifier.notify(Notification::error(message));
        Err(RosterError::ValidationFailed {
            field: primary.field,
            message: primary.message.clone(),
        })
    }

    async fn persist(&self, fields: StudentFields) -> Result<Student, RosterError> {
        let student_id = match self.store.create(STUDENT_OBJECT, &fields).await {
            Ok(student_id) => student_id,
            Err(failure) => {
                warn!("create: store rejected student: {failure}");
                self.notifier.notify(Notification::error(format!(
                    "Error creating student: {}",
                    failure.message
                )));
                return Err(failure.into());
            }
        };

        self.notifier
            .notify(Notification::success("Student created successfully!"));
        let record = Student::new(student_id, fields);
        match self.bus.publish(&STUDENT_CREATED, &record) {
            Ok(delivered) => info!(
                "create: published student id={} subscribers={delivered}",
                record.id()
            ),
            Err(err) => {
                error!("create: student id={} stored but not published: {err}", record.id());
                return Err(err.into());
            }
        }

        lock(&self.form).reset();
        Ok(record)
    }
}

#[cfg(test)]
#[path = "tests/creation_tests.rs"]
mod tests;
