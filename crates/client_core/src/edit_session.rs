use shared::domain::{FieldName, Student, StudentFields, StudentId};

use crate::{
    error::RosterError,
    validation::{self, ValidationResult, ValidationState, REQUIRED_FIELDS},
};

/// Draft copy of one roster row. Changes stay here until a save is confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    origin: StudentId,
    draft: StudentFields,
    validation: ValidationState,
}

impl EditSession {
    pub fn begin(row: &Student) -> Self {
        Self {
            origin: row.id().clone(),
            draft: row.fields.clone(),
            validation: ValidationState::default(),
        }
    }

    pub fn id(&self) -> &StudentId {
        &self.origin
    }

    pub fn draft(&self) -> &StudentFields {
        &self.draft
    }

    pub fn validation(&self) -> &ValidationState {
        &self.validation
    }

    pub fn set_field(&mut self, field: FieldName, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    /// Runs the required-field checks against the draft and records the
    /// per-field flags.
    pub fn validate(&mut self) -> ValidationResult {
        let result = validation::validate(&self.draft);
        self.validation.record(&result, &REQUIRED_FIELDS);
        result
    }

    /// The update payload: the draft under the original id.
    pub fn to_record(&self) -> Student {
        Student::new(self.origin.clone(), self.draft.clone())
    }
}

/// Whether an edit is live. At most one session exists at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    NoActiveEdit,
    Editing(EditSession),
}

impl EditState {
    /// Opens a session for `row`. Asking again for the row already being
    /// edited keeps the existing draft; asking for a different row while an
    /// edit is live is rejected.
    pub fn begin(&mut self, row: &Student) -> Result<EditSession, RosterError> {
        let session = match std::mem::take(self) {
            EditState::Editing(session) if session.id() != row.id() => {
                let active = session.id().clone();
                *self = EditState::Editing(session);
                return Err(RosterError::EditInProgress { active });
            }
            EditState::Editing(session) => session,
            EditState::NoActiveEdit => EditSession::begin(row),
        };
        *self = EditState::Editing(session.clone());
        Ok(session)
    }

    pub fn session(&self) -> Option<&EditSession> {
        match self {
            EditState::Editing(session) => Some(session),
            EditState::NoActiveEdit => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut EditSession> {
        match self {
            EditState::Editing(session) => Some(session),
            EditState::NoActiveEdit => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, EditState::Editing(_))
    }

    pub fn cancel(&mut self) -> Option<EditSession> {
        match std::mem::take(self) {
            EditState::Editing(session) => Some(session),
            EditState::NoActiveEdit => None,
        }
    }

    /// Ends the session only if it still belongs to `id`.
    pub fn finish(&mut self, id: &StudentId) -> Option<EditSession> {
        if self.session().is_some_and(|session| session.id() == id) {
            self.cancel()
        } else {
            None
        }
    }

    /// Ends the session only if its draft is still exactly `saved`. A draft
    /// changed or reopened while the save was in flight stays live.
    pub fn finish_if(&mut self, saved: &Student) -> Option<EditSession> {
        if self.session().is_some_and(|session| session.to_record() == *saved) {
            self.cancel()
        } else {
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/edit_session_tests.rs"]
mod tests;
