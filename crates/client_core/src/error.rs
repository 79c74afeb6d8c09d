use shared::{
    domain::{FieldName, StudentId},
    error::RemoteFailure,
};
use thiserror::Error;

use crate::bus::BusError;

/// Failure of a single roster operation. None of these are fatal; local state
/// is left at its last confirmed value.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("{message}")]
    ValidationFailed { field: FieldName, message: String },
    #[error(transparent)]
    Remote(#[from] RemoteFailure),
    #[error("student {active} is already being edited")]
    EditInProgress { active: StudentId },
    #[error("no edit is in progress")]
    NoActiveEdit,
    #[error(transparent)]
    Bus(#[from] BusError),
}

impl RosterError {
    /// The store-provided message when the failure came from the record store.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            RosterError::Remote(failure) => Some(&failure.message),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, RosterError::ValidationFailed { .. })
    }
}
