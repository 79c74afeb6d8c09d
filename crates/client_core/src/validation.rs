//! Field-level checks run before any call reaches the record store.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use shared::domain::{FieldName, StudentFields};

pub const HOBBIES_REQUIRED: &str = "Please select at least one hobby.";
pub const NAME_REQUIRED: &str = "Name is required.";
pub const DOB_REQUIRED: &str = "Date of Birth is required.";
pub const DOB_INVALID: &str = "Date of Birth must be a valid date (YYYY-MM-DD).";
pub const FIELD_EMPTY: &str = "This field cannot be empty";
pub const FORM_INVALID: &str = "Please fill in all required fields and ensure all inputs are valid";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Required fields in priority order. Hobbies is checked first even though
/// the form shows it last.
pub const REQUIRED_FIELDS: [FieldName; 3] =
    [FieldName::Hobbies, FieldName::Name, FieldName::DateOfBirth];

/// Fields that the bulk submission pass checks for trimmed non-emptiness.
pub const SUBMISSION_FIELDS: [FieldName; 3] =
    [FieldName::Sex, FieldName::Languages, FieldName::Country];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FieldName,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    /// Failing fields in priority order; the first entry is the primary error.
    Invalid { per_field: Vec<FieldError> },
}

impl ValidationResult {
    fn from_errors(per_field: Vec<FieldError>) -> Self {
        if per_field.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid { per_field }
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn primary(&self) -> Option<&FieldError> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid { per_field } => per_field.first(),
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        match self {
            ValidationResult::Valid => &[],
            ValidationResult::Invalid { per_field } => per_field,
        }
    }

    pub fn message_for(&self, field: FieldName) -> Option<&str> {
        self.errors()
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }
}

/// Checks the fields every create and save needs: hobbies, name and date of
/// birth, in that order.
pub fn validate(fields: &StudentFields) -> ValidationResult {
    ValidationResult::from_errors(required_errors(fields))
}

/// Bulk pass used on form submission. Visits every field and reports all
/// failures at once.
pub fn validate_submission(fields: &StudentFields) -> ValidationResult {
    let mut errors = required_errors(fields);
    for field in SUBMISSION_FIELDS {
        if fields.get(field).trim().is_empty() {
            errors.push(FieldError {
                field,
                message: FIELD_EMPTY.to_string(),
            });
        }
    }
    ValidationResult::from_errors(errors)
}

fn required_errors(fields: &StudentFields) -> Vec<FieldError> {
    REQUIRED_FIELDS
        .iter()
        .filter_map(|field| {
            required_message(*field, fields.get(*field)).map(|message| FieldError {
                field: *field,
                message: message.to_string(),
            })
        })
        .collect()
}

fn required_message(field: FieldName, value: &str) -> Option<&'static str> {
    match field {
        FieldName::Hobbies if value.is_empty() => Some(HOBBIES_REQUIRED),
        FieldName::Name if value.is_empty() => Some(NAME_REQUIRED),
        FieldName::DateOfBirth if value.is_empty() => Some(DOB_REQUIRED),
        FieldName::DateOfBirth
            if value.trim() != value || NaiveDate::parse_from_str(value, DATE_FORMAT).is_err() =>
        {
            Some(DOB_INVALID)
        }
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldStatus {
    Valid,
    Invalid(String),
}

/// Per-field flags shown next to form inputs. Recomputed on every pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationState {
    statuses: BTreeMap<FieldName, FieldStatus>,
}

impl ValidationState {
    /// Flags every failing field and clears every other visited field.
    pub fn record(&mut self, result: &ValidationResult, visited: &[FieldName]) {
        for field in visited {
            let status = match result.message_for(*field) {
                Some(message) => FieldStatus::Invalid(message.to_string()),
                None => FieldStatus::Valid,
            };
            self.statuses.insert(*field, status);
        }
    }

    pub fn status(&self, field: FieldName) -> Option<&FieldStatus> {
        self.statuses.get(&field)
    }

    pub fn is_flagged(&self, field: FieldName) -> bool {
        matches!(self.statuses.get(&field), Some(FieldStatus::Invalid(_)))
    }

    pub fn flagged(&self) -> impl Iterator<Item = (FieldName, &str)> + '_ {
        self.statuses.iter().filter_map(|(field, status)| match status {
            FieldStatus::Invalid(message) => Some((*field, message.as_str())),
            FieldStatus::Valid => None,
        })
    }

    pub fn clear(&mut self) {
        self.statuses.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
