use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Student;

/// Bus channel carrying freshly created students to the table view.
pub const STUDENT_CREATED_CHANNEL: &str = "student-created";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new("Info", message, Severity::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new("Success", message, Severity::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new("Error", message, Severity::Error)
    }
}

/// Row-level command dispatched from the table, carrying the row snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "row", rename_all = "snake_case")]
pub enum RowAction {
    Edit(Student),
    Delete(Student),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown row action: {0}")]
pub struct UnknownRowAction(pub String);

impl RowAction {
    pub fn from_tag(tag: &str, row: Student) -> Result<Self, UnknownRowAction> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "edit" => Ok(RowAction::Edit(row)),
            "delete" => Ok(RowAction::Delete(row)),
            _ => Err(UnknownRowAction(tag.to_string())),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            RowAction::Edit(_) => "edit",
            RowAction::Delete(_) => "delete",
        }
    }

    pub fn row(&self) -> &Student {
        match self {
            RowAction::Edit(row) | RowAction::Delete(row) => row,
        }
    }
}
