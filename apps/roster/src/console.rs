//! Terminal rendering for notifications and the roster table.

use std::fmt::Write as _;

use client_core::NotificationSink;
use shared::{
    domain::{FieldName, Student},
    protocol::Notification,
};

pub struct ConsoleNotificationSink;

impl NotificationSink for ConsoleNotificationSink {
    fn notify(&self, notification: Notification) {
        println!("{}", format_notification(&notification));
    }
}

pub fn format_notification(notification: &Notification) -> String {
    format!(
        "[{}] {}: {}",
        notification.severity, notification.title, notification.message
    )
}

pub fn render_table(rows: &[Student]) -> String {
    let mut header = vec!["Id".to_string()];
    header.extend(FieldName::ALL.iter().map(|field| field.label().to_string()));

    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.id().to_string()];
            cells.extend(
                FieldName::ALL
                    .iter()
                    .map(|field| row.fields.get(*field).to_string()),
            );
            cells
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|column| {
            std::iter::once(&header)
                .chain(body.iter())
                .map(|cells| cells[column].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for cells in std::iter::once(&header).chain(body.iter()) {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }
    if rows.is_empty() {
        out.push_str("(no students)\n");
    }
    out
}
