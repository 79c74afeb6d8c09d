use std::sync::{Arc, Mutex};

use client_core::NotificationSink;
use shared::protocol::{Notification, Severity};
use storage::Storage;

use super::*;

#[derive(Default)]
struct Collect(Mutex<Vec<Notification>>);

impl NotificationSink for Collect {
    fn notify(&self, notification: Notification) {
        self.0.lock().expect("lock").push(notification);
    }
}

impl Collect {
    fn severities(&self) -> Vec<Severity> {
        self.0
            .lock()
            .expect("lock")
            .iter()
            .map(|n| n.severity)
            .collect()
    }
}

async fn app() -> (RosterApp, Arc<Collect>) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let sink = Arc::new(Collect::default());
    let app = RosterApp::open(storage, sink.clone()).await.expect("app");
    (app, sink)
}

#[test]
fn parses_commands_and_field_values() {
    assert_eq!(parse_line("   ").expect("blank"), Input::Blank);
    assert_eq!(parse_line("exit").expect("quit"), Input::Quit);
    assert_eq!(parse_line("ls").expect("list"), Input::Command(ShellCommand::List));
    assert_eq!(
        parse_line("set name Ann Marie").expect("set"),
        Input::Command(ShellCommand::Set(FieldName::Name, "Ann Marie".into()))
    );
    assert_eq!(
        parse_line("field dob 2010-01-01").expect("field"),
        Input::Command(ShellCommand::Field(FieldName::DateOfBirth, "2010-01-01".into()))
    );
    assert_eq!(
        parse_line("set hobbies").expect("clear value"),
        Input::Command(ShellCommand::Set(FieldName::Hobbies, String::new()))
    );
    assert_eq!(
        parse_line("Delete a01").expect("delete"),
        Input::Command(ShellCommand::Row {
            action: "delete".into(),
            id: "a01".into()
        })
    );
}

#[test]
fn rejects_malformed_lines() {
    assert!(parse_line("edit").is_err());
    assert!(parse_line("set nickname x").is_err());
    assert!(parse_line("set").is_err());
    assert!(parse_line("frobnicate").is_err());
}

#[tokio::test]
async fn create_then_list_shows_the_new_row() {
    let (app, sink) = app().await;
    for line in ["set name Ann", "set dob 2010-01-01", "set hobbies Chess"] {
        let Input::Command(command) = parse_line(line).expect("parse") else {
            panic!("expected a command for {line}");
        };
        assert_eq!(execute(&app, command).await, "");
    }

    let reply = execute(&app, ShellCommand::Create).await;
    assert!(reply.starts_with("created "), "{reply}");
    let listing = execute(&app, ShellCommand::List).await;
    assert!(listing.contains("Ann"));
    assert_eq!(sink.severities(), vec![Severity::Success]);
}

#[tokio::test]
async fn notified_failures_print_nothing_extra() {
    let (app, sink) = app().await;
    assert_eq!(execute(&app, ShellCommand::Create).await, "");
    assert_eq!(sink.severities(), vec![Severity::Error]);

    let reply = execute(&app, ShellCommand::Save).await;
    assert_eq!(reply, "error: no edit is in progress");

    let reply = execute(
        &app,
        ShellCommand::Row {
            action: "edit".into(),
            id: "missing".into(),
        },
    )
    .await;
    assert_eq!(reply, "error: student missing not found");
}

#[tokio::test]
async fn scripted_session_edits_and_deletes() {
    let (app, sink) = app().await;
    app.creation.set_field(FieldName::Name, "Ann");
    app.creation.set_field(FieldName::DateOfBirth, "2010-01-01");
    app.creation.set_field(FieldName::Hobbies, "Chess");
    let created = app.creation.create().await.expect("create");
    let id = created.id().to_string();

    let script = format!(
        "edit {id}\nfield country Ireland\nsave\nlist\ndelete {id}\nlist\nquit\nlist\n"
    );
    let mut output = Vec::new();
    run(&app, script.as_bytes(), &mut output).await.expect("run");
    let output = String::from_utf8(output).expect("utf8");

    assert!(output.contains("Ireland"), "{output}");
    assert!(output.contains("(no students)"), "{output}");
    assert_eq!(output.matches("(no students)").count(), 1);
    assert!(app.table.rows().is_empty());
    assert_eq!(
        sink.severities(),
        vec![
            Severity::Success,
            Severity::Info,
            Severity::Success,
            Severity::Success
        ]
    );
}
