//! Line-oriented interactive session.

use anyhow::{bail, Result};
use client_core::RosterError;
use shared::{domain::FieldName, protocol::RowAction};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::{app::RosterApp, console::render_table};

pub const HELP: &str = "\
commands:
  list                      show the roster
  set <field> <value>       fill a creation form field
  form                      show the creation form
  create                    create from the form (required fields only)
  submit                    create from the form (every field checked)
  clear                     reset the creation form
  edit <id>                 start editing a row
  field <field> <value>     change a field of the row being edited
  save                      save the row being edited
  cancel                    discard the row being edited
  delete <id>               delete a row
  help                      show this help
  quit                      leave the shell
fields: name, dob, sex, languages, country, hobbies";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Set(FieldName, String),
    Form,
    Create,
    Submit,
    Clear,
    Row { action: String, id: String },
    Field(FieldName, String),
    Save,
    Cancel,
    Help,
}

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Blank,
    Quit,
    Command(ShellCommand),
}

pub fn parse_line(line: &str) -> Result<Input> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Blank);
    }
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match verb.to_ascii_lowercase().as_str() {
        "list" | "ls" => ShellCommand::List,
        "set" => {
            let (field, value) = field_and_value(rest)?;
            ShellCommand::Set(field, value)
        }
        "form" => ShellCommand::Form,
        "create" => ShellCommand::Create,
        "submit" => ShellCommand::Submit,
        "clear" => ShellCommand::Clear,
        "edit" | "delete" => {
            if rest.is_empty() {
                bail!("usage: {verb} <id>");
            }
            ShellCommand::Row {
                action: verb.to_ascii_lowercase(),
                id: rest.to_string(),
            }
        }
        "field" => {
            let (field, value) = field_and_value(rest)?;
            ShellCommand::Field(field, value)
        }
        "save" => ShellCommand::Save,
        "cancel" => ShellCommand::Cancel,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => return Ok(Input::Quit),
        other => bail!("unknown command '{other}'; type 'help'"),
    };
    Ok(Input::Command(command))
}

fn field_and_value(rest: &str) -> Result<(FieldName, String)> {
    let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    if field.is_empty() {
        bail!("usage: <field> <value>");
    }
    let field = field.parse::<FieldName>()?;
    Ok((field, value.trim().to_string()))
}

pub async fn run<R, W>(app: &RosterApp, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output.write_all(b"roster> ").await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Ok(Input::Quit) => break,
            Ok(Input::Command(command)) => {
                let reply = execute(app, command).await;
                if !reply.is_empty() {
                    output.write_all(reply.as_bytes()).await?;
                    if !reply.ends_with('\n') {
                        output.write_all(b"\n").await?;
                    }
                }
            }
            Ok(Input::Blank) => {}
            Err(err) => output.write_all(format!("error: {err}\n").as_bytes()).await?,
        }
        output.write_all(b"roster> ").await?;
        output.flush().await?;
    }
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}

/// Runs one command and returns the text to show. Outcomes of roster
/// operations are reported through the notification sink.
pub async fn execute(app: &RosterApp, command: ShellCommand) -> String {
    match dispatch(app, command).await {
        Ok(reply) => reply,
        Err(err) => match err.downcast_ref::<RosterError>() {
            Some(RosterError::NoActiveEdit) | Some(RosterError::Bus(_)) | None => {
                format!("error: {err}")
            }
            Some(notified) => {
                debug!("shell: command failed: {notified}");
                String::new()
            }
        },
    }
}

async fn dispatch(app: &RosterApp, command: ShellCommand) -> Result<String> {
    match command {
        ShellCommand::List => Ok(render_table(&app.table.rows())),
        ShellCommand::Set(field, value) => {
            app.creation.set_field(field, value);
            Ok(String::new())
        }
        ShellCommand::Form => {
            let form = app.creation.form();
            let mut out = String::new();
            for field in FieldName::ALL {
                let flag = if form.validation.is_flagged(field) { " (!)" } else { "" };
                out.push_str(&format!("{}: {}{flag}\n", field.label(), form.fields.get(field)));
            }
            Ok(out)
        }
        ShellCommand::Create => {
            let created = app.creation.create().await?;
            Ok(format!("created {}", created.id()))
        }
        ShellCommand::Submit => {
            let created = app.creation.submit().await?;
            Ok(format!("created {}", created.id()))
        }
        ShellCommand::Clear => {
            app.creation.reset();
            Ok(String::new())
        }
        ShellCommand::Row { action, id } => {
            let row = app.find_row(&id)?;
            let action = RowAction::from_tag(&action, row)?;
            app.table.handle_row_action(action).await?;
            Ok(String::new())
        }
        ShellCommand::Field(field, value) => {
            app.table.edit_field(field, value)?;
            Ok(String::new())
        }
        ShellCommand::Save => {
            app.table.save().await?;
            Ok(String::new())
        }
        ShellCommand::Cancel => match app.table.cancel_edit() {
            Some(session) => Ok(format!("cancelled edit of {}", session.id())),
            None => Ok("no edit in progress".to_string()),
        },
        ShellCommand::Help => Ok(HELP.to_string()),
    }
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
