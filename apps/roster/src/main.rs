use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{NotificationSink, RosterError, SaveOutcome, TracingNotificationSink};
use shared::domain::{FieldName, StudentFields};
use storage::Storage;
use tokio::io::BufReader;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod console;
mod shell;

use app::RosterApp;
use config::{load_settings, prepare_database_url};
use console::{render_table, ConsoleNotificationSink};

#[derive(Parser, Debug)]
#[command(name = "roster", about = "Manage the student roster")]
struct Cli {
    /// Config file; defaults to ./roster.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    database_url: Option<String>,
    /// Send notifications to the log instead of stdout.
    #[arg(long, short)]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the roster, most recent first.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Create a student.
    Create {
        #[command(flatten)]
        fields: FieldArgs,
        /// Require every field to be filled in.
        #[arg(long)]
        strict: bool,
    },
    /// Edit a student and save it.
    Update {
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    Delete {
        id: String,
    },
    /// Interactive session on stdin.
    Shell,
}

#[derive(Args, Debug, Default)]
struct FieldArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long = "dob")]
    date_of_birth: Option<String>,
    #[arg(long)]
    sex: Option<String>,
    #[arg(long)]
    languages: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    hobbies: Option<String>,
}

impl FieldArgs {
    fn into_pairs(self) -> Vec<(FieldName, String)> {
        [
            (FieldName::Name, self.name),
            (FieldName::DateOfBirth, self.date_of_birth),
            (FieldName::Sex, self.sex),
            (FieldName::Languages, self.languages),
            (FieldName::Country, self.country),
            (FieldName::Hobbies, self.hobbies),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .collect()
    }

    fn apply_to(self, mut fields: StudentFields) -> StudentFields {
        for (field, value) in self.into_pairs() {
            fields.set(field, value);
        }
        fields
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(database_url) = cli.database_url {
        settings.database_url = database_url;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url)
        .await
        .with_context(|| format!("failed to open database {database_url}"))?;
    storage.health_check().await?;

    let notifier: Arc<dyn NotificationSink> = if cli.quiet {
        Arc::new(TracingNotificationSink)
    } else {
        Arc::new(ConsoleNotificationSink)
    };
    let app = RosterApp::open(storage, notifier).await?;

    match run(&app, cli.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        // Already reported through the notification sink.
        Err(err) if err.downcast_ref::<RosterError>().is_some() => Ok(ExitCode::FAILURE),
        Err(err) => Err(err),
    }
}

async fn run(app: &RosterApp, command: Command) -> Result<()> {
    match command {
        Command::List { json } => {
            let rows = app.table.rows();
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print!("{}", render_table(&rows));
            }
        }
        Command::Create { fields, strict } => {
            app.creation.fill(fields.apply_to(StudentFields::default()));
            let created = if strict {
                app.creation.submit().await?
            } else {
                app.creation.create().await?
            };
            println!("{}", created.id());
        }
        Command::Update { id, fields } => {
            let row = app.find_row(&id)?;
            app.table.request_edit(&row)?;
            for (field, value) in fields.into_pairs() {
                app.table.edit_field(field, value)?;
            }
            if let SaveOutcome::RowMissing(record) = app.table.save().await? {
                warn!("student {} saved but missing from the local roster", record.id());
            }
        }
        Command::Delete { id } => {
            let row = app.find_row(&id)?;
            app.table.delete(&row).await?;
        }
        Command::Shell => {
            let stdin = BufReader::new(tokio::io::stdin());
            shell::run(app, stdin, tokio::io::stdout()).await?;
        }
    }
    Ok(())
}
