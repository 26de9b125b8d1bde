use anyhow::Context;
use anyhow::Result;
use chrono::DateTime;
use chrono::Utc;
use worklog_persist::ExportFormat;
use worklog_persist::Session;
use worklog_persist::SessionRepository;
use worklog_persist::format_timestamp;

use crate::cli_args::ArgsValidationError;
use crate::cli_args::Command;
use crate::cli_args::resolve_import_format;
use crate::stats::format_duration;
use crate::stats::render_summary;
use crate::stats::weekly_summary;

/// Execute one command against the repository and return what to print.
pub fn run(command: &Command, repo: &mut SessionRepository, now: DateTime<Utc>) -> Result<String> {
    let output = match command {
        Command::Add(args) => {
            let session = repo.create(
                &args.project,
                args.seconds,
                args.start.unwrap_or(now),
                &args.note,
            );
            format!("Added session {}", session.id)
        }
        Command::Edit(args) => match repo.update(args.id, args.patch()) {
            Some(session) => format!("Updated session {}", session.id),
            None => format!("No session with id {}", args.id),
        },
        Command::Delete { id } => {
            if repo.delete(*id) {
                format!("Deleted session {id}")
            } else {
                format!("No session with id {id}")
            }
        }
        Command::List { json: true } => serde_json::to_string_pretty(repo.sessions())?,
        Command::List { json: false } => render_list(repo.sessions()),
        Command::Clear { yes } => {
            if !yes {
                return Err(ArgsValidationError::ClearNotConfirmed.into());
            }
            let count = repo.len();
            repo.clear_all();
            format!("Removed {count} sessions")
        }
        Command::Export { format } => {
            let format = ExportFormat::from(*format);
            let path = repo
                .export(format)
                .with_context(|| format!("export as {} failed", format.file_extension()))?;
            format!("Exported {} sessions to {}", repo.len(), path.display())
        }
        Command::Import { path, format } => {
            let format = resolve_import_format(path, *format)
                .ok_or_else(|| ArgsValidationError::UnknownImportFormat(path.clone()))?;
            let count = repo
                .import_file(path, format)
                .with_context(|| format!("import of {} failed", path.display()))?;
            format!("Imported {count} sessions")
        }
        Command::Stats { week_of, json } => {
            let summary = weekly_summary(repo.sessions(), week_of.unwrap_or(now.date_naive()));
            if *json {
                serde_json::to_string_pretty(&summary)?
            } else {
                render_summary(&summary)
            }
        }
    };

    Ok(match repo.last_persist_error() {
        Some(err) if is_mutation(command) => {
            format!("{output}\nwarning: changes were not saved: {err}")
        }
        _ => output,
    })
}

fn is_mutation(command: &Command) -> bool {
    matches!(
        command,
        Command::Add(_)
            | Command::Edit(_)
            | Command::Delete { .. }
            | Command::Clear { .. }
            | Command::Import { .. }
    )
}

fn render_list(sessions: &[Session]) -> String {
    if sessions.is_empty() {
        return "No sessions recorded".to_string();
    }
    sessions
        .iter()
        .map(|session| {
            let project = if session.project_name.is_empty() {
                crate::stats::UNTITLED_PROJECT
            } else {
                session.project_name.as_str()
            };
            let note = session.note.lines().next().unwrap_or_default();
            format!(
                "{}  {}  {:>8}  {}  {}",
                session.id,
                format_timestamp(&session.start_date),
                format_duration(session.seconds),
                project,
                note
            )
            .trim_end()
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
