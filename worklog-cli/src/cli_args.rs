use std::path::Path;
use std::path::PathBuf;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use uuid::Uuid;
use worklog_persist::ExportFormat;
use worklog_persist::SessionPatch;
use worklog_persist::is_encodable_timestamp;

#[derive(Debug, Parser)]
#[command(name = "worklog", version)]
#[command(about = "Record work sessions and exchange them as JSON or CSV", long_about = None)]
pub struct WorklogCli {
    /// TOML config file (defaults to the platform config dir).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the session store; overrides config and env.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a finished session
    Add(AddArgs),
    /// Change fields of an existing session
    Edit(EditArgs),
    /// Remove a session
    Delete { id: Uuid },
    /// Show all sessions, newest first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Remove every session
    Clear {
        /// Confirm the reset.
        #[arg(long)]
        yes: bool,
    },
    /// Write all sessions to the export file
    Export {
        #[arg(long, value_enum, default_value_t = FormatArg::Json)]
        format: FormatArg,
    },
    /// Merge sessions from a JSON or CSV file
    Import {
        path: PathBuf,
        /// Inferred from the file extension when omitted.
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },
    /// Weekly totals per day and per project
    Stats {
        /// Any day in the week to report (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        week_of: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    #[arg(long, default_value = "")]
    pub project: String,
    #[arg(long, allow_negative_numbers = true)]
    pub seconds: f64,
    /// RFC 3339 start time; defaults to now.
    #[arg(long)]
    pub start: Option<DateTime<Utc>>,
    #[arg(long, default_value = "")]
    pub note: String,
}

#[derive(Debug, Clone, Args)]
pub struct EditArgs {
    pub id: Uuid,
    #[arg(long)]
    pub project: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub seconds: Option<f64>,
    #[arg(long)]
    pub start: Option<DateTime<Utc>>,
    #[arg(long)]
    pub note: Option<String>,
}

impl EditArgs {
    pub fn patch(&self) -> SessionPatch {
        SessionPatch {
            project_name: self.project.clone(),
            seconds: self.seconds,
            start_date: self.start,
            note: self.note.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Json,
    Csv,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Csv => ExportFormat::Csv,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgsValidationError {
    EmptyEdit,
    ClearNotConfirmed,
    UnknownImportFormat(PathBuf),
    InvalidSeconds(String),
    StartOutOfRange(String),
}

impl std::fmt::Display for ArgsValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgsValidationError::EmptyEdit => {
                write!(f, "edit needs at least one of --project, --seconds, --start, --note")
            }
            ArgsValidationError::ClearNotConfirmed => {
                write!(f, "clear removes every session; pass --yes to confirm")
            }
            ArgsValidationError::UnknownImportFormat(path) => write!(
                f,
                "cannot infer format of {}; pass --format json or --format csv",
                path.display()
            ),
            ArgsValidationError::InvalidSeconds(value) => {
                write!(f, "seconds must be a finite, non-negative number: {value}")
            }
            ArgsValidationError::StartOutOfRange(value) => {
                write!(f, "start must fall within years 0000-9999: {value}")
            }
        }
    }
}

impl std::error::Error for ArgsValidationError {}

/// Format for an import: the explicit flag, else the file extension.
pub fn resolve_import_format(path: &Path, explicit: Option<FormatArg>) -> Option<ExportFormat> {
    explicit
        .map(ExportFormat::from)
        .or_else(|| ExportFormat::from_path(path))
}

fn check_seconds(seconds: f64) -> Result<(), ArgsValidationError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ArgsValidationError::InvalidSeconds(seconds.to_string()));
    }
    Ok(())
}

fn check_start(start: Option<DateTime<Utc>>) -> Result<(), ArgsValidationError> {
    match start {
        Some(start) if !is_encodable_timestamp(&start) => {
            Err(ArgsValidationError::StartOutOfRange(start.to_string()))
        }
        _ => Ok(()),
    }
}

pub fn validate(command: &Command) -> Result<(), ArgsValidationError> {
    match command {
        Command::Add(args) => {
            check_seconds(args.seconds)?;
            check_start(args.start)
        }
        Command::Edit(args) => {
            if args.patch().is_empty() {
                return Err(ArgsValidationError::EmptyEdit);
            }
            args.seconds.map_or(Ok(()), check_seconds)?;
            check_start(args.start)
        }
        Command::Clear { yes: false } => Err(ArgsValidationError::ClearNotConfirmed),
        Command::Import { path, format } => {
            if resolve_import_format(path, *format).is_none() {
                return Err(ArgsValidationError::UnknownImportFormat(path.clone()));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> WorklogCli {
        WorklogCli::try_parse_from(std::iter::once("worklog").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_parse_add_with_defaults() {
        let cli = parse(&["add", "--project", "Thesis", "--seconds", "90.5"]);
        let Command::Add(args) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.project, "Thesis");
        assert_eq!(args.seconds, 90.5);
        assert!(args.start.is_none());
        assert_eq!(args.note, "");
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = parse(&["list", "--data-dir", "/tmp/wl", "-v"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/wl")));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::List { json: false }));
    }

    #[test]
    fn test_parse_rejects_bad_uuid() {
        let result = WorklogCli::try_parse_from(["worklog", "delete", "not-a-uuid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_empty_edit() {
        let cli = parse(&["edit", "6f9619ff-8b86-d011-b42d-00cf4fc964ff"]);
        assert_eq!(validate(&cli.command), Err(ArgsValidationError::EmptyEdit));
    }

    #[test]
    fn test_edit_patch_carries_only_given_fields() {
        let cli = parse(&[
            "edit",
            "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
            "--note",
            "new note",
        ]);
        let Command::Edit(args) = &cli.command else {
            panic!("expected edit");
        };
        assert_eq!(
            args.patch(),
            SessionPatch {
                note: Some("new note".to_string()),
                ..SessionPatch::default()
            }
        );
        assert!(validate(&cli.command).is_ok());
    }

    #[test]
    fn test_validate_clear_requires_confirmation() {
        assert_eq!(
            validate(&parse(&["clear"]).command),
            Err(ArgsValidationError::ClearNotConfirmed)
        );
        assert!(validate(&parse(&["clear", "--yes"]).command).is_ok());
    }

    #[test]
    fn test_validate_negative_seconds() {
        let cli = parse(&["add", "--seconds", "-3"]);
        assert!(matches!(
            validate(&cli.command),
            Err(ArgsValidationError::InvalidSeconds(_))
        ));
    }

    #[test]
    fn test_validate_non_finite_seconds() {
        for value in ["NaN", "inf"] {
            let cli = parse(&["add", "--seconds", value]);
            assert!(matches!(
                validate(&cli.command),
                Err(ArgsValidationError::InvalidSeconds(_))
            ));
        }
        let cli = parse(&[
            "edit",
            "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
            "--seconds",
            "NaN",
        ]);
        assert!(matches!(
            validate(&cli.command),
            Err(ArgsValidationError::InvalidSeconds(_))
        ));
    }

    #[test]
    fn test_validate_start_out_of_range() {
        let cli = parse(&["add", "--seconds", "1"]);
        let Command::Add(mut args) = cli.command else {
            panic!("expected add");
        };
        args.start = Utc.with_ymd_and_hms(12_000, 1, 1, 0, 0, 0).single();
        assert!(matches!(
            validate(&Command::Add(args.clone())),
            Err(ArgsValidationError::StartOutOfRange(_))
        ));
        args.start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
        assert!(validate(&Command::Add(args)).is_ok());
    }

    #[test]
    fn test_import_format_inference() {
        assert_eq!(
            resolve_import_format(Path::new("backup.csv"), None),
            Some(ExportFormat::Csv)
        );
        assert_eq!(
            resolve_import_format(Path::new("backup.txt"), Some(FormatArg::Json)),
            Some(ExportFormat::Json)
        );
        let cli = parse(&["import", "backup.txt"]);
        assert_eq!(
            validate(&cli.command),
            Err(ArgsValidationError::UnknownImportFormat(PathBuf::from(
                "backup.txt"
            )))
        );
    }

    #[test]
    fn test_export_defaults_to_json() {
        let cli = parse(&["export"]);
        assert!(matches!(
            cli.command,
            Command::Export {
                format: FormatArg::Json
            }
        ));
    }

    #[test]
    fn test_parse_stats_week_of() {
        let cli = parse(&["stats", "--week-of", "2024-04-03"]);
        let Command::Stats { week_of, json } = cli.command else {
            panic!("expected stats");
        };
        assert_eq!(week_of, NaiveDate::from_ymd_opt(2024, 4, 3));
        assert!(!json);
    }
}
