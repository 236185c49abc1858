//! CLI entry point for the Divvy statistics tool.
//!
//! Loads a stations file and a trips file, then prints aggregate statistics
//! about the trips.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use divvy_stats::{
    dataset::Dataset,
    output::{append_record, print_json, print_text},
    report::Summary,
};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "divvy_stats", version)]
#[command(about = "Prints statistics about Divvy stations and trips", long_about = None)]
struct Cli {
    /// Path to the stations CSV file
    #[arg(value_name = "STATION_FILE")]
    stations: PathBuf,

    /// Path to the trips CSV file
    #[arg(value_name = "TRIP_FILE")]
    trips: PathBuf,

    /// Output format of the report
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// CSV file to append the summary to
    #[arg(short, long)]
    append: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// What the command line asks for.
enum Invocation {
    Run(Cli),
    /// `--help` or `--version`, printed the way clap normally does.
    Info(clap::Error),
    /// Wrong arguments; answered with the usage line and a clean exit.
    Usage(clap::Error),
}

fn parse_args<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Invocation::Run(cli),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Invocation::Info(e)
        }
        Err(e) => Invocation::Usage(e),
    }
}

fn usage() -> String {
    Cli::command().render_usage().to_string()
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let invocation = parse_args(std::env::args_os());

    let _file_guard = init_tracing();

    let cli = match invocation {
        Invocation::Run(cli) => cli,
        Invocation::Info(e) => {
            e.print()?;
            return Ok(());
        }
        Invocation::Usage(e) => {
            debug!(error = %e, "Invalid arguments");
            println!("{}", usage());
            return Ok(());
        }
    };

    let dataset = Dataset::load(&cli.stations, &cli.trips).inspect_err(|e| {
        error!(error = %e, "Failed to load dataset");
    })?;

    let summary = Summary::from_dataset(&dataset);

    match cli.format {
        Format::Text => print_text(&summary),
        Format::Json => print_json(&summary)?,
    }

    if let Some(path) = &cli.append {
        append_record(path, &summary)?;
        info!(path = %path.display(), "Summary appended");
    }

    Ok(())
}

/// Daily rolling log file at `log_file_path`, creating its directory if needed.
fn log_file_appender(log_file_path: &str) -> Result<RollingFileAppender, InitError> {
    let log_dir = Path::new(log_file_path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("divvy_stats.log"));

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(log_file_name.to_string_lossy())
        .build(log_dir)
}

/// Logging setup: colored stderr + JSON rolling log file.
///
/// When the log file cannot be opened only the stderr layer is installed.
/// The returned guard flushes the file writer when dropped.
fn init_tracing() -> Option<WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/divvy_stats.log".to_string());

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive(LevelFilter::INFO.into()));

    let (json_layer, file_guard, file_error) = match log_file_appender(&log_file_path) {
        Ok(file_appender) => {
            let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);
            let json_layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(non_blocking_file)
                .with_filter(
                    EnvFilter::from_env("RUST_LOG_JSON").add_directive(LevelFilter::DEBUG.into()),
                );
            (Some(json_layer), Some(file_guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    if let Some(e) = file_error {
        warn!(path = %log_file_path, error = %e, "Log file unavailable, logging to stderr only");
    }

    file_guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_two_paths_run() {
        let Invocation::Run(cli) = parse_args(["divvy_stats", "s.csv", "t.csv"]) else {
            panic!("expected a run");
        };

        assert_eq!(cli.stations, PathBuf::from("s.csv"));
        assert_eq!(cli.trips, PathBuf::from("t.csv"));
        assert!(matches!(cli.format, Format::Text));
        assert!(cli.append.is_none());
    }

    #[test]
    fn test_run_with_options() {
        let Invocation::Run(cli) = parse_args([
            "divvy_stats",
            "s.csv",
            "t.csv",
            "--format",
            "json",
            "--append",
            "history.csv",
        ]) else {
            panic!("expected a run");
        };

        assert!(matches!(cli.format, Format::Json));
        assert_eq!(cli.append, Some(PathBuf::from("history.csv")));
    }

    #[test]
    fn test_wrong_argument_count_shows_usage() {
        assert!(matches!(parse_args(["divvy_stats"]), Invocation::Usage(_)));
        assert!(matches!(parse_args(["divvy_stats", "one"]), Invocation::Usage(_)));
        assert!(matches!(
            parse_args(["divvy_stats", "a", "b", "c"]),
            Invocation::Usage(_)
        ));
        assert!(matches!(
            parse_args(["divvy_stats", "a", "b", "--format", "xml"]),
            Invocation::Usage(_)
        ));
    }

    #[test]
    fn test_help_and_version_are_passed_through() {
        let Invocation::Info(help) = parse_args(["divvy_stats", "--help"]) else {
            panic!("expected help");
        };
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);

        let Invocation::Info(version) = parse_args(["divvy_stats", "--version"]) else {
            panic!("expected version");
        };
        assert_eq!(version.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_usage_names_both_files() {
        assert!(usage().contains("<STATION_FILE> <TRIP_FILE>"));
    }

    #[test]
    fn test_log_file_appender_in_writable_dir() {
        let dir = env::temp_dir().join("divvy_stats_test_logs");
        let path = dir.join("run.log");

        assert!(log_file_appender(&path.to_string_lossy()).is_ok());
        assert!(dir.is_dir());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_log_file_appender_reports_unusable_dir() {
        // A regular file cannot hold the log directory.
        let blocker = env::temp_dir().join("divvy_stats_test_log_blocker");
        fs::write(&blocker, "").unwrap();
        let path = blocker.join("logs").join("run.log");

        assert!(log_file_appender(&path.to_string_lossy()).is_err());

        fs::remove_file(&blocker).unwrap();
    }
}
