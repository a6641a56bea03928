//! facecue-replay - run recorded landmark frames through a session
//!
//! Reads JSON lines from a file (or stdin when no path is given) and writes
//! one JSON line per input to stdout. Thresholds come from
//! `~/.facecue/config.json` unless `--config` names another file.
//!
//! - `{"timestamp_ms": 0, "face": [...], "right_hand": [...], "left_hand": [...]}`
//!   is processed as a frame and answered with its frame result
//! - `{"command": "reset_calibration"}` clears the calibration baseline
//! - `{"command": "status"}` reports calibration and hand states
//!
//! Malformed lines are answered with `{"error": ...}` and do not stop the run.

use anyhow::{Context, Result};
use clap::Parser;
use facecue::{Config, Frame, RawFrame, Session};
use serde::Deserialize;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(
    name = "facecue-replay",
    about = "Run recorded landmark frames through a facecue session"
)]
struct Cli {
    /// JSON-lines recording to replay (default: stdin)
    input: Option<PathBuf>,

    /// Config file to use instead of ~/.facecue/config.json
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => facecue::config::load_from_path(path)
                .with_context(|| format!("Failed to load config {}", path.display())),
            None => Ok(facecue::config::get_config()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Command {
    ResetCalibration,
    Status,
}

#[derive(Debug, Deserialize)]
struct FrameRecord {
    /// Capture time relative to the start of the recording
    timestamp_ms: u64,
    #[serde(flatten)]
    frame: RawFrame,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Line {
    Command { command: Command },
    Frame(FrameRecord),
}

fn handle_line(session: &mut Session, start: Instant, line: &str) -> Result<serde_json::Value> {
    let parsed: Line = serde_json::from_str(line).context("Unrecognised input line")?;
    let response = match parsed {
        Line::Command {
            command: Command::ResetCalibration,
        } => {
            session.reset_calibration();
            serde_json::json!({ "message": "Calibration reset" })
        }
        Line::Command {
            command: Command::Status,
        } => serde_json::to_value(session.status())?,
        Line::Frame(record) => {
            let frame = Frame::try_from(record.frame)?;
            let now = start + Duration::from_millis(record.timestamp_ms);
            serde_json::to_value(session.process(&frame, now))?
        }
    };
    Ok(response)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    facecue::init_logging();

    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open input file {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(std::io::stdin())),
    };

    let mut session = Session::with_config(cli.load_config()?);
    let start = Instant::now();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    tracing::info!("facecue replay started");

    let mut processed = 0usize;
    for (number, line) in input.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(&mut session, start, &line).unwrap_or_else(|e| {
            tracing::warn!("Line {}: {:#}", number + 1, e);
            serde_json::json!({ "error": format!("{:#}", e), "line": number + 1 })
        });
        writeln!(out, "{}", response)?;
        processed += 1;
    }

    tracing::info!("facecue replay finished: {} lines", processed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn face_json() -> String {
        let point = r#"{"x":0.5,"y":0.5,"z":-0.05}"#;
        let points = vec![point; facecue::landmarks::FACE_LANDMARK_COUNT].join(",");
        format!("[{}]", points)
    }

    #[test]
    fn test_frame_line() {
        let mut session = Session::new();
        let line = format!(r#"{{"timestamp_ms": 0, "face": {}}}"#, face_json());
        let response = handle_line(&mut session, Instant::now(), &line).unwrap();
        assert_eq!(response["calibration_status"], "calibrating");
    }

    #[test]
    fn test_command_lines() {
        let mut session = Session::new();
        let start = Instant::now();
        let line = format!(r#"{{"timestamp_ms": 0, "face": {}}}"#, face_json());
        handle_line(&mut session, start, &line).unwrap();

        let status = handle_line(&mut session, start, r#"{"command": "status"}"#).unwrap();
        assert_eq!(status["calibration_status"], "calibrated");

        handle_line(&mut session, start, r#"{"command": "reset_calibration"}"#).unwrap();
        let status = handle_line(&mut session, start, r#"{"command": "status"}"#).unwrap();
        assert_eq!(status["calibration_status"], "uncalibrated");
    }

    #[test]
    fn test_malformed_lines_are_errors() {
        let mut session = Session::new();
        let start = Instant::now();
        assert!(handle_line(&mut session, start, "not json").is_err());
        assert!(handle_line(&mut session, start, r#"{"command": "explode"}"#).is_err());
        assert!(handle_line(
            &mut session,
            start,
            r#"{"timestamp_ms": 0, "right_hand": [{"x":0,"y":0,"z":0}]}"#
        )
        .is_err());
        assert!(!session.calibrator().is_calibrated());
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_arguments() {
        let cli = Cli::try_parse_from(["facecue-replay"]).unwrap();
        assert!(cli.input.is_none());
        assert!(cli.config.is_none());

        let cli = Cli::try_parse_from([
            "facecue-replay",
            "frames.jsonl",
            "--config",
            "custom.json",
        ])
        .unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("frames.jsonl")));
        assert_eq!(cli.config, Some(PathBuf::from("custom.json")));
    }

    #[test]
    fn test_cli_help_is_not_a_path() {
        let err = Cli::try_parse_from(["facecue-replay", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_rejects_extra_arguments() {
        assert!(Cli::try_parse_from(["facecue-replay", "a.jsonl", "b.jsonl"]).is_err());
        assert!(Cli::try_parse_from(["facecue-replay", "--frobnicate"]).is_err());
    }

    #[test]
    fn test_config_flag_loads_file() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"version": 1, "confirmation": {"required_confirmations": 7}}"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "facecue-replay".into(),
            "--config".into(),
            path.into_os_string(),
        ])
        .unwrap();
        let config = cli.load_config().unwrap();
        assert_eq!(config.confirmation.required_confirmations, 7);
    }

    #[test]
    fn test_config_flag_with_bad_file_fails() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let cli = Cli {
            input: None,
            config: Some(path),
        };
        assert!(cli.load_config().is_err());
    }
}
