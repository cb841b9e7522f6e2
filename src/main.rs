//! tavi-los: length-of-stay risk scoring after TAVI.
//!
//! Runs the terminal UI when stdin is a terminal. Otherwise reads one
//! patient as JSON from stdin and prints the score as JSON to stdout.
//!
//! # Usage
//!
//! ```bash
//! tavi-los                                  # interactive
//! tavi-los < patient.json                   # point-table score
//! tavi-los --discharge-odds < odds.json     # logistic early-discharge estimate
//! ```

use std::io::{IsTerminal, Read, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tavi_los::adapters::sanitize::SanitizingMakeWriter;
use tavi_los::application::AssessmentService;
use tavi_los::config::{AppConfig, LogMode};
use tavi_los::tui::App;
use tavi_los::{RiskScorer, TaviLosError};

const USAGE: &str = "Usage: tavi-los [--discharge-odds]\n\nWith a terminal on stdin, starts the interactive UI. Otherwise reads one JSON document from stdin and prints the result as JSON.";

/// Exit status for a well-formed request with out-of-range content.
const EXIT_INVALID_INPUT: u8 = 2;

/// What a non-interactive run computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchKind {
    PointScore,
    DischargeOdds,
}

fn main() -> Result<ExitCode> {
    let mut batch_kind = BatchKind::PointScore;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--discharge-odds" => batch_kind = BatchKind::DischargeOdds,
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(ExitCode::SUCCESS);
            }
            _ => {
                eprintln!("Unknown arg: {arg}\n{USAGE}");
                return Ok(ExitCode::from(EXIT_INVALID_INPUT));
            }
        }
    }

    let config = AppConfig::from_env()?;
    let interactive = std::io::stdin().is_terminal();

    // Logging to the terminal would corrupt the TUI, and stdout carries JSON
    // in batch mode, so logs go to a file or stderr.
    let use_file = match config.log_mode {
        LogMode::File => true,
        LogMode::Stderr => false,
        LogMode::Auto => interactive,
    };

    let (writer, _guard) = if use_file {
        if let Some(parent) = config.log_file.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
            .with_context(|| format!("Cannot open log file {:?}", config.log_file))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(!use_file && std::io::stderr().is_terminal())
                .with_writer(SanitizingMakeWriter::new(writer)),
        )
        .init();

    if interactive {
        tracing::info!("Starting tavi-los (model: {})", config.model);
        let mut app = App::new(&config)?;
        app.run()?;
        tracing::info!("tavi-los shutdown complete.");
        return Ok(ExitCode::SUCCESS);
    }

    let service = AssessmentService::new(RiskScorer::new(config.model));
    let code = run_batch(
        &service,
        batch_kind,
        std::io::stdin().lock(),
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    )?;
    Ok(ExitCode::from(code))
}

/// Score one JSON document from `input`, writing JSON to `out` and
/// diagnostics to `err`. Returns the process exit status.
fn run_batch<R: Read, W: Write, E: Write>(
    service: &AssessmentService,
    kind: BatchKind,
    input: R,
    out: &mut W,
    err: &mut E,
) -> std::io::Result<u8> {
    let rendered = match kind {
        BatchKind::PointScore => service
            .assess_reader(input)
            .and_then(|result| Ok(serde_json::to_string_pretty(&result)?)),
        BatchKind::DischargeOdds => service
            .estimate_discharge_reader(input)
            .and_then(|estimate| Ok(serde_json::to_string_pretty(&estimate)?)),
    };

    match rendered {
        Ok(json) => {
            writeln!(out, "{json}")?;
            Ok(0)
        }
        Err(TaviLosError::InvalidInput(e)) => {
            for violation in &e.violations {
                writeln!(err, "invalid input: {violation}")?;
            }
            Ok(EXIT_INVALID_INPUT)
        }
        Err(e) => {
            writeln!(err, "error: {e}")?;
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATIENT: &str = r#"{"age": 82, "sex": "female", "bmi": 27.5,
        "clinical_frailty_score": 4, "lvef": 55, "egfr": 48,
        "comorbidities": ["diabetes"], "access_approach": "transfemoral",
        "anaesthesia": "local"}"#;

    fn batch(kind: BatchKind, input: &str) -> (u8, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run_batch(&AssessmentService::default(), kind, input.as_bytes(), &mut out, &mut err)
            .expect("Writes to buffers succeed");
        (
            code,
            String::from_utf8(out).expect("utf8"),
            String::from_utf8(err).expect("utf8"),
        )
    }

    #[test]
    fn test_valid_patient_prints_result() {
        let (code, out, err) = batch(BatchKind::PointScore, PATIENT);
        assert_eq!(code, 0);
        assert!(err.is_empty());

        let result: serde_json::Value = serde_json::from_str(&out).expect("JSON output");
        assert_eq!(result["total_score"], 4);
        assert_eq!(result["category"], "low");
    }

    #[test]
    fn test_negative_and_low_age_both_exit_invalid_input() {
        for age in ["-3", "10"] {
            let input = PATIENT.replace("\"age\": 82", &format!("\"age\": {age}"));
            let (code, out, err) = batch(BatchKind::PointScore, &input);

            assert_eq!(code, EXIT_INVALID_INPUT, "age {age}");
            assert!(out.is_empty());
            assert_eq!(err, format!("invalid input: Age {age} out of range [18, 120]\n"));
        }
    }

    #[test]
    fn test_malformed_json_is_a_general_failure() {
        let (code, _, err) = batch(BatchKind::PointScore, "not json");
        assert_eq!(code, 1);
        assert!(err.starts_with("error: "));
    }

    #[test]
    fn test_discharge_odds_mode() {
        let (code, out, _) = batch(BatchKind::DischargeOdds, r#"{"fast_programme": true}"#);
        assert_eq!(code, 0);

        let estimate: serde_json::Value = serde_json::from_str(&out).expect("JSON output");
        assert_eq!(estimate["outlook"], "early");
    }
}
