//! Command-line frontend for the Wirescript sequence engine.
//!
//! Stands in for the transport layer: reads a JSON script of raw events,
//! runs it with a fresh runner, and streams one JSON line per progress
//! notification to stdout, followed by a terminal status line. Exit code 0
//! means the script passed, 1 means a step failed, 2 means the input was
//! rejected before execution started.

use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use wirescript_core::{
    LivenessResponder, Notification, ProgressSink, RawEvent, ResponderConfig, RunOutcome,
    SequenceError, SequenceRunner, build_sequence,
};
use wirescript_proto::MessageRegistry;

/// Run a protocol test script against a simulated peer.
#[derive(Debug, Parser)]
#[command(name = "wirescript", version, about)]
struct Args {
    /// Path to a JSON file containing the ordered list of raw events.
    script: PathBuf,

    /// Override the liveness-probe reply-suppression ceiling.
    #[arg(long)]
    pong_ceiling: Option<u64>,
}

/// Failures that prevent a run from starting.
#[derive(Debug, Error)]
enum CliError {
    /// The script file could not be read.
    #[error("cannot read script: {0}")]
    Io(#[from] io::Error),

    /// The script file is not a JSON list of raw events.
    #[error("cannot parse script: {0}")]
    Json(#[from] serde_json::Error),

    /// The script failed validation.
    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

/// Sink that writes one JSON object per line.
struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    fn new(out: W) -> Self {
        Self { out }
    }

    fn emit(&mut self, value: &serde_json::Value) {
        if let Err(write_error) = serde_json::to_writer(&mut self.out, value)
            .map_err(io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"))
        {
            warn!(%write_error, "dropping notification");
        }
    }
}

impl<W: Write> ProgressSink for JsonLinesSink<W> {
    fn step(&mut self, notification: Notification) {
        match serde_json::to_value(&notification) {
            Ok(value) => self.emit(&value),
            Err(serialize_error) => warn!(%serialize_error, "dropping notification"),
        }
    }

    fn finished(&mut self, outcome: &RunOutcome) {
        let value = match outcome {
            RunOutcome::Success => serde_json::json!({"status": "success"}),
            RunOutcome::FailureAt { step, error } => {
                serde_json::json!({"error": error.to_string(), "step": step})
            },
        };
        self.emit(&value);
    }
}

fn execute(args: &Args) -> Result<bool, CliError> {
    let script = fs::read_to_string(&args.script)?;
    let raws: Vec<RawEvent> = serde_json::from_str(&script)?;

    let registry = MessageRegistry::standard();
    let events = build_sequence(&raws, &registry)?;

    let mut config = ResponderConfig::default();
    if let Some(ceiling) = args.pong_ceiling {
        config.pong_ceiling = ceiling;
    }
    let runner =
        SequenceRunner::with_responder(&registry, Box::new(LivenessResponder::new(config)));

    let mut sink = JsonLinesSink::new(io::stdout().lock());
    let result = runner.run(&events, &mut sink);
    info!(steps = result.steps_completed, success = result.outcome.is_success(), "run finished");
    Ok(result.outcome.is_success())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match execute(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(cli_error) => {
            error!(%cli_error, "run rejected");
            ExitCode::from(2)
        },
    }
}

#[cfg(test)]
mod tests {
    use wirescript_core::RunError;

    use super::*;

    #[test]
    fn sink_writes_one_json_line_per_event() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.step(Notification {
            direction: wirescript_core::Direction::Connect,
            connprivkey: "02".into(),
            msg_name: None,
            payload: None,
            timestamp_ms: 0,
        });
        sink.finished(&RunOutcome::Success);

        let output = String::from_utf8(sink.out).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"direction\":\"connect\""));
        assert_eq!(lines[1], "{\"status\":\"success\"}");
    }

    #[test]
    fn sink_reports_failing_step() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.finished(&RunOutcome::FailureAt {
            step: 2,
            error: RunError::NotOpen("02".into()),
        });

        let output = String::from_utf8(sink.out).unwrap();
        assert!(output.contains("\"step\":2"));
        assert!(output.contains("not open"));
    }
}
