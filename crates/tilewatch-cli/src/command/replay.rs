//! Scripted replay of a host session.
//!
//! A script is JSON lines, one step per line; blank lines and lines starting
//! with `#` are skipped:
//!
//! ```text
//! {"predict": {"client_seed": "c", "server_seed": "s", "heuristic": "Minimax"}}
//! {"exchange": {"url": "https://host/api/mines/reveal", "response_body": {"isMine": false}}}
//! ```
//!
//! Predict steps override the current round inputs and stage a prediction;
//! afterwards the nonce moves on to the next round. Exchange steps are served
//! by a scripted transport through the interception middleware, exactly as a
//! live host would route them.

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use tilewatch_record::{RoundInputs, store::RecordStore};
use tilewatch_tracker::{
    HeuristicChoice, HttpRequest, HttpResponse, PredictRequest, TrackerSession, Transport,
    predict::DEFAULT_SIMULATIONS,
};

use super::RoundArg;
use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// JSON-lines script to replay
    script: PathBuf,
    /// Round inputs in effect before the first predict step
    #[clap(flatten)]
    round: RoundArg,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
enum ReplayStep {
    Predict(PredictStep),
    Exchange(ExchangeStep),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PredictStep {
    client_seed: Option<String>,
    server_seed: Option<String>,
    nonce: Option<u64>,
    grid_size: Option<usize>,
    #[serde(alias = "mines")]
    mine_count: Option<usize>,
    heuristic: Option<String>,
    revealed: Vec<usize>,
    simulations: Option<usize>,
}

impl PredictStep {
    fn apply(&self, round: &mut RoundInputs) {
        if let Some(client_seed) = &self.client_seed {
            round.client_seed.clone_from(client_seed);
        }
        if let Some(server_seed) = &self.server_seed {
            round.server_seed.clone_from(server_seed);
        }
        if let Some(nonce) = self.nonce {
            round.nonce = nonce;
        }
        if let Some(grid_size) = self.grid_size {
            round.grid_size = grid_size;
        }
        if let Some(mine_count) = self.mine_count {
            round.mine_count = mine_count;
        }
    }

    fn request(&self, round: &RoundInputs) -> PredictRequest {
        PredictRequest {
            round: round.clone(),
            heuristic: self
                .heuristic
                .as_deref()
                .map_or(HeuristicChoice::Auto, HeuristicChoice::from),
            revealed: self.revealed.clone(),
            simulations: self.simulations.unwrap_or(DEFAULT_SIMULATIONS),
        }
    }
}

fn default_method() -> String {
    "POST".to_owned()
}

const fn default_status() -> u16 {
    200
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExchangeStep {
    url: String,
    #[serde(default = "default_method")]
    method: String,
    #[serde(default)]
    request_body: Option<String>,
    #[serde(default = "default_status")]
    status: u16,
    /// JSON document, or a string sent verbatim
    response_body: Value,
}

impl ExchangeStep {
    fn request(&self) -> HttpRequest {
        HttpRequest {
            url: self.url.clone(),
            method: self.method.clone(),
            body: self.request_body.clone(),
        }
    }

    fn response(&self) -> HttpResponse {
        let body = match &self.response_body {
            Value::String(raw) => raw.clone(),
            document => document.to_string(),
        };
        HttpResponse {
            status: self.status,
            body,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
enum ReplayError {
    #[display("no scripted response for {url}")]
    NoResponse { url: String },
}

/// Serves the one response queued by the current exchange step.
#[derive(Debug, Default)]
struct ScriptedTransport {
    next: Option<HttpResponse>,
}

impl Transport for ScriptedTransport {
    type Error = ReplayError;

    fn send(&mut self, request: &HttpRequest) -> Result<HttpResponse, Self::Error> {
        self.next.take().ok_or_else(|| ReplayError::NoResponse {
            url: request.url.clone(),
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ReplaySummary {
    predictions: usize,
    exchanges: usize,
    recorded: usize,
}

pub(crate) fn run<S>(session: &mut TrackerSession<S>, arg: &ReplayArg) -> anyhow::Result<()>
where
    S: RecordStore,
{
    let script = util::read_text_file("replay script", &arg.script)?;
    let mut stdout = io::stdout().lock();
    let summary = replay_script(session, &script, arg.round.to_round(), &mut stdout)?;
    eprintln!(
        "Replayed {} predictions and {} exchanges, {} records appended",
        summary.predictions, summary.exchanges, summary.recorded
    );
    writeln!(stdout, "{}", session.status()).context("Failed to write status")?;
    Ok(())
}

fn replay_script<S, W>(
    session: &mut TrackerSession<S>,
    script: &str,
    mut round: RoundInputs,
    out: &mut W,
) -> anyhow::Result<ReplaySummary>
where
    S: RecordStore,
    W: Write,
{
    let mut summary = ReplaySummary::default();
    for (index, line) in script.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step: ReplayStep = serde_json::from_str(line)
            .with_context(|| format!("Invalid replay step on line {line_no}"))?;

        match step {
            ReplayStep::Predict(step) => {
                step.apply(&mut round);
                let prediction = session
                    .predict(&step.request(&round))
                    .with_context(|| format!("Prediction on line {line_no} failed"))?;
                writeln!(
                    out,
                    "[{line_no}] {} (nonce {})",
                    prediction.heuristic, round.nonce
                )?;
                write!(out, "{prediction}")?;
                round.advance_nonce();
                summary.predictions += 1;
            }
            ReplayStep::Exchange(step) => {
                let request = step.request();
                let before = session.history().len();
                let mut transport = ScriptedTransport {
                    next: Some(step.response()),
                };
                session
                    .intercept(&mut transport, &round)
                    .send(&request)
                    .with_context(|| format!("Exchange on line {line_no} failed"))?;
                summary.exchanges += 1;

                match session.history().get(before) {
                    Some(record) => {
                        summary.recorded += 1;
                        writeln!(
                            out,
                            "[{line_no}] {request} -> recorded {} ({})",
                            record.event_kind(),
                            if record.success { "success" } else { "failure" }
                        )?;
                    }
                    None => writeln!(out, "[{line_no}] {request} -> not recorded")?,
                }
            }
        }
    }
    Ok(summary)
}
