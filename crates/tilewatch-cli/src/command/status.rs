use std::{
    io::{self, Write as _},
    path::PathBuf,
};

use anyhow::Context;
use tilewatch_heuristic::{ACTIVATION_THRESHOLD, registry::is_activatable};
use tilewatch_record::store::RecordStore;
use tilewatch_tracker::TrackerSession;

use crate::util::Output;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct RankArg {
    /// Write the ranking as JSON to this file (`-` for stdout) instead of printing it
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run_status<S>(session: &TrackerSession<S>) -> anyhow::Result<()>
where
    S: RecordStore,
{
    println!("{}", session.status());
    Ok(())
}

pub(crate) fn run_rank<S>(session: &TrackerSession<S>, arg: &RankArg) -> anyhow::Result<()>
where
    S: RecordStore,
{
    let ranking = session.ranking();
    if let Some(path) = &arg.output {
        Output::save_json(&ranking, path)?;
        eprintln!("Saved ranking of {} heuristics to {}", ranking.len(), path.display());
        return Ok(());
    }

    if ranking.is_empty() {
        eprintln!(
            "Not enough data to rank heuristics: {} of {ACTIVATION_THRESHOLD} games collected",
            session.history().len()
        );
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    for (position, entry) in ranking.iter().enumerate() {
        writeln!(
            stdout,
            "{:>2}. {:<20} {:>5.1}%  ({}/{})",
            position + 1,
            entry.name,
            entry.success_rate * 100.0,
            entry.successes,
            entry.total
        )
        .context("Failed to write ranking")?;
    }
    Ok(())
}

pub(crate) fn run_heuristics<S>(session: &TrackerSession<S>) -> anyhow::Result<()>
where
    S: RecordStore,
{
    let history_size = session.history().len();
    let mut stdout = io::stdout().lock();
    for heuristic in session.registry().iter() {
        let kind = if heuristic.is_data_driven() {
            "data-driven"
        } else {
            "blind"
        };
        let state = if is_activatable(heuristic, history_size) {
            "available"
        } else {
            "locked"
        };
        writeln!(
            stdout,
            "{:<20} {:<20} {:<12} {state}",
            heuristic.name(),
            heuristic.id(),
            kind
        )
        .context("Failed to write heuristic list")?;
    }
    Ok(())
}
