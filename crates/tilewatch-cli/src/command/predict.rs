use std::path::PathBuf;

use anyhow::Context;
use tilewatch_record::{TileVerdict, store::RecordStore};
use tilewatch_tracker::{HeuristicChoice, PredictRequest, TrackerSession, predict::DEFAULT_SIMULATIONS};

use super::RoundArg;
use crate::util::Output;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PredictArg {
    #[clap(flatten)]
    round: RoundArg,
    /// Heuristic name or id, or `auto` to pick the best-ranked one
    #[arg(long, default_value = "auto")]
    heuristic: HeuristicChoice,
    /// Simulation budget for sampling heuristics
    #[arg(long, default_value_t = DEFAULT_SIMULATIONS)]
    simulations: usize,
    /// Comma-separated indices of tiles already revealed
    #[arg(long, value_delimiter = ',')]
    revealed: Vec<usize>,
    /// Write the prediction as JSON to this file (`-` for stdout) instead of drawing it
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run<S>(session: &mut TrackerSession<S>, arg: &PredictArg) -> anyhow::Result<()>
where
    S: RecordStore,
{
    let request = PredictRequest {
        round: arg.round.to_round(),
        heuristic: arg.heuristic.clone(),
        revealed: arg.revealed.clone(),
        simulations: arg.simulations,
    };
    let prediction = session
        .predict(&request)
        .context("Failed to predict round")?;

    eprintln!(
        "{}: {} safe, {} bombs, {} unknown (nonce {})",
        prediction.heuristic,
        prediction.count(TileVerdict::Safe),
        prediction.count(TileVerdict::Bomb),
        prediction.count(TileVerdict::Unknown),
        request.round.nonce
    );
    match &arg.output {
        Some(path) => {
            Output::save_json(&prediction, path)?;
            eprintln!("Saved prediction to {}", path.display());
        }
        None => print!("{prediction}"),
    }
    Ok(())
}
