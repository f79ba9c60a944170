use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tilewatch_record::RoundInputs;

use self::{
    archive::{ExportArg, ImportArg},
    predict::PredictArg,
    replay::ReplayArg,
    status::RankArg,
};
use crate::{logging, util};

mod archive;
mod predict;
mod replay;
mod status;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Directory holding the collected game history
    #[arg(long, global = true, default_value = "./data/tilewatch/")]
    data_dir: PathBuf,
    /// Log tracker activity to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    /// What to do with the collected history
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Show the one-line collection status
    Status,
    /// Rank heuristics by observed success rate
    Rank(#[clap(flatten)] RankArg),
    /// List the heuristic catalog and which entries are available
    Heuristics,
    /// Label the tiles of one round
    Predict(#[clap(flatten)] PredictArg),
    /// Replay a JSON-lines script of predictions and network exchanges
    Replay(#[clap(flatten)] ReplayArg),
    /// Export the collected history
    Export(#[clap(flatten)] ExportArg),
    /// Replace the collected history with an exported file
    Import(#[clap(flatten)] ImportArg),
    /// Delete the collected history
    Clear,
}

/// Round inputs as set by the host.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RoundArg {
    #[arg(long, default_value = "")]
    client_seed: String,
    #[arg(long, default_value = "")]
    server_seed: String,
    #[arg(long, default_value_t = 0)]
    nonce: u64,
    /// Number of mines on the board
    #[arg(long = "mines", default_value_t = 3)]
    mine_count: usize,
    /// Board side length
    #[arg(long, default_value_t = 5)]
    grid_size: usize,
}

impl RoundArg {
    pub(crate) fn to_round(&self) -> RoundInputs {
        RoundInputs {
            client_seed: self.client_seed.clone(),
            server_seed: self.server_seed.clone(),
            nonce: self.nonce,
            grid_size: self.grid_size,
            mine_count: self.mine_count,
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    logging::init(args.verbose);

    let mut session = util::open_session(&args.data_dir);
    match args.mode.unwrap_or(Mode::Status) {
        Mode::Status => status::run_status(&session)?,
        Mode::Rank(arg) => status::run_rank(&session, &arg)?,
        Mode::Heuristics => status::run_heuristics(&session)?,
        Mode::Predict(arg) => predict::run(&mut session, &arg)?,
        Mode::Replay(arg) => replay::run(&mut session, &arg)?,
        Mode::Export(arg) => archive::run_export(&session, &arg)?,
        Mode::Import(arg) => archive::run_import(&mut session, &arg)?,
        Mode::Clear => archive::run_clear(&mut session)?,
    }
    Ok(())
}
