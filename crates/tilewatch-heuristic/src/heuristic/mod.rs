//! Heuristic trait and the built-in catalog.
//!
//! Heuristics fall in two families:
//!
//! **Data-independent** ([`blind`]) - score tiles from position and randomness only:
//! - [`blind::Random`] - uniform random score per tile
//! - [`blind::Mcts`] - random playouts counting hits per tile
//! - [`blind::Minimax`] - `1/(i+1)`, favoring low indices
//! - [`blind::Expectimax`] - random score damped by tile index
//!
//! **Data-driven** ([`learned`]) - score tiles from past verdicts in the history:
//! - [`learned::Puct`] - observed safe rate plus an exploration bonus
//! - [`learned::FrequencySafe`] - how rarely a tile was labeled a bomb
//! - [`learned::WeightedSuccess`] - safe labels in successful records
//! - [`learned::PositionPattern`] - how often a tile was labeled safe
//! - [`learned::HybridDataDriven`] - safe share of all labels for a tile

use std::fmt;

use rand::RngCore;
use tilewatch_record::GameRecord;

pub mod blind;
pub mod learned;

#[must_use]
pub fn all_heuristics() -> Vec<BoxedHeuristic> {
    vec![
        // data-independent
        Box::new(blind::Random),
        Box::new(blind::Mcts),
        Box::new(blind::Minimax),
        Box::new(blind::Expectimax),
        // data-driven
        Box::new(learned::Puct),
        Box::new(learned::FrequencySafe),
        Box::new(learned::WeightedSuccess),
        Box::new(learned::PositionPattern),
        Box::new(learned::HybridDataDriven),
    ]
}

/// Inputs shared by every heuristic invocation.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    /// `client:server:nonce` seed string of the round
    pub seed: &'a str,
    pub mine_count: usize,
    pub total_tiles: usize,
    /// Tiles already revealed on the board
    pub revealed: &'a [usize],
    /// Simulation budget for sampling heuristics
    pub simulations: usize,
    /// Collected record history, oldest first
    pub history: &'a [GameRecord],
}

impl ScoringInput<'_> {
    #[must_use]
    pub fn is_revealed(&self, tile: usize) -> bool {
        self.revealed.contains(&tile)
    }
}

pub trait Heuristic: fmt::Debug + Send + Sync {
    /// Stable machine-friendly identifier, e.g. `frequency_safe`.
    #[must_use]
    fn id(&self) -> &str;

    /// Display name, recorded in prediction snapshots, e.g. `Frequency Safe`.
    #[must_use]
    fn name(&self) -> &str;

    /// Whether the heuristic learns from the record history.
    #[must_use]
    fn is_data_driven(&self) -> bool {
        false
    }

    #[must_use]
    fn clone_boxed(&self) -> BoxedHeuristic;

    /// Scores every tile; higher means more likely safe.
    ///
    /// Implementations return `input.total_tiles` scores, but callers must
    /// not rely on it and normalize the length themselves.
    #[must_use]
    fn score(&self, input: &ScoringInput<'_>, rng: &mut dyn RngCore) -> Vec<f64>;
}

pub type BoxedHeuristic = Box<dyn Heuristic>;

impl Clone for BoxedHeuristic {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

impl Heuristic for BoxedHeuristic {
    fn id(&self) -> &str {
        self.as_ref().id()
    }

    fn name(&self) -> &str {
        self.as_ref().name()
    }

    fn is_data_driven(&self) -> bool {
        self.as_ref().is_data_driven()
    }

    fn clone_boxed(&self) -> BoxedHeuristic {
        self.as_ref().clone_boxed()
    }

    fn score(&self, input: &ScoringInput<'_>, rng: &mut dyn RngCore) -> Vec<f64> {
        self.as_ref().score(input, rng)
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use chrono::Utc;
    use tilewatch_record::{
        GameEvent, GameRecord, PredictionSnapshot, RevealEvent, SeedTriple, TileVerdict,
    };

    pub(crate) fn labeled_record(
        heuristic: &str,
        verdicts: Vec<TileVerdict>,
        success: bool,
    ) -> GameRecord {
        let grid_size = verdicts.len().isqrt();
        let mut record = GameRecord::new(
            Some(PredictionSnapshot {
                heuristic: heuristic.to_owned(),
                verdicts,
                revealed: Vec::new(),
                grid_size,
                mine_count: 1,
                seeds: SeedTriple::new("client", "server", 0),
                created_at: Utc::now(),
            }),
            GameEvent::Reveal(RevealEvent {
                is_mine: Some(!success),
                revealed_tiles: None,
                mine_positions: None,
                next_tile_multiplier: None,
                next_tile_payout: None,
                nonce: Some(0),
            }),
            serde_json::json!({ "isMine": !success }),
        );
        record.success = success;
        record
    }
}
