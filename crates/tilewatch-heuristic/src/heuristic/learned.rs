//! Heuristics that learn from verdicts recorded in past predictions.
//!
//! Each one counts, per tile, how past predictions labeled that tile and
//! whether the correlated outcome was favorable. Below
//! [`ACTIVATION_THRESHOLD`](crate::ACTIVATION_THRESHOLD) records there is not
//! enough data; a direct call then returns a single random value repeated for
//! every tile, so the resulting labels are arbitrary.

use rand::{Rng as _, RngCore};
use tilewatch_record::{GameRecord, TileVerdict};

use super::{BoxedHeuristic, Heuristic, ScoringInput};
use crate::ACTIVATION_THRESHOLD;

fn untrained_scores(input: &ScoringInput<'_>, rng: &mut dyn RngCore) -> Option<Vec<f64>> {
    (input.history.len() < ACTIVATION_THRESHOLD)
        .then(|| vec![rng.random::<f64>(); input.total_tiles])
}

/// Per-tile label counts over the whole history.
#[derive(Debug, Clone)]
struct LabelCounts {
    /// Records whose prediction labeled the tile at all
    labeled: Vec<u32>,
    safe: Vec<u32>,
    bomb: Vec<u32>,
    /// Safe labels in records with a favorable outcome
    safe_in_success: Vec<u32>,
}

impl LabelCounts {
    fn collect(history: &[GameRecord], total_tiles: usize) -> Self {
        let mut counts = Self {
            labeled: vec![0; total_tiles],
            safe: vec![0; total_tiles],
            bomb: vec![0; total_tiles],
            safe_in_success: vec![0; total_tiles],
        };
        for record in history {
            for tile in 0..total_tiles {
                let Some(verdict) = record.verdict_at(tile) else {
                    continue;
                };
                counts.labeled[tile] += 1;
                match verdict {
                    TileVerdict::Safe => {
                        counts.safe[tile] += 1;
                        if record.success {
                            counts.safe_in_success[tile] += 1;
                        }
                    }
                    TileVerdict::Bomb => counts.bomb[tile] += 1,
                    TileVerdict::Unknown => {}
                }
            }
        }
        counts
    }
}

/// Observed safe rate per tile plus an exploration bonus.
///
/// # Scores
///
/// For hidden tile `i` labeled in `n` records, `s` of which labeled it safe
/// and had a favorable outcome:
///
/// - `prior = s / n` (or `0.5` when `n = 0`)
/// - `score = prior + sqrt(ln(total_tiles + 1) / (n + 1))`
///
/// Revealed tiles score `0`.
#[derive(Debug, Clone)]
pub struct Puct;

impl Heuristic for Puct {
    fn id(&self) -> &'static str {
        "puct"
    }
    fn name(&self) -> &'static str {
        "PUCT"
    }
    fn is_data_driven(&self) -> bool {
        true
    }
    fn clone_boxed(&self) -> BoxedHeuristic {
        Box::new(self.clone())
    }
    #[expect(clippy::cast_precision_loss)]
    fn score(&self, input: &ScoringInput<'_>, rng: &mut dyn RngCore) -> Vec<f64> {
        if let Some(scores) = untrained_scores(input, rng) {
            return scores;
        }
        let counts = LabelCounts::collect(input.history, input.total_tiles);
        let exploration = ((input.total_tiles + 1) as f64).ln();
        (0..input.total_tiles)
            .map(|tile| {
                if input.is_revealed(tile) {
                    return 0.0;
                }
                let total = f64::from(counts.labeled[tile]);
                let prior = if total > 0.0 {
                    f64::from(counts.safe_in_success[tile]) / total
                } else {
                    0.5
                };
                prior + (exploration / (total + 1.0)).sqrt()
            })
            .collect()
    }
}

/// How rarely each tile was labeled a bomb.
///
/// # Scores
///
/// - tile `i`: `1 - bomb_labels(i) / history_len`
#[derive(Debug, Clone)]
pub struct FrequencySafe;

impl Heuristic for FrequencySafe {
    fn id(&self) -> &'static str {
        "frequency_safe"
    }
    fn name(&self) -> &'static str {
        "Frequency Safe"
    }
    fn is_data_driven(&self) -> bool {
        true
    }
    fn clone_boxed(&self) -> BoxedHeuristic {
        Box::new(self.clone())
    }
    #[expect(clippy::cast_precision_loss)]
    fn score(&self, input: &ScoringInput<'_>, rng: &mut dyn RngCore) -> Vec<f64> {
        if let Some(scores) = untrained_scores(input, rng) {
            return scores;
        }
        let counts = LabelCounts::collect(input.history, input.total_tiles);
        let len = input.history.len() as f64;
        counts
            .bomb
            .iter()
            .map(|&bombs| 1.0 - f64::from(bombs) / len)
            .collect()
    }
}

/// Safe labels that were followed by a favorable outcome.
///
/// # Scores
///
/// - tile `i`: `safe_labels_in_successful_records(i) / history_len`
#[derive(Debug, Clone)]
pub struct WeightedSuccess;

impl Heuristic for WeightedSuccess {
    fn id(&self) -> &'static str {
        "weighted_success"
    }
    fn name(&self) -> &'static str {
        "Weighted Success"
    }
    fn is_data_driven(&self) -> bool {
        true
    }
    fn clone_boxed(&self) -> BoxedHeuristic {
        Box::new(self.clone())
    }
    #[expect(clippy::cast_precision_loss)]
    fn score(&self, input: &ScoringInput<'_>, rng: &mut dyn RngCore) -> Vec<f64> {
        if let Some(scores) = untrained_scores(input, rng) {
            return scores;
        }
        let counts = LabelCounts::collect(input.history, input.total_tiles);
        let len = input.history.len() as f64;
        counts
            .safe_in_success
            .iter()
            .map(|&safe| f64::from(safe) / len)
            .collect()
    }
}

/// How often each tile was labeled safe, regardless of outcome.
///
/// # Scores
///
/// - tile `i`: `safe_labels(i) / history_len`
#[derive(Debug, Clone)]
pub struct PositionPattern;

impl Heuristic for PositionPattern {
    fn id(&self) -> &'static str {
        "position_pattern"
    }
    fn name(&self) -> &'static str {
        "Position Pattern"
    }
    fn is_data_driven(&self) -> bool {
        true
    }
    fn clone_boxed(&self) -> BoxedHeuristic {
        Box::new(self.clone())
    }
    #[expect(clippy::cast_precision_loss)]
    fn score(&self, input: &ScoringInput<'_>, rng: &mut dyn RngCore) -> Vec<f64> {
        if let Some(scores) = untrained_scores(input, rng) {
            return scores;
        }
        let counts = LabelCounts::collect(input.history, input.total_tiles);
        let len = input.history.len() as f64;
        counts
            .safe
            .iter()
            .map(|&safe| f64::from(safe) / len)
            .collect()
    }
}

/// Safe share among all labels a tile received.
///
/// # Scores
///
/// - tile `i`: `safe_labels(i) / labels(i)`
/// - a random score when that share is zero or the tile was never labeled
#[derive(Debug, Clone)]
pub struct HybridDataDriven;

impl Heuristic for HybridDataDriven {
    fn id(&self) -> &'static str {
        "hybrid_data_driven"
    }
    fn name(&self) -> &'static str {
        "Hybrid Data-Driven"
    }
    fn is_data_driven(&self) -> bool {
        true
    }
    fn clone_boxed(&self) -> BoxedHeuristic {
        Box::new(self.clone())
    }
    fn score(&self, input: &ScoringInput<'_>, rng: &mut dyn RngCore) -> Vec<f64> {
        if let Some(scores) = untrained_scores(input, rng) {
            return scores;
        }
        let counts = LabelCounts::collect(input.history, input.total_tiles);
        counts
            .safe
            .iter()
            .zip(&counts.labeled)
            .map(|(&safe, &labeled)| {
                if safe == 0 || labeled == 0 {
                    rng.random()
                } else {
                    f64::from(safe) / f64::from(labeled)
                }
            })
            .collect()
    }
}
