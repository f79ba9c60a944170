//! Turning heuristic scores into tile verdicts.
//!
//! # Labeling
//!
//! Revealed tiles are never labeled. Among the remaining candidates:
//!
//! - the `max(5, min(⌊0.7·total⌋, total − mines))` best-scoring tiles are
//!   labeled safe
//! - the `mines + extra` worst-scoring tiles that are not safe are labeled
//!   bombs, where `extra` grows with the number of candidates scoring below
//!   `mean + std_dev` and is capped at `min(2, ⌊mines/5⌋)`
//! - everything else stays unknown
//!
//! Sorting is stable, so equal scores keep tile order.

use std::{convert::Infallible, fmt, str::FromStr};

use rand::{Rng, seq::IndexedRandom as _};
use serde::Serialize;
use tilewatch_heuristic::{
    ACTIVATION_THRESHOLD, Heuristic, HeuristicRegistry, ranking::HeuristicRanking,
    registry::is_activatable,
};
use tilewatch_record::{RoundInputs, TileVerdict};
use tilewatch_stats::descriptive::DescriptiveStats;

pub const DEFAULT_SIMULATIONS: usize = 2000;

const MIN_SAFE_TILES: usize = 5;
const SAFE_SHARE_TENTHS: usize = 7;
const MAX_EXTRA_BOMBS: usize = 2;
const EXTRA_BOMB_DIVISOR: usize = 5;
/// Spread used when every candidate scored the same
const FLAT_SPREAD: f64 = 0.1;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PredictError {
    #[display("client seed and server seed must both be set")]
    MissingSeeds,
    #[display("grid size {grid_size} is not a usable board size")]
    InvalidGridSize { grid_size: usize },
    #[display("mine count {mine_count} is out of range (1-{max})")]
    MineCountOutOfRange { mine_count: usize, max: usize },
    #[display("revealed tile {tile} is outside the {total_tiles}-tile grid")]
    RevealedOutOfRange { tile: usize, total_tiles: usize },
    #[display("unknown heuristic '{name}'")]
    UnknownHeuristic { name: String },
    #[display(
        "heuristic '{name}' is disabled until {}+ games are collected ({history_size} so far)",
        ACTIVATION_THRESHOLD
    )]
    HeuristicLocked { name: String, history_size: usize },
    #[display("no heuristic is available")]
    NoActivatableHeuristic,
}

/// Which heuristic a prediction should use.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum HeuristicChoice {
    /// Best-ranked heuristic, or a random available one without a ranking
    #[default]
    Auto,
    /// Registry lookup by display name or id
    Named(String),
}

impl From<&str> for HeuristicChoice {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("auto") {
            Self::Auto
        } else {
            Self::Named(s.to_owned())
        }
    }
}

impl FromStr for HeuristicChoice {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for HeuristicChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PredictRequest {
    pub round: RoundInputs,
    pub heuristic: HeuristicChoice,
    /// Tiles already revealed on the board
    pub revealed: Vec<usize>,
    pub simulations: usize,
}

impl PredictRequest {
    #[must_use]
    pub fn new(round: RoundInputs) -> Self {
        Self {
            round,
            heuristic: HeuristicChoice::Auto,
            revealed: Vec::new(),
            simulations: DEFAULT_SIMULATIONS,
        }
    }

    /// Checks the round inputs and returns the number of tiles on the board.
    pub fn validate(&self) -> Result<usize, PredictError> {
        let round = &self.round;
        if round.client_seed.is_empty() || round.server_seed.is_empty() {
            return Err(PredictError::MissingSeeds);
        }
        let total_tiles = round
            .grid_size
            .checked_mul(round.grid_size)
            .filter(|&total| total > 0)
            .ok_or(PredictError::InvalidGridSize {
                grid_size: round.grid_size,
            })?;
        let max = total_tiles - 1;
        if round.mine_count < 1 || round.mine_count > max {
            return Err(PredictError::MineCountOutOfRange {
                mine_count: round.mine_count,
                max,
            });
        }
        if let Some(&tile) = self.revealed.iter().find(|&&tile| tile >= total_tiles) {
            return Err(PredictError::RevealedOutOfRange { tile, total_tiles });
        }
        Ok(total_tiles)
    }
}

/// Verdicts produced for one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub heuristic: String,
    pub grid_size: usize,
    pub verdicts: Vec<TileVerdict>,
    /// Normalized scores the verdicts were derived from
    pub scores: Vec<f64>,
}

impl Prediction {
    #[must_use]
    pub fn count(&self, verdict: TileVerdict) -> usize {
        self.verdicts.iter().filter(|v| **v == verdict).count()
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.verdicts.chunks(self.grid_size.max(1)) {
            let mut sep = "";
            for verdict in row {
                write!(f, "{sep}{verdict}")?;
                sep = " ";
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Picks the heuristic for a prediction.
///
/// `Auto` takes the top of `ranking` when its success rate is positive,
/// otherwise a uniformly random activatable heuristic. Whatever is picked
/// must be activatable with `history_size` records.
pub fn resolve_heuristic<'r, R>(
    registry: &'r HeuristicRegistry,
    ranking: &[HeuristicRanking],
    history_size: usize,
    choice: &HeuristicChoice,
    rng: &mut R,
) -> Result<&'r dyn Heuristic, PredictError>
where
    R: Rng + ?Sized,
{
    let heuristic = match choice {
        HeuristicChoice::Auto => {
            let best = ranking
                .first()
                .filter(|top| top.success_rate > 0.0)
                .and_then(|top| registry.lookup(&top.name));
            match best {
                Some(heuristic) => heuristic,
                None => registry
                    .list_activatable(history_size)
                    .choose(rng)
                    .copied()
                    .ok_or(PredictError::NoActivatableHeuristic)?,
            }
        }
        HeuristicChoice::Named(name) => {
            registry
                .lookup(name)
                .ok_or_else(|| PredictError::UnknownHeuristic { name: name.clone() })?
        }
    };
    if !is_activatable(heuristic, history_size) {
        return Err(PredictError::HeuristicLocked {
            name: heuristic.name().to_owned(),
            history_size,
        });
    }
    Ok(heuristic)
}

/// Replaces NaN with `0` and pads or truncates to `total_tiles` entries.
#[must_use]
pub fn normalize_scores(mut scores: Vec<f64>, total_tiles: usize) -> Vec<f64> {
    for score in &mut scores {
        if score.is_nan() {
            *score = 0.0;
        }
    }
    scores.resize(total_tiles, 0.0);
    scores
}

/// Number of tiles to label safe before clamping to the candidates.
#[must_use]
pub fn safe_count(total_tiles: usize, mine_count: usize) -> usize {
    let by_share = total_tiles.saturating_mul(SAFE_SHARE_TENTHS) / 10;
    let by_mines = total_tiles.saturating_sub(mine_count);
    MIN_SAFE_TILES.max(by_share.min(by_mines))
}

/// Number of tiles to label as bombs given the candidate scores.
#[must_use]
pub fn bomb_count(mine_count: usize, candidate_scores: &[f64]) -> usize {
    let Some(stats) = DescriptiveStats::new(candidate_scores.iter().copied()) else {
        return mine_count;
    };
    let threshold = stats.upper_band(FLAT_SPREAD);
    let confident = candidate_scores.iter().filter(|&&s| s < threshold).count();
    let max_extra = MAX_EXTRA_BOMBS.min(mine_count / EXTRA_BOMB_DIVISOR);
    let extra = if confident > mine_count {
        max_extra.min(confident - mine_count)
    } else {
        0
    };
    mine_count + extra
}

/// Labels every tile from its score. `scores` holds one entry per tile.
#[must_use]
pub fn label_tiles(scores: &[f64], revealed: &[usize], mine_count: usize) -> Vec<TileVerdict> {
    let total_tiles = scores.len();
    let mut verdicts = vec![TileVerdict::Unknown; total_tiles];
    let candidates: Vec<usize> = (0..total_tiles)
        .filter(|tile| !revealed.contains(tile))
        .collect();
    if candidates.is_empty() {
        return verdicts;
    }

    let safe = safe_count(total_tiles, mine_count).min(candidates.len());
    let mut best_first = candidates.clone();
    best_first.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    for &tile in &best_first[..safe] {
        verdicts[tile] = TileVerdict::Safe;
    }

    let candidate_scores: Vec<f64> = candidates.iter().map(|&tile| scores[tile]).collect();
    let bombs = bomb_count(mine_count, &candidate_scores);
    // bombs win over safe labels when both counts overlap
    for &tile in best_first.iter().rev().take(bombs) {
        verdicts[tile] = TileVerdict::Bomb;
    }
    verdicts
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;
    use tilewatch_record::TileVerdict::{Bomb, Safe, Unknown};

    use super::*;

    fn round(grid_size: usize, mine_count: usize) -> RoundInputs {
        RoundInputs {
            client_seed: "client".to_owned(),
            server_seed: "server".to_owned(),
            nonce: 0,
            grid_size,
            mine_count,
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn descending(total: usize) -> Vec<f64> {
        (0..total).map(|i| 1.0 / (i as f64 + 1.0)).collect()
    }

    #[test]
    fn test_safe_count_formula() {
        assert_eq!(safe_count(25, 3), 17);
        assert_eq!(safe_count(25, 10), 15);
        assert_eq!(safe_count(25, 24), 5);
        assert_eq!(safe_count(30, 3), 21);
        assert_eq!(safe_count(4, 1), 5);
    }

    #[test]
    fn test_bomb_count_adds_confident_extras() {
        // flat scores: every candidate is below mean + 0.1
        assert_eq!(bomb_count(5, &[0.5; 25]), 6);
        assert_eq!(bomb_count(10, &[0.5; 25]), 12);
        assert_eq!(bomb_count(3, &[0.5; 25]), 3);
        assert_eq!(bomb_count(3, &[]), 3);
    }

    #[test]
    fn test_labels_on_standard_grid() {
        let verdicts = label_tiles(&descending(25), &[], 3);
        assert_eq!(verdicts.len(), 25);
        assert!(verdicts[..17].iter().all(|v| *v == Safe));
        assert!(verdicts[17..22].iter().all(|v| *v == Unknown));
        assert!(verdicts[22..].iter().all(|v| *v == Bomb));
    }

    #[test]
    fn test_ties_keep_tile_order() {
        let verdicts = label_tiles(&[0.5; 25], &[], 5);
        assert!(verdicts[..17].iter().all(|v| *v == Safe));
        assert_eq!(&verdicts[17..19], &[Unknown, Unknown]);
        assert!(verdicts[19..].iter().all(|v| *v == Bomb));
    }

    #[test]
    fn test_bombs_cover_mine_count_on_crowded_boards() {
        for mine_count in [21, 22, 24] {
            let verdicts = label_tiles(&descending(25), &[], mine_count);
            let bombs = verdicts.iter().filter(|v| **v == Bomb).count();
            assert!(bombs >= mine_count, "{mine_count} mines, {bombs} bombs");
            assert_eq!(verdicts.len(), 25);
        }

        let verdicts = label_tiles(&descending(25), &[], 24);
        assert_eq!(verdicts[0], Safe);
        assert!(verdicts[1..].iter().all(|v| *v == Bomb));
    }

    #[test]
    fn test_revealed_tiles_stay_unknown() {
        let verdicts = label_tiles(&descending(25), &[0, 1], 3);
        assert_eq!(verdicts[0], Unknown);
        assert_eq!(verdicts[1], Unknown);
        assert_eq!(verdicts.iter().filter(|v| **v == Safe).count(), 17);
        assert!(verdicts[2..19].iter().all(|v| *v == Safe));
    }

    #[test]
    fn test_small_board_clamps_to_candidates() {
        let verdicts = label_tiles(&descending(4), &[3], 1);
        assert_eq!(verdicts, vec![Safe, Safe, Bomb, Unknown]);
        assert_eq!(label_tiles(&descending(1), &[0], 1), vec![Unknown]);
    }

    #[test]
    fn test_normalize_scores() {
        let scores = normalize_scores(vec![f64::NAN, 0.25, 1.0], 5);
        assert_eq!(scores, vec![0.0, 0.25, 1.0, 0.0, 0.0]);
        assert_eq!(normalize_scores(vec![1.0; 30], 25).len(), 25);
    }

    #[test]
    fn test_validate_rejects_bad_inputs() {
        let mut request = PredictRequest::new(round(5, 3));
        assert_eq!(request.validate().unwrap(), 25);

        request.round.mine_count = 25;
        assert!(matches!(
            request.validate(),
            Err(PredictError::MineCountOutOfRange { mine_count: 25, max: 24 })
        ));
        request.round.mine_count = 0;
        assert!(request.validate().is_err());

        let mut request = PredictRequest::new(round(0, 3));
        assert!(matches!(
            request.validate(),
            Err(PredictError::InvalidGridSize { grid_size: 0 })
        ));
        request.round = round(5, 3);
        request.revealed = vec![2, 25];
        assert!(matches!(
            request.validate(),
            Err(PredictError::RevealedOutOfRange { tile: 25, total_tiles: 25 })
        ));
        request.round.server_seed.clear();
        assert!(matches!(request.validate(), Err(PredictError::MissingSeeds)));
    }

    #[test]
    fn test_resolve_named_and_locked() {
        let registry = HeuristicRegistry::builtin();
        let mut rng = Pcg32::seed_from_u64(21);
        let choice: HeuristicChoice = "minimax".parse().unwrap();
        let heuristic = resolve_heuristic(&registry, &[], 0, &choice, &mut rng).unwrap();
        assert_eq!(heuristic.name(), "Minimax");

        let choice = HeuristicChoice::Named("PUCT".to_owned());
        assert!(matches!(
            resolve_heuristic(&registry, &[], 10, &choice, &mut rng),
            Err(PredictError::HeuristicLocked { history_size: 10, .. })
        ));
        let choice = HeuristicChoice::Named("Oracle".to_owned());
        assert!(matches!(
            resolve_heuristic(&registry, &[], 10, &choice, &mut rng),
            Err(PredictError::UnknownHeuristic { .. })
        ));
    }

    #[test]
    fn test_resolve_auto() {
        let registry = HeuristicRegistry::builtin();
        let mut rng = Pcg32::seed_from_u64(22);
        for _ in 0..20 {
            let heuristic =
                resolve_heuristic(&registry, &[], 0, &HeuristicChoice::Auto, &mut rng).unwrap();
            assert!(!heuristic.is_data_driven());
        }

        let ranking = |rate| {
            vec![HeuristicRanking {
                name: "Frequency Safe".to_owned(),
                successes: 0,
                total: 0,
                success_rate: rate,
            }]
        };
        let top = resolve_heuristic(&registry, &ranking(0.6), 60, &HeuristicChoice::Auto, &mut rng)
            .unwrap();
        assert_eq!(top.name(), "Frequency Safe");
        let fallback =
            resolve_heuristic(&registry, &ranking(0.0), 60, &HeuristicChoice::Auto, &mut rng)
                .unwrap();
        assert!(registry.lookup(fallback.name()).is_some());
    }

    #[test]
    fn test_prediction_renders_rows() {
        let prediction = Prediction {
            heuristic: "Minimax".to_owned(),
            grid_size: 2,
            verdicts: vec![Safe, Bomb, Unknown, Safe],
            scores: vec![1.0, 0.0, 0.5, 0.8],
        };
        assert_eq!(prediction.to_string(), "✅ 💣\n❓ ✅\n");
        assert_eq!(prediction.count(Safe), 2);
    }
}
