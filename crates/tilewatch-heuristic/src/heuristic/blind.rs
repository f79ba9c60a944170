use rand::{Rng as _, RngCore};

use super::{BoxedHeuristic, Heuristic, ScoringInput};

/// Uniform random score in `[0, 1)` for every hidden tile.
///
/// # Scores
///
/// - hidden tile: `random()`
/// - revealed tile: `0`
#[derive(Debug, Clone)]
pub struct Random;

impl Heuristic for Random {
    fn id(&self) -> &'static str {
        "random"
    }
    fn name(&self) -> &'static str {
        "Random"
    }
    fn clone_boxed(&self) -> BoxedHeuristic {
        Box::new(self.clone())
    }
    fn score(&self, input: &ScoringInput<'_>, rng: &mut dyn RngCore) -> Vec<f64> {
        (0..input.total_tiles)
            .map(|tile| {
                if input.is_revealed(tile) {
                    0.0
                } else {
                    rng.random()
                }
            })
            .collect()
    }
}

/// Random playouts: each of `simulations` draws picks a tile uniformly and
/// counts a hit when that tile is still hidden.
///
/// # Scores
///
/// - hidden tile: number of draws that landed on it
/// - revealed tile: `0`
#[derive(Debug, Clone)]
pub struct Mcts;

impl Heuristic for Mcts {
    fn id(&self) -> &'static str {
        "mcts"
    }
    fn name(&self) -> &'static str {
        "MCTS"
    }
    fn clone_boxed(&self) -> BoxedHeuristic {
        Box::new(self.clone())
    }
    fn score(&self, input: &ScoringInput<'_>, rng: &mut dyn RngCore) -> Vec<f64> {
        let mut scores = vec![0.0; input.total_tiles];
        if input.total_tiles == 0 {
            return scores;
        }
        for _ in 0..input.simulations {
            let tile = rng.random_range(0..input.total_tiles);
            if !input.is_revealed(tile) {
                scores[tile] += 1.0;
            }
        }
        scores
    }
}

/// Deterministic preference for low tile indices.
///
/// # Scores
///
/// - hidden tile `i`: `1 / (i + 1)`
/// - revealed tile: `0`
#[derive(Debug, Clone)]
pub struct Minimax;

impl Heuristic for Minimax {
    fn id(&self) -> &'static str {
        "minimax"
    }
    fn name(&self) -> &'static str {
        "Minimax"
    }
    fn clone_boxed(&self) -> BoxedHeuristic {
        Box::new(self.clone())
    }
    #[expect(clippy::cast_precision_loss)]
    fn score(&self, input: &ScoringInput<'_>, _rng: &mut dyn RngCore) -> Vec<f64> {
        (0..input.total_tiles)
            .map(|tile| {
                if input.is_revealed(tile) {
                    0.0
                } else {
                    1.0 / (tile + 1) as f64
                }
            })
            .collect()
    }
}

/// Random score damped linearly by tile index.
///
/// # Scores
///
/// - hidden tile `i`: `random() * (1 - i / total)`
/// - revealed tile: `0`
#[derive(Debug, Clone)]
pub struct Expectimax;

impl Heuristic for Expectimax {
    fn id(&self) -> &'static str {
        "expectimax"
    }
    fn name(&self) -> &'static str {
        "Expectimax"
    }
    fn clone_boxed(&self) -> BoxedHeuristic {
        Box::new(self.clone())
    }
    #[expect(clippy::cast_precision_loss)]
    fn score(&self, input: &ScoringInput<'_>, rng: &mut dyn RngCore) -> Vec<f64> {
        let total = input.total_tiles as f64;
        (0..input.total_tiles)
            .map(|tile| {
                if input.is_revealed(tile) {
                    0.0
                } else {
                    rng.random::<f64>() * (1.0 - tile as f64 / total)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn input(revealed: &[usize], simulations: usize) -> ScoringInput<'_> {
        ScoringInput {
            seed: "client:server:0",
            mine_count: 3,
            total_tiles: 25,
            revealed,
            simulations,
            history: &[],
        }
    }

    #[test]
    fn test_random_zeroes_revealed_tiles() {
        let mut rng = Pcg32::seed_from_u64(1);
        let scores = Random.score(&input(&[0, 7], 0), &mut rng);
        assert_eq!(scores.len(), 25);
        assert_eq!(scores[0], 0.0);
        assert_eq!(scores[7], 0.0);
        assert!(scores.iter().all(|s| (0.0..1.0).contains(s)));
    }

    #[test]
    fn test_mcts_counts_only_hidden_hits() {
        let mut rng = Pcg32::seed_from_u64(2);
        let revealed = [3, 4];
        let scores = Mcts.score(&input(&revealed, 2000), &mut rng);
        assert_eq!(scores[3], 0.0);
        assert_eq!(scores[4], 0.0);
        let hits: f64 = scores.iter().sum();
        assert!(hits <= 2000.0);
        assert!(hits > 1500.0);
    }

    #[test]
    fn test_mcts_without_budget_is_flat() {
        let mut rng = Pcg32::seed_from_u64(3);
        let scores = Mcts.score(&input(&[], 0), &mut rng);
        assert!(scores.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_minimax_is_index_biased() {
        let mut rng = Pcg32::seed_from_u64(4);
        let scores = Minimax.score(&input(&[1], 0), &mut rng);
        assert_eq!(scores[0], 1.0);
        assert_eq!(scores[1], 0.0);
        assert!((scores[3] - 0.25).abs() < 1e-12);
        assert!(scores[2] > scores[24]);
    }

    #[test]
    fn test_expectimax_is_bounded_by_damping() {
        let mut rng = Pcg32::seed_from_u64(5);
        let scores = Expectimax.score(&input(&[], 0), &mut rng);
        for (tile, score) in scores.iter().enumerate() {
            #[expect(clippy::cast_precision_loss)]
            let bound = 1.0 - tile as f64 / 25.0;
            assert!(*score >= 0.0 && *score <= bound);
        }
    }
}
