//! Success-rate ranking of heuristics over the record history.
//!
//! Every record whose prediction names a registered heuristic counts toward
//! that heuristic's total, and toward its successes when the outcome was
//! favorable. Heuristics are then ordered by success rate, best first; equal
//! rates keep registry order. Below
//! [`ACTIVATION_THRESHOLD`](crate::ACTIVATION_THRESHOLD) records the ranking
//! is not trusted and comes back empty.

use std::fmt;

use serde::Serialize;
use tilewatch_record::GameRecord;
use tilewatch_stats::rate::SuccessCounter;

use crate::{ACTIVATION_THRESHOLD, HeuristicRegistry};

/// Observed performance of one heuristic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeuristicRanking {
    pub name: String,
    pub successes: usize,
    pub total: usize,
    pub success_rate: f64,
}

impl HeuristicRanking {
    fn new(name: &str, counter: SuccessCounter) -> Self {
        Self {
            name: name.to_owned(),
            successes: counter.successes(),
            total: counter.total(),
            success_rate: counter.rate(),
        }
    }
}

impl fmt::Display for HeuristicRanking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1}%)", self.name, self.success_rate * 100.0)
    }
}

/// Ranks every registered heuristic by observed success rate.
#[must_use]
pub fn rank(registry: &HeuristicRegistry, history: &[GameRecord]) -> Vec<HeuristicRanking> {
    if history.len() < ACTIVATION_THRESHOLD {
        return Vec::new();
    }

    let mut counters = vec![SuccessCounter::default(); registry.len()];
    let names: Vec<&str> = registry.iter().map(|h| h.name()).collect();
    for record in history {
        let Some(heuristic) = record.heuristic() else {
            continue;
        };
        if let Some(index) = names.iter().position(|name| *name == heuristic) {
            counters[index].record(record.success);
        }
    }

    let mut rankings: Vec<_> = names
        .iter()
        .zip(counters)
        .map(|(name, counter)| HeuristicRanking::new(name, counter))
        .collect();
    // stable: ties keep registry order
    rankings.sort_by(|a, b| b.success_rate.total_cmp(&a.success_rate));
    rankings
}
