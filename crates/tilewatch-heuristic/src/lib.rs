//! Scoring heuristics, their registry, and the success-rate ranking.
//!
//! # Architecture
//!
//! ```text
//! HeuristicRegistry (ordered, validated catalog)
//!     ↓ holds
//! Heuristic (named scoring function, data-independent or data-driven)
//!     ↓ scored against
//! GameRecord history (tilewatch-record)
//!     ↓ aggregated by
//! rank() → success rate per heuristic
//! ```
//!
//! Every heuristic maps the same inputs (seed string, mine count, tile count,
//! revealed tiles, simulation budget, record history) to one score per tile,
//! higher meaning "more likely safe". None of them can actually foresee a
//! seeded outcome; they are interchangeable stand-ins that the ranking
//! re-weights from observed results.
//!
//! Data-driven heuristics and the ranking itself only become meaningful after
//! [`ACTIVATION_THRESHOLD`] records have been collected.
//!
//! # Example
//!
//! ```
//! use tilewatch_heuristic::{HeuristicRegistry, ranking};
//!
//! let registry = HeuristicRegistry::builtin();
//! assert!(registry.lookup("Minimax").is_some());
//!
//! // nothing collected yet: only data-independent heuristics are usable
//! assert_eq!(registry.list_activatable(0).len(), 4);
//! assert!(ranking::rank(&registry, &[]).is_empty());
//! ```

pub use self::{
    heuristic::{BoxedHeuristic, Heuristic, ScoringInput, all_heuristics},
    registry::{HeuristicRegistry, RegistryError},
};

pub mod heuristic;
pub mod ranking;
pub mod registry;

/// Minimum number of collected records before data-driven heuristics may be
/// used and before rankings are reported.
pub const ACTIVATION_THRESHOLD: usize = 50;
