//! Small statistical helpers shared by the tilewatch crates.
//!
//! - [`descriptive`]: summary statistics over score vectors (mean, population
//!   standard deviation, median, range). Verdict labeling uses these to decide
//!   how many extra low-score tiles are confident enough to mark as bombs.
//! - [`rate`]: success/total counters that the ranking engine aggregates per
//!   heuristic.
//!
//! # Examples
//!
//! ```
//! use tilewatch_stats::{descriptive::DescriptiveStats, rate::SuccessCounter};
//!
//! let stats = DescriptiveStats::new([1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
//! assert_eq!(stats.mean, 3.0);
//!
//! let mut counter = SuccessCounter::default();
//! counter.record(true);
//! counter.record(false);
//! assert_eq!(counter.rate(), 0.5);
//! ```

pub mod descriptive;
pub mod rate;
