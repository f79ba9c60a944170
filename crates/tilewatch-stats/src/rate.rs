use serde::{Deserialize, Serialize};

/// Counts favorable outcomes out of all observed outcomes.
///
/// # Example
///
/// ```
/// use tilewatch_stats::rate::SuccessCounter;
///
/// let mut counter = SuccessCounter::default();
/// assert_eq!(counter.rate(), 0.0);
///
/// counter.record(true);
/// counter.record(true);
/// counter.record(false);
/// assert_eq!(counter.successes(), 2);
/// assert_eq!(counter.total(), 3);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessCounter {
    successes: usize,
    total: usize,
}

impl SuccessCounter {
    pub fn record(&mut self, success: bool) {
        self.total += 1;
        if success {
            self.successes += 1;
        }
    }

    #[must_use]
    pub const fn successes(&self) -> usize {
        self.successes
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Returns `successes / total`, or `0.0` when nothing was observed.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successes as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_of_empty_counter_is_zero() {
        assert_eq!(SuccessCounter::default().rate(), 0.0);
    }

    #[test]
    fn test_rate_matches_ratio() {
        let mut counter = SuccessCounter::default();
        for i in 0..10 {
            counter.record(i % 4 == 0);
        }
        assert_eq!(counter.successes(), 3);
        assert_eq!(counter.total(), 10);
        assert!((counter.rate() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_serializes_as_plain_counts() {
        let mut counter = SuccessCounter::default();
        counter.record(true);
        let json = serde_json::to_string(&counter).unwrap();
        assert_eq!(json, r#"{"successes":1,"total":1}"#);
    }
}
