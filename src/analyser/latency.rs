//! Streaming reply latency statistics.
use thiserror::Error;

use super::containers::Timestamp;
use super::OUTLIER_THRESHOLD_MS;

#[derive(Error, Debug, PartialEq)]
pub enum ElapsedError {
    #[error("'from' ({from}) is later than 'to' ({to})")]
    NegativeElapsed { from: Timestamp, to: Timestamp },
}

/// Milliseconds between two timestamps, truncated toward zero.
///
/// Computed as whole seconds plus the microsecond difference so that the result
/// matches what a `timeval` based capture of the same bus would report.
pub fn elapsed_ms(from: &Timestamp, to: &Timestamp) -> Result<i64, ElapsedError> {
    if from > to {
        return Err(ElapsedError::NegativeElapsed { from: *from, to: *to });
    }

    let seconds = to.timestamp() - from.timestamp();
    let micros =
        i64::from(to.timestamp_subsec_micros()) - i64::from(from.timestamp_subsec_micros());
    Ok(seconds * 1000 + micros / 1000)
}

#[derive(Debug, PartialEq, Eq)]
pub enum Observation {
    Accepted,
    Outlier,
}

/// Running mean of latency samples below [OUTLIER_THRESHOLD_MS].
#[derive(Clone, Debug, Default)]
pub struct LatencyAccumulator {
    sum: i64,
    count: u64,
    rejected: u64,
}

impl LatencyAccumulator {
    pub fn observe(&mut self, elapsed_ms: i64) -> Observation {
        if elapsed_ms < OUTLIER_THRESHOLD_MS {
            self.sum += elapsed_ms;
            self.count += 1;
            Observation::Accepted
        } else {
            self.rejected += 1;
            Observation::Outlier
        }
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Samples at or above the threshold, kept out of the mean.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, Local, TimeZone};

    fn at(micros: i64) -> Timestamp {
        Local.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::microseconds(micros)
    }

    #[test]
    fn mean_of_accepted_samples() {
        let mut acc = LatencyAccumulator::default();
        for sample in [50, 60, 40] {
            assert_eq!(acc.observe(sample), Observation::Accepted);
        }
        assert_eq!(acc.count(), 3);
        assert_relative_eq!(acc.mean(), 50.0);
    }

    #[test]
    fn outlier_is_rejected() {
        let mut acc = LatencyAccumulator::default();
        acc.observe(20);

        assert_eq!(acc.observe(1500), Observation::Outlier);
        assert_eq!(acc.observe(OUTLIER_THRESHOLD_MS), Observation::Outlier);
        assert_eq!(acc.count(), 1);
        assert_eq!(acc.rejected(), 2);
        assert_relative_eq!(acc.mean(), 20.0);
    }

    #[test]
    fn empty_mean_is_zero() {
        assert_relative_eq!(LatencyAccumulator::default().mean(), 0.0);
    }

    #[test]
    fn elapsed_forward() {
        assert_eq!(elapsed_ms(&at(0), &at(37_000)), Ok(37));
        assert_eq!(elapsed_ms(&at(0), &at(0)), Ok(0));
    }

    #[test]
    fn elapsed_truncates_toward_zero() {
        assert_eq!(elapsed_ms(&at(0), &at(37_999)), Ok(37));
        // the sub-second part is truncated on its own: 1000 + (-999)
        assert_eq!(elapsed_ms(&at(999_500), &at(1_000_000)), Ok(1));
        assert_eq!(elapsed_ms(&at(900_000), &at(1_150_000)), Ok(250));
    }

    #[test]
    fn elapsed_backwards_is_an_error() {
        let result = elapsed_ms(&at(10_000), &at(0));
        assert!(matches!(result, Err(ElapsedError::NegativeElapsed { .. })));
    }
}
