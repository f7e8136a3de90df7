// src/core/expiry.rs

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::core::timestamp::text_to_epoch;

/// Seconds in one license day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Outcome of comparing a decoded timestamp against the current time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpiryVerdict {
    /// Days between the issue time and now, or `None` if either could not be
    /// mapped to an instant.
    pub elapsed_days: Option<f64>,
    /// Whether the license is expired.
    pub expired: bool,
}

/// Decides expiry from a decoded timestamp and a license duration.
///
/// A license is expired when more than `duration_days` have elapsed since its
/// timestamp, or when the timestamp lies in the future. Timestamps that cannot
/// be interpreted count as expired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpiryEvaluator {
    duration_days: f64,
}

impl ExpiryEvaluator {
    /// An evaluator for licenses lasting `duration_days`.
    pub fn new(duration_days: f64) -> Self {
        Self { duration_days }
    }

    /// License duration in days.
    pub fn duration_days(&self) -> f64 {
        self.duration_days
    }

    /// Elapsed days since `decoded` at `now`, and whether that exceeds the duration.
    pub fn evaluate(&self, decoded: &str, now: &DateTime<Local>) -> ExpiryVerdict {
        if decoded.is_empty() {
            return ExpiryVerdict {
                elapsed_days: None,
                expired: true,
            };
        }
        let Some(start) = text_to_epoch(decoded) else {
            log::warn!("Could not interpret license timestamp {:?}", decoded);
            return ExpiryVerdict {
                elapsed_days: None,
                expired: true,
            };
        };

        let elapsed_days = (now.timestamp() - start) as f64 / SECONDS_PER_DAY;
        log::info!(
            "License duration: {} days, elapsed: {} days",
            self.duration_days,
            elapsed_days
        );
        ExpiryVerdict {
            elapsed_days: Some(elapsed_days),
            expired: elapsed_days > self.duration_days || elapsed_days < 0.0,
        }
    }

    /// Shorthand for `evaluate(..).expired`.
    pub fn is_expired(&self, decoded: &str, now: &DateTime<Local>) -> bool {
        self.evaluate(decoded, now).expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).earliest().unwrap()
    }

    const START_TEXT: &str = "2026-01-01T00:00:00Z";

    #[test]
    fn test_within_duration() {
        let evaluator = ExpiryEvaluator::new(0.1);
        let now = start() + Duration::seconds(8_000);
        let verdict = evaluator.evaluate(START_TEXT, &now);
        assert!(!verdict.expired);
        let elapsed = verdict.elapsed_days.unwrap();
        assert!((elapsed - 8_000.0 / 86_400.0).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_is_not_expired() {
        let evaluator = ExpiryEvaluator::new(0.1);
        let now = start() + Duration::seconds(8_640);
        assert!(!evaluator.is_expired(START_TEXT, &now));
        let now = start() + Duration::seconds(8_641);
        assert!(evaluator.is_expired(START_TEXT, &now));
    }

    #[test]
    fn test_future_start_is_expired() {
        let evaluator = ExpiryEvaluator::new(30.0);
        let now = start() - Duration::seconds(1);
        let verdict = evaluator.evaluate(START_TEXT, &now);
        assert!(verdict.expired);
        assert!(verdict.elapsed_days.unwrap() < 0.0);
    }

    #[test]
    fn test_zero_duration() {
        let evaluator = ExpiryEvaluator::new(0.0);
        assert!(!evaluator.is_expired(START_TEXT, &start()));
        assert!(evaluator.is_expired(START_TEXT, &(start() + Duration::seconds(1))));
    }

    #[test]
    fn test_uninterpretable_timestamp_is_expired() {
        let evaluator = ExpiryEvaluator::new(1e9);
        let verdict = evaluator.evaluate("99999999999999999999", &start());
        assert_eq!(
            verdict,
            ExpiryVerdict {
                elapsed_days: None,
                expired: true
            }
        );
    }

    #[test]
    fn test_empty_text_is_expired() {
        let evaluator = ExpiryEvaluator::new(1e9);
        let verdict = evaluator.evaluate("", &start());
        assert!(verdict.expired);
        assert_eq!(verdict.elapsed_days, None);
    }
}
