// src/core/clock.rs

use chrono::{DateTime, Local};
use std::fmt::Debug;

use crate::error::Result;

/// Source of the current local wall-clock time.
pub trait Clock: Send + Sync + Debug {
    /// The current moment in the local time zone.
    fn now(&self) -> Result<DateTime<Local>>;
}

/// Reads the operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<DateTime<Local>> {
        Ok(Local::now())
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Local>,
}

impl FixedClock {
    /// A clock frozen at `instant`.
    pub fn new(instant: DateTime<Local>) -> Self {
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Result<DateTime<Local>> {
        Ok(self.instant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_is_stable() {
        let instant = Local.with_ymd_and_hms(2024, 2, 29, 12, 30, 0).earliest().unwrap();
        let clock = FixedClock::new(instant);
        assert_eq!(clock.now().unwrap(), instant);
        assert_eq!(clock.now().unwrap(), instant);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let first = SystemClock.now().unwrap();
        let second = SystemClock.now().unwrap();
        assert!(second >= first);
    }
}
