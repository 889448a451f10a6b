//! Contains utilities and helper functions that aid in Packet processing.
use chrono::Local;

use super::containers::Timestamp;

/// Source of packet timestamps.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Local wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Local::now()
    }
}

/// `HH:MM:SS[mmmm]` rendering of a timestamp, local time with milliseconds.
pub fn log_time(tick: &Timestamp) -> String {
    format!("{}[{:04}]", tick.format("%H:%M:%S"), tick.timestamp_subsec_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn log_time_has_millisecond_suffix() {
        let tick = Local.with_ymd_and_hms(2024, 3, 1, 13, 5, 9).unwrap()
            + chrono::Duration::milliseconds(42);
        assert_eq!(log_time(&tick), "13:05:09[0042]");
    }
}
