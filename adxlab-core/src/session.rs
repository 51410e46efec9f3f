//! Session clock gate and the daily re-arm boundary.
//!
//! Times are taken from whatever clock the caller supplies; no timezone
//! conversion happens here.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Parse an "HH:MM" time of day. Seconds are always zero.
pub fn parse_time_of_day(field: &'static str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| ConfigError::InvalidTime {
        field,
        value: value.to_string(),
    })
}

/// Returns true iff `now` lies within `[start, end]` on `now`'s own date.
///
/// A window whose start is after its end never matches: the bounds are built
/// on the same calendar day, so there is no wrap past midnight.
pub fn is_trading_time(now: NaiveDateTime, start: NaiveTime, end: NaiveTime) -> bool {
    let date = now.date();
    let start_bound = date.and_time(start);
    let end_bound = date.and_time(end);
    start_bound <= now && now <= end_bound
}

/// Validated trading window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl SessionWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Build a window from "HH:MM" strings, failing on malformed input.
    pub fn parse(start: &str, end: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            start: parse_time_of_day("session.start", start)?,
            end: parse_time_of_day("session.end", end)?,
        })
    }

    pub fn contains(&self, now: NaiveDateTime) -> bool {
        is_trading_time(now, self.start, self.end)
    }
}

/// Daily boundary at which a tripped risk latch is cleared.
///
/// Due while the clock hour is below `before_hour`. With the default of 1 the
/// boundary is the first hour of the trading day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRearm {
    pub before_hour: u32,
}

impl DailyRearm {
    pub fn new(before_hour: u32) -> Self {
        Self { before_hour }
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        now.hour() < self.before_hour
    }
}

impl Default for DailyRearm {
    fn default() -> Self {
        Self { before_hour: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn window() -> SessionWindow {
        SessionWindow::parse("13:30", "15:30").unwrap()
    }

    #[test]
    fn inside_window() {
        assert!(window().contains(at(14, 0, 0)));
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(window().contains(at(13, 30, 0)));
        assert!(window().contains(at(15, 30, 0)));
    }

    #[test]
    fn seconds_past_end_are_outside() {
        assert!(!window().contains(at(15, 30, 1)));
        assert!(!window().contains(at(13, 29, 59)));
    }

    #[test]
    fn inverted_window_never_matches() {
        let w = SessionWindow::parse("22:00", "02:00").unwrap();
        assert!(!w.contains(at(23, 0, 0)));
        assert!(!w.contains(at(1, 0, 0)));
    }

    #[test]
    fn malformed_time_is_config_error() {
        for bad in ["1330", "25:00", "13:61", "ab:cd", ""] {
            let err = SessionWindow::parse(bad, "15:30").unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidTime { field: "session.start", .. }),
                "expected InvalidTime for {bad:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let w = SessionWindow::parse(" 13:30 ", "15:30").unwrap();
        assert_eq!(w.start, NaiveTime::from_hms_opt(13, 30, 0).unwrap());
    }

    #[test]
    fn rearm_due_in_first_hour() {
        let rearm = DailyRearm::default();
        assert!(rearm.is_due(at(0, 0, 0)));
        assert!(rearm.is_due(at(0, 59, 59)));
        assert!(!rearm.is_due(at(1, 0, 0)));
    }

    #[test]
    fn rearm_zero_is_never_due() {
        let rearm = DailyRearm::new(0);
        assert!(!rearm.is_due(at(0, 0, 0)));
    }
}
