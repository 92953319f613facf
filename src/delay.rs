//! Take-off delay computation on a 24-hour clock.
//!
//! Times carry no date, so a flight scheduled at 23:45 that leaves at 00:45
//! is one hour late rather than 23 hours early. The difference is always
//! resolved to the shorter way around the clock.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Serialize, Serializer};

use crate::error::ParseError;

pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Largest magnitude a delay can have. A difference of exactly half a day is
/// kept as computed; only larger magnitudes wrap.
pub const HALF_DAY: i32 = MINUTES_PER_DAY / 2;

/// A wall-clock time with minute precision and no date component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Builds a time from its components, `None` when out of range.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Minutes elapsed since midnight, in `0..1440`.
    pub fn minutes_since_midnight(&self) -> i32 {
        // at most 23 * 60 + 59, always fits
        (self.hour() * 60 + self.minute()) as i32
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseError;

    /// Accepts `H:MM` and `HH:MM`, e.g. `0:05` or `23:45`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(Self)
            .map_err(|_| ParseError::InvalidTime {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Signed delay in minutes of `actual` relative to `expected`.
///
/// Positive values are late departures, negative values early ones.
pub fn delay(expected: TimeOfDay, actual: TimeOfDay) -> i32 {
    let raw = actual.minutes_since_midnight() - expected.minutes_since_midnight();

    if raw > HALF_DAY {
        raw - MINUTES_PER_DAY
    } else if raw < -HALF_DAY {
        raw + MINUTES_PER_DAY
    } else {
        raw
    }
}

/// Parses both times and returns [`delay`] between them.
///
/// # Errors
///
/// Returns [`ParseError::InvalidTime`] for the first string that is not a
/// valid time of day.
pub fn delay_between(expected: &str, actual: &str) -> Result<i32, ParseError> {
    Ok(delay(expected.parse()?, actual.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hm(hour: u32, minute: u32) -> TimeOfDay {
        TimeOfDay::from_hm(hour, minute).unwrap()
    }

    #[test]
    fn test_delay_late_and_early() {
        assert_eq!(delay_between("12:10", "12:45").unwrap(), 35);
        assert_eq!(delay_between("12:10", "11:45").unwrap(), -25);
        assert_eq!(delay_between("08:05", "08:05").unwrap(), 0);
    }

    #[test]
    fn test_delay_across_midnight() {
        assert_eq!(delay_between("23:45", "00:45").unwrap(), 60);
        assert_eq!(delay_between("00:10", "23:50").unwrap(), -20);
    }

    #[test]
    fn test_half_day_is_not_wrapped() {
        assert_eq!(delay(hm(0, 0), hm(12, 0)), 720);
        assert_eq!(delay(hm(12, 0), hm(0, 0)), -720);
        assert_eq!(delay(hm(0, 0), hm(12, 1)), -719);
    }

    #[test]
    fn test_single_digit_hour() {
        let time: TimeOfDay = "0:05".parse().unwrap();
        assert_eq!(time, hm(0, 5));
        assert_eq!(delay_between("0:05", "0:41").unwrap(), 36);
        assert_eq!(delay_between("08:20", "8:25").unwrap(), 5);
    }

    #[test]
    fn test_components() {
        let time: TimeOfDay = "23:45".parse().unwrap();
        assert_eq!((time.hour(), time.minute()), (23, 45));
        assert_eq!(time.minutes_since_midnight(), 1425);
        assert_eq!(hm(0, 0).minutes_since_midnight(), 0);
    }

    #[test]
    fn test_invalid_time() {
        assert_eq!(
            delay_between("25:00", "12:00"),
            Err(ParseError::InvalidTime {
                value: "25:00".to_string()
            })
        );
        assert!(delay_between("12:00", "noon").is_err());
        assert!("".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn test_display_pads() {
        assert_eq!(hm(0, 5).to_string(), "00:05");
        assert_eq!(serde_json::to_string(&hm(9, 30)).unwrap(), "\"09:30\"");
    }

    fn arb_time() -> impl Strategy<Value = TimeOfDay> {
        (0u32..24, 0u32..60).prop_map(|(hour, minute)| hm(hour, minute))
    }

    proptest! {
        #[test]
        fn test_delay_is_antisymmetric(a in arb_time(), b in arb_time()) {
            prop_assert_eq!(delay(a, b), -delay(b, a));
        }

        #[test]
        fn test_delay_is_shortest_path(a in arb_time(), b in arb_time()) {
            let d = delay(a, b);
            prop_assert!(d.abs() <= HALF_DAY);
            prop_assert_eq!(
                (a.minutes_since_midnight() + d).rem_euclid(MINUTES_PER_DAY),
                b.minutes_since_midnight()
            );
        }
    }
}
