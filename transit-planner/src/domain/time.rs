//! Service-day time handling.
//!
//! GTFS expresses times as "HH:MM:SS" relative to the midnight that starts
//! the service day. Trips running after midnight keep counting, so values
//! such as "25:10:00" are legal. This module stores those times as whole
//! seconds and keeps the arithmetic the graph needs in one place.

use chrono::Duration;
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::Sub;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time {input:?}: {reason}")]
pub struct TimeError {
    input: String,
    reason: &'static str,
}

impl TimeError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// Seconds in one calendar day.
pub const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Latest hour accepted when parsing. Feeds rarely go past 30:00:00, but
/// two full days leaves room for overnight services on long routes.
const MAX_HOUR: u32 = 47;

/// A time of the service day, in seconds since its midnight.
///
/// # Examples
///
/// ```
/// use transit_planner::domain::ServiceTime;
///
/// let t = ServiceTime::parse("08:05:30").unwrap();
/// assert_eq!(t.as_secs(), 8 * 3600 + 5 * 60 + 30);
/// assert_eq!(t.to_string(), "08:05:30");
///
/// // Services past midnight keep counting hours
/// let late = ServiceTime::parse("25:10:00").unwrap();
/// assert_eq!(late.to_string(), "25:10:00");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ServiceTime(u32);

impl ServiceTime {
    /// Midnight at the start of the service day.
    pub const MIDNIGHT: ServiceTime = ServiceTime(0);

    /// Create a time from seconds since the start of the service day.
    pub const fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    /// Create a time from hour, minute and second components.
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Option<Self> {
        if hour > MAX_HOUR || minute > 59 || second > 59 {
            return None;
        }
        Some(Self(hour * 3600 + minute * 60 + second))
    }

    /// Parse "H:MM:SS" or "HH:MM:SS".
    ///
    /// Leading and trailing whitespace is ignored, since some feeds pad
    /// the column.
    ///
    /// ```
    /// use transit_planner::domain::ServiceTime;
    ///
    /// assert!(ServiceTime::parse("7:45:00").is_ok());
    /// assert!(ServiceTime::parse(" 07:45:00").is_ok());
    /// assert!(ServiceTime::parse("07:45").is_err());
    /// assert!(ServiceTime::parse("07:60:00").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let trimmed = s.trim();
        let mut parts = trimmed.split(':');

        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TimeError::new(s, "expected H:MM:SS format"));
        };

        if h.is_empty() || h.len() > 2 {
            return Err(TimeError::new(s, "hour must have one or two digits"));
        }
        let hour = parse_digits(h).ok_or_else(|| TimeError::new(s, "invalid hour digits"))?;
        if hour > MAX_HOUR {
            return Err(TimeError::new(s, "hour out of range"));
        }

        if m.len() != 2 || sec.len() != 2 {
            return Err(TimeError::new(s, "minutes and seconds need two digits"));
        }
        let minute = parse_digits(m).ok_or_else(|| TimeError::new(s, "invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new(s, "minute must be 0-59"));
        }
        let second = parse_digits(sec).ok_or_else(|| TimeError::new(s, "invalid second digits"))?;
        if second > 59 {
            return Err(TimeError::new(s, "second must be 0-59"));
        }

        Ok(Self(hour * 3600 + minute * 60 + second))
    }

    /// Seconds since the start of the service day.
    pub fn as_secs(&self) -> u32 {
        self.0
    }

    pub fn hour(&self) -> u32 {
        self.0 / 3600
    }

    pub fn minute(&self) -> u32 {
        (self.0 % 3600) / 60
    }

    pub fn second(&self) -> u32 {
        self.0 % 60
    }

    /// Add a number of seconds, returning `None` on overflow.
    pub fn checked_add_secs(&self, secs: u32) -> Option<Self> {
        self.0.checked_add(secs).map(Self)
    }

    /// Add a number of seconds, clamping at the largest representable time.
    pub fn saturating_add_secs(&self, secs: u32) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// Signed number of seconds from `earlier` to `self`.
    ///
    /// Negative when `earlier` is actually later.
    pub fn secs_since(&self, earlier: ServiceTime) -> i64 {
        i64::from(self.0) - i64::from(earlier.0)
    }

    /// Returns the duration between two times as a chrono `Duration`.
    pub fn signed_duration_since(&self, earlier: ServiceTime) -> Duration {
        Duration::seconds(self.secs_since(earlier))
    }
}

impl Sub for ServiceTime {
    type Output = i64;

    fn sub(self, rhs: Self) -> Self::Output {
        self.secs_since(rhs)
    }
}

impl fmt::Debug for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceTime({self})")
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

impl Serialize for ServiceTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Format a number of seconds as "H hours, M minutes, S seconds".
pub fn describe_duration(total_secs: u32) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours} hours, {minutes} minutes, {seconds} seconds")
}

/// Parse a run of ASCII digits into a u32.
fn parse_digits(s: &str) -> Option<u32> {
    s.chars().try_fold(0u32, |acc, c| {
        let d = c.to_digit(10)?;
        acc.checked_mul(10)?.checked_add(d)
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn display_then_parse_is_identity(secs in 0u32..(MAX_HOUR + 1) * 3600) {
            let t = ServiceTime::from_secs(secs);
            prop_assert_eq!(ServiceTime::parse(&t.to_string()).unwrap(), t);
        }

        #[test]
        fn ordering_matches_seconds(a in 0u32..200_000, b in 0u32..200_000) {
            let ta = ServiceTime::from_secs(a);
            let tb = ServiceTime::from_secs(b);
            prop_assert_eq!(ta.cmp(&tb), a.cmp(&b));
            prop_assert_eq!(ta - tb, i64::from(a) - i64::from(b));
        }
    }
}
