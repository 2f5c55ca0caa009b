use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseTimeError;

const NANOS_PER_SEC: u64 = 1_000_000_000;
const FRACTION_DIGITS: usize = 9;

/// A receive time split into whole seconds and nanoseconds.
///
/// `nsec` is always below one second, so the derived ordering
/// (seconds first, then nanoseconds) is chronological.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Time {
    pub sec: u64,
    pub nsec: u32,
}

impl Time {
    pub const MIN: Self = Self { sec: 0, nsec: 0 };
    pub const MAX: Self = Self {
        sec: u64::MAX,
        nsec: 999_999_999,
    };

    /// Split a nanosecond timestamp, as carried by Message records.
    #[must_use]
    pub fn from_nanos(nanos: u64) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let nsec = (nanos % NANOS_PER_SEC) as u32;
        Self {
            sec: nanos / NANOS_PER_SEC,
            nsec,
        }
    }

    /// Total nanoseconds. Wider than the wire timestamp because parsed
    /// times may exceed it.
    #[must_use]
    pub fn as_nanos(self) -> u128 {
        u128::from(self.sec) * u128::from(NANOS_PER_SEC) + u128::from(self.nsec)
    }
}

impl FromStr for Time {
    type Err = ParseTimeError;

    /// Parse `<sec>[.<fraction>]` exactly, without going through a float.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let err = || ParseTimeError {
            input: input.to_string(),
        };
        let (whole, fraction) = input.split_once('.').unwrap_or((input, ""));

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let sec = whole.parse::<u64>().map_err(|_| err())?;

        if fraction.len() > FRACTION_DIGITS || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        if input.ends_with('.') {
            return Err(err());
        }
        let nsec = format!("{fraction:0<width$}", width = FRACTION_DIGITS)
            .parse::<u32>()
            .map_err(|_| err())?;

        Ok(Self { sec, nsec })
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.sec, self.nsec)
    }
}

/// Inclusive time range a retrieval keeps messages from.
///
/// A window whose `start` is after its `end` is valid and admits
/// nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestWindow {
    pub start: Time,
    pub end: Time,
}

impl RequestWindow {
    #[must_use]
    pub fn new(start: Time, end: Time) -> Self {
        Self { start, end }
    }

    /// The window that admits every representable time.
    #[must_use]
    pub fn all() -> Self {
        Self::new(Time::MIN, Time::MAX)
    }

    #[must_use]
    pub fn contains(&self, time: Time) -> bool {
        self.start <= time && time <= self.end
    }
}

impl Default for RequestWindow {
    fn default() -> Self {
        Self::all()
    }
}
