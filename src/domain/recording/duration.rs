//! Duration value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default one-shot recording length (10 seconds)
pub const DEFAULT_DURATION_SECS: u64 = 10;

/// Default extended-execution budget granted while backgrounded (30 seconds)
pub const DEFAULT_BACKGROUND_BUDGET_SECS: u64 = 30;

/// Value object representing a configured time span (recording length,
/// background execution budget). Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    /// Create a Duration from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    /// Create a Duration from seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs * 1000,
        }
    }

    /// Default one-shot recording length
    pub const fn default_duration() -> Self {
        Self::from_secs(DEFAULT_DURATION_SECS)
    }

    /// Default background execution budget
    pub const fn default_background_budget() -> Self {
        Self::from_secs(DEFAULT_BACKGROUND_BUDGET_SECS)
    }

    /// Get duration in seconds
    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    /// Get duration in milliseconds
    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    /// Convert to std::time::Duration
    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }
}

/// Unit suffixes, longest match first, with their length in milliseconds
const UNITS: [(&str, u64); 4] = [("ms", 1), ("h", 3_600_000), ("m", 60_000), ("s", 1000)];

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Parses `<number><unit>` segments with units h, m, s and ms in
    /// descending order, e.g. "30s", "2m30s", "1h", "1s500ms".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DurationParseError {
            input: s.to_string(),
        };
        let input = s.trim().to_lowercase();
        let mut rest = input.as_str();
        let mut total: u64 = 0;
        let mut previous_scale = u64::MAX;

        while !rest.is_empty() {
            let digits = rest
                .find(|c: char| !c.is_ascii_digit())
                .filter(|&end| end > 0)
                .ok_or_else(invalid)?;
            let value: u64 = rest[..digits].parse().map_err(|_| invalid())?;
            rest = &rest[digits..];

            let (suffix, scale) = UNITS
                .iter()
                .find(|(suffix, _)| rest.starts_with(suffix))
                .ok_or_else(invalid)?;
            if *scale >= previous_scale {
                return Err(invalid());
            }
            previous_scale = *scale;
            rest = &rest[suffix.len()..];

            total = value
                .checked_mul(*scale)
                .and_then(|ms| total.checked_add(ms))
                .ok_or_else(invalid)?;
        }

        if total == 0 {
            return Err(invalid());
        }
        Ok(Self::from_millis(total))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.milliseconds == 0 {
            return write!(f, "0s");
        }
        let mut rest = self.milliseconds;
        for (suffix, scale) in [("h", 3_600_000), ("m", 60_000), ("s", 1000), ("ms", 1)] {
            let count = rest / scale;
            if count > 0 {
                write!(f, "{}{}", count, suffix)?;
            }
            rest %= scale;
        }
        Ok(())
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::default_duration()
    }
}
