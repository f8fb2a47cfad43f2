//! Duration value object and elapsed-time formatting

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default safety limit for a single recording (5 minutes)
pub const DEFAULT_MAX_DURATION_SECS: u64 = 300;

/// Longest limit that can be configured
pub const MAX_DURATION_SECS: u64 = 3600;

/// Recording length limit, millisecond resolution
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

    /// Default max recording duration (5 minutes)
    pub const fn default_max_duration() -> Self {
        Self::from_secs(DEFAULT_MAX_DURATION_SECS)
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

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Parse `<n>h`, `<n>m`, `<n>s` segments in that order, e.g. `1m30s`.
    /// A bare number is rejected so units are never guessed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason| DurationParseError {
            input: s.to_string(),
            reason,
        };
        let input = s.trim().to_ascii_lowercase();
        if input.is_empty() {
            return Err(fail("is empty"));
        }

        let mut rest = input.as_str();
        let mut total_secs: u64 = 0;
        // Units must appear largest first, each at most once
        let mut allowed: &[(char, u64)] = &[('h', 3600), ('m', 60), ('s', 1)];

        while !rest.is_empty() {
            let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            if digits == 0 {
                return Err(fail("must start with a number"));
            }
            let Some(unit) = rest[digits..].chars().next() else {
                return Err(fail("is missing a unit"));
            };
            let Some(pos) = allowed.iter().position(|&(u, _)| u == unit) else {
                return Err(fail("has an unknown or repeated unit"));
            };

            let value: u64 = rest[..digits].parse().map_err(|_| fail("is too large"))?;
            total_secs = value
                .checked_mul(allowed[pos].1)
                .and_then(|v| total_secs.checked_add(v))
                .ok_or_else(|| fail("is too large"))?;

            allowed = &allowed[pos + 1..];
            rest = &rest[digits + unit.len_utf8()..];
        }

        if total_secs == 0 {
            return Err(fail("must be longer than zero"));
        }
        if total_secs > MAX_DURATION_SECS {
            return Err(fail("exceeds the one hour limit"));
        }

        Ok(Self::from_secs(total_secs))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.as_secs();
        let parts = [(secs / 3600, 'h'), (secs / 60 % 60, 'm'), (secs % 60, 's')];
        if secs == 0 {
            return write!(f, "0s");
        }
        for (value, unit) in parts {
            if value > 0 {
                write!(f, "{}{}", value, unit)?;
            }
        }
        Ok(())
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::default_max_duration()
    }
}

/// Running timer display, zero-padded: `MM:SS`
pub fn format_clock(elapsed_ms: u64) -> String {
    let seconds = elapsed_ms / 1000;
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Compact length display for a finished recording: `M:SS`
pub fn format_length(elapsed_ms: u64) -> String {
    let seconds = elapsed_ms / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
