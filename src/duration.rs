//! Conversion of `HH:MM:SS` run times into the batch's duration representation.
//!
//! A batch picks one [`DurationMode`] up front. Every child duration is
//! converted with it, and a parent's total is the sum of its children's
//! converted values starting from [`DurationMode::identity`].
//!
//! # Examples
//!
//! ```
//! use foxmlgen::duration::DurationMode;
//!
//! let minutes = DurationMode::Minutes.convert("01:30:15")?.unwrap();
//! assert_eq!(minutes.to_string(), "90.25");
//!
//! let clock = DurationMode::Structured.convert("01:30:15")?.unwrap();
//! assert_eq!(clock.to_string(), "1:30:15");
//! # Ok::<(), foxmlgen::FoxmlError>(())
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{FoxmlError, Result};

/// Representation used for every duration in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum DurationMode {
    /// Decimal minutes rounded to two places (`90.25`)
    #[default]
    Minutes,
    /// Hours, minutes and whole seconds kept exactly (`1:30:15`)
    Structured,
}

impl fmt::Display for DurationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minutes => write!(f, "minutes"),
            Self::Structured => write!(f, "structured"),
        }
    }
}

impl FromStr for DurationMode {
    type Err = FoxmlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "m" | "minutes" => Ok(Self::Minutes),
            "i" | "iso" | "structured" | "hh:mm:ss" => Ok(Self::Structured),
            other => Err(FoxmlError::InvalidConfig(format!(
                "unknown duration format {other:?} (expected M for minutes or I for hh:mm:ss)"
            ))),
        }
    }
}

impl TryFrom<String> for DurationMode {
    type Error = FoxmlError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl DurationMode {
    /// Units label written into the parent's extent element.
    #[must_use]
    pub const fn units(&self) -> &'static str {
        match self {
            Self::Minutes => "minutes",
            Self::Structured => "hh:mm:ss",
        }
    }

    /// The additive identity: what a group with no children totals to.
    #[must_use]
    pub const fn identity(&self) -> RunTime {
        match self {
            Self::Minutes => RunTime::Minutes { hundredths: 0 },
            Self::Structured => RunTime::Clock(Duration::ZERO),
        }
    }

    /// Convert a raw `HH:MM:SS` string.
    ///
    /// Returns `Ok(None)` for an empty string, which marks "not applicable".
    /// Fractional seconds are accepted and truncated to whole seconds.
    ///
    /// # Errors
    ///
    /// Returns [`FoxmlError::MalformedDuration`] when the text does not have
    /// exactly three `:`-separated numeric components, or when the value is
    /// too large to represent.
    pub fn convert(&self, raw: &str) -> Result<Option<RunTime>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let seconds = parse_clock(raw)?;
        let run_time = match self {
            Self::Minutes => {
                // rest / 60 minutes, rounded to hundredths
                let fraction = (seconds % 60 * 100 + 30) / 60;
                let hundredths = (seconds / 60)
                    .checked_mul(100)
                    .and_then(|h| h.checked_add(fraction))
                    .ok_or_else(|| FoxmlError::MalformedDuration {
                        value: raw.to_string(),
                        reason: "duration is out of range".to_string(),
                    })?;
                RunTime::Minutes { hundredths }
            },
            Self::Structured => RunTime::Clock(Duration::from_secs(seconds)),
        };
        Ok(Some(run_time))
    }
}

fn parse_clock(raw: &str) -> Result<u64> {
    let malformed = |reason: &str| FoxmlError::MalformedDuration {
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(malformed("expected HH:MM:SS"));
    }

    let hours: u64 = parts[0]
        .parse()
        .map_err(|_| malformed("hours are not a whole number"))?;
    let minutes: u64 = parts[1]
        .parse()
        .map_err(|_| malformed("minutes are not a whole number"))?;
    let seconds = parse_seconds(parts[2]).ok_or_else(|| malformed("seconds are not a number"))?;

    hours
        .checked_mul(3600)
        .zip(minutes.checked_mul(60))
        .and_then(|(h, m)| h.checked_add(m))
        .and_then(|total| total.checked_add(seconds))
        .ok_or_else(|| malformed("duration is out of range"))
}

/// Plain decimal seconds; the fraction is truncated.
fn parse_seconds(text: &str) -> Option<u64> {
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !digits(whole) || !digits(fraction) || (whole.is_empty() && fraction.is_empty()) {
        return None;
    }
    if whole.is_empty() {
        Some(0)
    } else {
        whole.parse().ok()
    }
}

/// A converted duration, in the representation of the batch's [`DurationMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTime {
    /// Decimal minutes, stored as whole hundredths of a minute
    Minutes {
        /// Minutes multiplied by 100
        hundredths: u64,
    },
    /// Exact clock duration
    Clock(Duration),
}

impl RunTime {
    /// Decimal minutes, for the minutes representation.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_minutes(&self) -> Option<f64> {
        match self {
            Self::Minutes { hundredths } => Some(*hundredths as f64 / 100.0),
            Self::Clock(_) => None,
        }
    }

    /// The clock duration, for the structured representation.
    #[must_use]
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Clock(duration) => Some(*duration),
            Self::Minutes { .. } => None,
        }
    }

    /// Add two values of the same representation.
    ///
    /// Returns `None` when the representations differ or the sum overflows.
    #[must_use]
    pub fn checked_add(self, other: RunTime) -> Option<RunTime> {
        match (self, other) {
            (Self::Minutes { hundredths: a }, Self::Minutes { hundredths: b }) => {
                a.checked_add(b).map(|hundredths| Self::Minutes { hundredths })
            },
            (Self::Clock(a), Self::Clock(b)) => a.checked_add(b).map(Self::Clock),
            _ => None,
        }
    }
}

impl fmt::Display for RunTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minutes { hundredths } => {
                write!(f, "{}.{:02}", hundredths / 100, hundredths % 100)
            },
            Self::Clock(duration) => {
                let total = duration.as_secs();
                write!(
                    f,
                    "{}:{:02}:{:02}",
                    total / 3600,
                    (total / 60) % 60,
                    total % 60
                )
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_conversion() {
        let run_time = DurationMode::Minutes.convert("01:30:15").unwrap().unwrap();
        assert_eq!(run_time.as_minutes(), Some(90.25));
        assert_eq!(run_time.to_string(), "90.25");
    }

    #[test]
    fn test_minutes_rounded_to_two_places() {
        // 20 seconds is a third of a minute
        let run_time = DurationMode::Minutes.convert("00:00:20").unwrap().unwrap();
        assert_eq!(run_time.to_string(), "0.33");
        let run_time = DurationMode::Minutes.convert("00:00:40").unwrap().unwrap();
        assert_eq!(run_time.to_string(), "0.67");
    }

    #[test]
    fn test_structured_conversion_is_exact() {
        let run_time = DurationMode::Structured
            .convert("01:30:15")
            .unwrap()
            .unwrap();
        assert_eq!(
            run_time.as_duration(),
            Some(Duration::from_secs(3600 + 30 * 60 + 15))
        );
        assert_eq!(run_time.to_string(), "1:30:15");
    }

    #[test]
    fn test_structured_display_does_not_roll_into_days() {
        let run_time = DurationMode::Structured
            .convert("26:00:05")
            .unwrap()
            .unwrap();
        assert_eq!(run_time.to_string(), "26:00:05");
    }

    #[test]
    fn test_empty_input_passes_through() {
        assert_eq!(DurationMode::Minutes.convert("").unwrap(), None);
        assert_eq!(DurationMode::Structured.convert("  ").unwrap(), None);
    }

    #[test]
    fn test_fractional_seconds_truncated() {
        let run_time = DurationMode::Structured
            .convert("00:01:15.8")
            .unwrap()
            .unwrap();
        assert_eq!(run_time.to_string(), "0:01:15");
    }

    #[test]
    fn test_wrong_token_count_rejected() {
        let err = DurationMode::Minutes.convert("01:30").unwrap_err();
        assert!(matches!(err, FoxmlError::MalformedDuration { .. }));
        assert!(DurationMode::Minutes.convert("1:2:3:4").is_err());
    }

    #[test]
    fn test_non_numeric_rejected() {
        assert!(DurationMode::Minutes.convert("aa:30:15").is_err());
        assert!(DurationMode::Structured.convert("01:-3:15").is_err());
        assert!(DurationMode::Structured.convert("01:30:x").is_err());
    }

    #[test]
    fn test_exponent_seconds_rejected() {
        for raw in ["00:00:1e30", "00:00:1E2", "00:00:inf", "00:00:.", "00:00:+5"] {
            assert!(
                matches!(
                    DurationMode::Minutes.convert(raw),
                    Err(FoxmlError::MalformedDuration { .. })
                ),
                "{raw} accepted"
            );
        }
        let run_time = DurationMode::Structured.convert("00:00:.5").unwrap().unwrap();
        assert_eq!(run_time.to_string(), "0:00:00");
    }

    #[test]
    fn test_out_of_range_rejected() {
        let huge = format!("{}:00:00", u64::MAX);
        for mode in [DurationMode::Minutes, DurationMode::Structured] {
            match mode.convert(&huge) {
                Err(FoxmlError::MalformedDuration { value, reason }) => {
                    assert_eq!(value, huge);
                    assert!(reason.contains("out of range"));
                },
                other => panic!("unexpected result: {other:?}"),
            }
        }
        // fits in seconds but not in hundredths of a minute
        let seconds = format!("00:00:{}", u64::MAX);
        assert!(DurationMode::Minutes.convert(&seconds).is_err());
        assert!(DurationMode::Structured.convert(&seconds).is_ok());
    }

    #[test]
    fn test_checked_add_overflow() {
        let big = RunTime::Minutes { hundredths: u64::MAX };
        assert_eq!(big.checked_add(RunTime::Minutes { hundredths: 1 }), None);
        let long = RunTime::Clock(Duration::MAX);
        assert_eq!(long.checked_add(RunTime::Clock(Duration::from_secs(1))), None);
    }

    #[test]
    fn test_identity() {
        assert_eq!(DurationMode::Minutes.identity().to_string(), "0.00");
        assert_eq!(DurationMode::Structured.identity().to_string(), "0:00:00");
    }

    #[test]
    fn test_checked_add_same_representation() {
        let mode = DurationMode::Minutes;
        let total = mode
            .identity()
            .checked_add(mode.convert("00:10:30").unwrap().unwrap())
            .and_then(|t| t.checked_add(mode.convert("00:00:20").unwrap().unwrap()))
            .unwrap();
        assert_eq!(total.to_string(), "10.83");
    }

    #[test]
    fn test_checked_add_mixed_representation() {
        let minutes = DurationMode::Minutes.identity();
        let clock = DurationMode::Structured.identity();
        assert_eq!(minutes.checked_add(clock), None);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("M".parse::<DurationMode>().unwrap(), DurationMode::Minutes);
        assert_eq!("i".parse::<DurationMode>().unwrap(), DurationMode::Structured);
        assert_eq!(
            "structured".parse::<DurationMode>().unwrap(),
            DurationMode::Structured
        );
        assert!(matches!(
            "H".parse::<DurationMode>(),
            Err(FoxmlError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_units_label() {
        assert_eq!(DurationMode::Minutes.units(), "minutes");
        assert_eq!(DurationMode::Structured.units(), "hh:mm:ss");
    }
}
