//! # Duration Parsing
//!
//! Parses interval settings such as `500ms`, `1.5s` or `1m30s`.
//!
//! The grammar is a sequence of `<decimal><unit>` groups with an optional
//! leading sign. Units are `ns`, `us` (also `µs`/`μs`), `ms`, `s`, `m` and
//! `h`. A bare `0` is accepted. Fractions are truncated to whole
//! nanoseconds.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use trading_engine::config::parse_duration;
//!
//! assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
//! assert_eq!(parse_duration("2.5ms").unwrap(), Duration::from_micros(2500));
//! assert!(parse_duration("500").is_err());
//! ```

use std::time::Duration;
use thiserror::Error;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Largest accepted duration, `i64::MAX` nanoseconds (about 2562047h).
const MAX_NANOS: u128 = i64::MAX as u128;

// Longest unit first so "ms" is not read as "m".
const UNITS: &[(&str, u128)] = &[
    ("ns", 1),
    ("us", NANOS_PER_MICRO),
    ("µs", NANOS_PER_MICRO),
    ("μs", NANOS_PER_MICRO),
    ("ms", NANOS_PER_MILLI),
    ("s", NANOS_PER_SEC),
    ("m", 60 * NANOS_PER_SEC),
    ("h", 3_600 * NANOS_PER_SEC),
];

/// Error returned when a duration string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    /// Input was empty.
    #[error("empty duration")]
    Empty,

    /// Input was negative.
    #[error("negative duration: {0:?}")]
    Negative(String),

    /// A number had no unit after it.
    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    /// A unit was not recognised.
    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit {
        /// The unrecognised unit text.
        unit: String,
        /// The full input.
        input: String,
    },

    /// A number was malformed.
    #[error("invalid number in duration {0:?}")]
    InvalidNumber(String),

    /// Value exceeds `i64::MAX` nanoseconds.
    #[error("duration out of range: {0:?}")]
    Overflow(String),
}

/// Parses a duration string.
///
/// # Errors
///
/// Returns `DurationParseError` describing the first problem found.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    if input.is_empty() {
        return Err(DurationParseError::Empty);
    }
    let (negative, mut rest) = if let Some(rest) = input.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = input.strip_prefix('+') {
        (false, rest)
    } else {
        (false, input)
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(DurationParseError::InvalidNumber(input.to_string()));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_part, after_int) = rest.split_at(int_len);
        let (frac_part, after_num) = match after_int.strip_prefix('.') {
            Some(after_dot) => {
                let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
                after_dot.split_at(frac_len)
            }
            None => ("", after_int),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(DurationParseError::InvalidNumber(input.to_string()));
        }

        let unit_len = after_num
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() || *c == '.')
            .map_or(after_num.len(), |(i, _)| i);
        let (unit, after_unit) = after_num.split_at(unit_len);
        if unit.is_empty() {
            return Err(DurationParseError::MissingUnit(input.to_string()));
        }
        let scale = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| DurationParseError::UnknownUnit {
                unit: unit.to_string(),
                input: input.to_string(),
            })?;

        let overflow = || DurationParseError::Overflow(input.to_string());
        let whole = if int_part.is_empty() {
            0
        } else {
            int_part.parse::<u128>().map_err(|_| overflow())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(overflow)?;
        nanos = nanos
            .checked_add(fraction_nanos(frac_part, scale))
            .ok_or_else(overflow)?;
        total = total
            .checked_add(nanos)
            .filter(|t| *t <= MAX_NANOS)
            .ok_or_else(overflow)?;
        rest = after_unit;
    }

    if negative && total > 0 {
        return Err(DurationParseError::Negative(input.to_string()));
    }

    let secs = u64::try_from(total / NANOS_PER_SEC)
        .map_err(|_| DurationParseError::Overflow(input.to_string()))?;
    // Remainder is always below one second.
    let sub_nanos = (total % NANOS_PER_SEC) as u32;
    Ok(Duration::new(secs, sub_nanos))
}

/// Converts fractional digits of `scale`-sized units to whole nanoseconds.
fn fraction_nanos(digits: &str, scale: u128) -> u128 {
    // Digits beyond this cannot change the nanosecond result for any unit.
    let digits = digits.get(..digits.len().min(20)).unwrap_or(digits);
    let mut numerator: u128 = 0;
    let mut denominator: u128 = 1;
    for b in digits.bytes() {
        numerator = numerator * 10 + u128::from(b - b'0');
        denominator *= 10;
    }
    numerator * scale / denominator
}
