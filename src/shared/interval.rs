//! Metric interval expressions
//!
//! Metrics store their rollover period as a duration expression such as
//! `"168h"`, `"1h30m"` or `"1.5h"`: an optional sign followed by one or more
//! `<decimal><unit>` components. Supported units are `ns`, `us` (or `µs`),
//! `ms`, `s`, `m` and `h`.

use chrono::TimeDelta;
use thiserror::Error;

/// Reasons an interval expression is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalError {
    #[error("empty interval")]
    Empty,
    #[error("invalid number in interval {0:?}")]
    InvalidNumber(String),
    #[error("missing unit in interval {0:?}")]
    MissingUnit(String),
    #[error("unknown unit {unit:?} in interval {input:?}")]
    UnknownUnit { unit: String, input: String },
    #[error("interval {0:?} is out of range")]
    Overflow(String),
    #[error("interval {0:?} must be positive")]
    NotPositive(String),
}

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SECOND),
        "m" => Some(60 * NANOS_PER_SECOND),
        "h" => Some(3_600 * NANOS_PER_SECOND),
        _ => None,
    }
}

/// Parse a duration expression into a signed [`TimeDelta`].
///
/// Accepts zero and negative values; use [`parse_interval`] for rollover
/// periods.
pub fn parse_duration(input: &str) -> Result<TimeDelta, IntervalError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IntervalError::Empty);
    }

    let (negative, mut rest) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    if rest == "0" {
        return Ok(TimeDelta::zero());
    }
    if rest.is_empty() {
        return Err(IntervalError::InvalidNumber(input.to_string()));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let integer_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (integer, after_integer) = rest.split_at(integer_len);

        let (fraction, after_number) = match after_integer.strip_prefix('.') {
            Some(tail) => {
                let fraction_len = tail.bytes().take_while(u8::is_ascii_digit).count();
                tail.split_at(fraction_len)
            }
            None => ("", after_integer),
        };

        if integer.is_empty() && fraction.is_empty() {
            return Err(IntervalError::InvalidNumber(input.to_string()));
        }

        let unit_len = after_number
            .char_indices()
            .find(|(_, c)| *c == '.' || c.is_ascii_digit())
            .map(|(idx, _)| idx)
            .unwrap_or(after_number.len());
        let (unit, tail) = after_number.split_at(unit_len);

        if unit.is_empty() {
            return Err(IntervalError::MissingUnit(input.to_string()));
        }
        let scale = unit_nanos(unit).ok_or_else(|| IntervalError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let overflow = || IntervalError::Overflow(input.to_string());

        let whole: u128 = if integer.is_empty() {
            0
        } else {
            integer.parse().map_err(|_| overflow())?
        };
        let mut component = whole.checked_mul(scale).ok_or_else(overflow)?;

        // Digits past nanosecond precision cannot contribute anything.
        let fraction = &fraction[..fraction.len().min(18)];
        if !fraction.is_empty() {
            let digits: u128 = fraction.parse().map_err(|_| overflow())?;
            let divisor = 10u128.pow(fraction.len() as u32);
            component = component
                .checked_add(digits * scale / divisor)
                .ok_or_else(overflow)?;
        }

        total = total.checked_add(component).ok_or_else(overflow)?;
        rest = tail;
    }

    let nanos = i64::try_from(total).map_err(|_| IntervalError::Overflow(input.to_string()))?;
    Ok(TimeDelta::nanoseconds(if negative { -nanos } else { nanos }))
}

/// Parse a metric rollover interval.
///
/// The result is strictly positive, so `now + interval` is always later
/// than `now`.
pub fn parse_interval(input: &str) -> Result<TimeDelta, IntervalError> {
    let duration = parse_duration(input)?;
    if duration <= TimeDelta::zero() {
        return Err(IntervalError::NotPositive(input.to_string()));
    }
    Ok(duration)
}
