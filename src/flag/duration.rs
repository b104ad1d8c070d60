#![forbid(unsafe_code)]

//! Duration literals
//!
//! Accepts the compact form used by most command line tools: a sequence of
//! decimal numbers, each with an optional fraction and a unit suffix, such as
//! `300ms`, `1.5h` or `2h45m`. Valid units are `ns`, `us` (or `µs`), `ms`,
//! `s`, `m` and `h`. A bare `0` is the only unit-less literal.

use std::time::Duration;

const NANOS_PER_UNIT: &[(&str, u128)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60 * 1_000_000_000),
    ("h", 60 * 60 * 1_000_000_000),
];

/// Parses a duration literal
///
/// Negative durations cannot be represented and are rejected, except for
/// the degenerate `-0` forms.
pub fn parse_duration(literal: &str) -> Result<Duration, String> {
    let (negative, mut rest) = match literal.as_bytes().first() {
        Some(b'-') => (true, &literal[1..]),
        Some(b'+') => (false, &literal[1..]),
        _ => (false, literal),
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(format!("invalid duration {:?}", literal));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (whole, after_whole) = split_digits(rest);
        rest = after_whole;

        let mut fraction = "";
        if let Some(stripped) = rest.strip_prefix('.') {
            let (digits, after_fraction) = split_digits(stripped);
            fraction = digits;
            rest = after_fraction;
        } else if whole.is_empty() {
            return Err(format!("invalid duration {:?}", literal));
        }
        if whole.is_empty() && fraction.is_empty() {
            return Err(format!("invalid duration {:?}", literal));
        }

        let unit_len = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        if unit_len == 0 {
            return Err(format!("missing unit in duration {:?}", literal));
        }
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        let scale = NANOS_PER_UNIT
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, nanos)| *nanos)
            .ok_or_else(|| format!("unknown unit {:?} in duration {:?}", unit, literal))?;

        total = total
            .checked_add(component_nanos(whole, fraction, scale, literal)?)
            .ok_or_else(|| format!("invalid duration {:?}", literal))?;
    }

    if negative && total > 0 {
        return Err(format!("negative duration {:?} is not supported", literal));
    }

    let secs = u64::try_from(total / 1_000_000_000)
        .map_err(|_| format!("invalid duration {:?}", literal))?;
    // Remainder is below one second, so it always fits.
    let nanos = (total % 1_000_000_000) as u32;
    Ok(Duration::new(secs, nanos))
}

/// Formats a duration the way [`parse_duration`] reads it back
///
/// Sub-second values use the largest fitting unit (`1.5ms`, `250ns`);
/// longer ones are written as hours, minutes and seconds (`1h0m0s`, `1m30s`,
/// `2.5s`).
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    match nanos {
        0 => return "0s".to_string(),
        1..1_000 => return format!("{}ns", nanos),
        1_000..1_000_000 => return format!("{}µs", decimal(nanos, 3)),
        1_000_000..1_000_000_000 => return format!("{}ms", decimal(nanos, 6)),
        _ => {}
    }

    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, secs / 60 % 60, secs % 60);
    let seconds = decimal(
        u128::from(seconds) * 1_000_000_000 + u128::from(duration.subsec_nanos()),
        9,
    );
    match (hours, minutes) {
        (0, 0) => format!("{}s", seconds),
        (0, _) => format!("{}m{}s", minutes, seconds),
        _ => format!("{}h{}m{}s", hours, minutes, seconds),
    }
}

/// `value` scaled down by `10^digits`, without trailing fractional zeros
fn decimal(value: u128, digits: u32) -> String {
    let scale = 10u128.pow(digits);
    let (whole, fraction) = (value / scale, value % scale);
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0width$}", fraction, width = digits as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn component_nanos(whole: &str, fraction: &str, scale: u128, literal: &str) -> Result<u128, String> {
    let overflow = || format!("invalid duration {:?}", literal);

    let whole_value: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let mut nanos = whole_value.checked_mul(scale).ok_or_else(overflow)?;

    // Digits beyond nanosecond precision are dropped.
    let mut place = scale;
    for digit in fraction.bytes() {
        place /= 10;
        if place == 0 {
            break;
        }
        nanos = nanos
            .checked_add(u128::from(digit - b'0') * place)
            .ok_or_else(overflow)?;
    }

    Ok(nanos)
}
