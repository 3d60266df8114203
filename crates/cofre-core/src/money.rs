//! Minor-unit money helpers
//!
//! Every amount in Cofre is an `i64` count of minor currency units (cents).
//! These helpers convert between that and the decimal text users type.

use crate::error::{Error, Result};

/// Minor units per major unit
pub const MINOR_PER_MAJOR: i64 = 100;

/// Parse user-entered decimal text into minor units
///
/// Accepts an optional sign, `.` or `,` as decimal separator and at most two
/// decimal places: `"12"`, `"12.5"`, `"-3,99"`. The sign is preserved; callers
/// pass the result through the normalizer to get the canonical sign.
pub fn parse_amount(input: &str) -> Result<i64> {
    let trimmed = input.trim();
    let invalid = || Error::InvalidAmount(format!("cannot parse '{}'", input));

    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let digits = digits.replace(',', ".");
    let (whole, fraction) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits.as_str(), ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if fraction.len() > 2 {
        return Err(Error::InvalidAmount(format!(
            "'{}' has more than two decimal places",
            input
        )));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let whole_value: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let fraction_value: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };

    let magnitude = whole_value
        .checked_mul(MINOR_PER_MAJOR)
        .and_then(|v| v.checked_add(fraction_value))
        .ok_or_else(|| Error::InvalidAmount(format!("'{}' is out of range", input)))?;

    Ok(if negative { -magnitude } else { magnitude })
}

/// Render minor units as a plain decimal string, e.g. `-1234` → `"-12.34"`
pub fn format_amount(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    let per = MINOR_PER_MAJOR as u64;
    format!("{}{}.{:02}", sign, abs / per, abs % per)
}

/// Convert minor units to major units for ratios and display
pub fn to_major(minor: i64) -> f64 {
    minor as f64 / MINOR_PER_MAJOR as f64
}
