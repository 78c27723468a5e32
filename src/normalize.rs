//! Number and time normalization for extracted field values.

use crate::error::ParseError;
use chrono::NaiveTime;
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[$£€¥₹]|NZD|USD|EUR|GBP|AUD").unwrap());

// Accepted time shapes (whitelist): 24-hour with a two-digit hour, and
// 12-hour with an uppercase AM/PM designator, each with optional seconds.
static TIME_24H_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[01][0-9]|2[0-3]):[0-5][0-9](?::[0-5][0-9])?$").unwrap()
});
static TIME_12H_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:0?[1-9]|1[0-2]):[0-5][0-9](?::[0-5][0-9])? [AP]M$").unwrap()
});

/// Strips currency symbols/codes and grouping commas, then parses the rest
/// as an exact decimal. Empty or whitespace-only input is an error, never a
/// zero default.
pub fn normalize_number(input: &str) -> Result<Decimal, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::InvalidNumber {
            input: input.to_string(),
        });
    }

    let cleaned = CURRENCY_RE.replace_all(trimmed, "");
    let cleaned = cleaned.trim().replace(',', "");

    Decimal::from_str_exact(&cleaned).map_err(|_| ParseError::InvalidNumber {
        input: input.to_string(),
    })
}

/// Whitelist-based time-of-day parser. Anything outside the four accepted
/// formats, including ambiguous shorthand like `230` or `2.30`, returns
/// `None`; callers treat that as a warning, not an error.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if TIME_24H_RE.is_match(trimmed) {
        let format = if trimmed.len() == 8 { "%H:%M:%S" } else { "%H:%M" };
        return NaiveTime::parse_from_str(trimmed, format).ok();
    }

    if TIME_12H_RE.is_match(trimmed) {
        let format = if trimmed.matches(':').count() == 2 {
            "%I:%M:%S %p"
        } else {
            "%I:%M %p"
        };
        return NaiveTime::parse_from_str(trimmed, format).ok();
    }

    None
}
