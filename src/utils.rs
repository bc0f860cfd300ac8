// Utility modules

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use crate::constants::{EPOCH_MILLIS_THRESHOLD, MAX_PAGE_LIMIT};

/// Clamp a configured page size into the range the upstream APIs accept.
pub fn clamp_page_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_PAGE_LIMIT)
}

/// Scale an integer amount of base units (planck, uatom, lamports, wei)
/// into a human-readable decimal string with a fixed number of fraction digits.
///
/// Returns `None` when `raw` is not a number.
pub fn format_base_units(raw: &str, decimals: u32, fraction_digits: u32) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(mut value) = Decimal::from_str(trimmed) {
        if value.set_scale(value.scale() + decimals).is_ok() {
            let mut rounded = value
                .round_dp_with_strategy(fraction_digits, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(fraction_digits);
            return Some(rounded.to_string());
        }
    }

    // Out of Decimal's 96-bit range; fall back to float precision.
    let value = trimmed.parse::<f64>().ok().filter(|v| v.is_finite())?;
    let scaled = value / 10_f64.powi(decimals as i32);
    Some(format!("{:.*}", fraction_digits as usize, scaled))
}

/// Zero rendered with the given number of fraction digits.
pub fn zero_amount(fraction_digits: u32) -> String {
    format!("{:.*}", fraction_digits as usize, 0.0)
}

/// Convert chain-native epoch seconds or milliseconds into an instant.
pub fn timestamp_from_epoch(value: i64) -> Option<DateTime<Utc>> {
    if value >= EPOCH_MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}

/// Read a timestamp that may be an epoch number, a numeric string, or RFC 3339.
pub fn parse_timestamp_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(timestamp_from_epoch),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(epoch) = trimmed.parse::<i64>() {
                return timestamp_from_epoch(epoch);
            }
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }
        _ => None,
    }
}

/// Numbers and strings both come back as their textual form.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First `n` characters of `value`, counted in chars rather than bytes.
pub fn take_chars(value: &str, n: usize) -> String {
    value.chars().take(n).collect()
}
