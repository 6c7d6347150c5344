// Utility helpers for parsing, rounding and number formatting.
//
// This module centralizes all the "dirty" form/number/date handling so the
// rest of the pipeline can assume clean, typed, non-negative values.
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in hand-typed form fields.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok()
}

/// Clamp a value into the engine's numeric domain: negative, NaN and
/// infinite values all become `0.0`.
pub fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// Clamp a computed amount: negative and NaN become `0.0`, while an
/// amount that overflowed to `+inf` saturates at `f64::MAX`.
pub fn saturating(v: f64) -> f64 {
    if v.is_nan() || v <= 0.0 {
        0.0
    } else {
        v.min(f64::MAX)
    }
}

/// `non_negative` for optional leaves; a missing value is `0.0`.
pub fn leaf(v: Option<f64>) -> f64 {
    non_negative(v.unwrap_or(0.0))
}

pub fn parse_datetime_safe(s: Option<&str>) -> Option<NaiveDateTime> {
    // Plain dates are taken as midnight so they compare with timestamps.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

pub fn days_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    // Fractional days; callers decide how to round.
    (end - start).num_seconds() as f64 / SECONDS_PER_DAY
}

/// Round to two decimal places (paise/cents). Applied at every stage
/// boundary so drift cannot accumulate across categories. Values too large
/// to carry cents are returned as is, with infinities saturated.
pub fn round2(v: f64) -> f64 {
    let cents = v * 100.0;
    if cents.is_finite() {
        cents.round() / 100.0
    } else if v.is_nan() {
        v
    } else {
        v.clamp(f64::MIN, f64::MAX)
    }
}

/// Round to the nearest whole currency unit for user-facing amounts.
pub fn round_whole(v: f64) -> u64 {
    let v = non_negative(v).round();
    if v >= u64::MAX as f64 {
        u64::MAX
    } else {
        v as u64
    }
}

fn locale_for(currency: &str) -> Locale {
    if currency.trim().eq_ignore_ascii_case("INR") {
        Locale::en_IN
    } else {
        Locale::en
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    format_grouped(n, decimals, Locale::en)
}

/// Like `format_number`, but with the digit grouping customary for the
/// currency (`12,34,567.00` for INR, `1,234,567.00` otherwise).
pub fn format_amount(n: f64, decimals: usize, currency: &str) -> String {
    format_grouped(n, decimals, locale_for(currency))
}

fn format_grouped(n: f64, decimals: usize, locale: Locale) -> String {
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert separators into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&locale);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_f64_safe_handles_separators_and_garbage() {
        assert_eq!(parse_f64_safe(Some(" 1,250.5 ")), Some(1250.5));
        assert_eq!(parse_f64_safe(Some("abc")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn non_negative_absorbs_bad_values() {
        assert_eq!(non_negative(-5.0), 0.0);
        assert_eq!(non_negative(f64::NAN), 0.0);
        assert_eq!(non_negative(f64::INFINITY), 0.0);
        assert_eq!(non_negative(12.5), 12.5);
        assert_eq!(leaf(None), 0.0);
    }

    #[test]
    fn datetime_formats() {
        let d = parse_datetime_safe(Some("2025-11-10")).unwrap();
        let t = parse_datetime_safe(Some("2025-11-12T18:00:00")).unwrap();
        let z = parse_datetime_safe(Some("2025-11-12T18:00:00Z")).unwrap();
        assert_eq!(t, z);
        assert_eq!(days_between(d, t), 2.75);
        assert!(parse_datetime_safe(Some("10/11/2025")).is_none());
    }

    #[test]
    fn rounding() {
        assert_eq!(round2(2.345_678), 2.35);
        assert_eq!(round2(75_600.0), 75_600.0);
        assert_eq!(round_whole(1_063_999.6), 1_064_000);
        assert_eq!(round_whole(-3.0), 0);
    }

    #[test]
    fn huge_amounts_saturate() {
        assert_eq!(round2(1.0e307), 1.0e307);
        assert_eq!(round2(f64::INFINITY), f64::MAX);
        assert_eq!(saturating(f64::INFINITY), f64::MAX);
        assert_eq!(saturating(f64::NAN), 0.0);
        assert_eq!(saturating(-1.0), 0.0);
        assert_eq!(round_whole(f64::MAX), u64::MAX);
    }

    #[test]
    fn formatting() {
        assert_eq!(format_number(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(format_amount(1_234_567.0, 0, "INR"), "12,34,567");
        assert_eq!(format_amount(1_234_567.0, 0, "usd"), "1,234,567");
        assert_eq!(format_int(9855), "9,855");
    }
}
