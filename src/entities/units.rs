//! Unit conversions shared by every entity: data sizes, durations, frame rates and timestamps.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Which multiplier a human-readable data size is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeBase {
    /// Powers of 1000 (`kB`, `MB`, ...), as `ls -lh --si` prints them.
    #[default]
    Decimal,
    /// Powers of 1024 (`kiB`, `MiB`, ...).
    Binary,
}

const SIZE_PREFIXES: [&str; 8] = ["", "k", "M", "G", "T", "P", "E", "Z"];

/// Formats `num` with one decimal place and the largest unit prefix that keeps it below the divisor.
///
/// `suffix` is appended after the prefix, e.g. `"B"` for bytes.
pub fn datasize_as_human(num: f64, suffix: &str, base: SizeBase) -> Option<String> {
    if !num.is_finite() {
        return None;
    }
    let divisor = match base {
        SizeBase::Decimal => 1000.0,
        SizeBase::Binary => 1024.0,
    };
    let binary_marker = match base {
        SizeBase::Decimal => "",
        SizeBase::Binary => "i",
    };

    let mut num = num;
    for prefix in SIZE_PREFIXES {
        if num.abs() < divisor {
            let marker = if prefix.is_empty() { "" } else { binary_marker };
            return Some(format!("{num:.1} {prefix}{marker}{suffix}"));
        }
        num /= divisor;
    }
    Some(format!("{num:.1} Y{binary_marker}{suffix}"))
}

/// SI-decimal byte count, e.g. `567800000` -> `"567.8 MB"`.
pub fn size_human(bytes: u64) -> String {
    // Only non-finite input yields `None`, which a u64 never is.
    datasize_as_human(bytes as f64, "B", SizeBase::Decimal).unwrap_or_default()
}

/// Formats seconds as `HH:MM:SS.ss`, e.g. `3854.80` -> `"01:04:14.80"`.
///
/// The value is rounded to hundredths first so the seconds field never reads `60.00`.
/// Negative and non-finite durations have no human form.
pub fn duration_human(secs: f64) -> Option<String> {
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    let centis = (secs * 100.0).round() as u64;
    let hours = centis / 360_000;
    let minutes = (centis / 6_000) % 60;
    let whole_secs = (centis / 100) % 60;
    let frac = centis % 100;
    Some(format!("{hours:02}:{minutes:02}:{whole_secs:02}.{frac:02}"))
}

/// Parses frame rate values which can be integers, floats, or fractions (e.g., "30000/1001").
///
/// A zero denominator (ffprobe prints `0/0` for unknown rates) yields `None`.
pub fn parse_rational(value: &str) -> Option<f64> {
    parse_ratio(value).map(|(num, den)| num / den)
}

/// Splits a rational like `"1/1000"` into `(numerator, denominator)`. A plain number has
/// denominator `1`. A zero denominator yields `None`.
///
/// Scale by the numerator and divide by the denominator last: `1/1000000000` has no exact
/// `f64` reciprocal.
pub fn parse_ratio(value: &str) -> Option<(f64, f64)> {
    let value = value.trim();
    let (num, den) = match value.split_once('/') {
        Some((num, den)) => (
            num.trim().parse::<f64>().ok()?,
            den.trim().parse::<f64>().ok()?,
        ),
        None => (value.parse::<f64>().ok()?, 1.0),
    };
    if den == 0.0 {
        return None;
    }
    Some((num, den))
}

/// Parses the `creation_time` tag ffprobe prints, e.g. `2019-03-14T09:41:02.000000Z`.
pub fn parse_creation_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            // Some muxers write the time without an offset; ffprobe treats it as UTC.
            ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|naive| naive.and_utc())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_size_human_examples() {
        assert_eq!(size_human(567_800_000), "567.8 MB");
        assert_eq!(size_human(1_200_000_000), "1.2 GB");
        assert_eq!(size_human(5_243_244), "5.2 MB");
    }

    #[test]
    fn test_size_human_small_values_stay_in_bytes() {
        assert_eq!(size_human(0), "0.0 B");
        assert_eq!(size_human(999), "999.0 B");
        assert_eq!(size_human(1000), "1.0 kB");
    }

    #[test]
    fn test_size_human_uses_decimal_not_binary_divisor() {
        // 1 MiB is only 1.0 MB when divided by 1000.
        assert_eq!(size_human(1_048_576), "1.0 MB");
        assert_eq!(size_human(2_500_000_000_000), "2.5 TB");
    }

    #[test]
    fn test_binary_base_marks_prefix() {
        assert_eq!(
            datasize_as_human(1_048_576.0, "B", SizeBase::Binary),
            Some("1.0 MiB".to_string())
        );
        assert_eq!(
            datasize_as_human(512.0, "B", SizeBase::Binary),
            Some("512.0 B".to_string())
        );
    }

    #[test]
    fn test_datasize_without_suffix_and_huge_values() {
        assert_eq!(
            datasize_as_human(5_243_244.0, "", SizeBase::Decimal),
            Some("5.2 M".to_string())
        );
        assert_eq!(
            datasize_as_human(3e24, "B", SizeBase::Decimal),
            Some("3.0 YB".to_string())
        );
        assert_eq!(datasize_as_human(f64::NAN, "B", SizeBase::Decimal), None);
    }

    #[test]
    fn test_duration_human_examples() {
        assert_eq!(duration_human(3854.80), Some("01:04:14.80".to_string()));
        assert_eq!(duration_human(30.998), Some("00:00:31.00".to_string()));
        assert_eq!(duration_human(0.0), Some("00:00:00.00".to_string()));
    }

    #[test]
    fn test_duration_human_pads_seconds_and_carries_rounding() {
        assert_eq!(duration_human(65.5), Some("00:01:05.50".to_string()));
        assert_eq!(duration_human(59.999), Some("00:01:00.00".to_string()));
    }

    #[test]
    fn test_duration_human_hours_grow_past_two_digits() {
        assert_eq!(duration_human(360_000.25), Some("100:00:00.25".to_string()));
    }

    #[test]
    fn test_duration_human_rejects_negative_and_nan() {
        assert_eq!(duration_human(-1.0), None);
        assert_eq!(duration_human(f64::NAN), None);
        assert_eq!(duration_human(f64::INFINITY), None);
    }

    #[test]
    fn test_parse_rational() {
        assert_eq!(parse_rational("25/1"), Some(25.0));
        let ntsc = parse_rational("30000/1001").unwrap();
        assert!((ntsc - 29.97).abs() < 0.001);
        assert_eq!(parse_rational("0/0"), None);
        assert_eq!(parse_rational("24"), Some(24.0));
        assert_eq!(parse_rational("fast"), None);
    }

    #[test]
    fn test_parse_ratio() {
        assert_eq!(parse_ratio("1/1000000000"), Some((1.0, 1e9)));
        assert_eq!(parse_ratio(" 1 / 1000 "), Some((1.0, 1000.0)));
        assert_eq!(parse_ratio("48000"), Some((48000.0, 1.0)));
        assert_eq!(parse_ratio("1/0"), None);
        assert_eq!(parse_ratio("a/b"), None);
    }

    #[test]
    fn test_parse_creation_time_rfc3339() {
        let dt = parse_creation_time("2019-03-14T09:41:02.000000Z").unwrap();
        assert_eq!(dt.year(), 2019);
        assert_eq!(dt.hour(), 9);
        assert_eq!(dt.second(), 2);
    }

    #[test]
    fn test_parse_creation_time_without_offset() {
        let dt = parse_creation_time("2021-07-01 12:00:00").unwrap();
        assert_eq!(dt.month(), 7);
        assert!(parse_creation_time("yesterday").is_none());
    }
}
