//! EPS time token parsing.
//!
//! Two grammars are recognised:
//! - elapsed: `[sign][ddd_]hh:mm:ss[.fraction]`, relative to a reference date
//! - absolute: `dd-Mon-yyyy[_hh:mm:ss[.fraction]]`
//!
//! Which parser applies is decided by [`TimeFormat`]; see [`TimeResolver`].

use crate::config::TimeFormat;
use crate::constants::{MONTH_ABBREVIATIONS, TABLE_TIME_FORMAT};
use crate::error::{EpsError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

static ELAPSED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])?(?:(\d+)_)?(\d{1,2}):(\d{2}):(\d{2})(?:\.(\d{1,9}))?$")
        .expect("elapsed time pattern is valid")
});

static ABSOLUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{1,2})-([A-Za-z]{3,9})-(\d{4})(?:_(\d{1,2}):(\d{2}):(\d{2})(?:\.(\d{1,9}))?)?$",
    )
    .expect("absolute time pattern is valid")
});

/// Signed offset of an elapsed token
pub fn elapsed_duration(token: &str) -> Result<Duration> {
    let caps = ELAPSED
        .captures(token)
        .ok_or_else(|| EpsError::malformed_time(token, "expected [sign][ddd_]hh:mm:ss[.fff]"))?;

    let days: i64 = match caps.get(2) {
        Some(m) => m
            .as_str()
            .parse()
            .map_err(|_| EpsError::malformed_time(token, "day count out of range"))?,
        None => 0,
    };
    let (hours, minutes, seconds) = clock_fields(token, &caps[3], &caps[4], &caps[5])?;
    let nanos = fraction_nanos(caps.get(6).map(|m| m.as_str()));

    let clock = Duration::hours(hours as i64)
        + Duration::minutes(minutes as i64)
        + Duration::seconds(seconds as i64)
        + Duration::nanoseconds(nanos as i64);
    let magnitude = Duration::try_days(days)
        .and_then(|d| d.checked_add(&clock))
        .ok_or_else(|| EpsError::malformed_time(token, "day count out of range"))?;

    Ok(match caps.get(1).map(|m| m.as_str()) {
        Some("-") => -magnitude,
        _ => magnitude,
    })
}

/// Resolve an elapsed token against a reference date
pub fn parse_elapsed(token: &str, reference: NaiveDateTime) -> Result<NaiveDateTime> {
    let offset = elapsed_duration(token)?;
    reference
        .checked_add_signed(offset)
        .ok_or_else(|| EpsError::malformed_time(token, "offset overflows the calendar"))
}

/// Parse `dd-Mon-yyyy[_hh:mm:ss[.fff]]`; time of day defaults to midnight
pub fn parse_absolute(token: &str) -> Result<NaiveDateTime> {
    let caps = ABSOLUTE
        .captures(token)
        .ok_or_else(|| EpsError::malformed_time(token, "expected dd-Mon-yyyy[_hh:mm:ss]"))?;

    let day: u32 = caps[1]
        .parse()
        .map_err(|_| EpsError::malformed_time(token, "invalid day"))?;
    let month = month_number(&caps[2])
        .ok_or_else(|| EpsError::malformed_time(token, format!("unknown month '{}'", &caps[2])))?;
    let year: i32 = caps[3]
        .parse()
        .map_err(|_| EpsError::malformed_time(token, "invalid year"))?;

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| EpsError::malformed_time(token, "invalid calendar date"))?;

    let time = match (caps.get(4), caps.get(5), caps.get(6)) {
        (Some(h), Some(m), Some(s)) => {
            let (hours, minutes, seconds) = clock_fields(token, h.as_str(), m.as_str(), s.as_str())?;
            let nanos = fraction_nanos(caps.get(7).map(|m| m.as_str()));
            NaiveTime::from_hms_nano_opt(hours, minutes, seconds, nanos)
                .ok_or_else(|| EpsError::malformed_time(token, "invalid time of day"))?
        }
        _ => NaiveTime::MIN,
    };

    Ok(date.and_time(time))
}

/// Whether a token has the shape of any EPS time token
pub fn is_time_token(token: &str) -> bool {
    ELAPSED.is_match(token) || ABSOLUTE.is_match(token)
}

/// Auto rule: a `-` after the optional leading sign marks an absolute date
pub fn looks_absolute(token: &str) -> bool {
    token
        .strip_prefix(['+', '-'])
        .unwrap_or(token)
        .contains('-')
}

/// Time token resolution for one document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeResolver {
    format: TimeFormat,
    reference: Option<NaiveDateTime>,
}

impl TimeResolver {
    pub fn new(format: TimeFormat, reference: Option<NaiveDateTime>) -> Self {
        Self { format, reference }
    }

    pub fn reference(&self) -> Option<NaiveDateTime> {
        self.reference
    }

    pub fn resolve(&self, token: &str) -> Result<NaiveDateTime> {
        let absolute = match self.format {
            TimeFormat::Auto => looks_absolute(token),
            TimeFormat::Elapsed => false,
            TimeFormat::Absolute => true,
        };

        if absolute {
            return parse_absolute(token);
        }

        let reference = self.reference.ok_or_else(|| EpsError::MissingReferenceDate {
            token: token.to_string(),
        })?;
        parse_elapsed(token, reference)
    }
}

/// Rendering used in table cells
pub fn format_table_time(time: NaiveDateTime) -> String {
    time.format(TABLE_TIME_FORMAT).to_string()
}

/// Inverse of [`format_table_time`]
pub fn parse_table_time(cell: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(cell, TABLE_TIME_FORMAT)
        .map_err(|e| EpsError::malformed_time(cell, e.to_string()))
}

fn month_number(name: &str) -> Option<u32> {
    let prefix = name.get(..3)?;
    MONTH_ABBREVIATIONS
        .iter()
        .position(|m| *m == prefix)
        .map(|index| index as u32 + 1)
}

fn clock_fields(token: &str, h: &str, m: &str, s: &str) -> Result<(u32, u32, u32)> {
    let parse = |field: &str| {
        field
            .parse::<u32>()
            .map_err(|_| EpsError::malformed_time(token, "non-numeric clock field"))
    };
    let (hours, minutes, seconds) = (parse(h)?, parse(m)?, parse(s)?);

    if hours > 23 {
        return Err(EpsError::malformed_time(token, "hours must be below 24"));
    }
    if minutes > 59 || seconds > 59 {
        return Err(EpsError::malformed_time(
            token,
            "minutes and seconds must be below 60",
        ));
    }

    Ok((hours, minutes, seconds))
}

fn fraction_nanos(fraction: Option<&str>) -> u32 {
    match fraction {
        Some(digits) => format!("{:0<9}", digits).parse().unwrap_or(0),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_parse_elapsed_with_days() {
        let reference = dt(2024, 1, 1, 0, 0, 0);
        assert_eq!(
            parse_elapsed("003_12:30:00", reference).unwrap(),
            dt(2024, 1, 4, 12, 30, 0)
        );
        assert_eq!(
            parse_elapsed("+000_00:00:01", reference).unwrap(),
            dt(2024, 1, 1, 0, 0, 1)
        );
    }

    #[test]
    fn test_parse_elapsed_negative_and_short() {
        let reference = dt(2024, 1, 2, 0, 0, 0);
        assert_eq!(
            parse_elapsed("-001_01:00:00", reference).unwrap(),
            dt(2023, 12, 31, 23, 0, 0)
        );
        assert_eq!(
            parse_elapsed("10:15:30", reference).unwrap(),
            dt(2024, 1, 2, 10, 15, 30)
        );
    }

    #[test]
    fn test_parse_elapsed_overflow_is_malformed() {
        let reference = dt(2024, 1, 1, 0, 0, 0);
        // Fits a Duration, but lands past the last representable date
        assert!(matches!(
            parse_elapsed("999999999_00:00:00", reference),
            Err(EpsError::MalformedTime { .. })
        ));
        // Too many days for a Duration at all
        assert!(matches!(
            parse_elapsed("99999999999999_00:00:00", reference),
            Err(EpsError::MalformedTime { .. })
        ));
    }

    #[test]
    fn test_parse_elapsed_fraction() {
        let reference = dt(2024, 1, 1, 0, 0, 0);
        let parsed = parse_elapsed("000_00:00:01.5", reference).unwrap();
        assert_eq!(parsed, reference + Duration::milliseconds(1500));
    }

    #[test]
    fn test_parse_absolute() {
        assert_eq!(parse_absolute("01-Jan-2024").unwrap(), dt(2024, 1, 1, 0, 0, 0));
        assert_eq!(
            parse_absolute("15-March-2025_08:00:05").unwrap(),
            dt(2025, 3, 15, 8, 0, 5)
        );
    }

    #[test]
    fn test_malformed_tokens_are_errors() {
        let reference = dt(2024, 1, 1, 0, 0, 0);
        for token in ["001_25:00:00", "00:61:00", "abc", "001-00:00:00", ""] {
            assert!(
                matches!(
                    parse_elapsed(token, reference),
                    Err(EpsError::MalformedTime { .. })
                ),
                "token {:?} should be rejected",
                token
            );
        }
        for token in ["31-Feb-2024", "01-jan-2024", "01-Foo-2024", "2024-01-01"] {
            assert!(
                matches!(parse_absolute(token), Err(EpsError::MalformedTime { .. })),
                "token {:?} should be rejected",
                token
            );
        }
    }

    #[test]
    fn test_resolver_auto_dispatch() {
        let resolver = TimeResolver::new(TimeFormat::Auto, Some(dt(2024, 1, 1, 0, 0, 0)));
        assert_eq!(
            resolver.resolve("01-Feb-2024_00:00:00").unwrap(),
            dt(2024, 2, 1, 0, 0, 0)
        );
        assert_eq!(
            resolver.resolve("-000_01:00:00").unwrap(),
            dt(2023, 12, 31, 23, 0, 0)
        );
    }

    #[test]
    fn test_resolver_forced_formats() {
        let reference = Some(dt(2024, 1, 1, 0, 0, 0));
        let elapsed = TimeResolver::new(TimeFormat::Elapsed, reference);
        assert!(elapsed.resolve("01-Feb-2024").is_err());

        let absolute = TimeResolver::new(TimeFormat::Absolute, reference);
        assert!(absolute.resolve("001_00:00:00").is_err());
    }

    #[test]
    fn test_resolver_without_reference() {
        let resolver = TimeResolver::new(TimeFormat::Auto, None);
        assert!(matches!(
            resolver.resolve("001_00:00:00"),
            Err(EpsError::MissingReferenceDate { .. })
        ));
        assert!(resolver.resolve("02-Jan-2024").is_ok());
    }

    #[test]
    fn test_time_token_shapes() {
        assert!(is_time_token("000_22:30:00"));
        assert!(is_time_token("23:00:00"));
        assert!(is_time_token("01-Jan-2024_00:00:00"));
        assert!(!is_time_token("Start_time:"));
        assert!(!is_time_token("SOC"));
    }

    #[test]
    fn test_table_time_roundtrip() {
        let time = dt(2024, 1, 4, 12, 30, 0);
        let cell = format_table_time(time);
        assert_eq!(cell, "2024-01-04T12:30:00");
        assert_eq!(parse_table_time(&cell).unwrap(), time);
    }
}
