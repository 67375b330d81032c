//! Date normalization between user input, the wire and redisplay.
//!
//! Input is day-first. Only four shapes are recognized, in this order:
//!
//! | dialect    | example     |
//! |------------|-------------|
//! | `D.M.YYYY` | `5.1.2024`  |
//! | `D-M-YYYY` | `5-1-2024`  |
//! | `D/M/YYYY` | `5/1/2024`  |
//! | `YYYY-M-D` | `2024-1-5`  |
//!
//! [`normalize`] turns any of them into `YYYY-MM-DD` and leaves everything else
//! alone. It does not check the calendar: `31.02.2024` becomes `2024-02-31`,
//! which [`parse_canonical`] then rejects.
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};
use regex::{Captures, Regex};
use thiserror::Error;

const DISPLAY_FORMAT: &str = "%d.%m.%Y";
const CANONICAL_FORMAT: &str = "%Y-%m-%d";

/// The input could not be read as a date for display.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unrecognized date: {0:?}")]
pub struct FormatError(pub String);

#[derive(Clone, Copy)]
enum Order {
    DayFirst,
    YearFirst,
}

struct Dialect {
    pattern: Regex,
    order: Order,
}

impl Dialect {
    fn new(pattern: &str, order: Order) -> Self {
        #[allow(clippy::expect_used)]
        let pattern = Regex::new(pattern).expect("date pattern is a valid literal");
        Self { pattern, order }
    }

    fn canonical(&self, caps: &Captures<'_>) -> String {
        let (year, month, day) = match self.order {
            Order::DayFirst => (&caps[3], &caps[2], &caps[1]),
            Order::YearFirst => (&caps[1], &caps[2], &caps[3]),
        };
        format!("{year}-{month:0>2}-{day:0>2}")
    }
}

static DIALECTS: LazyLock<[Dialect; 4]> = LazyLock::new(|| {
    [
        Dialect::new(r"^([0-9]{1,2})\.([0-9]{1,2})\.([0-9]{4})$", Order::DayFirst),
        Dialect::new(r"^([0-9]{1,2})-([0-9]{1,2})-([0-9]{4})$", Order::DayFirst),
        Dialect::new(r"^([0-9]{1,2})/([0-9]{1,2})/([0-9]{4})$", Order::DayFirst),
        Dialect::new(r"^([0-9]{4})-([0-9]{1,2})-([0-9]{1,2})$", Order::YearFirst),
    ]
});

static DISPLAY: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[0-9]{2}\.[0-9]{2}\.[0-9]{4}$").expect("display pattern is a valid literal")
});

/// Canonicalizes a user-typed date to `YYYY-MM-DD`.
///
/// Blank input gives an empty string. Input that matches none of the
/// recognized dialects is returned trimmed but otherwise unchanged, so
/// callers must still check the result with [`parse_canonical`].
pub fn normalize(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    DIALECTS
        .iter()
        .find_map(|dialect| {
            dialect
                .pattern
                .captures(trimmed)
                .map(|caps| dialect.canonical(&caps))
        })
        .unwrap_or_else(|| trimmed.to_string())
}

/// Builds a real calendar date from a canonical `YYYY-MM-DD` string.
pub fn parse_canonical(canonical: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(canonical, CANONICAL_FORMAT).ok()
}

/// Formats a date for the wire: RFC3339 at midnight UTC.
pub fn to_wire(date: NaiveDate) -> String {
    date.and_time(NaiveTime::MIN)
        .and_utc()
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Formats a wire date or timestamp as `DD.MM.YYYY`.
///
/// A string already in that shape is returned untouched.
pub fn to_display(input: &str) -> Result<String, FormatError> {
    if DISPLAY.is_match(input) {
        return Ok(input.to_string());
    }

    parse_timestamp(input.trim())
        .map(|date| date.format(DISPLAY_FORMAT).to_string())
        .ok_or_else(|| FormatError(input.to_string()))
}

/// [`to_display`], with an empty value in place of a [`FormatError`].
pub fn display_or_empty(input: &str) -> String {
    to_display(input).unwrap_or_default()
}

fn parse_timestamp(input: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(input)
        .or_else(|_| DateTime::parse_from_rfc2822(input))
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S%.f"))
                .map(|dt| dt.date())
                .ok()
        })
        .or_else(|| parse_canonical(&normalize(input)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_dialect_normalizes_and_redisplays() {
        for input in ["5.1.2024", "5-1-2024", "5/1/2024", "2024-1-5", "05.01.2024"] {
            let canonical = normalize(input);
            assert_eq!(canonical, "2024-01-05", "normalize({input})");
            assert_eq!(to_display(&canonical).unwrap(), "05.01.2024");
        }
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in ["17.11.2023", "7-3-1999", "1/12/2020", "2021-2-9"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn unknown_shapes_pass_through() {
        assert_eq!(normalize("yesterday"), "yesterday");
        assert_eq!(normalize("5.1.24"), "5.1.24");
        assert_eq!(normalize("2024/01/05"), "2024/01/05");
        assert_eq!(normalize("  soon \n"), "soon");
    }

    #[test]
    fn calendar_check_is_separate() {
        let canonical = normalize("31.02.2024");
        assert_eq!(canonical, "2024-02-31");
        assert_eq!(parse_canonical(&canonical), None);
        assert!(parse_canonical("2024-02-29").is_some());
    }

    #[test]
    fn wire_is_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(to_wire(date), "2024-01-05T00:00:00Z");
    }

    #[test]
    fn display_reads_timestamps() {
        assert_eq!(to_display("2024-01-05T00:00:00Z").unwrap(), "05.01.2024");
        assert_eq!(to_display("2024-01-05T10:30:00+02:00").unwrap(), "05.01.2024");
        assert_eq!(to_display("2024-01-05T10:30:00").unwrap(), "05.01.2024");
    }

    #[test]
    fn display_leaves_display_strings_alone() {
        assert_eq!(to_display("05.01.2024").unwrap(), "05.01.2024");
    }

    #[test]
    fn display_rejects_garbage() {
        assert_eq!(
            to_display("not a date"),
            Err(FormatError("not a date".to_string()))
        );
        assert_eq!(display_or_empty("not a date"), "");
    }
}
