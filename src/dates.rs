//! Calendar-date helpers shared by the store and the HTTP layer.
//!
//! Dates travel as `YYYY-MM-DD` strings and are kept as timezone-naive
//! `time::Date` values everywhere else.

use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
use time::{format_description::BorrowedFormatItem, macros::format_description, Date, OffsetDateTime};

const CALENDAR_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parses a `YYYY-MM-DD` date, ignoring surrounding whitespace.
pub fn parse(raw: &str) -> Result<Date, time::error::Parse> {
    Date::parse(raw.trim(), CALENDAR_DATE)
}

pub fn format(date: Date) -> String {
    // The format only uses components every Date has.
    date.format(CALENDAR_DATE).unwrap_or_default()
}

/// Current calendar date in UTC.
pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(*date))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(D::Error::custom)
}

pub mod option {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::{format, parse};

    pub fn serialize<S: Serializer>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_some(&format(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Date>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse(s).map(Some).map_err(D::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_and_formats_calendar_dates() {
        assert_eq!(parse("2024-02-29").unwrap(), date!(2024 - 02 - 29));
        assert_eq!(parse(" 2024-01-05 ").unwrap(), date!(2024 - 01 - 05));
        assert_eq!(format(date!(2024 - 01 - 05)), "2024-01-05");
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse("2024-13-01").is_err());
        assert!(parse("01/02/2024").is_err());
        assert!(parse("").is_err());
    }
}
