//! Parsing of the month and year query parameters into a date range.

use serde::Deserialize;
use time::{Date, Month, OffsetDateTime, Time};

use crate::{Error, timezone::to_local_instant};

/// The earliest year that may be requested.
pub const MIN_YEAR: i32 = 1900;
/// The latest year that may be requested.
///
/// The range for December needs the first day of the following year, which
/// must still be representable.
pub const MAX_YEAR: i32 = 9998;

/// The query parameters that select a calendar month.
///
/// Both fields are kept as raw strings so that missing or malformed values can
/// be reported with a JSON error instead of the default query rejection.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MonthQuery {
    /// A month number (1-12), an English month name, or a three letter
    /// abbreviation, e.g. "3", "March" or "mar".
    pub month: Option<String>,
    /// A four digit year, e.g. "2022".
    pub year: Option<String>,
}

/// The half-open interval `[start, end)` covering one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    /// Midnight at the start of the first day of the month.
    pub start: OffsetDateTime,
    /// Midnight at the start of the first day of the following month.
    pub end: OffsetDateTime,
}

impl MonthRange {
    /// The range as unix timestamps, in the form used by the transaction table.
    pub fn as_unix_timestamps(&self) -> (i64, i64) {
        (self.start.unix_timestamp(), self.end.unix_timestamp())
    }
}

impl MonthQuery {
    /// Validate the query and compute the month's date range with month
    /// boundaries at midnight in `local_timezone`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::MissingParameter] if either the month or year is missing,
    /// - [Error::InvalidMonth] if the month is not a month number or name,
    /// - [Error::InvalidYear] if the year is not a number between [MIN_YEAR] and [MAX_YEAR],
    /// - or [Error::InvalidTimezoneError] if `local_timezone` is not a canonical timezone name.
    pub fn to_range(&self, local_timezone: &str) -> Result<MonthRange, Error> {
        let month = self
            .month
            .as_deref()
            .ok_or(Error::MissingParameter("month"))?;
        let year = self.year.as_deref().ok_or(Error::MissingParameter("year"))?;

        let month = parse_month(month)?;
        let year = parse_year(year)?;

        let range = month_range(year, month, local_timezone)?;
        tracing::debug!(
            "Month range for {month} {year}: {} to {}",
            range.start,
            range.end
        );

        Ok(range)
    }
}

/// Parse a month number, English month name or three letter abbreviation.
fn parse_month(text: &str) -> Result<Month, Error> {
    let trimmed = text.trim();

    if let Ok(number) = trimmed.parse::<u8>() {
        return Month::try_from(number).map_err(|_| Error::InvalidMonth(text.to_owned()));
    }

    let month = match trimmed.to_ascii_lowercase().as_str() {
        "january" | "jan" => Month::January,
        "february" | "feb" => Month::February,
        "march" | "mar" => Month::March,
        "april" | "apr" => Month::April,
        "may" => Month::May,
        "june" | "jun" => Month::June,
        "july" | "jul" => Month::July,
        "august" | "aug" => Month::August,
        "september" | "sep" | "sept" => Month::September,
        "october" | "oct" => Month::October,
        "november" | "nov" => Month::November,
        "december" | "dec" => Month::December,
        _ => return Err(Error::InvalidMonth(text.to_owned())),
    };

    Ok(month)
}

fn parse_year(text: &str) -> Result<i32, Error> {
    match text.trim().parse::<i32>() {
        Ok(year) if (MIN_YEAR..=MAX_YEAR).contains(&year) => Ok(year),
        _ => Err(Error::InvalidYear(text.to_owned())),
    }
}

fn month_range(year: i32, month: Month, local_timezone: &str) -> Result<MonthRange, Error> {
    let first_day =
        Date::from_calendar_date(year, month, 1).map_err(|_| Error::InvalidYear(year.to_string()))?;
    let next_year = if month == Month::December {
        year + 1
    } else {
        year
    };
    let first_day_of_next_month = Date::from_calendar_date(next_year, month.next(), 1)
        .map_err(|_| Error::InvalidYear(year.to_string()))?;

    let to_instant = |date: Date| {
        to_local_instant(date.with_time(Time::MIDNIGHT), local_timezone)
            .ok_or_else(|| Error::InvalidTimezoneError(local_timezone.to_owned()))
    };

    Ok(MonthRange {
        start: to_instant(first_day)?,
        end: to_instant(first_day_of_next_month)?,
    })
}
