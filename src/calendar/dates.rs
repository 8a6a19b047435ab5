//! Recurring-date helpers for `YYYY-MM-DD` strings.

use chrono::{Datelike, NaiveDate};

/// Parse a stored `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// `DD/MM/YYYY`, or `None` if `s` is not a date.
pub fn format_date_dmy(s: &str) -> Option<String> {
    parse_date(s).map(|d| d.format("%d/%m/%Y").to_string())
}

/// The date's anniversary in `year`. Feb 29 falls on Mar 1 in common years.
pub fn anniversary_in(date: NaiveDate, year: i32) -> Option<NaiveDate> {
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}

/// First anniversary of `date` on or after `from`.
pub fn next_anniversary(date: NaiveDate, from: NaiveDate) -> Option<NaiveDate> {
    let this_year = anniversary_in(date, from.year())?;
    if this_year >= from {
        Some(this_year)
    } else {
        anniversary_in(date, from.year() + 1)
    }
}

/// First anniversary of the stored date `s` on or after `from`.
pub fn next_occurrence(s: &str, from: NaiveDate) -> Option<NaiveDate> {
    next_anniversary(parse_date(s)?, from)
}

/// Calendar years between the stored date `s` and `reference`, never negative.
pub fn years_since(s: &str, reference: NaiveDate) -> Option<u32> {
    let date = parse_date(s)?;
    Some((reference.year() - date.year()).max(0) as u32)
}
