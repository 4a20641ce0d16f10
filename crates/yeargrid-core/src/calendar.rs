use anyhow::{Context, anyhow};
use chrono::{Datelike, Days, Months, NaiveDate};
use regex::Regex;
use tracing::warn;

pub const MONTH_NAMES_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub const DAY_NAMES_SHORT: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// 0-based offset of `date` from January 1 of its own year.
pub fn day_of_year_index(date: NaiveDate) -> u32 {
    date.ordinal0()
}

/// Weekday of January 1, 0=Sunday..6=Saturday.
pub fn first_weekday_of_year(year: i32) -> u32 {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .map(|d| d.weekday().num_days_from_sunday())
        .unwrap_or_else(|| {
            warn!(year, "year outside representable range; treating Jan 1 as Sunday");
            0
        })
}

/// Remaps a Sunday-based weekday into the configured week-start convention.
pub fn normalize_leading_offset(weekday: u32, monday_first: bool) -> u32 {
    if monday_first {
        if weekday == 0 { 6 } else { weekday - 1 }
    } else {
        weekday
    }
}

/// Strict `YYYY-MM-DD` parse. Anything else is a degenerate input, not an
/// error: callers render an empty grid for `None`.
pub fn parse_reference_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Resolves a human date expression to a calendar date.
///
/// Supported forms: `today`/`tomorrow`/`yesterday`, `YYYY-MM-DD`, a 4-digit
/// year (January 1), month names (the 1st of that month in `today`'s year),
/// weekday names (the next such weekday after `today`), and relative offsets
/// `+Nd`/`-Nd`/`+Nw`/`-Nw`/`+Nm`/`-Nm`.
pub fn parse_date_expr(input: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let token = input.trim();
    let lower = token.to_ascii_lowercase();

    match lower.as_str() {
        "today" => return Ok(today),
        "tomorrow" => {
            return today
                .checked_add_days(Days::new(1))
                .ok_or_else(|| anyhow!("cannot advance past the end of the calendar"));
        }
        "yesterday" => {
            return today
                .checked_sub_days(Days::new(1))
                .ok_or_else(|| anyhow!("cannot step before the start of the calendar"));
        }
        _ => {}
    }

    if token.len() == 4 && token.chars().all(|c| c.is_ascii_digit()) {
        let year: i32 = token.parse().context("invalid 4-digit year")?;
        return NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| anyhow!("invalid year value: {year}"));
    }

    if let Some(month) = parse_month_name(&lower) {
        return NaiveDate::from_ymd_opt(today.year(), month, 1)
            .ok_or_else(|| anyhow!("invalid month value: {month}"));
    }

    if let Some(target) = parse_weekday_name(&lower) {
        return Ok(next_weekday_date(today, target));
    }

    let rel_re = Regex::new(r"^(?P<sign>[+-])(?P<num>\d+)(?P<unit>[dwm])$")
        .map_err(|e| anyhow!("internal regex compile failure: {e}"))?;

    if let Some(caps) = rel_re.captures(token) {
        let sign = caps
            .name("sign")
            .map(|m| m.as_str())
            .ok_or_else(|| anyhow!("missing relative sign"))?;
        let num: u64 = caps
            .name("num")
            .map(|m| m.as_str())
            .ok_or_else(|| anyhow!("missing relative amount"))?
            .parse()
            .context("invalid relative number")?;
        let unit = caps
            .name("unit")
            .map(|m| m.as_str())
            .ok_or_else(|| anyhow!("missing relative unit"))?;

        let shifted = match (sign, unit) {
            ("+", "d") => today.checked_add_days(Days::new(num)),
            ("-", "d") => today.checked_sub_days(Days::new(num)),
            ("+", "w") => today.checked_add_days(Days::new(num * 7)),
            ("-", "w") => today.checked_sub_days(Days::new(num * 7)),
            ("+", "m") => u32::try_from(num)
                .ok()
                .and_then(|months| today.checked_add_months(Months::new(months))),
            ("-", "m") => u32::try_from(num)
                .ok()
                .and_then(|months| today.checked_sub_months(Months::new(months))),
            _ => None,
        };
        return shifted.ok_or_else(|| anyhow!("relative offset out of range: {token}"));
    }

    if let Some(date) = parse_reference_date(token) {
        return Ok(date);
    }

    Err(anyhow!("unrecognized date expression: {input}")).with_context(|| {
        "supported formats: today/tomorrow/yesterday, YYYY-MM-DD, 4-digit year, \
         month names (e.g. march), weekday names (e.g. monday), +Nd/-Nd/+Nw/-Nw/+Nm/-Nm"
    })
}

fn parse_weekday_name(token: &str) -> Option<chrono::Weekday> {
    use chrono::Weekday;
    match token.trim() {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

fn next_weekday_date(from: NaiveDate, target: chrono::Weekday) -> NaiveDate {
    let from_idx = from.weekday().num_days_from_monday() as i64;
    let target_idx = target.num_days_from_monday() as i64;
    let mut delta = (7 + target_idx - from_idx) % 7;
    if delta == 0 {
        delta = 7;
    }
    from.checked_add_days(Days::new(delta as u64)).unwrap_or(from)
}

fn parse_month_name(token: &str) -> Option<u32> {
    match token.trim() {
        "january" | "jan" => Some(1),
        "february" | "feb" => Some(2),
        "march" | "mar" => Some(3),
        "april" | "apr" => Some(4),
        "may" => Some(5),
        "june" | "jun" => Some(6),
        "july" | "jul" => Some(7),
        "august" | "aug" => Some(8),
        "september" | "sep" | "sept" => Some(9),
        "october" | "oct" => Some(10),
        "november" | "nov" => Some(11),
        "december" | "dec" => Some(12),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn leap_year_boundaries() {
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(2023));
        assert!(is_leap_year(2024));
    }

    #[test]
    fn days_in_year_matches_leap_status() {
        for year in [1900, 1999, 2000, 2023, 2024, 2100] {
            let expected = if is_leap_year(year) { 366 } else { 365 };
            assert_eq!(days_in_year(year), expected, "year {year}");
        }
    }

    #[test]
    fn day_of_year_index_is_zero_based() {
        assert_eq!(day_of_year_index(date(2024, 1, 1)), 0);
        assert_eq!(day_of_year_index(date(2024, 3, 15)), 74);
        assert_eq!(day_of_year_index(date(2024, 12, 31)), 365);
        assert_eq!(day_of_year_index(date(2023, 12, 31)), 364);
    }

    #[test]
    fn first_weekday_of_known_years() {
        // Jan 1 2024 was a Monday, Jan 1 2023 a Sunday, Jan 1 2021 a Friday.
        assert_eq!(first_weekday_of_year(2024), 1);
        assert_eq!(first_weekday_of_year(2023), 0);
        assert_eq!(first_weekday_of_year(2021), 5);
    }

    #[test]
    fn leading_offset_normalization() {
        assert_eq!(normalize_leading_offset(1, false), 1);
        assert_eq!(normalize_leading_offset(1, true), 0);
        assert_eq!(normalize_leading_offset(0, true), 6);
        assert_eq!(normalize_leading_offset(6, true), 5);
        assert_eq!(normalize_leading_offset(0, false), 0);
    }

    #[test]
    fn reference_date_parses_strictly() {
        assert_eq!(parse_reference_date("2024-03-15"), Some(date(2024, 3, 15)));
        assert_eq!(parse_reference_date(" 2024-02-29 "), Some(date(2024, 2, 29)));
        assert_eq!(parse_reference_date("2023-02-29"), None);
        assert_eq!(parse_reference_date("not-a-date"), None);
        assert_eq!(parse_reference_date("15/03/2024"), None);
    }

    #[test]
    fn expr_today_and_neighbors() {
        let today = date(2026, 2, 17);
        assert_eq!(parse_date_expr("today", today).expect("today"), today);
        assert_eq!(
            parse_date_expr("tomorrow", today).expect("tomorrow"),
            date(2026, 2, 18)
        );
        assert_eq!(
            parse_date_expr("yesterday", today).expect("yesterday"),
            date(2026, 2, 16)
        );
    }

    #[test]
    fn expr_year_and_month_names() {
        let today = date(2026, 2, 17);
        assert_eq!(parse_date_expr("2028", today).expect("year"), date(2028, 1, 1));
        assert_eq!(parse_date_expr("march", today).expect("month"), date(2026, 3, 1));
        assert_eq!(parse_date_expr("sept", today).expect("month"), date(2026, 9, 1));
    }

    #[test]
    fn expr_weekday_names_move_forward() {
        // 2026-02-17 is a Tuesday; the next Wednesday is the 18th, the next
        // Tuesday wraps a full week.
        let today = date(2026, 2, 17);
        assert_eq!(
            parse_date_expr("wednesday", today).expect("weekday"),
            date(2026, 2, 18)
        );
        assert_eq!(
            parse_date_expr("tuesday", today).expect("weekday"),
            date(2026, 2, 24)
        );
    }

    #[test]
    fn expr_relative_offsets() {
        let today = date(2026, 2, 17);
        assert_eq!(parse_date_expr("+10d", today).expect("+10d"), date(2026, 2, 27));
        assert_eq!(parse_date_expr("-1w", today).expect("-1w"), date(2026, 2, 10));
        assert_eq!(parse_date_expr("+2m", today).expect("+2m"), date(2026, 4, 17));
    }

    #[test]
    fn expr_rejects_garbage() {
        let today = date(2026, 2, 17);
        assert!(parse_date_expr("sometime soon", today).is_err());
        assert!(parse_date_expr("+5x", today).is_err());
    }
}
