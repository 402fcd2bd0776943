//! Date and contact normalization.
//!
//! Roster exports mix `7/5/49`, `07/05/1949`, `15-01-1989` and ISO dates in
//! the same column. Layouts are tried in a fixed order and the first one that
//! yields a valid calendar date wins, so an ambiguous value such as
//! `07/05/12` is always read month-first.

use chrono::NaiveDate;

/// Position of each component within a date string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOrder {
    MonthDayYear,
    DayMonthYear,
    YearMonthDay,
}

/// Number of digits the year component must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearDigits {
    Two,
    Four,
}

/// One accepted date layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateLayout {
    pub order: FieldOrder,
    pub separator: char,
    pub year: YearDigits,
}

impl DateLayout {
    const fn new(order: FieldOrder, separator: char, year: YearDigits) -> Self {
        Self { order, separator, year }
    }

    /// Parse `raw` strictly against this layout.
    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let parts: Vec<&str> = raw.split(self.separator).collect();
        let [a, b, c] = parts.as_slice() else {
            return None;
        };

        let (year, month, day) = match self.order {
            FieldOrder::MonthDayYear => (*c, *a, *b),
            FieldOrder::DayMonthYear => (*c, *b, *a),
            FieldOrder::YearMonthDay => (*a, *b, *c),
        };

        let month = day_or_month(month)?;
        let day = day_or_month(day)?;
        let year = match self.year {
            YearDigits::Two => window_two_digit_year(digits(year, 2)?),
            YearDigits::Four => digits(year, 4)? as i32,
        };

        NaiveDate::from_ymd_opt(year, month, day)
    }
}

use FieldOrder::{DayMonthYear, MonthDayYear, YearMonthDay};
use YearDigits::{Four, Two};

/// Accepted layouts, in priority order.
pub const DATE_LAYOUTS: [DateLayout; 8] = [
    DateLayout::new(MonthDayYear, '/', Two),
    DateLayout::new(MonthDayYear, '/', Four),
    DateLayout::new(DayMonthYear, '/', Two),
    DateLayout::new(DayMonthYear, '/', Four),
    DateLayout::new(DayMonthYear, '-', Two),
    DateLayout::new(DayMonthYear, '-', Four),
    DateLayout::new(YearMonthDay, '-', Four),
    DateLayout::new(DayMonthYear, '.', Four),
];

/// Parse a birthday using the first matching layout in [`DATE_LAYOUTS`].
pub fn parse_birthday(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_LAYOUTS.iter().find_map(|layout| layout.parse(raw))
}

/// Map a two-digit year onto 1931..=2030.
pub fn window_two_digit_year(yy: u32) -> i32 {
    let yy = (yy % 100) as i32;
    if yy <= 30 { 2000 + yy } else { 1900 + yy }
}

/// A day or month component: one or two ASCII digits.
fn day_or_month(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 {
        return None;
    }
    s.parse().ok().filter(|_| s.bytes().all(|b| b.is_ascii_digit()))
}

/// Exactly `width` ASCII digits.
fn digits(s: &str, width: usize) -> Option<u32> {
    if s.len() != width || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Canonicalize a phone-like identifier into a messaging address.
///
/// Spaces, hyphens and parentheses are removed along with a leading `+`.
/// The result is prefixed with `country_code` unless it already starts with
/// it. Length and digit count are not validated. Returns `None` when nothing
/// is left after stripping.
pub fn normalize_contact(raw: &str, country_code: &str) -> Option<String> {
    let stripped: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    let stripped = stripped.trim_start_matches('+');
    if stripped.is_empty() {
        return None;
    }

    if stripped.starts_with(country_code) {
        Some(stripped.to_string())
    } else {
        Some(format!("{country_code}{stripped}"))
    }
}
