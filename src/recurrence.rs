//! Recurring event date resolution.
//!
//! Event sheets describe repeating events in free text: "Every Monday",
//! "3rd Wednesday", "First Friday of the month". This module turns such a
//! pattern into the concrete dates it covers in a given month.
//!
//! ## Matching rules
//!
//! Matching is loose, since the text is typed by hand into a spreadsheet:
//!
//! - The **weekday** is the first weekday name (Sunday through Saturday, in
//!   that order) that appears anywhere in the lowercased pattern. No weekday,
//!   no dates.
//! - The **ordinal** is the first of `1st, first, 2nd, second, 3rd, third,
//!   4th, fourth, 5th, fifth` found in the pattern. No ordinal means every
//!   occurrence of the weekday.
//!
//! ```text
//! "Every Monday"        → all Mondays
//! "3rd Wednesday"       → the third Wednesday
//! "First Friday"        → the first Friday
//! "5th Monday"          → the fifth Monday, or nothing in a four-Monday month
//! "Trivia night"        → nothing
//! ```

use crate::calendar::Month;
use chrono::{Datelike, NaiveDate, Weekday};

/// Weekday names in scan order. Sunday first, so "Sunday brunch & Monday
/// trivia" resolves to Sunday.
const WEEKDAYS: [(&str, Weekday); 7] = [
    ("sunday", Weekday::Sun),
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
];

/// Ordinal tokens in scan order; the first hit wins.
const ORDINALS: [(&str, u32); 10] = [
    ("1st", 1),
    ("first", 1),
    ("2nd", 2),
    ("second", 2),
    ("3rd", 3),
    ("third", 3),
    ("4th", 4),
    ("fourth", 4),
    ("5th", 5),
    ("fifth", 5),
];

/// A parsed recurrence rule: a weekday and, optionally, which occurrence of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrencePattern {
    pub weekday: Weekday,
    /// `Some(n)` selects the n-th occurrence (1-based); `None` means every one.
    pub ordinal: Option<u32>,
}

impl RecurrencePattern {
    /// Parse a free-text pattern. Returns `None` when no weekday name is present.
    pub fn parse(pattern: &str) -> Option<Self> {
        let lower = pattern.to_lowercase();
        let weekday = WEEKDAYS
            .iter()
            .find(|(name, _)| lower.contains(name))
            .map(|&(_, day)| day)?;
        let ordinal = ORDINALS
            .iter()
            .find(|(token, _)| lower.contains(token))
            .map(|&(_, n)| n);
        Some(Self { weekday, ordinal })
    }

    /// All dates in `month` matching this rule, in ascending order.
    pub fn dates_in_month(&self, month: Month) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut occurrence = 0;
        for date in month.dates() {
            if date.weekday() != self.weekday {
                continue;
            }
            occurrence += 1;
            match self.ordinal {
                None => dates.push(date),
                Some(n) if n == occurrence => {
                    dates.push(date);
                    break;
                }
                Some(_) => {}
            }
        }
        dates
    }

    /// Whether `date` is one of the dates this rule produces.
    pub fn matches(&self, date: NaiveDate) -> bool {
        self.dates_in_month(Month::containing(date)).contains(&date)
    }
}

/// Resolve a free-text pattern straight to dates. Unrecognised or empty
/// patterns resolve to nothing.
pub fn recurring_dates(pattern: &str, month: Month) -> Vec<NaiveDate> {
    RecurrencePattern::parse(pattern)
        .map(|rule| rule.dates_in_month(month))
        .unwrap_or_default()
}
