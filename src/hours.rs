//! Opening-hours rows: sheet cells in, display strings out.
//!
//! The hours sheet has one row per day (or per holiday) with columns
//! `day, open, close, label, type, sort, active`. Times are entered in 24h
//! `HH:MM`; the site shows 12h times. A `label` ("Closed", "Christmas Day –
//! Closed") overrides the times entirely.

use crate::types::{HoursEntry, Row, is_truthy};
use chrono::{Datelike, NaiveDate};

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Whether a raw hours row should be shown at all: it needs a day and a truthy
/// `active` cell.
pub fn is_listed(row: &Row) -> bool {
    let day = row.get("day").map(|d| d.trim()).unwrap_or("");
    let active = row.get("active").is_some_and(|a| is_truthy(a));
    !day.is_empty() && active
}

/// Build a display entry from a listed row.
pub fn entry_from_row(row: &Row) -> HoursEntry {
    let cell = |key: &str| row.get(key).map(|v| v.trim()).unwrap_or("");
    let is_special = cell("type") == "holiday";
    HoursEntry {
        day: display_day(cell("day"), is_special),
        hours: display_hours(cell("label"), cell("open"), cell("close")),
        is_special,
        sort: cell("sort").parse().unwrap_or(0),
    }
}

/// Label wins, then an open–close range, then "Closed".
pub fn display_hours(label: &str, open: &str, close: &str) -> String {
    if !label.is_empty() {
        label.to_string()
    } else if !open.is_empty() && !close.is_empty() {
        format!("{}–{}", to_12h(open), to_12h(close))
    } else {
        "Closed".to_string()
    }
}

/// Holidays entered as `YYYY-MM-DD` show as `"Dec 25"`.
pub fn display_day(day: &str, is_holiday: bool) -> String {
    if is_holiday && let Ok(date) = NaiveDate::parse_from_str(day, "%Y-%m-%d") {
        return format!("{} {}", MONTH_ABBR[date.month0() as usize], date.day());
    }
    day.to_string()
}

/// `"17:00"` → `"5:00 PM"`, `"00:30"` → `"12:30 AM"`. Unparseable input is
/// returned as-is.
pub fn to_12h(time: &str) -> String {
    let Some((hours, minutes)) = time.split_once(':') else {
        return time.to_string();
    };
    let Ok(h) = hours.trim().parse::<u32>() else {
        return time.to_string();
    };
    let period = if h >= 12 { "PM" } else { "AM" };
    let h12 = match h {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    format!("{h12}:{minutes} {period}")
}

/// Stable sort by the sheet's `sort` column.
pub fn sorted(entries: &[HoursEntry]) -> Vec<&HoursEntry> {
    let mut sorted: Vec<&HoursEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.sort);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn converts_24h_to_12h() {
        assert_eq!(to_12h("17:00"), "5:00 PM");
        assert_eq!(to_12h("12:15"), "12:15 PM");
        assert_eq!(to_12h("00:30"), "12:30 AM");
        assert_eq!(to_12h("09:00"), "9:00 AM");
    }

    #[test]
    fn unparseable_time_passes_through() {
        assert_eq!(to_12h("noon"), "noon");
        assert_eq!(to_12h("ab:cd"), "ab:cd");
    }

    #[test]
    fn hours_prefer_label() {
        assert_eq!(display_hours("Closed for renos", "11:00", "23:00"), "Closed for renos");
        assert_eq!(display_hours("", "11:00", "23:00"), "11:00 AM–11:00 PM");
        assert_eq!(display_hours("", "11:00", ""), "Closed");
    }

    #[test]
    fn holiday_day_is_abbreviated() {
        assert_eq!(display_day("2026-12-25", true), "Dec 25");
        assert_eq!(display_day("2027-01-01", true), "Jan 1");
        assert_eq!(display_day("2026-12-25", false), "2026-12-25");
        assert_eq!(display_day("Boxing Day", true), "Boxing Day");
    }

    #[test]
    fn listed_requires_day_and_active() {
        assert!(is_listed(&row(&[("day", "Monday"), ("active", "TRUE")])));
        assert!(!is_listed(&row(&[("day", "Monday"), ("active", "")])));
        assert!(!is_listed(&row(&[("day", " "), ("active", "TRUE")])));
    }

    #[test]
    fn entry_from_row_formats_everything() {
        let e = entry_from_row(&row(&[
            ("day", "2026-12-25"),
            ("type", "holiday"),
            ("label", "Christmas Day – Closed"),
            ("sort", "90"),
            ("active", "TRUE"),
        ]));
        assert_eq!(e.day, "Dec 25");
        assert_eq!(e.hours, "Christmas Day – Closed");
        assert!(e.is_special);
        assert_eq!(e.sort, 90);
    }

    #[test]
    fn sort_defaults_to_zero_and_is_stable() {
        let entries = vec![
            entry_from_row(&row(&[("day", "Sunday"), ("sort", "7")])),
            entry_from_row(&row(&[("day", "Monday"), ("sort", "x")])),
            entry_from_row(&row(&[("day", "Tuesday")])),
        ];
        let days: Vec<&str> = sorted(&entries).iter().map(|e| e.day.as_str()).collect();
        assert_eq!(days, vec!["Monday", "Tuesday", "Sunday"]);
    }
}
