//! Small presentation helpers used by the page templates.
//!
//! Sheet cells are free text, so every helper is forgiving: blank input
//! renders as nothing, and input that doesn't parse is shown unchanged rather
//! than dropped.

use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;
use std::hash::Hash;

/// Where event images live when the sheet gives a bare file name.
pub const EVENT_IMAGE_BASE: &str = "/assets/images/events/";

/// `"2026-01-16"` → `"Friday, January 16, 2026"`.
pub fn format_date(date: &str) -> String {
    let trimmed = date.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(d) => format_naive_date(d),
        Err(_) => date.to_string(),
    }
}

pub fn format_naive_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// `"5"` → `"$5.00"`. Reads the leading number the way a lenient float parse
/// does, so `"5.5 oz"` → `"$5.50"`; anything non-numeric passes through.
pub fn format_price(price: &str) -> String {
    if price.trim().is_empty() {
        return String::new();
    }
    match leading_number(price) {
        Some(n) => format!("${n:.2}"),
        None => price.to_string(),
    }
}

fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            '-' | '+' if i == 0 => {}
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    s[..end].parse().ok()
}

/// Full URLs are kept; bare file names resolve under [`EVENT_IMAGE_BASE`].
pub fn event_image(filename: &str) -> String {
    let filename = filename.trim();
    if filename.is_empty() {
        String::new()
    } else if filename.starts_with("http://") || filename.starts_with("https://") {
        filename.to_string()
    } else {
        format!("{EVENT_IMAGE_BASE}{filename}")
    }
}

/// De-duplicate, keeping first-seen order.
pub fn unique<T, I>(items: I) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    T: Eq + Hash + Clone,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Footer copyright year.
pub fn current_year(today: NaiveDate) -> String {
    today.year().to_string()
}
