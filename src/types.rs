//! Records shared by the fetch and generate stages.
//!
//! These types are serialized into `data.json` between stages and must stay
//! identical on both sides. Each record is built from a normalized sheet
//! [`Row`]; blank cells become `None`, and columns the site doesn't know about
//! are kept in `extra` so a new column never silently disappears.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One CSV row keyed by normalized column name (`"Item Name"` → `item_name`).
pub type Row = BTreeMap<String, String>;

/// The result of loading one dataset. A failed load is an empty set with a
/// user-facing message; pages render the message instead of the list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSet<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub error: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl<T> DataSet<T> {
    pub fn loaded(items: Vec<T>, now: DateTime<Utc>) -> Self {
        Self {
            items,
            error: None,
            last_updated: now,
        }
    }

    pub fn failed(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            items: Vec::new(),
            error: Some(message.into()),
            last_updated: now,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// A beer on the tap list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Beer {
    pub name: String,
    pub style: Option<String>,
    pub abv: Option<String>,
    pub ibu: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Beer {
    pub fn from_row(row: &Row) -> Self {
        let mut cells = Cells::new(row);
        Self {
            name: cells.text("name"),
            style: cells.optional("style"),
            abv: cells.optional("abv"),
            ibu: cells.optional("ibu"),
            description: cells.optional("description"),
            price: cells.optional("price"),
            extra: cells.rest(),
        }
    }
}

/// A food menu item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub item_name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub dietary: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl MenuItem {
    pub fn from_row(row: &Row) -> Self {
        let mut cells = Cells::new(row);
        Self {
            item_name: cells.text("item_name"),
            category: cells.optional("category"),
            description: cells.optional("description"),
            price: cells.optional("price"),
            dietary: cells.optional("dietary"),
            extra: cells.rest(),
        }
    }
}

/// An event. Either `date` (`YYYY-MM-DD`) or `recurring_pattern` places it on
/// the calendar; see [`crate::calendar::Schedule`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub date: Option<String>,
    pub recurring_pattern: Option<String>,
    pub active: bool,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub image_alt: Option<String>,
    pub ticket_link: Option<String>,
    pub instagram_link: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Event {
    pub fn from_row(row: &Row) -> Self {
        let mut cells = Cells::new(row);
        Self {
            title: cells.text("title"),
            date: cells.optional("date"),
            recurring_pattern: cells.optional("recurring_pattern"),
            active: cells.flag("active"),
            time_start: cells.optional("time_start"),
            time_end: cells.optional("time_end"),
            price: cells.optional("price"),
            description: cells.optional("description"),
            image_url: cells.optional("image_url"),
            image_alt: cells.optional("image_alt"),
            ticket_link: cells.optional("ticket_link"),
            instagram_link: cells.optional("instagram_link"),
            extra: cells.rest(),
        }
    }
}

/// A row of the opening-hours table, already formatted for display.
/// See [`crate::hours`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoursEntry {
    /// "Monday", or "Dec 25" for holidays.
    pub day: String,
    /// "4:00 PM–11:00 PM", a custom label, or "Closed".
    pub hours: String,
    pub is_special: bool,
    pub sort: i64,
}

/// Truthy spreadsheet cell: `TRUE`, `yes`, `1`, a checkbox `x`.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1" | "x" | "on"
    )
}

/// Takes known columns out of a row one by one; whatever is left over is
/// returned by [`Cells::rest`].
struct Cells {
    remaining: Row,
}

impl Cells {
    fn new(row: &Row) -> Self {
        Self {
            remaining: row.clone(),
        }
    }

    fn text(&mut self, key: &str) -> String {
        self.remaining
            .remove(key)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    fn optional(&mut self, key: &str) -> Option<String> {
        Some(self.text(key)).filter(|v| !v.is_empty())
    }

    fn flag(&mut self, key: &str) -> bool {
        is_truthy(&self.text(key))
    }

    fn rest(self) -> BTreeMap<String, String> {
        self.remaining
            .into_iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .collect()
    }
}
