//! Shared test utilities for the taproom test suite.
//!
//! Provides fixture setup, event builders, an in-memory [`Fetch`], and a
//! ready-made [`DataManifest`] for generate-stage tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let trivia = recurring_event("Trivia", "Every Monday");
//! let fetcher = StaticFetcher::new(&[("https://x.test/beers.csv", "name\nPale Ale\n")]);
//! let calls = fetcher.calls();
//! ```

use std::cell::Cell;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::fetch::{Fetch, FetchError};
use crate::sources::DataManifest;
use crate::types::{Beer, DataSet, Event, HoursEntry, MenuItem};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Event builders
// =========================================================================

/// An active event with only a title.
pub fn event(title: &str) -> Event {
    Event {
        title: title.to_string(),
        active: true,
        ..Event::default()
    }
}

/// An active one-off event on `date` (`YYYY-MM-DD`).
pub fn fixed_event(title: &str, date: &str) -> Event {
    Event {
        date: Some(date.to_string()),
        ..event(title)
    }
}

/// An active recurring event, e.g. `recurring_event("Trivia", "Every Monday")`.
pub fn recurring_event(title: &str, pattern: &str) -> Event {
    Event {
        recurring_pattern: Some(pattern.to_string()),
        ..event(title)
    }
}

// =========================================================================
// StaticFetcher
// =========================================================================

/// Serves canned bodies by URL and counts requests. Unknown URLs fail the
/// way a 404 would.
pub struct StaticFetcher {
    bodies: HashMap<String, String>,
    calls: Rc<Cell<u32>>,
}

impl StaticFetcher {
    pub fn new(bodies: &[(&str, &str)]) -> Self {
        Self {
            bodies: bodies
                .iter()
                .map(|(url, body)| (url.to_string(), body.to_string()))
                .collect(),
            calls: Rc::new(Cell::new(0)),
        }
    }

    /// Shared request counter; stays readable after the fetcher is moved.
    pub fn calls(&self) -> Rc<Cell<u32>> {
        Rc::clone(&self.calls)
    }
}

impl Fetch for StaticFetcher {
    fn fetch_text(&mut self, url: &str) -> Result<String, FetchError> {
        self.calls.set(self.calls.get() + 1);
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

// =========================================================================
// Manifests
// =========================================================================

pub fn fetched_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
}

/// A small but complete data set: two beers, three menu items in two
/// categories, a weekly and a one-off event, and two hours rows.
pub fn sample_manifest() -> DataManifest {
    let now = fetched_at();
    let beer = |name: &str, style: &str, abv: &str| Beer {
        name: name.to_string(),
        style: Some(style.to_string()),
        abv: Some(abv.to_string()),
        price: Some("8".to_string()),
        ..Beer::default()
    };
    let dish = |name: &str, category: &str, price: &str| MenuItem {
        item_name: name.to_string(),
        category: Some(category.to_string()),
        price: Some(price.to_string()),
        ..MenuItem::default()
    };
    let hours = |day: &str, hours: &str, sort: i64| HoursEntry {
        day: day.to_string(),
        hours: hours.to_string(),
        is_special: false,
        sort,
    };

    DataManifest {
        source: "sheets".to_string(),
        fetched_at: now,
        beers: DataSet::loaded(
            vec![
                beer("Lab Rat Pale", "American Pale Ale", "5.2"),
                beer("Night Shift Stout", "Dry Stout", "4.6"),
            ],
            now,
        ),
        menu: DataSet::loaded(
            vec![
                dish("Margherita", "Pizza", "16"),
                dish("Caesar", "Salads", "12.5"),
                dish("Pepperoni", "Pizza", "18"),
            ],
            now,
        ),
        events: DataSet::loaded(
            vec![
                Event {
                    time_start: Some("7:00 PM".to_string()),
                    ..recurring_event("Trivia Night", "Every Tuesday")
                },
                fixed_event("Halloween Party", "2026-10-31"),
            ],
            now,
        ),
        hours: DataSet::loaded(
            vec![
                hours("Tuesday", "4:00 PM–11:00 PM", 2),
                hours("Monday", "Closed", 1),
            ],
            now,
        ),
        config: SiteConfig::default(),
    }
}
