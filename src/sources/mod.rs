//! Data source adapters.
//!
//! Stage 1 of the build. A [`DataSource`] supplies the four datasets the site
//! renders (beers, menu, events, hours); [`load_all`] collects them into a
//! [`DataManifest`] that the generate stage consumes.
//!
//! ## Failure policy
//!
//! A broken data source must never break the build. Every dataset that can't
//! be loaded becomes an empty [`DataSet`] carrying a short, user-facing
//! message, and the pages show that message in place of the list. The real
//! cause goes to the log.
//!
//! ## Adapters
//!
//! | Kind | Adapter |
//! |------|---------|
//! | `sheets` | [`sheets::SheetsSource`]: published Google Sheets CSVs |
//! | `squarespace` | [`squarespace::SquarespaceSource`]: placeholder, always fails |

pub mod sheets;
pub mod squarespace;

use crate::config::SiteConfig;
use crate::fetch::FetchError;
use crate::types::{Beer, DataSet, Event, HoursEntry, MenuItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Squarespace data source is not yet implemented. Please use DATA_SOURCE=sheets instead.")]
    SquarespaceUnavailable,
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
}

/// One of the four datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Beers,
    Menu,
    Events,
    Hours,
}

impl Dataset {
    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Beers => "beers",
            Dataset::Menu => "menu",
            Dataset::Events => "events",
            Dataset::Hours => "hours",
        }
    }

    /// Environment variable holding this dataset's sheet URL.
    pub fn env_var(&self) -> &'static str {
        match self {
            Dataset::Beers => "SHEET_URL_BEERS",
            Dataset::Menu => "SHEET_URL_MENU",
            Dataset::Events => "SHEET_URL_EVENTS",
            Dataset::Hours => "SHEET_URL_HOURS",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Supplies the site's datasets. `now` stamps each result's `last_updated`.
pub trait DataSource {
    fn beers(&mut self, now: DateTime<Utc>) -> Result<DataSet<Beer>, SourceError>;
    fn menu(&mut self, now: DateTime<Utc>) -> Result<DataSet<MenuItem>, SourceError>;
    fn events(&mut self, now: DateTime<Utc>) -> Result<DataSet<Event>, SourceError>;
    fn hours(&mut self, now: DateTime<Utc>) -> Result<DataSet<HoursEntry>, SourceError>;
}

/// Which adapter to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataSourceKind {
    #[default]
    Sheets,
    Squarespace,
}

impl DataSourceKind {
    /// Case- and whitespace-insensitive. Unknown names fall back to sheets
    /// with an error in the log rather than failing the build.
    pub fn resolve(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "" | "sheets" => DataSourceKind::Sheets,
            "squarespace" => DataSourceKind::Squarespace,
            _ => {
                tracing::error!("Unknown DATA_SOURCE: {raw:?}. Defaulting to sheets.");
                DataSourceKind::Sheets
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataSourceKind::Sheets => "sheets",
            DataSourceKind::Squarespace => "squarespace",
        }
    }
}

/// Everything the generate stage needs, written to `data.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataManifest {
    pub source: String,
    pub fetched_at: DateTime<Utc>,
    pub beers: DataSet<Beer>,
    pub menu: DataSet<MenuItem>,
    pub events: DataSet<Event>,
    pub hours: DataSet<HoursEntry>,
    pub config: SiteConfig,
}

/// Load every dataset from `source`. Adapter errors are logged and turned
/// into empty datasets carrying the error message.
pub fn load_all(
    source: &mut dyn DataSource,
    kind: DataSourceKind,
    config: &SiteConfig,
    now: DateTime<Utc>,
) -> DataManifest {
    DataManifest {
        source: kind.name().to_string(),
        fetched_at: now,
        beers: settle(source.beers(now), Dataset::Beers, kind, now),
        menu: settle(source.menu(now), Dataset::Menu, kind, now),
        events: settle(source.events(now), Dataset::Events, kind, now),
        hours: settle(source.hours(now), Dataset::Hours, kind, now),
        config: config.clone(),
    }
}

fn settle<T>(
    result: Result<DataSet<T>, SourceError>,
    dataset: Dataset,
    kind: DataSourceKind,
    now: DateTime<Utc>,
) -> DataSet<T> {
    result.unwrap_or_else(|e| {
        tracing::error!(dataset = dataset.name(), "Adapter error ({}): {e}", kind.name());
        DataSet::failed(e.to_string(), now)
    })
}
