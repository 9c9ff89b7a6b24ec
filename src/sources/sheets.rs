//! Google Sheets adapter.
//!
//! Each dataset is a sheet published to the web as CSV. The first row holds
//! column names, which are normalized before use (`" Item Name "` →
//! `item_name`), so editors can label columns however reads best to them.
//!
//! Rows without their key column (`name`, `item_name`, `title`, or `day` for
//! hours) are skipped; spreadsheets are full of half-typed rows.

use super::{DataSource, Dataset, SourceError};
use crate::config::SheetsConfig;
use crate::fetch::Fetch;
use crate::hours;
use crate::types::{Beer, DataSet, Event, HoursEntry, MenuItem, Row};
use chrono::{DateTime, Utc};

/// Shown when a dataset has no URL configured.
pub const NOT_CONFIGURED: &str = "Data source not configured";

/// A parsed CSV body plus any recoverable problems found in it.
#[derive(Debug, Default)]
pub struct ParsedSheet {
    pub rows: Vec<Row>,
    pub warnings: Vec<String>,
}

/// `"  Recurring   Pattern "` → `"recurring_pattern"`.
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Parse a CSV body with a header row.
///
/// Lenient the way a spreadsheet export needs: short rows are padded (the
/// missing cells are simply absent), long rows drop the extra cells, and
/// rows with nothing but blank cells are skipped. Each of those is reported
/// as a warning rather than failing the sheet.
pub fn parse_csv(text: &str) -> ParsedSheet {
    let mut sheet = ParsedSheet::default();
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(h) => h.iter().map(normalize_header).collect(),
        Err(e) => {
            sheet.warnings.push(format!("header row: {e}"));
            return sheet;
        }
    };

    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                sheet.warnings.push(e.to_string());
                continue;
            }
        };
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        if record.len() != headers.len() {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            sheet.warnings.push(format!(
                "line {line}: expected {} fields, found {}",
                headers.len(),
                record.len()
            ));
        }
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, cell)| (header.clone(), cell.to_string()))
            .collect();
        sheet.rows.push(row);
    }
    sheet
}

/// Fetches each dataset's published CSV through `F`.
pub struct SheetsSource<F> {
    fetcher: F,
    urls: SheetsConfig,
}

impl<F: Fetch> SheetsSource<F> {
    pub fn new(fetcher: F, urls: SheetsConfig) -> Self {
        Self { fetcher, urls }
    }

    fn url(&self, dataset: Dataset) -> Option<&str> {
        let url = match dataset {
            Dataset::Beers => &self.urls.beers,
            Dataset::Menu => &self.urls.menu,
            Dataset::Events => &self.urls.events,
            Dataset::Hours => &self.urls.hours,
        };
        url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// Rows of one dataset, or the user-facing message explaining why there
    /// are none.
    fn rows(&mut self, dataset: Dataset) -> Result<Vec<Row>, String> {
        let Some(url) = self.url(dataset).map(str::to_string) else {
            tracing::warn!(
                "{} not configured. Using empty {} list.",
                dataset.env_var(),
                dataset
            );
            return Err(NOT_CONFIGURED.to_string());
        };

        let text = self.fetcher.fetch_text(&url).map_err(|e| {
            tracing::error!(%url, "Failed to fetch {dataset} data: {e}");
            format!("Unable to load {dataset} at this time")
        })?;

        let sheet = parse_csv(&text);
        if !sheet.warnings.is_empty() {
            tracing::warn!(
                dataset = dataset.name(),
                warnings = ?sheet.warnings,
                "CSV parsing warnings"
            );
        }
        Ok(sheet.rows)
    }

    fn load<T>(
        &mut self,
        dataset: Dataset,
        noun: &str,
        now: DateTime<Utc>,
        build: impl Fn(Vec<Row>) -> Vec<T>,
    ) -> DataSet<T> {
        match self.rows(dataset) {
            Ok(rows) => {
                let items = build(rows);
                tracing::info!("Loaded {} {noun} from Google Sheets", items.len());
                DataSet::loaded(items, now)
            }
            Err(message) => DataSet::failed(message, now),
        }
    }
}

fn has_cell(row: &Row, key: &str) -> bool {
    row.get(key).is_some_and(|v| !v.trim().is_empty())
}

impl<F: Fetch> DataSource for SheetsSource<F> {
    fn beers(&mut self, now: DateTime<Utc>) -> Result<DataSet<Beer>, SourceError> {
        Ok(self.load(Dataset::Beers, "beers", now, |rows| {
            rows.iter()
                .filter(|r| has_cell(r, "name"))
                .map(Beer::from_row)
                .collect()
        }))
    }

    fn menu(&mut self, now: DateTime<Utc>) -> Result<DataSet<MenuItem>, SourceError> {
        Ok(self.load(Dataset::Menu, "menu items", now, |rows| {
            rows.iter()
                .filter(|r| has_cell(r, "item_name"))
                .map(MenuItem::from_row)
                .collect()
        }))
    }

    fn events(&mut self, now: DateTime<Utc>) -> Result<DataSet<Event>, SourceError> {
        Ok(self.load(Dataset::Events, "events", now, |rows| {
            rows.iter()
                .filter(|r| has_cell(r, "title"))
                .map(Event::from_row)
                .collect()
        }))
    }

    fn hours(&mut self, now: DateTime<Utc>) -> Result<DataSet<HoursEntry>, SourceError> {
        Ok(self.load(Dataset::Hours, "hours entries", now, |rows| {
            rows.iter()
                .filter(|r| hours::is_listed(r))
                .map(hours::entry_from_row)
                .collect()
        }))
    }
}
