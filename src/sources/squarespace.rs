//! Squarespace adapter placeholder.
//!
//! Selecting `DATA_SOURCE=squarespace` is accepted so the switch can be
//! flipped once the integration exists, but every dataset fails for now and
//! the site renders its "unavailable" messages.

use super::{DataSource, SourceError};
use crate::types::{Beer, DataSet, Event, HoursEntry, MenuItem};
use chrono::{DateTime, Utc};

pub struct SquarespaceSource;

impl DataSource for SquarespaceSource {
    fn beers(&mut self, _now: DateTime<Utc>) -> Result<DataSet<Beer>, SourceError> {
        Err(SourceError::SquarespaceUnavailable)
    }

    fn menu(&mut self, _now: DateTime<Utc>) -> Result<DataSet<MenuItem>, SourceError> {
        Err(SourceError::SquarespaceUnavailable)
    }

    fn events(&mut self, _now: DateTime<Utc>) -> Result<DataSet<Event>, SourceError> {
        Err(SourceError::SquarespaceUnavailable)
    }

    fn hours(&mut self, _now: DateTime<Utc>) -> Result<DataSet<HoursEntry>, SourceError> {
        Err(SourceError::SquarespaceUnavailable)
    }
}
