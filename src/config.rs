//! Site configuration module.
//!
//! Handles loading, validating, and overriding `config.toml`. Stock defaults
//! are overridden by an optional `config.toml` in the content root, which is
//! in turn overridden by environment variables / CLI flags (see
//! [`Overrides`]).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! name = "Supply & Demand Beer and Pizza"
//! short_name = "Supply & Demand"
//! description = "Craft beer and artisan pizza in the heart of the community"
//! url = "http://localhost:8080"   # or URL env var
//! language = "en"
//!
//! [site.address]
//! street = "420 Talbot Street"
//! city = "London"
//! province = "Ontario"
//! country = "Canada"
//!
//! [data]
//! source = "sheets"               # or DATA_SOURCE env var
//!
//! [sheets]                        # published-CSV URLs, or SHEET_URL_* env vars
//! beers = "https://docs.google.com/.../pub?output=csv"
//!
//! [fetch]
//! duration = "1h"                 # cache lifetime in development
//! production_duration = "1d"      # cache lifetime with SITE_ENV=production
//!
//! [calendar]
//! months_ahead = 3
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::fetch::CacheDuration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Business identity shown on every page.
    pub site: SiteInfo,
    /// Which adapter supplies the sheets data.
    pub data: DataConfig,
    /// Published-CSV URLs, one per dataset.
    pub sheets: SheetsConfig,
    /// HTTP fetch and cache settings.
    pub fetch: FetchConfig,
    /// Events calendar settings.
    pub calendar: CalendarConfig,
    /// Output settings.
    pub build: BuildConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.name.trim().is_empty() {
            return Err(ConfigError::Validation("site.name must not be empty".into()));
        }
        if self.calendar.months_ahead > 24 {
            return Err(ConfigError::Validation(
                "calendar.months_ahead must be 0-24".into(),
            ));
        }
        for (key, value) in [
            ("fetch.duration", &self.fetch.duration),
            ("fetch.production_duration", &self.fetch.production_duration),
        ] {
            if CacheDuration::parse(value).is_none() {
                return Err(ConfigError::Validation(format!(
                    "{key} must look like \"30m\", \"1h\", \"1d\" or \"*\", got {value:?}"
                )));
            }
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "fetch.timeout_secs must be at least 1".into(),
            ));
        }
        for path in &self.build.passthrough {
            if !is_contained(Path::new(path)) {
                return Err(ConfigError::Validation(format!(
                    "build.passthrough entry {path:?} must be a relative path inside the content directory"
                )));
            }
        }
        if !is_contained(Path::new(&self.build.scss_dir)) {
            return Err(ConfigError::Validation(format!(
                "build.scss_dir {:?} must be a relative path inside the content directory",
                self.build.scss_dir
            )));
        }
        Ok(())
    }

    /// Apply environment / command-line overrides on top of file values.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(source) = &overrides.data_source {
            self.data.source = source.clone();
        }
        if let Some(url) = &overrides.url {
            self.site.url = url.clone();
        }
        let sheets = [
            (&overrides.sheet_beers, &mut self.sheets.beers),
            (&overrides.sheet_menu, &mut self.sheets.menu),
            (&overrides.sheet_events, &mut self.sheets.events),
            (&overrides.sheet_hours, &mut self.sheets.hours),
        ];
        for (value, slot) in sheets {
            if let Some(url) = value {
                *slot = Some(url.clone());
            }
        }
    }

    /// The cache lifetime for the given environment.
    pub fn cache_duration(&self, env: Environment) -> CacheDuration {
        let raw = match env {
            Environment::Development => &self.fetch.duration,
            Environment::Production => &self.fetch.production_duration,
        };
        CacheDuration::parse(raw).unwrap_or(CacheDuration::Expires(3600))
    }
}

/// Values that take precedence over `config.toml`, typically from the
/// environment (`DATA_SOURCE`, `SHEET_URL_*`, `URL`).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_source: Option<String>,
    pub url: Option<String>,
    pub sheet_beers: Option<String>,
    pub sheet_menu: Option<String>,
    pub sheet_events: Option<String>,
    pub sheet_hours: Option<String>,
}

/// Build environment. Production caches sheet responses longer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Business identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub name: String,
    pub short_name: String,
    pub description: String,
    /// Public base URL of the deployed site.
    pub url: String,
    pub language: String,
    pub author: String,
    pub address: Address,
    pub contact: Contact,
    pub social: Social,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "Supply & Demand Beer and Pizza".to_string(),
            short_name: "Supply & Demand".to_string(),
            description: "Craft beer and artisan pizza in the heart of the community".to_string(),
            url: "http://localhost:8080".to_string(),
            language: "en".to_string(),
            author: "Supply & Demand Beer and Pizza".to_string(),
            address: Address::default(),
            contact: Contact::default(),
            social: Social::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub province: String,
    pub country: String,
    pub postal_code: String,
}

impl Default for Address {
    fn default() -> Self {
        Self {
            street: "420 Talbot Street".to_string(),
            city: "London".to_string(),
            province: "Ontario".to_string(),
            country: "Canada".to_string(),
            postal_code: String::new(),
        }
    }
}

impl Address {
    /// Non-empty parts joined for a one-line footer address.
    pub fn one_line(&self) -> String {
        [
            &self.street,
            &self.city,
            &self.province,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.as_str())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Contact {
    pub email: String,
    pub phone: String,
}

impl Default for Contact {
    fn default() -> Self {
        Self {
            email: "info@beerlab.com".to_string(),
            phone: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Social {
    pub facebook: String,
    pub instagram: String,
    pub twitter: String,
}

impl Default for Social {
    fn default() -> Self {
        Self {
            facebook: "https://www.facebook.com/SupplyDemandBrewery".to_string(),
            instagram: "https://www.instagram.com/supplydemandbrewery".to_string(),
            twitter: String::new(),
        }
    }
}

/// Data source selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// `sheets` or `squarespace`. Resolved leniently, see
    /// [`crate::sources::DataSourceKind::resolve`].
    pub source: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: "sheets".to_string(),
        }
    }
}

/// Published-CSV URLs. A missing URL leaves that dataset empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
}

/// HTTP fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    pub user_agent: String,
    /// Cache lifetime in development, e.g. `"1h"`.
    pub duration: String,
    /// Cache lifetime in production, e.g. `"1d"`.
    pub production_duration: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Supply-Demand-Website/1.0".to_string(),
            duration: "1h".to_string(),
            production_duration: "1d".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Events calendar settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarConfig {
    /// Month pages generated after the current one.
    pub months_ahead: u32,
    /// Events listed on the home page.
    pub upcoming_limit: usize,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            months_ahead: 3,
            upcoming_limit: 4,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Paths under the content root copied to the output unchanged.
    pub passthrough: Vec<String>,
    /// Directory (relative to the content root) added to the SCSS load path.
    pub scss_dir: String,
    /// Number of beers featured on the home page.
    pub featured_beers: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            passthrough: vec![
                "assets/js".to_string(),
                "assets/images".to_string(),
                "logo.jpg".to_string(),
            ],
            scss_dir: "assets/scss".to_string(),
            featured_beers: 6,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// True for a non-empty relative path made only of normal components, so
/// joining it onto a directory can never leave that directory.
pub fn is_contained(path: &Path) -> bool {
    let mut components = path.components().peekable();
    components.peek().is_some()
        && components.all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `config.toml` in the content root, merged over stock
/// defaults, with unknown keys rejected.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load, apply overrides, and re-validate.
pub fn load_with_overrides(root: &Path, overrides: &Overrides) -> Result<SiteConfig, ConfigError> {
    let mut config = load_config(root)?;
    config.apply(overrides);
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Taproom Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Place this file in the content root.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Business identity
# ---------------------------------------------------------------------------
[site]
name = "Supply & Demand Beer and Pizza"
short_name = "Supply & Demand"
description = "Craft beer and artisan pizza in the heart of the community"
# Public base URL. The URL environment variable overrides this.
url = "http://localhost:8080"
language = "en"
author = "Supply & Demand Beer and Pizza"

[site.address]
street = "420 Talbot Street"
city = "London"
province = "Ontario"
country = "Canada"
postal_code = ""

[site.contact]
email = "info@beerlab.com"
phone = ""

[site.social]
facebook = "https://www.facebook.com/SupplyDemandBrewery"
instagram = "https://www.instagram.com/supplydemandbrewery"
twitter = ""

# ---------------------------------------------------------------------------
# Data source
# ---------------------------------------------------------------------------
[data]
# "sheets" (published Google Sheets CSVs) or "squarespace" (not yet available).
# The DATA_SOURCE environment variable overrides this.
source = "sheets"

# Published-CSV URLs. SHEET_URL_BEERS, SHEET_URL_MENU, SHEET_URL_EVENTS and
# SHEET_URL_HOURS override these. A missing URL leaves that list empty.
[sheets]
# beers = "https://docs.google.com/spreadsheets/d/e/.../pub?gid=0&output=csv"
# menu = ""
# events = ""
# hours = ""

# ---------------------------------------------------------------------------
# Fetching
# ---------------------------------------------------------------------------
[fetch]
user_agent = "Supply-Demand-Website/1.0"
# How long a fetched sheet is reused: <n>s, m, h, d, w, y, or "*" for forever.
duration = "1h"
# Used instead when building with SITE_ENV=production.
production_duration = "1d"
timeout_secs = 30

# ---------------------------------------------------------------------------
# Events calendar
# ---------------------------------------------------------------------------
[calendar]
# Month pages generated after the current month (0-24).
months_ahead = 3
# Upcoming events listed on the home page.
upcoming_limit = 4

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[build]
# Copied to the output directory unchanged.
passthrough = ["assets/js", "assets/images", "logo.jpg"]
# Extra SCSS load path, relative to the content root.
scss_dir = "assets/scss"
# Beers featured on the home page.
featured_beers = 6
"##
}
