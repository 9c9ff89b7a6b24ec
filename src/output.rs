//! CLI output formatting for all pipeline stages.
//!
//! # Output Format
//!
//! ## Fetch
//!
//! ```text
//! Data (sheets)
//! 001 Beers: 12 loaded
//! 002 Menu: 0 loaded
//!     Error: Data source not configured
//! 003 Events: 5 loaded
//! 004 Hours: 8 loaded
//! Cache: 3 cached, 0 fetched (3 total)
//! ```
//!
//! ## Generate
//!
//! ```text
//! Pages
//! 001 / → index.html
//! 002 /menu/ → menu/index.html
//!
//! Stylesheets
//! 001 assets/scss/main.scss → assets/scss/main.css
//!
//! Generated 9 pages, 1 stylesheet, 4 copied files
//! ```
//!
//! ## Dates
//!
//! ```text
//! 3rd Wednesday in November 2026
//!     Wednesday, November 18, 2026
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::calendar::Month;
use crate::config::SiteConfig;
use crate::fetch::CacheStats;
use crate::filters;
use crate::generate::GenerateReport;
use crate::pages::Page;
use crate::sources::DataManifest;
use crate::types::DataSet;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

/// `"/"` → `"index.html"`, `"/menu/"` → `"menu/index.html"`.
fn page_file(url: &str) -> String {
    let trimmed = url.trim_matches('/');
    if trimmed.is_empty() {
        "index.html".to_string()
    } else {
        format!("{trimmed}/index.html")
    }
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

// ============================================================================
// Fetch
// ============================================================================

fn dataset_lines<T>(lines: &mut Vec<String>, index: usize, label: &str, set: &DataSet<T>) {
    lines.push(format!(
        "{} {}: {} loaded",
        format_index(index),
        label,
        set.items.len()
    ));
    if let Some(error) = &set.error {
        lines.push(format!("{}Error: {}", indent(1), error));
    }
}

/// Per-dataset summary of a fetch, plus cache statistics when the data came
/// over HTTP.
pub fn format_fetch_output(manifest: &DataManifest, stats: Option<CacheStats>) -> Vec<String> {
    let mut lines = vec![format!("Data ({})", manifest.source)];
    dataset_lines(&mut lines, 1, "Beers", &manifest.beers);
    dataset_lines(&mut lines, 2, "Menu", &manifest.menu);
    dataset_lines(&mut lines, 3, "Events", &manifest.events);
    dataset_lines(&mut lines, 4, "Hours", &manifest.hours);
    if let Some(stats) = stats
        && stats.total() > 0
    {
        lines.push(format!("Cache: {stats}"));
    }
    lines
}

/// Print fetch output to stdout.
pub fn print_fetch_output(manifest: &DataManifest, stats: Option<CacheStats>) {
    for line in format_fetch_output(manifest, stats) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Every written page and stylesheet, then totals.
pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    for (i, url) in report.pages.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            url,
            page_file(url)
        ));
    }

    if !report.stylesheets.is_empty() {
        lines.push(String::new());
        lines.push("Stylesheets".to_string());
        for (i, style) in report.stylesheets.iter().enumerate() {
            lines.push(format!(
                "{} {} \u{2192} {}",
                format_index(i + 1),
                display_path(&style.source),
                display_path(&style.output)
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {}",
        plural(report.pages.len(), "page", "pages"),
        plural(report.stylesheets.len(), "stylesheet", "stylesheets"),
        plural(report.copied.len(), "copied file", "copied files"),
    ));
    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// What a build would use, without fetching anything.
pub fn format_check_output(
    config: &SiteConfig,
    source: &str,
    pages: &[Page],
    stylesheets: &[PathBuf],
    content_root: &Path,
) -> Vec<String> {
    let mut lines = vec![
        format!("Site: {}", config.site.name),
        format!("Data source: {source}"),
        "Sheets".to_string(),
    ];
    let sheets = [
        ("beers", &config.sheets.beers),
        ("menu", &config.sheets.menu),
        ("events", &config.sheets.events),
        ("hours", &config.sheets.hours),
    ];
    for (name, url) in sheets {
        let status = match url.as_deref().map(str::trim) {
            Some(u) if !u.is_empty() => "configured",
            _ => "not configured",
        };
        lines.push(format!("{}{name}: {status}", indent(1)));
    }

    if !pages.is_empty() {
        lines.push("Pages".to_string());
        for (i, page) in pages.iter().enumerate() {
            let hidden = if page.in_nav { "" } else { " (hidden)" };
            lines.push(format!(
                "{} {} \u{2192} {}{hidden}",
                format_index(i + 1),
                page.title,
                page.href()
            ));
        }
    }

    if !stylesheets.is_empty() {
        lines.push("Stylesheets".to_string());
        for path in stylesheets {
            let rel = path.strip_prefix(content_root).unwrap_or(path);
            lines.push(format!("{}{}", indent(1), display_path(rel)));
        }
    }
    lines
}

/// Print check output to stdout.
pub fn print_check_output(
    config: &SiteConfig,
    source: &str,
    pages: &[Page],
    stylesheets: &[PathBuf],
    content_root: &Path,
) {
    for line in format_check_output(config, source, pages, stylesheets, content_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Dates
// ============================================================================

/// The dates a recurring pattern resolves to in one month.
pub fn format_dates_output(pattern: &str, month: Month, dates: &[NaiveDate]) -> Vec<String> {
    let mut lines = vec![format!("{} in {}", pattern.trim(), month)];
    if dates.is_empty() {
        lines.push(format!("{}(no matching dates)", indent(1)));
    }
    for date in dates {
        lines.push(format!("{}{}", indent(1), filters::format_naive_date(*date)));
    }
    lines
}

/// Print dates output to stdout.
pub fn print_dates_output(pattern: &str, month: Month, dates: &[NaiveDate]) {
    for line in format_dates_output(pattern, month, dates) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
