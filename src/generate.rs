//! HTML site generation.
//!
//! Stage 2 of the build pipeline. Takes the data manifest written by the fetch
//! stage plus the content directory and produces the final static site.
//!
//! ## Generated Pages
//!
//! - **Home** (`/index.html`): description, opening hours, upcoming events,
//!   featured beers
//! - **Menu** (`/menu/`): food menu grouped by category, in sheet order
//! - **Beers** (`/beers/`): the full tap list
//! - **Events** (`/events/`): today's month; plus `/events/YYYY-MM/` for today's
//!   month and `[calendar] months_ahead` more, each with prev/next/today links
//! - **Markdown pages** (`/{slug}/`): see [`crate::pages`]
//!
//! A dataset that failed to load shows its message in an alert where the list
//! would be. The rest of the page renders normally.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── menu/index.html
//! ├── beers/index.html
//! ├── events/
//! │   ├── index.html             # today's month
//! │   ├── 2026-10/index.html
//! │   └── 2026-11/index.html
//! ├── about/index.html           # from 040-about.md
//! ├── assets/
//! │   ├── scss/main.css          # compiled from main.scss
//! │   ├── js/…                   # passthrough
//! │   └── images/…               # passthrough
//! └── logo.jpg                   # passthrough
//! ```
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::calendar::{EventCalendar, Month, render_event_card};
use crate::config::{self, SiteConfig};
use crate::filters;
use crate::hours;
use crate::pages::{self, Page, PageError};
use crate::sources::DataManifest;
use crate::styles::{self, CompiledStyle, StyleError};
use crate::types::{Beer, HoursEntry, MenuItem};
use chrono::NaiveDate;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Page error: {0}")]
    Page(#[from] PageError),
    #[error("Style error: {0}")]
    Style(#[from] StyleError),
    #[error("passthrough path {path} is outside the content directory")]
    OutsideContent { path: PathBuf },
    #[error("copying {path}: {source}")]
    Copy {
        path: PathBuf,
        source: walkdir::Error,
    },
}

/// What a generate run wrote.
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// URL paths of every HTML page, in write order (`/`, `/menu/`, …).
    pub pages: Vec<String>,
    pub stylesheets: Vec<CompiledStyle>,
    /// Passthrough files, relative to the output root.
    pub copied: Vec<PathBuf>,
}

/// A top-level navigation entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NavLink {
    pub title: String,
    pub href: String,
}

/// Everything every page needs to render the shared layout.
struct Site<'a> {
    config: &'a SiteConfig,
    nav: Vec<NavLink>,
    stylesheets: Vec<String>,
    today: NaiveDate,
}

/// Read a `data.json` written by the fetch stage.
pub fn load_manifest(path: &Path) -> Result<DataManifest, GenerateError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Render the whole site into `output_dir`. `today` anchors the calendar:
/// events before it are not shown and the events index is its month.
pub fn generate(
    manifest: &DataManifest,
    content_dir: &Path,
    output_dir: &Path,
    today: NaiveDate,
) -> Result<GenerateReport, GenerateError> {
    let config = &manifest.config;
    let mut report = GenerateReport::default();
    fs::create_dir_all(output_dir)?;

    report.stylesheets = styles::compile_all(content_dir, output_dir, &config.build.scss_dir)?;
    report.copied = copy_passthrough(content_dir, output_dir, &config.build.passthrough)?;

    let md_pages = pages::load_pages(content_dir)?;
    let site = Site {
        config,
        nav: build_nav(&md_pages),
        stylesheets: report
            .stylesheets
            .iter()
            .map(|s| format!("/{}", url_path(&s.output)))
            .collect(),
        today,
    };
    let calendar = EventCalendar::new(&manifest.events.items, today);

    let mut write = |path: &str, markup: Markup| -> Result<(), GenerateError> {
        write_page(output_dir, path, markup)?;
        report.pages.push(path.to_string());
        Ok(())
    };

    write("/", render_home(&site, manifest, &calendar))?;
    write("/menu/", render_menu(&site, manifest))?;
    write("/beers/", render_beers(&site, manifest))?;

    let current = calendar.current_month();
    let mut month = current;
    for _ in 0..=config.calendar.months_ahead {
        let is_last = month_offset(current, month) >= config.calendar.months_ahead;
        let markup = render_events_month(&site, manifest, &calendar, month, !is_last);
        if month == current {
            write("/events/", markup.clone())?;
        }
        write(&format!("/events/{}/", month.iso()), markup)?;
        month = month.succ();
    }

    for page in &md_pages {
        write(&page.href(), render_markdown_page(&site, page))?;
    }

    tracing::info!(
        pages = report.pages.len(),
        stylesheets = report.stylesheets.len(),
        copied = report.copied.len(),
        "site generated at {}",
        output_dir.display()
    );
    Ok(report)
}

fn month_offset(from: Month, to: Month) -> u32 {
    let months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    months.max(0) as u32
}

fn url_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// `/` → `index.html`, `/menu/` → `menu/index.html`.
fn write_page(output_dir: &Path, url: &str, markup: Markup) -> std::io::Result<()> {
    let dir = output_dir.join(url.trim_matches('/'));
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("index.html"), markup.into_string())
}

/// Copy each configured passthrough path (file or directory) verbatim.
/// Paths that don't exist are skipped.
fn copy_passthrough(
    content_dir: &Path,
    output_dir: &Path,
    paths: &[String],
) -> Result<Vec<PathBuf>, GenerateError> {
    let mut copied = Vec::new();
    for rel in paths {
        if !config::is_contained(Path::new(rel)) {
            return Err(GenerateError::OutsideContent { path: rel.into() });
        }
        let src = content_dir.join(rel);
        if !src.exists() {
            tracing::debug!(path = %rel, "passthrough path missing, skipping");
            continue;
        }
        for entry in WalkDir::new(&src) {
            let entry = entry.map_err(|source| GenerateError::Copy {
                path: src.clone(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = match entry.path().strip_prefix(content_dir) {
                Ok(relative) if config::is_contained(relative) => relative.to_path_buf(),
                _ => {
                    return Err(GenerateError::OutsideContent {
                        path: entry.path().to_path_buf(),
                    });
                }
            };
            let dest = output_dir.join(&relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &dest)?;
            copied.push(relative);
        }
    }
    copied.sort();
    Ok(copied)
}

/// Fixed sections first, then numbered markdown pages in order.
pub fn build_nav(md_pages: &[Page]) -> Vec<NavLink> {
    let fixed = [("Home", "/"), ("Menu", "/menu/"), ("Beers", "/beers/"), ("Events", "/events/")];
    fixed
        .iter()
        .map(|(title, href)| NavLink {
            title: title.to_string(),
            href: href.to_string(),
        })
        .chain(md_pages.iter().filter(|p| p.in_nav).map(|p| NavLink {
            title: p.link_title.clone(),
            href: p.href(),
        }))
        .collect()
}

// ============================================================================
// HTML Components
// ============================================================================

fn base_document(
    site: &Site,
    title: Option<&str>,
    description: Option<&str>,
    path: &str,
    content: Markup,
) -> Markup {
    let info = &site.config.site;
    let full_title = match title {
        Some(t) => format!("{t} | {}", info.name),
        None => info.name.clone(),
    };
    let description = description.unwrap_or(&info.description);
    let canonical = format!("{}{}", info.url.trim_end_matches('/'), path);

    html! {
        (DOCTYPE)
        html lang=(info.language) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (full_title) }
                meta name="description" content=(description);
                meta name="author" content=(info.author);
                link rel="canonical" href=(canonical);
                meta property="og:title" content=(full_title);
                meta property="og:description" content=(description);
                meta property="og:url" content=(canonical);
                @for href in &site.stylesheets {
                    link rel="stylesheet" href=(href);
                }
            }
            body {
                a.visually-hidden href="#main" { "Skip to content" }
                (site_header(site, path))
                main id="main" { (content) }
                (site_footer(site))
            }
        }
    }
}

fn site_header(site: &Site, path: &str) -> Markup {
    html! {
        header.site-header {
            nav.navbar aria-label="Main navigation" {
                a.navbar-brand href="/" { (site.config.site.short_name) }
                ul.nav-links {
                    @for link in &site.nav {
                        @let is_current = is_current_link(&link.href, path);
                        li class=[is_current.then_some("current")] {
                            a href=(link.href) aria-current=[is_current.then_some("page")] { (link.title) }
                        }
                    }
                }
            }
        }
    }
}

fn is_current_link(href: &str, path: &str) -> bool {
    if href == "/" {
        path == "/"
    } else {
        path.starts_with(href)
    }
}

fn site_footer(site: &Site) -> Markup {
    let info = &site.config.site;
    let social = [
        ("Facebook", "fab fa-facebook", &info.social.facebook),
        ("Instagram", "fab fa-instagram", &info.social.instagram),
        ("Twitter", "fab fa-twitter", &info.social.twitter),
    ];

    html! {
        footer.site-footer {
            address {
                span.footer-name { (info.name) }
                br;
                (info.address.one_line())
            }
            p.footer-contact {
                @if !info.contact.email.is_empty() {
                    a href={ "mailto:" (info.contact.email) } { (info.contact.email) }
                }
                @if !info.contact.phone.is_empty() {
                    " · "
                    a href={ "tel:" (info.contact.phone) } { (info.contact.phone) }
                }
            }
            ul.social-links {
                @for (label, icon, url) in social {
                    @if !url.is_empty() {
                        li {
                            a href=(url) target="_blank" rel="noopener" {
                                i class=(icon) aria-hidden="true" {}
                                span.visually-hidden { (label) }
                            }
                        }
                    }
                }
            }
            p.copyright { "© " (filters::current_year(site.today)) " " (info.name) }
        }
    }
}

fn dataset_alert(message: &str) -> Markup {
    html! {
        div.alert.alert-warning role="alert" {
            p.mb-0 { (message) }
        }
    }
}

fn render_hours_table(entries: &[HoursEntry]) -> Markup {
    html! {
        table.hours-table {
            tbody {
                @for entry in hours::sorted(entries) {
                    tr class=[entry.is_special.then_some("special")] {
                        th scope="row" { (entry.day) }
                        td { (entry.hours) }
                    }
                }
            }
        }
    }
}

fn render_beer(beer: &Beer) -> Markup {
    html! {
        article.beer-card {
            h3.beer-name { (beer.name) }
            @if let Some(style) = &beer.style {
                p.beer-style { (style) }
            }
            @if beer.abv.is_some() || beer.ibu.is_some() {
                p.beer-stats {
                    @if let Some(abv) = &beer.abv {
                        span.beer-abv { (abv) "% ABV" }
                    }
                    @if let Some(ibu) = &beer.ibu {
                        " " span.beer-ibu { (ibu) " IBU" }
                    }
                }
            }
            @if let Some(description) = &beer.description {
                p.beer-description { (description) }
            }
            @if let Some(price) = &beer.price {
                p.beer-price { (filters::format_price(price)) }
            }
        }
    }
}

fn render_menu_item(item: &MenuItem) -> Markup {
    html! {
        div.menu-item {
            div.menu-item-header {
                h3.menu-item-name { (item.item_name) }
                @if let Some(price) = &item.price {
                    span.menu-item-price { (filters::format_price(price)) }
                }
            }
            @if let Some(description) = &item.description {
                p.menu-item-description { (description) }
            }
            @if let Some(dietary) = &item.dietary {
                span.badge.dietary { (dietary) }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

fn render_home(site: &Site, manifest: &DataManifest, calendar: &EventCalendar) -> Markup {
    let config = site.config;
    let upcoming = calendar.upcoming(
        config.calendar.upcoming_limit,
        config.calendar.months_ahead + 1,
    );
    let featured: Vec<&Beer> = manifest
        .beers
        .items
        .iter()
        .take(config.build.featured_beers)
        .collect();

    let content = html! {
        section.hero {
            h1 { (config.site.name) }
            p.lead { (config.site.description) }
        }
        section.hours {
            h2 { "Hours" }
            @if let Some(error) = &manifest.hours.error {
                (dataset_alert(error))
            } @else if manifest.hours.items.is_empty() {
                p { "Hours coming soon." }
            } @else {
                (render_hours_table(&manifest.hours.items))
            }
        }
        section.upcoming-events {
            h2 { "Upcoming Events" }
            @if let Some(error) = &manifest.events.error {
                (dataset_alert(error))
            } @else if upcoming.is_empty() {
                p { "No upcoming events. Check back soon!" }
            } @else {
                @for (date, event) in &upcoming {
                    div.upcoming-event {
                        p.event-date { (filters::format_naive_date(*date)) }
                        (render_event_card(event))
                    }
                }
            }
            a.hero-btn href="/events/" { "Full calendar" }
        }
        section.featured-beers {
            h2 { "On Tap" }
            @if let Some(error) = &manifest.beers.error {
                (dataset_alert(error))
            } @else {
                div.beer-grid {
                    @for beer in &featured {
                        (render_beer(beer))
                    }
                }
            }
            a.hero-btn href="/beers/" { "All beers" }
        }
    };
    base_document(site, None, None, "/", content)
}

fn render_menu(site: &Site, manifest: &DataManifest) -> Markup {
    let items = &manifest.menu.items;
    let categories = filters::unique(items.iter().map(category_of));

    let content = html! {
        h1 { "Menu" }
        @if let Some(error) = &manifest.menu.error {
            (dataset_alert(error))
        } @else if items.is_empty() {
            p { "Menu coming soon." }
        } @else {
            @for category in &categories {
                section.menu-category {
                    h2 { (category) }
                    @for item in items.iter().filter(|i| category_of(i) == *category) {
                        (render_menu_item(item))
                    }
                }
            }
        }
    };
    base_document(site, Some("Menu"), None, "/menu/", content)
}

fn category_of(item: &MenuItem) -> &str {
    item.category.as_deref().unwrap_or("Other")
}

fn render_beers(site: &Site, manifest: &DataManifest) -> Markup {
    let content = html! {
        h1 { "Beers" }
        @if let Some(error) = &manifest.beers.error {
            (dataset_alert(error))
        } @else if manifest.beers.items.is_empty() {
            p { "Tap list coming soon." }
        } @else {
            div.beer-grid {
                @for beer in &manifest.beers.items {
                    (render_beer(beer))
                }
            }
        }
    };
    base_document(site, Some("Beers"), None, "/beers/", content)
}

fn render_events_month(
    site: &Site,
    manifest: &DataManifest,
    calendar: &EventCalendar,
    month: Month,
    has_next: bool,
) -> Markup {
    let path = format!("/events/{}/", month.iso());
    let prev = month.pred();
    let next = month.succ();

    let content = html! {
        h1 { "Events" }
        div.calendar-nav {
            @if calendar.can_go_back(month) {
                a.calendar-prev href={ "/events/" (prev.iso()) "/" } aria-label={ "Previous month, " (prev.to_string()) } { "‹ " (prev.name()) }
            } @else {
                span.calendar-prev.disabled aria-disabled="true" { "‹" }
            }
            h2.calendar-month { (month.to_string()) }
            a.calendar-today href="/events/" { "Today" }
            @if has_next {
                a.calendar-next href={ "/events/" (next.iso()) "/" } aria-label={ "Next month, " (next.to_string()) } { (next.name()) " ›" }
            } @else {
                span.calendar-next.disabled aria-disabled="true" { "›" }
            }
        }
        @if let Some(error) = &manifest.events.error {
            (dataset_alert(error))
        } @else {
            (calendar.render_grid(month))
            div.events-list {
                (calendar.render_events_list(month))
            }
        }
    };
    let title = format!("Events: {month}");
    base_document(site, Some(&title), None, &path, content)
}

fn render_markdown_page(site: &Site, page: &Page) -> Markup {
    let content = html! {
        article.page-content {
            (PreEscaped(page.html()))
        }
    };
    base_document(
        site,
        Some(&page.title),
        page.description.as_deref(),
        &page.href(),
        content,
    )
}
