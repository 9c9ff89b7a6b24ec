//! End-to-end build: fixture content + in-memory sheets → a rendered site.

use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use taproom::config::{self, Overrides};
use taproom::fetch::{Fetch, FetchError};
use taproom::generate;
use taproom::sources::sheets::SheetsSource;
use taproom::sources::{self, DataSourceKind};
use tempfile::TempDir;

const BEERS: &str = "\
Name,Style,ABV,IBU,Description,Price
Lab Rat Pale,American Pale Ale,5.2,38,Citrus and pine,8
Night Shift Stout,Dry Stout,4.6,30,,7.5
,,,,,
";

const MENU: &str = "\
Item Name,Category,Description,Price,Dietary
Margherita,Pizza,\"Tomato, basil, mozzarella\",16,V
Caesar,Salads,,12.5,
Pepperoni,Pizza,,18,
";

const EVENTS: &str = "\
Title,Date,Recurring Pattern,Active,Time Start,Time End,Price,Description,Image URL,Image Alt
Trivia Night,,Every Tuesday,TRUE,7:00 PM,9:00 PM,Free,Teams of up to six,trivia.svg,Trivia cards
Vinyl Night,,3rd Wednesday,TRUE,8:00 PM,,,,,
Halloween Party,2026-10-31,,TRUE,9:00 PM,,$10,,,
Summer Patio Launch,2026-06-01,,TRUE,,,,,,
Cancelled Karaoke,,Every Thursday,FALSE,,,,,,
";

const HOURS: &str = "\
Day,Open,Close,Label,Type,Sort,Active
Monday,,,Closed,regular,1,TRUE
Tuesday,16:00,23:00,,regular,2,TRUE
2026-12-25,,,Christmas Day – Closed,holiday,90,TRUE
Wednesday,16:00,23:00,,regular,3,FALSE
";

/// Serves canned sheet bodies; anything else is a 404.
struct Sheets(HashMap<String, String>);

impl Fetch for Sheets {
    fn fetch_text(&mut self, url: &str) -> Result<String, FetchError> {
        self.0.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content")
}

fn url(name: &str) -> String {
    format!("https://sheets.test/{name}.csv")
}

/// Fetch (with the menu sheet missing when `with_menu` is false) and generate
/// into a fresh output directory.
fn build(with_menu: bool) -> (TempDir, generate::GenerateReport) {
    let overrides = Overrides {
        sheet_beers: Some(url("beers")),
        sheet_menu: with_menu.then(|| url("menu")),
        sheet_events: Some(url("events")),
        sheet_hours: Some(url("hours")),
        ..Overrides::default()
    };
    let config = config::load_with_overrides(&fixtures(), &overrides).unwrap();

    let mut bodies = HashMap::new();
    bodies.insert(url("beers"), BEERS.to_string());
    bodies.insert(url("events"), EVENTS.to_string());
    bodies.insert(url("hours"), HOURS.to_string());
    if with_menu {
        bodies.insert(url("menu"), MENU.to_string());
    }

    let now = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
    let mut source = SheetsSource::new(Sheets(bodies), config.sheets.clone());
    let manifest = sources::load_all(&mut source, DataSourceKind::Sheets, &config, now);

    let out = TempDir::new().unwrap();
    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let report = generate::generate(&manifest, &fixtures(), out.path(), today).unwrap();
    (out, report)
}

fn read(out: &TempDir, rel: &str) -> String {
    fs::read_to_string(out.path().join(rel)).unwrap_or_else(|e| panic!("{rel}: {e}"))
}

#[test]
fn builds_every_page() {
    let (out, report) = build(true);
    assert_eq!(
        report.pages,
        vec![
            "/",
            "/menu/",
            "/beers/",
            "/events/",
            "/events/2026-10/",
            "/events/2026-11/",
            "/events/2026-12/",
            "/events/2027-01/",
            "/about/",
            "/accessibility/",
        ]
    );
    assert!(out.path().join("assets/scss/main.css").exists());
    assert!(out.path().join("assets/images/events/trivia.svg").exists());
}

#[test]
fn home_page_lists_the_next_four_occurrences() {
    let (out, _) = build(true);
    let html = read(&out, "index.html");
    // Tuesdays Oct 20 and 27, Vinyl Night is Oct 21 (3rd Wednesday), Halloween Oct 31.
    let order = [
        "Tuesday, October 20, 2026",
        "Wednesday, October 21, 2026",
        "Tuesday, October 27, 2026",
        "Saturday, October 31, 2026",
    ];
    let positions: Vec<usize> = order.iter().map(|d| html.find(d).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(!html.contains("Tuesday, November 3, 2026"));
    assert!(html.contains("Christmas Day – Closed"));
    assert!(html.contains("Dec 25"));
}

#[test]
fn november_calendar_resolves_recurring_and_ordinal_patterns() {
    let (out, _) = build(true);
    let html = read(&out, "events/2026-11/index.html");
    for day in ["2026-11-03", "2026-11-10", "2026-11-17", "2026-11-24", "2026-11-18"] {
        assert!(html.contains(&format!("id=\"date-{day}\"")), "{day} missing");
    }
    // Vinyl Night is only the third Wednesday.
    assert!(!html.contains("id=\"date-2026-11-11\""));
    // Inactive events never show.
    assert!(!html.contains("Cancelled Karaoke"));
}

#[test]
fn past_one_off_events_are_not_listed() {
    let (out, _) = build(true);
    for page in ["index.html", "events/index.html"] {
        assert!(!read(&out, page).contains("Summer Patio Launch"));
    }
}

#[test]
fn event_images_resolve_under_assets() {
    let (out, _) = build(true);
    let html = read(&out, "events/index.html");
    assert!(html.contains("src=\"/assets/images/events/trivia.svg\""));
}

#[test]
fn menu_renders_categories_and_prices() {
    let (out, _) = build(true);
    let html = read(&out, "menu/index.html");
    assert!(html.contains("Tomato, basil, mozzarella"));
    assert!(html.contains("$16.00"));
    assert!(html.find("Pizza").unwrap() < html.find("Salads").unwrap());
}

#[test]
fn missing_sheet_shows_message_and_build_continues() {
    let (out, _) = build(false);
    let html = read(&out, "menu/index.html");
    assert!(html.contains("Data source not configured"));
    assert!(read(&out, "beers/index.html").contains("Lab Rat Pale"));
}

#[test]
fn config_from_content_root_is_used() {
    let (out, _) = build(true);
    let html = read(&out, "about/index.html");
    assert!(html.contains("About Supply &amp; Demand | Supply &amp; Demand Beer and Pizza"));
    assert!(html.contains("https://supplyanddemand.example/about/"));
    assert!(html.contains("519-555-0142"));
}
