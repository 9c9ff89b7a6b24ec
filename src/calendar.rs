//! Events calendar: which events fall on which days, and the month views
//! that show them.
//!
//! Every event row carries either a fixed `date` or a free-text
//! `recurring_pattern` (see [`crate::recurrence`]). The [`EventCalendar`]
//! resolves both into concrete dates for a [`Month`] and renders the two
//! pieces of the events page:
//!
//! - a Sunday-first month grid where days with events link to their group,
//! - the by-date list of event cards for the same month.
//!
//! ## Precedence
//!
//! A non-blank `date` always wins. An event that has both a date and a
//! pattern occurs only on its date; the pattern is shown as text but never
//! expanded, so the event can't appear twice.
//!
//! ## Past dates
//!
//! The calendar is anchored on "today" (the build date). Days before today
//! are still drawn in the grid, but they never carry events and never show up
//! in the list, and navigating to months before today's month is disabled.

use crate::filters;
use crate::recurrence::RecurrencePattern;
use crate::types::Event;
use chrono::{Datelike, NaiveDate};
use maud::{Markup, html};
use std::collections::BTreeSet;
use std::fmt;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Column headers, Sunday first: (abbreviation, full name).
const DAY_NAMES: [(&str, &str); 7] = [
    ("Sun", "Sunday"),
    ("Mon", "Monday"),
    ("Tue", "Tuesday"),
    ("Wed", "Wednesday"),
    ("Thu", "Thursday"),
    ("Fri", "Friday"),
    ("Sat", "Saturday"),
];

// ============================================================================
// Month
// ============================================================================

/// A calendar month, e.g. October 2026.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    first: NaiveDate,
}

impl Month {
    /// `month` is 1-based. Returns `None` for an out-of-range month or year.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    /// The month a date falls in.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date - chrono::Days::new(u64::from(date.day0())),
        }
    }

    /// Parse the `YYYY-MM` form used in URLs and on the command line.
    pub fn parse(s: &str) -> Option<Self> {
        let (year, month) = s.trim().split_once('-')?;
        Self::new(year.parse().ok()?, month.parse().ok()?)
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    /// 1-based month number.
    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// Every date of the month in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let month = self.first.month();
        self.first.iter_days().take_while(move |d| d.month() == month)
    }

    pub fn days(&self) -> u32 {
        self.dates().count() as u32
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::containing(date) == *self
    }

    /// The following month. Saturates at the end of chrono's date range.
    pub fn succ(&self) -> Self {
        let (year, month) = match self.month() {
            12 => (self.year() + 1, 1),
            m => (self.year(), m + 1),
        };
        Self::new(year, month).unwrap_or(*self)
    }

    /// The preceding month. Saturates at the start of chrono's date range.
    pub fn pred(&self) -> Self {
        let (year, month) = match self.month() {
            1 => (self.year() - 1, 12),
            m => (self.year(), m - 1),
        };
        Self::new(year, month).unwrap_or(*self)
    }

    pub fn name(&self) -> &'static str {
        MONTH_NAMES[self.first.month0() as usize]
    }

    /// `YYYY-MM`, used for URL segments.
    pub fn iso(&self) -> String {
        format!("{:04}-{:02}", self.year(), self.month())
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.year())
    }
}

// ============================================================================
// Schedule
// ============================================================================

/// How an event places itself on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// A single explicit date.
    Fixed(NaiveDate),
    /// A weekday rule, expanded per month.
    Recurring(RecurrencePattern),
    /// No usable date: blank, unparseable, or a pattern with no weekday.
    Unscheduled,
}

impl Schedule {
    pub fn of(event: &Event) -> Self {
        if let Some(date) = event.date.as_deref() {
            // A fixed date blocks the recurrence rule even when it doesn't parse.
            return NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
                .map(Schedule::Fixed)
                .unwrap_or(Schedule::Unscheduled);
        }
        event
            .recurring_pattern
            .as_deref()
            .and_then(RecurrencePattern::parse)
            .map(Schedule::Recurring)
            .unwrap_or(Schedule::Unscheduled)
    }

    /// Dates this schedule produces within `month`.
    pub fn dates_in_month(&self, month: Month) -> Vec<NaiveDate> {
        match self {
            Schedule::Fixed(date) if month.contains(*date) => vec![*date],
            Schedule::Fixed(_) | Schedule::Unscheduled => Vec::new(),
            Schedule::Recurring(rule) => rule.dates_in_month(month),
        }
    }

    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        match self {
            Schedule::Fixed(d) => *d == date,
            Schedule::Recurring(rule) => rule.matches(date),
            Schedule::Unscheduled => false,
        }
    }
}

// ============================================================================
// EventCalendar
// ============================================================================

/// Active events resolved against a fixed "today".
pub struct EventCalendar<'a> {
    events: Vec<(&'a Event, Schedule)>,
    today: NaiveDate,
}

impl<'a> EventCalendar<'a> {
    /// Inactive events are dropped here and never considered again.
    pub fn new(events: &'a [Event], today: NaiveDate) -> Self {
        let events = events
            .iter()
            .filter(|e| e.active)
            .map(|e| (e, Schedule::of(e)))
            .collect();
        Self { events, today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn current_month(&self) -> Month {
        Month::containing(self.today)
    }

    pub fn is_today(&self, date: NaiveDate) -> bool {
        date == self.today
    }

    /// Today or later.
    pub fn is_upcoming(&self, date: NaiveDate) -> bool {
        date >= self.today
    }

    /// Dates in `month` that carry at least one event, sorted and unique.
    /// Dates before today are left out.
    pub fn event_dates_for_month(&self, month: Month) -> Vec<NaiveDate> {
        self.events
            .iter()
            .flat_map(|(_, schedule)| schedule.dates_in_month(month))
            .filter(|date| self.is_upcoming(*date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Events occurring on `date`, in sheet order.
    pub fn events_for_date(&self, date: NaiveDate) -> Vec<&'a Event> {
        self.events
            .iter()
            .filter(|(_, schedule)| schedule.occurs_on(date))
            .map(|(event, _)| *event)
            .collect()
    }

    /// The next `limit` occurrences from today, looking `months` months ahead
    /// starting with the current month.
    pub fn upcoming(&self, limit: usize, months: u32) -> Vec<(NaiveDate, &'a Event)> {
        let mut found = Vec::new();
        let mut month = self.current_month();
        for _ in 0..months {
            for date in self.event_dates_for_month(month) {
                for event in self.events_for_date(date) {
                    if found.len() == limit {
                        return found;
                    }
                    found.push((date, event));
                }
            }
            month = month.succ();
        }
        found
    }

    /// Navigating backwards stops at today's month.
    pub fn can_go_back(&self, month: Month) -> bool {
        month > self.current_month()
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// The month grid: one row per week, Sunday first, blank cells padding
    /// the first and last week.
    pub fn render_grid(&self, month: Month) -> Markup {
        let event_dates: BTreeSet<NaiveDate> =
            self.event_dates_for_month(month).into_iter().collect();

        let lead = month.first_day().weekday().num_days_from_sunday() as usize;
        let mut cells: Vec<Option<NaiveDate>> = vec![None; lead];
        cells.extend(month.dates().map(Some));
        while cells.len() % 7 != 0 {
            cells.push(None);
        }

        html! {
            table.calendar-table role="grid" aria-label="Events calendar" {
                thead {
                    tr {
                        @for (short, long) in DAY_NAMES {
                            th scope="col" {
                                span aria-hidden="true" { (short) }
                                span.visually-hidden { (long) }
                            }
                        }
                    }
                }
                tbody {
                    @for week in cells.chunks(7) {
                        tr {
                            @for cell in week {
                                @match cell {
                                    Some(date) => {
                                        (self.render_day(*date, event_dates.contains(date)))
                                    }
                                    None => {
                                        td.empty {}
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    fn render_day(&self, date: NaiveDate, has_events: bool) -> Markup {
        let is_today = self.is_today(date);
        let mut classes = vec!["calendar-day"];
        if is_today {
            classes.push("today");
        }
        if has_events {
            classes.push("has-events");
        }

        html! {
            td class=(classes.join(" ")) {
                @if has_events {
                    a.day-link href={ "#date-" (date.format("%Y-%m-%d").to_string()) } {
                        span.day-number { (date.day()) }
                        @if is_today {
                            span.today-label { "Today" }
                        } @else {
                            span.event-label { "Event" }
                        }
                    }
                } @else {
                    span.day-no-link {
                        span.day-number { (date.day()) }
                        @if is_today {
                            span.today-label { "Today" }
                        }
                    }
                }
            }
        }
    }

    /// Event cards for `month`, grouped under a heading per date.
    pub fn render_events_list(&self, month: Month) -> Markup {
        let dates = self.event_dates_for_month(month);

        html! {
            @if dates.is_empty() {
                div.alert.alert-info {
                    p.mb-0 { "No upcoming events for this month. Check back soon!" }
                }
            } @else {
                @for date in &dates {
                    div.date-group id={ "date-" (date.format("%Y-%m-%d").to_string()) } {
                        h3.date-header { (filters::format_naive_date(*date)) }
                        @for event in self.events_for_date(*date) {
                            (render_event_card(event))
                        }
                    }
                }
            }
        }
    }
}

/// A compact event card. Shared by the calendar list and the home page.
pub fn render_event_card(event: &Event) -> Markup {
    let has_actions = event.ticket_link.is_some() || event.instagram_link.is_some();

    html! {
        div.event-card-compact {
            @if let Some(image) = &event.image_url {
                div.event-image {
                    img src=(filters::event_image(image)) alt=(event.image_alt.as_deref().unwrap_or(""));
                }
            }
            div.event-content {
                h4.event-title { (event.title) }
                @if let Some(pattern) = &event.recurring_pattern {
                    p.recurring-pattern {
                        i.fas.fa-calendar-week aria-hidden="true" {}
                        " " (pattern)
                    }
                }
                div.event-meta {
                    @if let Some(start) = &event.time_start {
                        span.event-time {
                            i.far.fa-clock aria-hidden="true" {}
                            " " (start)
                            @if let Some(end) = &event.time_end {
                                " - " (end)
                            }
                        }
                    }
                    @if let Some(price) = &event.price {
                        span.event-price {
                            i.fas.fa-ticket-alt aria-hidden="true" {}
                            " " (price)
                        }
                    }
                }
                @if let Some(description) = &event.description {
                    p.event-description { (description) }
                }
                @if has_actions {
                    div.event-actions {
                        @if let Some(link) = &event.ticket_link {
                            a.hero-btn.hero-btn-sm href=(link) {
                                i.fas.fa-ticket-alt aria-hidden="true" {}
                                " Tickets"
                                span.visually-hidden { " - " (event.title) }
                            }
                        }
                        @if let Some(link) = &event.instagram_link {
                            a.hero-btn.hero-btn-sm href=(link) {
                                i.fab.fa-instagram aria-hidden="true" {}
                                " Instagram"
                                span.visually-hidden { " - " (event.title) }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{event, fixed_event, recurring_event};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn oct_2026() -> Month {
        Month::new(2026, 10).unwrap()
    }

    // =========================================================================
    // Month
    // =========================================================================

    #[test]
    fn month_rejects_out_of_range() {
        assert!(Month::new(2026, 0).is_none());
        assert!(Month::new(2026, 13).is_none());
    }

    #[test]
    fn month_days_handles_lengths() {
        assert_eq!(Month::new(2026, 2).unwrap().days(), 28);
        assert_eq!(Month::new(2028, 2).unwrap().days(), 29);
        assert_eq!(Month::new(2026, 4).unwrap().days(), 30);
        assert_eq!(oct_2026().days(), 31);
    }

    #[test]
    fn month_succ_and_pred_wrap_years() {
        let dec = Month::new(2026, 12).unwrap();
        assert_eq!(dec.succ(), Month::new(2027, 1).unwrap());
        assert_eq!(Month::new(2027, 1).unwrap().pred(), dec);
    }

    #[test]
    fn month_containing_and_display() {
        let m = Month::containing(ymd(2026, 10, 19));
        assert_eq!(m, oct_2026());
        assert_eq!(m.to_string(), "October 2026");
        assert_eq!(m.iso(), "2026-10");
    }

    #[test]
    fn month_parse() {
        assert_eq!(Month::parse("2026-10"), Some(oct_2026()));
        assert_eq!(Month::parse("2026-13"), None);
        assert_eq!(Month::parse("october"), None);
    }

    // =========================================================================
    // Schedule
    // =========================================================================

    #[test]
    fn fixed_date_takes_precedence_over_pattern() {
        let mut e = fixed_event("Release party", "2026-10-24");
        e.recurring_pattern = Some("Every Monday".into());
        assert_eq!(Schedule::of(&e), Schedule::Fixed(ymd(2026, 10, 24)));
    }

    #[test]
    fn unparseable_fixed_date_still_blocks_pattern() {
        let mut e = fixed_event("Mystery", "next week");
        e.recurring_pattern = Some("Every Monday".into());
        assert_eq!(Schedule::of(&e), Schedule::Unscheduled);
    }

    #[test]
    fn pattern_without_weekday_is_unscheduled() {
        let e = recurring_event("Trivia", "now and then");
        assert_eq!(Schedule::of(&e), Schedule::Unscheduled);
    }

    // =========================================================================
    // Event dates
    // =========================================================================

    #[test]
    fn recurring_dates_before_today_are_suppressed() {
        let events = vec![recurring_event("Trivia", "Every Monday")];
        let cal = EventCalendar::new(&events, ymd(2026, 10, 19));
        assert_eq!(
            cal.event_dates_for_month(oct_2026()),
            vec![ymd(2026, 10, 19), ymd(2026, 10, 26)]
        );
    }

    #[test]
    fn fixed_date_in_past_is_suppressed() {
        let events = vec![fixed_event("Old news", "2026-10-02")];
        let cal = EventCalendar::new(&events, ymd(2026, 10, 19));
        assert!(cal.event_dates_for_month(oct_2026()).is_empty());
    }

    #[test]
    fn fixed_date_outside_month_is_ignored() {
        let events = vec![fixed_event("Later", "2026-11-05")];
        let cal = EventCalendar::new(&events, ymd(2026, 10, 1));
        assert!(cal.event_dates_for_month(oct_2026()).is_empty());
        assert_eq!(
            cal.event_dates_for_month(oct_2026().succ()),
            vec![ymd(2026, 11, 5)]
        );
    }

    #[test]
    fn shared_dates_are_deduplicated_and_sorted() {
        let events = vec![
            fixed_event("Tap takeover", "2026-10-26"),
            recurring_event("Trivia", "Every Monday"),
            fixed_event("Cask night", "2026-10-20"),
        ];
        let cal = EventCalendar::new(&events, ymd(2026, 10, 19));
        assert_eq!(
            cal.event_dates_for_month(oct_2026()),
            vec![ymd(2026, 10, 19), ymd(2026, 10, 20), ymd(2026, 10, 26)]
        );
    }

    #[test]
    fn inactive_events_contribute_nothing() {
        let mut e = recurring_event("Retired", "Every Friday");
        e.active = false;
        let events = vec![e];
        let cal = EventCalendar::new(&events, ymd(2026, 10, 1));
        assert!(cal.event_dates_for_month(oct_2026()).is_empty());
        assert!(cal.events_for_date(ymd(2026, 10, 2)).is_empty());
    }

    #[test]
    fn fixed_event_with_pattern_is_not_duplicated() {
        let mut e = fixed_event("Anniversary", "2026-10-26");
        e.recurring_pattern = Some("Every Monday".into());
        let events = vec![e];
        let cal = EventCalendar::new(&events, ymd(2026, 10, 1));

        assert_eq!(cal.event_dates_for_month(oct_2026()), vec![ymd(2026, 10, 26)]);
        assert_eq!(cal.events_for_date(ymd(2026, 10, 26)).len(), 1);
        assert!(cal.events_for_date(ymd(2026, 10, 19)).is_empty());
    }

    #[test]
    fn events_for_date_keeps_sheet_order() {
        let events = vec![
            recurring_event("Trivia", "Every Monday"),
            fixed_event("Tap takeover", "2026-10-26"),
            recurring_event("Open mic", "4th Monday"),
        ];
        let cal = EventCalendar::new(&events, ymd(2026, 10, 1));
        let titles: Vec<&str> = cal
            .events_for_date(ymd(2026, 10, 26))
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Trivia", "Tap takeover", "Open mic"]);
    }

    #[test]
    fn upcoming_spans_months_and_respects_limit() {
        let events = vec![recurring_event("Pizza club", "1st Friday")];
        let cal = EventCalendar::new(&events, ymd(2026, 10, 19));
        let upcoming = cal.upcoming(2, 6);
        let dates: Vec<NaiveDate> = upcoming.iter().map(|(d, _)| *d).collect();
        // October's first Friday has passed.
        assert_eq!(dates, vec![ymd(2026, 11, 6), ymd(2026, 12, 4)]);
    }

    #[test]
    fn cannot_go_back_from_current_month() {
        let events = vec![];
        let cal = EventCalendar::new(&events, ymd(2026, 10, 19));
        assert!(!cal.can_go_back(oct_2026()));
        assert!(cal.can_go_back(oct_2026().succ()));
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    #[test]
    fn grid_pads_leading_and_trailing_cells() {
        let events = vec![];
        let cal = EventCalendar::new(&events, ymd(2026, 10, 19));
        let html = cal.render_grid(oct_2026()).into_string();
        // Oct 1 2026 is a Thursday: 4 leading blanks, 31 days, 0 trailing → 35 cells.
        assert_eq!(html.matches("<tr>").count(), 6); // header + 5 weeks
        assert_eq!(html.matches(r#"<td class="empty">"#).count(), 4);
        assert_eq!(html.matches("calendar-day").count(), 31);
    }

    #[test]
    fn grid_marks_today_and_event_days() {
        let events = vec![fixed_event("Cask night", "2026-10-20")];
        let cal = EventCalendar::new(&events, ymd(2026, 10, 19));
        let html = cal.render_grid(oct_2026()).into_string();
        assert!(html.contains(r#"class="calendar-day today""#));
        assert!(html.contains(r#"class="calendar-day has-events""#));
        assert!(html.contains(r##"href="#date-2026-10-20""##));
        assert!(html.contains("Today"));
        assert!(html.contains("Event"));
    }

    #[test]
    fn grid_today_with_event_shows_today_label() {
        let events = vec![fixed_event("Launch", "2026-10-19")];
        let cal = EventCalendar::new(&events, ymd(2026, 10, 19));
        let html = cal.render_grid(oct_2026()).into_string();
        assert!(html.contains(r#"class="calendar-day today has-events""#));
        assert!(!html.contains("event-label"));
    }

    #[test]
    fn events_list_empty_month_message() {
        let events = vec![];
        let cal = EventCalendar::new(&events, ymd(2026, 10, 19));
        let html = cal.render_events_list(oct_2026()).into_string();
        assert!(html.contains("No upcoming events for this month"));
    }

    #[test]
    fn events_list_groups_by_date() {
        let mut trivia = recurring_event("Trivia", "Every Monday");
        trivia.time_start = Some("7:00 PM".into());
        trivia.time_end = Some("9:00 PM".into());
        let events = vec![trivia];
        let cal = EventCalendar::new(&events, ymd(2026, 10, 19));
        let html = cal.render_events_list(oct_2026()).into_string();
        assert!(html.contains(r#"id="date-2026-10-19""#));
        assert!(html.contains(r#"id="date-2026-10-26""#));
        assert!(html.contains("Monday, October 19, 2026"));
        assert!(html.contains("7:00 PM - 9:00 PM"));
        assert!(html.contains("Every Monday"));
    }

    #[test]
    fn event_card_escapes_and_links() {
        let mut e = event("<b>Tap</b> takeover");
        e.ticket_link = Some("https://tickets.example/tap".into());
        e.image_url = Some("tap.jpg".into());
        let html = render_event_card(&e).into_string();
        assert!(html.contains("&lt;b&gt;Tap&lt;/b&gt;"));
        assert!(html.contains(r#"href="https://tickets.example/tap""#));
        assert!(html.contains(r#"src="/assets/images/events/tap.jpg""#));
        assert!(!html.contains("Instagram"));
    }
}
