//! # Taproom
//!
//! A static site generator for a brewpub's marketing site. The tap list, food
//! menu, events and opening hours live in spreadsheets that staff edit; the
//! site is rebuilt from them and deployed as plain HTML.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Fetch     sheets (CSV over HTTP, disk cached)  →  data.json
//! 2. Generate  data.json + content/                 →  dist/
//! ```
//!
//! The data manifest between the stages is human-readable JSON, so a failed
//! build can be debugged by reading it, and the generate stage can be rerun
//! offline against yesterday's data.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`sources`] | Stage 1: data source adapters producing the [`sources::DataManifest`] |
//! | [`fetch`] | HTTP fetching with an on-disk response cache |
//! | [`generate`] | Stage 2: renders the HTML site with Maud |
//! | [`recurrence`] | "3rd Wednesday" / "Every Monday" → dates in a month |
//! | [`calendar`] | Months, event schedules and the rendered month grid |
//! | [`pages`] | Markdown content pages with optional TOML front matter |
//! | [`styles`] | SCSS compilation with `grass` |
//! | [`hours`] | Opening-hours rows → display strings |
//! | [`filters`] | Small formatting helpers for templates |
//! | [`config`] | `config.toml` loading, validation and env overrides |
//! | [`types`] | Records shared between stages |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## The Calendar Is Rendered at Build Time
//!
//! Event dates are resolved when the site is built, using the build date as
//! "today". The month pages are plain HTML with no client-side date logic, so
//! a scheduled daily rebuild keeps them current.
//!
//! ## Broken Data Never Breaks the Build
//!
//! A missing sheet URL, an HTTP failure or a malformed CSV turns into an empty
//! list with a short message on the page. Only problems in the content
//! directory itself (bad front matter, SCSS errors) fail a build, because
//! those are fixed by whoever is running it.

pub mod calendar;
pub mod config;
pub mod fetch;
pub mod filters;
pub mod generate;
pub mod hours;
pub mod logging;
pub mod output;
pub mod pages;
pub mod recurrence;
pub mod sources;
pub mod styles;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
