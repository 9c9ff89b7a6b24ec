use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use taproom::calendar::Month;
use taproom::config::{self, Environment, Overrides, SiteConfig};
use taproom::fetch::{CacheStats, CachedFetcher, HttpFetcher};
use taproom::sources::sheets::SheetsSource;
use taproom::sources::squarespace::SquarespaceSource;
use taproom::sources::{self, DataManifest, DataSourceKind};
use taproom::{generate, logging, output, pages, recurrence, styles};

/// Shared flags for commands that fetch sheet data.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the fetch cache and request every sheet again
    #[arg(long)]
    no_cache: bool,
}

/// Settings normally supplied through the environment.
#[derive(clap::Args, Clone, Default)]
struct EnvArgs {
    /// Data source adapter: sheets or squarespace
    #[arg(long, env = "DATA_SOURCE", global = true)]
    data_source: Option<String>,

    /// Public site URL used for canonical links
    #[arg(long, env = "URL", global = true)]
    url: Option<String>,

    /// Published CSV URL of the beers sheet
    #[arg(long, env = "SHEET_URL_BEERS", global = true)]
    sheet_url_beers: Option<String>,

    /// Published CSV URL of the menu sheet
    #[arg(long, env = "SHEET_URL_MENU", global = true)]
    sheet_url_menu: Option<String>,

    /// Published CSV URL of the events sheet
    #[arg(long, env = "SHEET_URL_EVENTS", global = true)]
    sheet_url_events: Option<String>,

    /// Published CSV URL of the hours sheet
    #[arg(long, env = "SHEET_URL_HOURS", global = true)]
    sheet_url_hours: Option<String>,

    /// Build environment; production caches sheets for longer
    #[arg(long = "env", env = "SITE_ENV", value_enum, default_value_t, global = true)]
    site_env: Environment,
}

impl EnvArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            data_source: self.data_source.clone(),
            url: self.url.clone(),
            sheet_beers: self.sheet_url_beers.clone(),
            sheet_menu: self.sheet_url_menu.clone(),
            sheet_events: self.sheet_url_events.clone(),
            sheet_hours: self.sheet_url_hours.clone(),
        }
    }
}

#[derive(Parser)]
#[command(name = "taproom")]
#[command(about = "Static site generator for a brewpub's website")]
#[command(long_about = "\
Static site generator for a brewpub's website

The tap list, food menu, events and opening hours come from published
spreadsheets; everything else comes from the content directory.

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  ├── 040-about.md                 # Page (numbered = shown in nav)
  ├── accessibility.md             # Page (unnumbered = hidden from nav)
  ├── logo.jpg                     # Copied as-is
  └── assets/
      ├── scss/
      │   ├── main.scss            # Compiled to assets/scss/main.css
      │   └── _variables.scss      # Partial, only imported
      ├── js/                      # Copied as-is
      └── images/events/           # Event images referenced by file name

Sheets (one published CSV each, set in config.toml or the environment):

  beers    name, style, abv, ibu, description, price
  menu     item_name, category, description, price, dietary
  events   title, date | recurring_pattern, active, time_start, time_end, ...
  hours    day, open, close, label, type, sort, active

Recurring events use patterns like \"Every Monday\" or \"3rd Wednesday\".
Try them with 'taproom dates \"First Friday\" --month 2026-11'.

Run 'taproom gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (data manifest)
    #[arg(long, default_value = ".taproom-temp", global = true)]
    temp_dir: PathBuf,

    /// Directory for cached sheet responses
    #[arg(long, default_value = ".taproom-cache", global = true)]
    cache_dir: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    env: EnvArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch sheet data into the data manifest
    Fetch(CacheArgs),
    /// Produce the HTML site from the data manifest
    Generate,
    /// Run the full pipeline: fetch → generate
    Build(CacheArgs),
    /// Validate config and content without fetching
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// Show the dates a recurring pattern falls on in a month
    Dates {
        /// Pattern such as "Every Monday" or "3rd Wednesday"
        pattern: String,
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match &cli.command {
        Command::Fetch(cache_args) => {
            let config = load_config(&cli)?;
            fetch_stage(&cli, &config, cache_args)?;
        }
        Command::Generate => {
            let manifest = generate::load_manifest(&manifest_path(&cli))?;
            let report = generate::generate(
                &manifest,
                &cli.source,
                &cli.output,
                Local::now().date_naive(),
            )?;
            output::print_generate_output(&report);
        }
        Command::Build(cache_args) => {
            let config = load_config(&cli)?;

            println!("==> Stage 1: Fetching data ({})", config.data.source);
            let manifest = fetch_stage(&cli, &config, cache_args)?;

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            let report = generate::generate(
                &manifest,
                &cli.source,
                &cli.output,
                Local::now().date_naive(),
            )?;
            output::print_generate_output(&report);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let config = load_config(&cli)?;
            let kind = DataSourceKind::resolve(&config.data.source);
            let md_pages = pages::load_pages(&cli.source)?;
            let stylesheets = styles::find_stylesheets(&cli.source)?;
            let shared = cli.source.join(&config.build.scss_dir);
            for sheet in &stylesheets {
                styles::compile(sheet, &shared)?;
            }
            output::print_check_output(&config, kind.name(), &md_pages, &stylesheets, &cli.source);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Dates { pattern, month } => {
            let month = match month {
                Some(raw) => Month::parse(raw)
                    .ok_or_else(|| format!("invalid month {raw:?}, expected YYYY-MM"))?,
                None => Month::containing(Local::now().date_naive()),
            };
            let dates = recurrence::recurring_dates(pattern, month);
            output::print_dates_output(pattern, month, &dates);
        }
    }

    Ok(())
}

fn manifest_path(cli: &Cli) -> PathBuf {
    cli.temp_dir.join("data.json")
}

fn load_config(cli: &Cli) -> Result<SiteConfig, config::ConfigError> {
    config::load_with_overrides(&cli.source, &cli.env.overrides())
}

/// Load every dataset, write the data manifest and print the summary.
fn fetch_stage(
    cli: &Cli,
    config: &SiteConfig,
    cache_args: &CacheArgs,
) -> Result<DataManifest, Box<dyn std::error::Error>> {
    let kind = DataSourceKind::resolve(&config.data.source);
    let now = Utc::now();

    let (manifest, stats) = match kind {
        DataSourceKind::Sheets => {
            let http = HttpFetcher::new(
                &config.fetch.user_agent,
                Duration::from_secs(config.fetch.timeout_secs),
            )?;
            let mut fetcher = CachedFetcher::new(
                http,
                &cli.cache_dir,
                config.cache_duration(cli.env.site_env),
                !cache_args.no_cache,
            );
            let mut source = SheetsSource::new(&mut fetcher, config.sheets.clone());
            let manifest = sources::load_all(&mut source, kind, config, now);
            (manifest, Some(fetcher.stats()))
        }
        DataSourceKind::Squarespace => {
            let manifest = sources::load_all(&mut SquarespaceSource, kind, config, now);
            (manifest, None::<CacheStats>)
        }
    };

    write_manifest(&manifest, &manifest_path(cli))?;
    output::print_fetch_output(&manifest, stats);
    Ok(manifest)
}

fn write_manifest(manifest: &DataManifest, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(path, json)
}
