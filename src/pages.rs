//! Markdown content pages.
//!
//! Every `.md` file in the content root becomes a page at `/{slug}/`.
//!
//! ```text
//! content/
//! ├── 040-about.md        # in nav as "about", served at /about/
//! ├── 050-private-events.md
//! └── accessibility.md    # generated, but hidden from nav
//! ```
//!
//! ## Naming
//!
//! Files follow the `NNN-name` convention: the numeric prefix orders the nav
//! and is stripped from the slug; dashes in the name become spaces in the nav
//! label. Unnumbered files are generated but don't appear in the nav.
//!
//! ## Front matter
//!
//! An optional TOML block fenced by `+++` lines at the very top:
//!
//! ```text
//! +++
//! title = "About the Lab"
//! description = "Who brews the beer."
//! +++
//! # About
//! ```
//!
//! The title comes from front matter, else the first `# heading`, else the
//! nav label.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html as md_html};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Slugs owned by generated pages.
pub const RESERVED_SLUGS: &[&str] = &["index", "menu", "beers", "events", "assets"];

const FENCE: &str = "+++";

#[derive(Error, Debug)]
pub enum PageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("{path}: unterminated front matter (missing closing +++)")]
    Unterminated { path: PathBuf },
    #[error("{path} would overwrite the generated /{slug}/ page")]
    ReservedSlug { path: PathBuf, slug: String },
}

/// Result of parsing a numbered entry name like `040-private-events`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Number prefix if present (`40` from `040-private-events`).
    pub number: Option<u32>,
    /// Name after `NNN-`, dashes preserved. The full input when unnumbered.
    pub name: String,
    /// Name with dashes converted to spaces.
    pub display_title: String,
}

/// Parse a file stem following the `NNN-name` convention.
///
/// - `"040-private-events"` → number=Some(40), name="private-events"
/// - `"040"` → number=Some(40), name=""
/// - `"accessibility"` → number=None, name="accessibility"
pub fn parse_entry_name(stem: &str) -> ParsedName {
    if let Some((prefix, rest)) = stem.split_once('-')
        && let Ok(num) = prefix.parse::<u32>()
    {
        return ParsedName {
            number: Some(num),
            name: rest.to_string(),
            display_title: rest.replace('-', " "),
        };
    }
    if let Ok(num) = stem.parse::<u32>() {
        return ParsedName {
            number: Some(num),
            name: String::new(),
            display_title: String::new(),
        };
    }
    ParsedName {
        number: None,
        name: stem.to_string(),
        display_title: stem.replace('-', " "),
    }
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A markdown page ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub title: String,
    /// Nav label: file name with number stripped and dashes as spaces.
    pub link_title: String,
    pub slug: String,
    pub description: Option<String>,
    /// Markdown with the front matter removed.
    pub body: String,
    pub in_nav: bool,
    pub sort_key: u32,
}

impl Page {
    pub fn href(&self) -> String {
        format!("/{}/", self.slug)
    }

    /// Body rendered to HTML (tables, strikethrough and footnotes enabled).
    pub fn html(&self) -> String {
        let mut html = String::new();
        md_html::push_html(&mut html, Parser::new_ext(&self.body, markdown_options()));
        html
    }
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);
    options
}

/// Plain text of the first level-one heading, ignoring headings inside code.
fn first_heading(body: &str) -> Option<String> {
    let mut events = Parser::new_ext(body, markdown_options());
    events.find(|e| matches!(e, Event::Start(Tag::Heading { level: HeadingLevel::H1, .. })))?;
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            _ => {}
        }
    }
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Split `+++`-fenced front matter from the body. `Ok(None)` when the file
/// has no front matter; `Err(())` when the opening fence is never closed.
fn split_front_matter(content: &str) -> Result<(Option<&str>, &str), ()> {
    let Some(rest) = content
        .strip_prefix(FENCE)
        .and_then(|r| r.strip_prefix("\r\n").or_else(|| r.strip_prefix('\n')))
    else {
        return Ok((None, content));
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            return Ok((Some(&rest[..offset]), &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    Err(())
}

/// Parse one markdown file into a page.
pub fn parse_page(path: &Path) -> Result<Page, PageError> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let parsed = parse_entry_name(&stem);

    let content = fs::read_to_string(path)?;
    let (front, body) = split_front_matter(&content).map_err(|()| PageError::Unterminated {
        path: path.to_path_buf(),
    })?;
    let front: FrontMatter = match front {
        Some(text) => toml::from_str(text).map_err(|source| PageError::FrontMatter {
            path: path.to_path_buf(),
            source,
        })?,
        None => FrontMatter::default(),
    };

    let slug = if parsed.name.is_empty() {
        stem.clone()
    } else {
        parsed.name.clone()
    };
    if RESERVED_SLUGS.iter().any(|r| r.eq_ignore_ascii_case(&slug)) {
        return Err(PageError::ReservedSlug {
            path: path.to_path_buf(),
            slug,
        });
    }

    let link_title = if parsed.display_title.is_empty() {
        slug.replace('-', " ")
    } else {
        parsed.display_title
    };
    let title = front
        .title
        .or_else(|| first_heading(body))
        .unwrap_or_else(|| link_title.clone());

    Ok(Page {
        title,
        link_title,
        slug,
        description: front.description,
        body: body.to_string(),
        in_nav: parsed.number.is_some(),
        sort_key: parsed.number.unwrap_or(u32::MAX),
    })
}

/// All markdown pages in the content root, nav pages first in number order,
/// then hidden pages by file name.
pub fn load_pages(root: &Path) -> Result<Vec<Page>, PageError> {
    let mut md_files: Vec<PathBuf> = fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|e| e.eq_ignore_ascii_case("md"))
                    .unwrap_or(false)
        })
        .collect();
    md_files.sort();

    let mut pages = md_files
        .iter()
        .map(|p| parse_page(p))
        .collect::<Result<Vec<_>, _>>()?;
    pages.sort_by_key(|p| p.sort_key);
    tracing::debug!(count = pages.len(), "loaded markdown pages");
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    // =========================================================================
    // parse_entry_name
    // =========================================================================

    #[test]
    fn numbered_name() {
        let p = parse_entry_name("040-private-events");
        assert_eq!(p.number, Some(40));
        assert_eq!(p.name, "private-events");
        assert_eq!(p.display_title, "private events");
    }

    #[test]
    fn number_only() {
        let p = parse_entry_name("001");
        assert_eq!(p.number, Some(1));
        assert_eq!(p.name, "");
    }

    #[test]
    fn unnumbered_with_dashes() {
        let p = parse_entry_name("gift-cards");
        assert_eq!(p.number, None);
        assert_eq!(p.name, "gift-cards");
        assert_eq!(p.display_title, "gift cards");
    }

    // =========================================================================
    // Front matter
    // =========================================================================

    #[test]
    fn split_without_front_matter() {
        assert_eq!(split_front_matter("# Hi\n"), Ok((None, "# Hi\n")));
    }

    #[test]
    fn split_with_front_matter() {
        let (front, body) = split_front_matter("+++\ntitle = \"X\"\n+++\n# Body\n").unwrap();
        assert_eq!(front, Some("title = \"X\"\n"));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn split_unterminated() {
        assert!(split_front_matter("+++\ntitle = \"X\"\n# Body\n").is_err());
    }

    // =========================================================================
    // parse_page
    // =========================================================================

    #[test]
    fn title_from_front_matter_wins() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            tmp.path(),
            "040-about.md",
            "+++\ntitle = \"About the Lab\"\ndescription = \"Who we are\"\n+++\n# About\n\nHello.\n",
        );
        let page = parse_page(&path).unwrap();
        assert_eq!(page.title, "About the Lab");
        assert_eq!(page.description.as_deref(), Some("Who we are"));
        assert_eq!(page.slug, "about");
        assert!(page.in_nav);
        assert_eq!(page.sort_key, 40);
        assert!(!page.body.contains("+++"));
    }

    #[test]
    fn title_from_heading_then_name() {
        let tmp = TempDir::new().unwrap();
        let heading = write(tmp.path(), "010-private-events.md", "# Book the Lab\n");
        let bare = write(tmp.path(), "020-gift-cards.md", "Ask at the bar.\n");
        assert_eq!(parse_page(&heading).unwrap().title, "Book the Lab");
        assert_eq!(parse_page(&bare).unwrap().title, "gift cards");
    }

    #[test]
    fn title_skips_comments_in_code_blocks() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            tmp.path(),
            "030-wifi.md",
            "```sh\n# join the guest network\n```\n\n# Guest *Wi-Fi*\n",
        );
        assert_eq!(parse_page(&path).unwrap().title, "Guest Wi-Fi");
    }

    #[test]
    fn unnumbered_page_is_hidden() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "accessibility.md", "# Accessibility\n");
        let page = parse_page(&path).unwrap();
        assert!(!page.in_nav);
        assert_eq!(page.href(), "/accessibility/");
    }

    #[test]
    fn bad_front_matter_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "about.md", "+++\ntitle = \n+++\n");
        assert!(matches!(parse_page(&path), Err(PageError::FrontMatter { .. })));
        let path = write(tmp.path(), "x.md", "+++\nauthor = \"me\"\n+++\n");
        assert!(matches!(parse_page(&path), Err(PageError::FrontMatter { .. })));
    }

    #[test]
    fn reserved_slug_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "010-menu.md", "# Menu\n");
        assert!(matches!(parse_page(&path), Err(PageError::ReservedSlug { .. })));
        for name in ["010-Menu.md", "Events.md"] {
            let path = write(tmp.path(), name, "# Ours\n");
            assert!(
                matches!(parse_page(&path), Err(PageError::ReservedSlug { .. })),
                "{name} accepted"
            );
        }
    }

    #[test]
    fn markdown_renders_to_html() {
        let page = Page {
            title: "t".into(),
            link_title: "t".into(),
            slug: "t".into(),
            description: None,
            body: "# Hours\n\n| Day | Open |\n|---|---|\n| Mon | no |\n\n~~old~~\n".into(),
            in_nav: false,
            sort_key: u32::MAX,
        };
        let html = page.html();
        assert!(html.contains("<h1>Hours</h1>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>old</del>"));
    }

    // =========================================================================
    // load_pages
    // =========================================================================

    #[test]
    fn pages_sorted_by_number_hidden_last() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "020-second.md", "# Second");
        write(tmp.path(), "010-first.md", "# First");
        write(tmp.path(), "notes.md", "# Notes");
        write(tmp.path(), "README.txt", "not markdown");
        let slugs: Vec<String> = load_pages(tmp.path())
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, vec!["first", "second", "notes"]);
    }
}
