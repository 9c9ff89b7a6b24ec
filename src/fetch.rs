//! HTTP fetching with an on-disk response cache.
//!
//! Published sheets are slow to serve and rate limited, and a site rebuild
//! (or a dev-server restart) shouldn't hit them every time. [`CachedFetcher`]
//! wraps any [`Fetch`] implementation and reuses a stored response body until
//! it is older than the configured [`CacheDuration`].
//!
//! ## Cache layout
//!
//! ```text
//! .taproom-cache/
//! ├── .fetch-cache.json      # URL → { key, fetched_at }
//! ├── 3f1a…e9.txt            # response body, named by SHA-256 of the URL
//! └── …
//! ```
//!
//! A hit requires:
//! 1. An entry for the URL whose `fetched_at` is within the cache duration
//! 2. The body file still exists on disk
//!
//! The manifest is versioned; a version mismatch or a corrupt file is treated
//! as an empty cache, never as an error. Failed requests are not cached.
//!
//! ## Bypassing the cache
//!
//! Pass `--no-cache` to `fetch` or `build`. Every URL is requested again and
//! the fresh bodies overwrite the stored ones.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the cache manifest file within the cache directory.
const MANIFEST_FILENAME: &str = ".fetch-cache.json";

/// Version of the cache manifest format. Bump this to invalidate all
/// existing caches when the format or key computation changes.
const MANIFEST_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Something that can turn a URL into response text.
pub trait Fetch {
    fn fetch_text(&mut self, url: &str) -> Result<String, FetchError>;
}

impl<F: Fetch + ?Sized> Fetch for &mut F {
    fn fetch_text(&mut self, url: &str) -> Result<String, FetchError> {
        (**self).fetch_text(url)
    }
}

// ============================================================================
// HttpFetcher
// ============================================================================

/// Blocking HTTP client. Non-2xx responses are errors.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch_text(&mut self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(url, "requesting");
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text()?)
    }
}

// ============================================================================
// CacheDuration
// ============================================================================

/// How long a cached response stays fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDuration {
    /// Fresh for this many seconds.
    Expires(u64),
    /// Never refetched once cached (`"*"`).
    Forever,
}

impl CacheDuration {
    /// Parse `<n><unit>` with units `s m h d w y`, or `*`.
    ///
    /// ```
    /// use taproom::fetch::CacheDuration;
    /// assert_eq!(CacheDuration::parse("1h"), Some(CacheDuration::Expires(3600)));
    /// assert_eq!(CacheDuration::parse("*"), Some(CacheDuration::Forever));
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s == "*" {
            return Some(CacheDuration::Forever);
        }
        let unit = s.chars().last()?;
        let amount: u64 = s[..s.len() - unit.len_utf8()].parse().ok()?;
        let seconds = match unit {
            's' => 1,
            'm' => 60,
            'h' => 3_600,
            'd' => 86_400,
            'w' => 7 * 86_400,
            'y' => 365 * 86_400,
            _ => return None,
        };
        Some(CacheDuration::Expires(amount.checked_mul(seconds)?))
    }

    /// Whether something fetched at `fetched_at` is still fresh at `now`.
    pub fn is_fresh(&self, fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            CacheDuration::Forever => true,
            CacheDuration::Expires(secs) => {
                let age = now.signed_duration_since(fetched_at).num_seconds();
                age >= 0 && (age as u64) < *secs
            }
        }
    }
}

// ============================================================================
// Cache manifest
// ============================================================================

/// A single cached response.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    /// SHA-256 of the URL; the body lives in `<key>.txt`.
    pub key: String,
    pub fetched_at: DateTime<Utc>,
}

/// On-disk manifest mapping URLs to their cached responses.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
}

impl CacheManifest {
    /// Create an empty manifest (used for a first build or a corrupt cache).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from the cache directory. Returns an empty manifest if the file
    /// doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(cache_dir: &Path) -> Self {
        let content = match std::fs::read_to_string(manifest_path(cache_dir)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable fetch cache manifest");
                return Self::empty();
            }
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest
    }

    /// Save to the cache directory, creating it if needed.
    pub fn save(&self, cache_dir: &Path) -> io::Result<()> {
        std::fs::create_dir_all(cache_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(manifest_path(cache_dir), json)
    }

    /// Path of a fresh cached body for `url`, if there is one.
    pub fn find_fresh(
        &self,
        url: &str,
        duration: CacheDuration,
        now: DateTime<Utc>,
        cache_dir: &Path,
    ) -> Option<PathBuf> {
        let entry = self.entries.get(url)?;
        if !duration.is_fresh(entry.fetched_at, now) {
            return None;
        }
        let path = body_path(cache_dir, &entry.key);
        path.exists().then_some(path)
    }

    /// Record a freshly fetched body for `url`.
    pub fn insert(&mut self, url: &str, fetched_at: DateTime<Utc>) -> String {
        let key = hash_url(url);
        self.entries.insert(
            url.to_string(),
            CacheEntry {
                key: key.clone(),
                fetched_at,
            },
        );
        key
    }
}

/// SHA-256 of a URL, returned as a hex string.
pub fn hash_url(url: &str) -> String {
    format!("{:x}", Sha256::digest(url.as_bytes()))
}

/// Resolve the cache manifest path for a cache directory.
pub fn manifest_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(MANIFEST_FILENAME)
}

fn body_path(cache_dir: &Path, key: &str) -> PathBuf {
    cache_dir.join(format!("{key}.txt"))
}

// ============================================================================
// CachedFetcher
// ============================================================================

/// Summary of cache behaviour for a fetch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} fetched ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} fetched", self.misses)
        }
    }
}

/// A [`Fetch`] that consults the disk cache before delegating to `inner`.
pub struct CachedFetcher<F> {
    inner: F,
    cache_dir: PathBuf,
    duration: CacheDuration,
    manifest: CacheManifest,
    use_cache: bool,
    stats: CacheStats,
}

impl<F: Fetch> CachedFetcher<F> {
    /// With `use_cache == false` nothing is read from the cache, but fresh
    /// responses are still written so the next run can use them.
    pub fn new(inner: F, cache_dir: &Path, duration: CacheDuration, use_cache: bool) -> Self {
        let manifest = if use_cache {
            CacheManifest::load(cache_dir)
        } else {
            CacheManifest::empty()
        };
        Self {
            inner,
            cache_dir: cache_dir.to_path_buf(),
            duration,
            manifest,
            use_cache,
            stats: CacheStats::default(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Fetch as of `now`; the [`Fetch`] impl calls this with the wall clock.
    pub fn fetch_at(&mut self, url: &str, now: DateTime<Utc>) -> Result<String, FetchError> {
        if self.use_cache
            && let Some(path) = self
                .manifest
                .find_fresh(url, self.duration, now, &self.cache_dir)
        {
            match std::fs::read_to_string(&path) {
                Ok(body) => {
                    tracing::debug!(url, "fetch cache hit");
                    self.stats.hits += 1;
                    return Ok(body);
                }
                Err(e) => tracing::warn!(url, error = %e, "cached body unreadable, refetching"),
            }
        }

        let body = self.inner.fetch_text(url)?;
        self.stats.misses += 1;

        if let Err(e) = self.store(url, &body, now) {
            tracing::warn!(
                url,
                cache_dir = %self.cache_dir.display(),
                error = %e,
                "could not write fetch cache"
            );
        }
        Ok(body)
    }

    fn store(&mut self, url: &str, body: &str, now: DateTime<Utc>) -> io::Result<()> {
        std::fs::create_dir_all(&self.cache_dir)?;
        let key = self.manifest.insert(url, now);
        std::fs::write(body_path(&self.cache_dir, &key), body)?;
        self.manifest.save(&self.cache_dir)
    }
}

impl<F: Fetch> Fetch for CachedFetcher<F> {
    fn fetch_text(&mut self, url: &str) -> Result<String, FetchError> {
        self.fetch_at(url, Utc::now())
    }
}
