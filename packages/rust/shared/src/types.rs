//! Core domain types for a chapter crawl.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{NovelFetchError, Result};

/// Chapter cap applied when the caller does not provide one.
pub const DEFAULT_MAX_CHAPTERS: usize = 10;

// ---------------------------------------------------------------------------
// CrawlRequest
// ---------------------------------------------------------------------------

/// Parameters of a single crawl. Immutable once the crawl starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    /// First chapter page.
    pub start_url: Url,
    /// Upper bound on recorded chapters (always >= 1).
    pub max_chapters: usize,
    /// Caller-supplied literals removed from every chapter.
    pub user_blacklist: Vec<String>,
    /// Whether the built-in auto filters are applied on top of the blacklist.
    pub use_auto_filters: bool,
}

impl CrawlRequest {
    /// Create a request with default cap, empty blacklist and auto filters on.
    pub fn new(start_url: Url) -> Self {
        Self {
            start_url,
            max_chapters: DEFAULT_MAX_CHAPTERS,
            user_blacklist: Vec::new(),
            use_auto_filters: true,
        }
    }

    /// Parse `url` and build a request from it.
    pub fn parse(url: &str) -> Result<Self> {
        let start_url = Url::parse(url.trim())
            .map_err(|e| NovelFetchError::validation(format!("invalid URL '{url}': {e}")))?;
        match start_url.scheme() {
            "http" | "https" => Ok(Self::new(start_url)),
            other => Err(NovelFetchError::validation(format!(
                "unsupported URL scheme '{other}': expected http or https"
            ))),
        }
    }

    /// Set the chapter cap. Zero is rejected.
    pub fn with_max_chapters(mut self, max_chapters: usize) -> Result<Self> {
        if max_chapters == 0 {
            return Err(NovelFetchError::validation(
                "max_chapters must be at least 1",
            ));
        }
        self.max_chapters = max_chapters;
        Ok(self)
    }

    /// Replace the user blacklist.
    pub fn with_blacklist(mut self, blacklist: Vec<String>) -> Self {
        self.user_blacklist = blacklist;
        self
    }

    /// Toggle the built-in auto filters.
    pub fn with_auto_filters(mut self, enabled: bool) -> Self {
        self.use_auto_filters = enabled;
        self
    }
}

// ---------------------------------------------------------------------------
// SiteProfile
// ---------------------------------------------------------------------------

/// Hand-tuned extraction rules for one source domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Hostname, lowercase, without a leading `www.`.
    pub domain: String,
    /// Content containers, tried in order.
    pub content_selectors: Vec<String>,
    /// Chapter title elements, tried in order.
    #[serde(default)]
    pub title_selectors: Vec<String>,
    /// Elements removed before any content selector runs.
    #[serde(default)]
    pub removal_selectors: Vec<String>,
}

/// Normalize a hostname into a profile key: lowercase, no leading `www.`.
pub fn normalize_domain(host: &str) -> String {
    let lower = host.trim().to_ascii_lowercase();
    match lower.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

// ---------------------------------------------------------------------------
// ExtractionMethod
// ---------------------------------------------------------------------------

/// Which content-location strategy produced a chapter's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// A per-domain site profile matched.
    Profile,
    /// Generic readability scoring.
    Readability,
    /// First generic content container with enough text.
    Heuristic,
    /// Whole body minus noise.
    Body,
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Profile => "profile",
            Self::Readability => "readability",
            Self::Heuristic => "heuristic",
            Self::Body => "body",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// ChapterRecord
// ---------------------------------------------------------------------------

/// One successfully extracted chapter page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterRecord {
    /// 1-based position in this crawl.
    pub sequence_number: usize,
    /// Chapter number parsed from the title or URL, else `sequence_number`.
    pub display_number: usize,
    /// Cleaned chapter title.
    pub title: String,
    /// URL the page was fetched from.
    pub url: String,
    /// Sanitized chapter text.
    pub content: String,
    /// Character count of the located text before sanitization.
    pub raw_length: usize,
    /// Strategy that located the content.
    pub method: ExtractionMethod,
    /// Extraction confidence, 0-100.
    pub quality: u8,
    /// When the page was fetched.
    pub fetched_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// CrawlResult
// ---------------------------------------------------------------------------

/// Why a crawl stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// `max_chapters` chapters were recorded.
    ChapterLimit,
    /// The last page had no acceptable next link.
    NoNextLink,
    /// Sanitized content was too short to count as a chapter.
    ContentTooShort { url: String },
    /// The page could not be fetched.
    FetchFailed { url: String, message: String },
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ChapterLimit => f.write_str("chapter limit reached"),
            Self::NoNextLink => f.write_str("no next chapter link"),
            Self::ContentTooShort { url } => write!(f, "content too short at {url}"),
            Self::FetchFailed { url, message } => write!(f, "fetch failed at {url}: {message}"),
        }
    }
}

/// Output of a completed crawl (at least one chapter).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    /// Chapters in link-following order.
    pub chapters: Vec<ChapterRecord>,
    /// All chapters joined under banner headers.
    pub combined_text: String,
    /// Number of active filter literals.
    pub filters_applied_count: usize,
    /// Terminal condition of the crawl loop.
    pub stop_reason: StopReason,
}
