//! Sequential pagination crawler.
//!
//! Starting from the request's URL, each iteration fetches one page, locates
//! and sanitizes its text, records a chapter, then follows the resolved next
//! link after a politeness delay. Exactly one fetch is in flight at a time and
//! chapter order mirrors link-following order.

use std::collections::HashSet;

use chrono::Utc;
use scraper::Html;
use tracing::{debug, info, instrument, warn};
use url::Url;

use novelfetch_sanitizer::{FilterSet, Sanitizer};
use novelfetch_shared::{
    ChapterRecord, CrawlConfig, CrawlRequest, CrawlResult, NovelFetchError, Result, StopReason,
};

use crate::chapter::{build_combined_text, display_number, extract_title};
use crate::fetcher::Fetcher;
use crate::locator::ContentLocator;
use crate::next_link::{normalize_url, resolve_next};
use crate::profiles::ProfileRegistry;

/// A page is recorded only when its sanitized text is longer than this.
pub const MIN_CHAPTER_CHARS: usize = 50;

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Observer for crawl progress.
pub trait CrawlProgress: Send + Sync {
    /// A page is about to be fetched.
    fn chapter_started(&self, sequence: usize, url: &Url);
    /// A chapter was extracted and kept.
    fn chapter_recorded(&self, chapter: &ChapterRecord, max_chapters: usize);
    /// The loop terminated.
    fn finished(&self, chapters: usize, reason: &StopReason);
}

/// No-op progress observer for headless/test usage.
pub struct SilentProgress;

impl CrawlProgress for SilentProgress {
    fn chapter_started(&self, _sequence: usize, _url: &Url) {}
    fn chapter_recorded(&self, _chapter: &ChapterRecord, _max_chapters: usize) {}
    fn finished(&self, _chapters: usize, _reason: &StopReason) {}
}

// ---------------------------------------------------------------------------
// Crawler
// ---------------------------------------------------------------------------

/// Outcome of processing one fetched page.
enum Page {
    Recorded {
        chapter: Box<ChapterRecord>,
        next: Option<Url>,
    },
    TooShort,
}

/// Chapter crawler. Holds the immutable profile and filter tables shared by
/// every crawl it runs.
pub struct Crawler {
    config: CrawlConfig,
    fetcher: Fetcher,
    profiles: ProfileRegistry,
    auto_filters: FilterSet,
}

impl Crawler {
    /// Create a crawler from the runtime config and the static tables.
    pub fn new(config: CrawlConfig, profiles: ProfileRegistry, auto_filters: FilterSet) -> Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        Ok(Self {
            config,
            fetcher,
            profiles,
            auto_filters,
        })
    }

    pub fn profiles(&self) -> &ProfileRegistry {
        &self.profiles
    }

    pub fn auto_filters(&self) -> &FilterSet {
        &self.auto_filters
    }

    /// Run one crawl.
    ///
    /// Per-page problems (fetch failure, too little text, no next link) end
    /// the loop and keep the chapters gathered so far. Only a crawl that
    /// records nothing is an error.
    #[instrument(skip_all, fields(start_url = %request.start_url, max = request.max_chapters))]
    pub async fn crawl(
        &self,
        request: &CrawlRequest,
        progress: &dyn CrawlProgress,
    ) -> Result<CrawlResult> {
        let sanitizer = Sanitizer::new(
            &self.auto_filters,
            &request.user_blacklist,
            request.use_auto_filters,
        )?;
        let locator = ContentLocator::new(&self.profiles, self.config.readability);

        info!(
            filters = sanitizer.active_filter_count(),
            auto_filters = request.use_auto_filters,
            readability = self.config.readability,
            "starting crawl"
        );

        let mut visited = HashSet::<String>::new();
        let mut chapters: Vec<ChapterRecord> = Vec::new();
        let mut current = request.start_url.clone();

        let stop_reason = loop {
            let sequence = chapters.len() + 1;
            progress.chapter_started(sequence, &current);
            visited.insert(normalize_url(&current));

            let html = match self.fetcher.fetch(&current).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(url = %current, error = %e, "fetch failed, stopping");
                    break StopReason::FetchFailed {
                        url: current.to_string(),
                        message: e.to_string(),
                    };
                }
            };

            let want_next = sequence < request.max_chapters;
            let page = self.process_page(
                &locator, &sanitizer, &html, &current, sequence, &visited, want_next,
            );

            let (chapter, next) = match page {
                Page::Recorded { chapter, next } => (*chapter, next),
                Page::TooShort => {
                    info!(url = %current, "content too short, stopping");
                    break StopReason::ContentTooShort {
                        url: current.to_string(),
                    };
                }
            };

            info!(
                sequence,
                display = chapter.display_number,
                chars = chapter.content.chars().count(),
                method = %chapter.method,
                quality = chapter.quality,
                "chapter recorded"
            );
            progress.chapter_recorded(&chapter, request.max_chapters);
            chapters.push(chapter);

            if !want_next {
                break StopReason::ChapterLimit;
            }

            current = match next {
                Some(next) => next,
                None => break StopReason::NoNextLink,
            };

            if !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }
        };

        progress.finished(chapters.len(), &stop_reason);

        if chapters.is_empty() {
            warn!(reason = %stop_reason, "no chapter extracted");
            return Err(NovelFetchError::NoChapters {
                url: request.start_url.to_string(),
            });
        }

        info!(chapters = chapters.len(), reason = %stop_reason, "crawl completed");

        Ok(CrawlResult {
            combined_text: build_combined_text(&chapters),
            chapters,
            filters_applied_count: sanitizer.active_filter_count(),
            stop_reason,
        })
    }

    /// Locate, sanitize and title one page, and resolve its next link when
    /// another chapter is wanted. All DOM work happens here so no parsed
    /// document lives across an await point.
    #[allow(clippy::too_many_arguments)]
    fn process_page(
        &self,
        locator: &ContentLocator<'_>,
        sanitizer: &Sanitizer,
        html: &str,
        url: &Url,
        sequence: usize,
        visited: &HashSet<String>,
        want_next: bool,
    ) -> Page {
        let doc = Html::parse_document(html);

        let located = locator.locate(&doc, html, url);
        let raw_length = located.text.chars().count();
        let content = sanitizer.sanitize(&located.text);
        debug!(raw_length, sanitized = content.chars().count(), "page sanitized");

        if content.chars().count() <= MIN_CHAPTER_CHARS {
            return Page::TooShort;
        }

        let title = extract_title(&doc, self.profiles.lookup(url), sequence);
        let chapter = ChapterRecord {
            sequence_number: sequence,
            display_number: display_number(&title, url, sequence),
            title,
            url: url.to_string(),
            content,
            raw_length,
            method: located.method,
            quality: located.quality,
            fetched_at: Utc::now(),
        };

        let next = if want_next {
            resolve_next(&doc, url, visited)
        } else {
            None
        };

        Page::Recorded {
            chapter: Box::new(chapter),
            next,
        }
    }
}
