//! Content location: find the chapter text on a fetched page.
//!
//! Strategies run in a fixed order and the first one producing more than
//! [`MIN_CONTENT_CHARS`] characters wins:
//!
//! 1. site profile (hand-tuned selectors for known domains)
//! 2. readability scoring (`dom_smoothie`)
//! 3. generic content containers, noise removed
//! 4. the whole body, noise removed (always succeeds)

use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use novelfetch_shared::ExtractionMethod;

use crate::dom::{collapse_whitespace, detach_all, element_text, first_match_text_without};
use crate::profiles::{CompiledProfile, ProfileRegistry};

/// A strategy's text is accepted only when strictly longer than this.
pub const MIN_CONTENT_CHARS: usize = 100;

/// Generic content containers, most specific first.
const HEURISTIC_SELECTORS: &[&str] = &[
    "article",
    ".post-content",
    ".entry-content",
    ".article-content",
    ".content",
    "main article",
    r#"[role="main"]"#,
    ".post",
    "#content article",
    "#chapter-content",
    ".chapter-content",
];

static HEURISTIC_RULES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    HEURISTIC_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).expect("valid selector"))
        .collect()
});

/// Noise removed inside a heuristic container.
static CONTAINER_NOISE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"script, style, noscript, iframe, .ad, .advertisement, .pub, .publicite, [class*="ad-"], [id*="ad-"],
           nav, .navigation, .nav, .chapter-nav, .post-navigation, header, .header, h1, h2.story-title"#,
    )
    .expect("valid selector")
});

/// Noise removed from the whole page before taking body text.
static PAGE_NOISE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "script, style, noscript, nav, header, footer, aside, iframe, .ad, .advertisement, .menu, \
         .sidebar, h1, .navigation, .chapter-nav",
    )
    .expect("valid selector")
});

/// Never prose, removed before profile selectors run.
static SCRIPT_NOISE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script, style, noscript").expect("valid selector"));

static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid selector"));

/// Located page text and the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    /// Whitespace-collapsed text.
    pub text: String,
    /// Winning strategy.
    pub method: ExtractionMethod,
    /// Heuristic confidence in the result, 0-100.
    pub quality: u8,
}

/// Runs the strategy chain against a parsed page.
pub struct ContentLocator<'a> {
    profiles: &'a ProfileRegistry,
    readability: bool,
}

impl<'a> ContentLocator<'a> {
    /// `readability` toggles strategy 2.
    pub fn new(profiles: &'a ProfileRegistry, readability: bool) -> Self {
        Self {
            profiles,
            readability,
        }
    }

    /// Locate the chapter text in `doc` (parsed from `raw_html`, fetched from `url`).
    #[instrument(skip_all, fields(url = %url))]
    pub fn locate(&self, doc: &Html, raw_html: &str, url: &Url) -> Located {
        let (text, method) = self.run_strategies(doc, raw_html, url);
        let quality = quality_score(&text, &body_text(doc));
        debug!(%method, chars = text.chars().count(), quality, "content located");
        Located {
            text,
            method,
            quality,
        }
    }

    fn run_strategies(&self, doc: &Html, raw_html: &str, url: &Url) -> (String, ExtractionMethod) {
        if let Some(profile) = self.profiles.lookup(url) {
            debug!(domain = profile.domain(), "site profile matched");
            if let Some(text) = by_profile(doc, profile) {
                return (text, ExtractionMethod::Profile);
            }
            debug!("profile selectors found no usable content");
        }

        if self.readability {
            if let Some(text) = by_readability(raw_html, url) {
                return (text, ExtractionMethod::Readability);
            }
        }

        // Heuristic and body strategies share one working copy: noise removed
        // from a rejected container stays removed for the body fallback.
        let mut work = doc.clone();
        if let Some(text) = by_heuristics(&mut work) {
            return (text, ExtractionMethod::Heuristic);
        }

        debug!("falling back to raw body text");
        (by_body(&mut work), ExtractionMethod::Body)
    }
}

fn accept(text: String) -> Option<String> {
    (text.chars().count() > MIN_CONTENT_CHARS).then_some(text)
}

// ---------------------------------------------------------------------------
// Strategy 1: site profile
// ---------------------------------------------------------------------------

fn by_profile(doc: &Html, profile: &CompiledProfile) -> Option<String> {
    let mut work = doc.clone();
    detach_all(&mut work, &SCRIPT_NOISE);
    for rule in &profile.removal {
        detach_all(&mut work, rule);
    }

    profile.content.iter().find_map(|rule| {
        let text = work
            .select(rule)
            .map(element_text)
            .collect::<Vec<_>>()
            .join(" ");
        accept(collapse_whitespace(&text))
    })
}

// ---------------------------------------------------------------------------
// Strategy 2: readability
// ---------------------------------------------------------------------------

#[cfg(feature = "readability")]
fn by_readability(raw_html: &str, url: &Url) -> Option<String> {
    use dom_smoothie::Readability;

    let mut reader = match Readability::new(raw_html.to_string(), Some(url.as_str()), None) {
        Ok(reader) => reader,
        Err(e) => {
            debug!(error = ?e, "readability init failed");
            return None;
        }
    };

    match reader.parse() {
        Ok(article) => accept(collapse_whitespace(&article.text_content.to_string())),
        Err(e) => {
            debug!(error = ?e, "readability found no article");
            None
        }
    }
}

#[cfg(not(feature = "readability"))]
fn by_readability(_raw_html: &str, _url: &Url) -> Option<String> {
    None
}

// ---------------------------------------------------------------------------
// Strategy 3: generic containers
// ---------------------------------------------------------------------------

fn by_heuristics(work: &mut Html) -> Option<String> {
    HEURISTIC_RULES.iter().find_map(|rule| {
        first_match_text_without(work, rule, &CONTAINER_NOISE).and_then(accept)
    })
}

// ---------------------------------------------------------------------------
// Strategy 4: whole body
// ---------------------------------------------------------------------------

fn by_body(work: &mut Html) -> String {
    detach_all(work, &PAGE_NOISE);
    body_text(work)
}

fn body_text(doc: &Html) -> String {
    match doc.select(&BODY).next() {
        Some(body) => element_text(body),
        None => element_text(doc.root_element()),
    }
}

// ---------------------------------------------------------------------------
// Quality
// ---------------------------------------------------------------------------

/// Share of passing sanity checks, as a percentage.
fn quality_score(content: &str, page_text: &str) -> u8 {
    let len = content.chars().count();
    let page_len = page_text.chars().count();
    let lower = content.to_lowercase();

    let checks = [
        len > MIN_CONTENT_CHARS,
        content.contains('\n') || len > 500,
        !lower.contains("advertisement") && !lower.contains("sponsored"),
        len > 200,
        (len as f64) < page_len as f64 * 0.8,
    ];

    let passed = checks.iter().filter(|c| **c).count();
    u8::try_from(passed * 100 / checks.len()).unwrap_or(100)
}
