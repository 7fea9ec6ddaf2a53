//! Chapter titles, display numbers and the combined document.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use novelfetch_shared::ChapterRecord;

use crate::dom::element_text;
use crate::profiles::CompiledProfile;

/// Banner rule framing each chapter header in the combined text.
pub const DIVIDER: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("valid selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));

static LEADING_NOISE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^.*?(chapter\s+\d+)").expect("valid regex"));
static HEADING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)chapter\s+(\d+)").expect("valid regex"));
static ANY_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));
static URL_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)chapter[-_]?(\d+)").expect("valid regex"));

/// Page title for chapter `sequence`: profile title selectors, then `h1`,
/// then `<title>`, cleaned by [`clean_title`].
pub fn extract_title(doc: &Html, profile: Option<&CompiledProfile>, sequence: usize) -> String {
    let profile_rules = profile.map(|p| p.title.as_slice()).unwrap_or_default();

    let raw = profile_rules
        .iter()
        .chain([&*H1, &*TITLE])
        .find_map(|rule| {
            doc.select(rule)
                .map(element_text)
                .find(|text| !text.is_empty())
        });

    match raw {
        Some(raw) => clean_title(&raw),
        None => format!("Chapter {sequence}"),
    }
}

/// Drop anything before the first "Chapter N"; a title without one but
/// carrying a number becomes "Chapter {number}".
pub fn clean_title(raw: &str) -> String {
    let title = raw.trim();

    if HEADING_NUMBER_RE.is_match(title) {
        return LEADING_NOISE_RE.replace(title, "$1").into_owned();
    }

    match ANY_NUMBER_RE.find(title) {
        Some(number) => format!("Chapter {}", number.as_str()),
        None => title.to_string(),
    }
}

/// Chapter number shown in the banner: the title's "Chapter N", else a
/// `chapter-N` URL fragment, else the sequence number.
pub fn display_number(title: &str, url: &Url, sequence: usize) -> usize {
    let parse = |re: &Regex, haystack: &str| {
        re.captures(haystack)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<usize>().ok())
    };

    parse(&HEADING_NUMBER_RE, title)
        .or_else(|| parse(&URL_NUMBER_RE, url.as_str()))
        .unwrap_or(sequence)
}

/// Join chapters into one document, each under its banner.
pub fn build_combined_text(chapters: &[ChapterRecord]) -> String {
    chapters
        .iter()
        .map(|ch| {
            format!(
                "{DIVIDER}\nCHAPTER {}\n{}\n{DIVIDER}\n\n{}",
                ch.display_number, ch.title, ch.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
