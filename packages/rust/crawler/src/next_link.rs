//! Next-chapter link resolution.
//!
//! Candidate rules are tried in order; inside a rule, matches are visited in
//! document order. The first href that survives every guard wins. A rejected
//! candidate falls through to the next match, then to the next rule.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};
use url::Url;

/// Anchor text fragments that mark a "next" link, in priority order.
const NEXT_TEXT_MARKERS: &[&str] = &["suivant", "next", "→", "»"];

enum Rule {
    /// Every element matched by the selector is a candidate.
    Css(Selector),
    /// Anchors whose text contains the marker, case-insensitively.
    AnchorText(&'static str),
    /// Anchors whose `title` attribute contains the marker, case-insensitively.
    AnchorTitle(&'static str),
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    let css = |s: &str| Rule::Css(Selector::parse(s).expect("valid selector"));

    let mut rules = vec![
        css("#next_chap"),
        css(r#"a[rel="next"]"#),
        css(".next-post a"),
        css(".nav-next a"),
        css("a.next"),
        css("a.nextchapter"),
    ];
    rules.extend(NEXT_TEXT_MARKERS.iter().map(|m| Rule::AnchorText(*m)));
    rules.push(css(r#"[class*="next"] a"#));
    rules.push(Rule::AnchorTitle("next"));
    rules.push(css(".pagination a:last-child"));
    rules
});

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Links that lead back to the first chapter.
static CHAPTER_ONE_LINK: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)chapter[-_]?1(?:[^0-9]|$)",
        r"(?i)chapitre[-_]?1(?:[^0-9]|$)",
        r"/1(?:[^0-9]|$)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Pages that are themselves the first chapter.
static CHAPTER_ONE_PAGE: LazyLock<Vec<Regex>> = LazyLock::new(|| CHAPTER_ONE_LINK[..2].to_vec());

/// Find the URL of the chapter following `current`.
///
/// Returns `None` when no candidate passes the guards, which ends a crawl
/// normally.
pub fn resolve_next(doc: &Html, current: &Url, visited: &HashSet<String>) -> Option<Url> {
    let current_key = normalize_url(current);
    let on_first_chapter = is_first_chapter_page(current);

    for (index, rule) in RULES.iter().enumerate() {
        for candidate in candidates(doc, rule) {
            let Some(href) = candidate.value().attr("href") else {
                continue;
            };
            let Some(resolved) = resolve_href(current, href) else {
                continue;
            };

            let key = normalize_url(&resolved);
            if key == current_key || visited.contains(&key) {
                trace!(%resolved, "candidate already visited");
                continue;
            }
            if !on_first_chapter && is_chapter_one_link(&resolved) {
                trace!(%resolved, "candidate points back to chapter 1");
                continue;
            }

            debug!(rule = index, next = %resolved, "next link resolved");
            return Some(resolved);
        }
    }

    debug!(%current, "no next link");
    None
}

fn candidates<'a>(doc: &'a Html, rule: &'a Rule) -> Box<dyn Iterator<Item = ElementRef<'a>> + 'a> {
    match rule {
        Rule::Css(selector) => Box::new(doc.select(selector)),
        Rule::AnchorText(marker) => Box::new(doc.select(&ANCHOR).filter(move |a| {
            a.text().collect::<String>().to_lowercase().contains(marker)
        })),
        Rule::AnchorTitle(marker) => Box::new(doc.select(&ANCHOR).filter(move |a| {
            a.value()
                .attr("title")
                .is_some_and(|t| t.to_lowercase().contains(marker))
        })),
    }
}

/// Resolve `href` against `base`: root-relative paths against the origin,
/// others against the current directory. Fragment-only, `javascript:` and
/// `mailto:` hrefs and non-http(s) results are dropped.
fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    if href.is_empty()
        || href.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
    {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved)
}

/// Canonical visited-set key: the URL without its fragment.
pub fn normalize_url(url: &Url) -> String {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized.to_string()
}

/// Path and query of a URL; the host never counts as chapter evidence.
fn locator_part(url: &Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{q}", url.path()),
        None => url.path().to_string(),
    }
}

/// Whether `url` looks like a link back to chapter 1.
pub fn is_chapter_one_link(url: &Url) -> bool {
    let part = locator_part(url);
    CHAPTER_ONE_LINK.iter().any(|re| re.is_match(&part))
}

fn is_first_chapter_page(url: &Url) -> bool {
    let part = locator_part(url);
    CHAPTER_ONE_PAGE.iter().any(|re| re.is_match(&part))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn resolve(html: &str, current: &str, visited: &[&str]) -> Option<String> {
        let doc = Html::parse_document(html);
        let visited = visited.iter().map(|v| (*v).to_string()).collect();
        resolve_next(&doc, &url(current), &visited).map(|u| u.to_string())
    }

    #[test]
    fn next_chap_id_wins() {
        let html = r#"<a href="/b/chapter-9.html">Next</a><a id="next_chap" href="/b/chapter-8.html">»</a>"#;
        assert_eq!(
            resolve(html, "https://novelfull.net/b/chapter-7.html", &[]).as_deref(),
            Some("https://novelfull.net/b/chapter-8.html")
        );
    }

    #[test]
    fn rel_next_before_text_match() {
        let html = r#"<a href="c5">Next chapter</a><link><a rel="next" href="c4">→</a>"#;
        assert_eq!(
            resolve(html, "https://site.example/novel/c3", &[]).as_deref(),
            Some("https://site.example/novel/c4")
        );
    }

    #[test]
    fn anchor_text_is_case_insensitive() {
        let html = r#"<a href="/home">Home</a><a href="chapitre-4">Chapitre SUIVANT</a>"#;
        assert_eq!(
            resolve(html, "https://site.example/roman/chapitre-3", &[]).as_deref(),
            Some("https://site.example/roman/chapitre-4")
        );
    }

    #[test]
    fn title_attribute_matches() {
        let html = r#"<a href="/s/c11" title="Go to Next Chapter"><img src="x.png"></a>"#;
        assert_eq!(
            resolve(html, "https://site.example/s/c10", &[]).as_deref(),
            Some("https://site.example/s/c11")
        );
    }

    #[test]
    fn pagination_last_child_is_last_resort() {
        let html = r#"<div class="pagination"><a href="/p/1">1</a><a href="/p/2">2</a><a href="/p/4">4</a></div>"#;
        assert_eq!(
            resolve(html, "https://site.example/p/3", &[]).as_deref(),
            Some("https://site.example/p/4")
        );
    }

    #[test]
    fn visited_and_self_are_skipped() {
        let html = r#"<a class="next" href="/c/2">next</a><a class="next" href="/c/3#top">next</a><a class="next" href="/c/4">next</a>"#;
        let next = resolve(
            html,
            "https://site.example/c/3",
            &["https://site.example/c/2"],
        );
        assert_eq!(next.as_deref(), Some("https://site.example/c/4"));
    }

    #[test]
    fn chapter_one_link_rejected_mid_series() {
        let html = r#"<a rel="next" href="/novel/chapter-1">Next</a>"#;
        assert_eq!(resolve(html, "https://site.example/novel/chapter-7", &[]), None);
    }

    #[test]
    fn chapter_one_rejection_falls_through_to_next_rule() {
        let html = r#"<a rel="next" href="/novel/chapter-1">Start</a><a class="next" href="/novel/chapter-8">go</a>"#;
        assert_eq!(
            resolve(html, "https://site.example/novel/chapter-7", &[]).as_deref(),
            Some("https://site.example/novel/chapter-8")
        );
    }

    #[test]
    fn chapter_one_link_allowed_from_chapter_one() {
        // chapter-1 -> chapter-1-part-2 style sites
        let html = r#"<a rel="next" href="/novel/chapter-1_2">Next</a>"#;
        assert_eq!(
            resolve(html, "https://site.example/novel/chapter-1", &[]).as_deref(),
            Some("https://site.example/novel/chapter-1_2")
        );
    }

    #[test]
    fn pseudo_links_are_ignored() {
        let html = r##"<a class="next" href="javascript:void(0)">Next</a>
                       <a class="next" href="#">Next</a>
                       <a class="next" href="mailto:me@example.com">Next</a>"##;
        assert_eq!(resolve(html, "https://site.example/c/5", &[]), None);
    }

    #[test]
    fn no_candidates_is_none() {
        assert_eq!(resolve("<p>The end.</p>", "https://site.example/c/5", &[]), None);
    }

    #[test]
    fn chapter_one_patterns() {
        assert!(is_chapter_one_link(&url("https://x.example/book/chapter-1")));
        assert!(is_chapter_one_link(&url("https://x.example/book/Chapitre_1.html")));
        assert!(is_chapter_one_link(&url("https://x.example/book/1")));
        assert!(!is_chapter_one_link(&url("https://x.example/book/chapter-10")));
        assert!(!is_chapter_one_link(&url("https://x.example/book/12")));
        // Host digits are not path evidence
        assert!(!is_chapter_one_link(&url("http://127.0.0.1:8080/book/chapter-3")));
    }

    #[test]
    fn normalize_strips_fragment() {
        assert_eq!(
            normalize_url(&url("https://x.example/c/2#comments")),
            "https://x.example/c/2"
        );
    }
}
