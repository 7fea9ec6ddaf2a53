//! Small helpers over `scraper::Html`: text extraction and subtree removal.

use scraper::{ElementRef, Html, Selector};

use novelfetch_shared::{NovelFetchError, Result};

/// Parse a CSS selector, mapping failures to a parse error.
pub(crate) fn parse_selector(raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|e| NovelFetchError::parse(format!("bad selector '{raw}': {e:?}")))
}

/// Text content of an element, text nodes joined by a space and whitespace collapsed.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

/// Detach every element matching `selector` from the document.
pub(crate) fn detach_all(doc: &mut Html, selector: &Selector) -> usize {
    let ids: Vec<_> = doc.select(selector).map(|el| el.id()).collect();
    let mut removed = 0;
    for id in ids {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
            removed += 1;
        }
    }
    removed
}

/// Text of the first element matching `root`, after detaching its
/// descendants that match `noise`. `None` when nothing matches `root`.
pub(crate) fn first_match_text_without(
    doc: &mut Html,
    root: &Selector,
    noise: &Selector,
) -> Option<String> {
    let (root_id, noise_ids): (_, Vec<_>) = {
        let el = doc.select(root).next()?;
        (el.id(), el.select(noise).map(|n| n.id()).collect())
    };

    for id in noise_ids {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }

    doc.tree.get(root_id).and_then(ElementRef::wrap).map(element_text)
}

/// Collapse every whitespace run to one space and trim.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_text_separates_blocks() {
        let doc = Html::parse_document("<div id='c'><p>One</p><p>Two\n\n three</p></div>");
        let sel = parse_selector("#c").unwrap();
        let el = doc.select(&sel).next().unwrap();
        assert_eq!(element_text(el), "One Two three");
    }

    #[test]
    fn detach_all_removes_matches() {
        let mut doc =
            Html::parse_document("<body><p>keep</p><div class='ad'>buy</div><div class='ad'>now</div></body>");
        let removed = detach_all(&mut doc, &parse_selector(".ad").unwrap());
        assert_eq!(removed, 2);
        let body = doc.select(&parse_selector("body").unwrap()).next().unwrap();
        assert_eq!(element_text(body), "keep");
    }

    #[test]
    fn first_match_text_without_leaves_outside_nodes() {
        let mut doc = Html::parse_document(
            "<body><script>outside()</script><article><script>inside()</script><p>text</p></article></body>",
        );
        let text = first_match_text_without(
            &mut doc,
            &parse_selector("article").unwrap(),
            &parse_selector("script").unwrap(),
        );
        assert_eq!(text.as_deref(), Some("text"));
        assert_eq!(doc.select(&parse_selector("script").unwrap()).count(), 1);
    }

    #[test]
    fn first_match_text_without_misses() {
        let mut doc = Html::parse_document("<body><p>text</p></body>");
        let sel = parse_selector("article").unwrap();
        assert!(first_match_text_without(&mut doc, &sel, &sel).is_none());
    }

    #[test]
    fn bad_selector_is_parse_error() {
        let err = parse_selector("div[").unwrap_err();
        assert!(matches!(err, NovelFetchError::Parse { .. }));
    }
}
