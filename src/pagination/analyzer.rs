//! HTML analysis: pagination candidates and the next relation.

use scraper::{Html, Selector};
use std::sync::LazyLock;

/// CSS selectors used for link discovery.
struct Selectors {
    /// Hyperlinks carrying a target.
    anchor: Selector,
    /// Document-level next relation.
    next: Selector,
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(|| Selectors {
    anchor: Selector::parse("a[href]").unwrap(),
    next: Selector::parse(r#"link[rel~="next"][href]"#).unwrap(),
});

/// A hyperlink as it appears in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Raw `href` attribute.
    pub href: String,
    /// Visible text, trimmed.
    pub text: String,
}

/// Links extracted from one document.
///
/// Owns its data so no parsed DOM is held across an await point.
#[derive(Debug, Clone, Default)]
pub struct PageLinks {
    /// Anchors in document order.
    pub anchors: Vec<Anchor>,
    /// Target of the first `<link rel="next">`.
    pub next: Option<String>,
}

impl PageLinks {
    /// Parses an HTML document.
    pub fn parse(html: &str) -> Self {
        let doc = Html::parse_document(html);

        let anchors = doc
            .select(&SELECTORS.anchor)
            .filter_map(|elem| {
                let href = elem.value().attr("href")?.trim().to_string();
                let text = elem.text().collect::<String>().trim().to_string();
                Some(Anchor { href, text })
            })
            .collect();

        let next = doc
            .select(&SELECTORS.next)
            .next()
            .and_then(|elem| elem.value().attr("href"))
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty());

        Self { anchors, next }
    }
}

/// Returns the next-relation target of a document, if any.
pub fn find_next_link(html: &str) -> Option<String> {
    PageLinks::parse(html).next
}
