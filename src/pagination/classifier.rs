//! Pattern classifier for pagination links.

use super::analyzer::{Anchor, PageLinks};
use super::scheme::{PaginationScheme, SegmentForm};
use regex::Regex;
use std::sync::LazyLock;

/// A `showpage=2` style parameter; the name's spelling is captured.
static SHOWPAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[?&](showpage)=2(?:[&#]|$)").unwrap());

/// Classifies a page-2 URL or href by its embedded marker.
pub fn classify_url(href: &str) -> Option<PaginationScheme> {
    if let Some(caps) = SHOWPAGE_MARKER.captures(href) {
        return Some(PaginationScheme::QueryParamShowPage {
            param: caps[1].to_string(),
        });
    }

    let path = href.split(['?', '#']).next().unwrap_or(href);
    if path.contains("index-2.htm") {
        return Some(PaginationScheme::NumericSegment(SegmentForm::Index));
    }
    if path.ends_with("-2.htm") {
        return Some(PaginationScheme::NumericSegment(SegmentForm::Generic));
    }

    None
}

/// Classifies an anchor: href markers first, then visible text exactly "2".
pub fn classify_anchor(anchor: &Anchor) -> Option<PaginationScheme> {
    classify_url(&anchor.href).or_else(|| {
        (anchor.text == "2").then_some(PaginationScheme::NumericSegment(SegmentForm::Generic))
    })
}

/// Scans anchors in document order; the first classified one wins.
///
/// The text check can pick an unrelated "2" link that precedes the real
/// pager in the document.
pub fn find_page_two_link(links: &PageLinks) -> Option<(&Anchor, PaginationScheme)> {
    links
        .anchors
        .iter()
        .find_map(|anchor| classify_anchor(anchor).map(|scheme| (anchor, scheme)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(href: &str, text: &str) -> Anchor {
        Anchor {
            href: href.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_classify_showpage() {
        assert_eq!(
            classify_url("/rolex/index.htm?showpage=2&x=1"),
            Some(PaginationScheme::QueryParamShowPage {
                param: "showpage".to_string()
            })
        );
        assert_eq!(
            classify_url("/rolex/index.htm?x=1&showPage=2"),
            Some(PaginationScheme::QueryParamShowPage {
                param: "showPage".to_string()
            })
        );
        assert_eq!(classify_url("/rolex/index.htm?showpage=20"), None);
    }

    #[test]
    fn test_classify_segments() {
        assert_eq!(
            classify_url("/rolex/index-2.htm?x=1"),
            Some(PaginationScheme::NumericSegment(SegmentForm::Index))
        );
        assert_eq!(
            classify_url("/rolex/daytona-2.htm"),
            Some(PaginationScheme::NumericSegment(SegmentForm::Generic))
        );
        assert_eq!(classify_url("/rolex/daytona-12.htm"), None);
        assert_eq!(classify_url("/rolex/daytona.htm"), None);
    }

    #[test]
    fn test_text_match_is_lowest_priority() {
        assert_eq!(
            classify_anchor(&anchor("/rolex/index-2.htm", "2")),
            Some(PaginationScheme::NumericSegment(SegmentForm::Index))
        );
        assert_eq!(
            classify_anchor(&anchor("/somewhere", "2")),
            Some(PaginationScheme::NumericSegment(SegmentForm::Generic))
        );
        assert_eq!(classify_anchor(&anchor("/somewhere", "22")), None);
    }

    #[test]
    fn test_first_match_in_document_order_wins() {
        let links = PageLinks {
            anchors: vec![
                anchor("/about", "About"),
                anchor("/promo", "2"),
                anchor("/rolex/index-2.htm", "2"),
            ],
            next: None,
        };

        let (found, scheme) = find_page_two_link(&links).unwrap();
        assert_eq!(found.href, "/promo");
        assert_eq!(scheme, PaginationScheme::NumericSegment(SegmentForm::Generic));
    }

    #[test]
    fn test_no_candidate() {
        let links = PageLinks {
            anchors: vec![anchor("/about", "About")],
            next: Some("/next".to_string()),
        };
        assert!(find_page_two_link(&links).is_none());
    }
}
