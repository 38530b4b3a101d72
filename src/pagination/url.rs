//! URL string helpers for page addressing.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Path marker identifying the site's direct search endpoint.
pub const SEARCH_PATH_MARKER: &str = "/search/index.htm";

/// Query parameter carrying the page size.
pub const PAGE_SIZE_PARAM: &str = "pageSize";

/// Page-index parameter used by search-form URLs.
pub const SEARCH_PAGE_PARAM: &str = "showpage";

static PAGE_SIZE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([?&])pageSize=\d*").unwrap());

/// Returns true if the URL addresses the search endpoint directly.
pub fn is_search_url(url: &str) -> bool {
    url.contains(SEARCH_PATH_MARKER)
}

/// Appends `key=value` using `?` or `&` as appropriate.
///
/// The parameter goes into the query, ahead of any `#fragment`.
pub fn append_param(url: &str, key: &str, value: u32) -> String {
    let (base, fragment) = match url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (url, None),
    };
    let separator = if base.contains('?') { '&' } else { '?' };

    match fragment {
        Some(fragment) => format!("{}{}{}={}#{}", base, separator, key, value, fragment),
        None => format!("{}{}{}={}", base, separator, key, value),
    }
}

/// Makes sure the URL carries exactly one `pageSize` parameter with `page_size`.
pub fn ensure_page_size(url: &str, page_size: u32) -> String {
    if PAGE_SIZE_REGEX.is_match(url) {
        let mut seen = false;
        // `?` precedes every `&`, so the first match is the one kept.
        let replaced = PAGE_SIZE_REGEX.replace_all(url, |caps: &regex::Captures| {
            if seen {
                return String::new();
            }
            seen = true;
            format!("{}{}={}", &caps[1], PAGE_SIZE_PARAM, page_size)
        });
        return replaced.into_owned();
    }

    append_param(url, PAGE_SIZE_PARAM, page_size)
}

/// Replaces the numeric value of `key` in the query string.
///
/// The name matches case-insensitively and keeps the spelling found in the
/// URL. Returns `None` if the parameter is absent.
pub fn replace_param(url: &str, key: &str, value: u32) -> Option<String> {
    let pattern = Regex::new(&format!(r"(?i)([?&])({})=\d*", regex::escape(key))).ok()?;
    if !pattern.is_match(url) {
        return None;
    }
    let replacement = format!("${{1}}${{2}}={}", value);
    Some(pattern.replace_all(url, replacement.as_str()).into_owned())
}

/// Sets `key` to `value`, replacing an existing value or appending the parameter.
pub fn set_param(url: &str, key: &str, value: u32) -> String {
    replace_param(url, key, value).unwrap_or_else(|| append_param(url, key, value))
}

/// Resolves a relative URL against the site origin.
///
/// When the first page was a search-form URL, a root-relative `/index.htm`
/// target is redirected to `/search/index.htm` so the walk stays on the
/// search endpoint.
pub fn join_preserving_search(origin: &Url, href: &str, first_page_url: &str) -> Option<String> {
    let href = href.trim();
    let mut target = href.to_string();

    if is_search_url(first_page_url)
        && href.starts_with("/index.htm")
        && !href.starts_with("/search/")
    {
        target = href.replacen("/index.htm", SEARCH_PATH_MARKER, 1);
    }

    origin.join(&target).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://www.chrono24.com").unwrap()
    }

    #[test]
    fn test_is_search_url() {
        assert!(is_search_url(
            "https://www.chrono24.com/search/index.htm?query=rolex"
        ));
        assert!(!is_search_url("https://www.chrono24.com/rolex/index.htm"));
    }

    #[test]
    fn test_append_param_separator() {
        assert_eq!(
            append_param("https://a.com/x.htm", "pageSize", 60),
            "https://a.com/x.htm?pageSize=60"
        );
        assert_eq!(
            append_param("https://a.com/x.htm?q=1", "pageSize", 60),
            "https://a.com/x.htm?q=1&pageSize=60"
        );
    }

    #[test]
    fn test_append_param_before_fragment() {
        assert_eq!(
            append_param("https://a.com/index-2.htm#wt-watches", "pageSize", 120),
            "https://a.com/index-2.htm?pageSize=120#wt-watches"
        );
        assert_eq!(
            ensure_page_size("https://a.com/index-2.htm?x=1#top", 120),
            "https://a.com/index-2.htm?x=1&pageSize=120#top"
        );
    }

    #[test]
    fn test_ensure_page_size_replaces_existing() {
        assert_eq!(
            ensure_page_size("https://a.com/x.htm?pageSize=60&q=1", 120),
            "https://a.com/x.htm?pageSize=120&q=1"
        );
        assert_eq!(
            ensure_page_size("https://a.com/x.htm?q=1&pageSize=120", 120),
            "https://a.com/x.htm?q=1&pageSize=120"
        );
    }

    #[test]
    fn test_ensure_page_size_collapses_duplicates() {
        assert_eq!(
            ensure_page_size("https://a.com/x.htm?pageSize=60&q=1&pageSize=30", 120),
            "https://a.com/x.htm?pageSize=120&q=1"
        );
    }

    #[test]
    fn test_set_param_replace_and_append() {
        assert_eq!(
            set_param("https://a.com/s?showpage=7&x=1", "showpage", 3),
            "https://a.com/s?showpage=3&x=1"
        );
        assert_eq!(
            set_param("https://a.com/s?x=1", "showpage", 3),
            "https://a.com/s?x=1&showpage=3"
        );
    }

    #[test]
    fn test_replace_param_keeps_existing_spelling() {
        assert_eq!(
            set_param("https://a.com/s?showPage=7&x=1", "showpage", 3),
            "https://a.com/s?showPage=3&x=1"
        );
        assert_eq!(
            replace_param("https://a.com/s?SHOWPAGE=2", "showPage", 4),
            Some("https://a.com/s?SHOWPAGE=4".to_string())
        );
    }

    #[test]
    fn test_replace_param_does_not_match_suffix_names() {
        assert_eq!(replace_param("https://a.com/s?xshowpage=2", "showpage", 3), None);
    }

    #[test]
    fn test_join_plain_relative() {
        assert_eq!(
            join_preserving_search(&origin(), "/rolex/index-2.htm", "https://www.chrono24.com/rolex/index.htm")
                .unwrap(),
            "https://www.chrono24.com/rolex/index-2.htm"
        );
        assert_eq!(
            join_preserving_search(&origin(), "https://other.example/p", "https://www.chrono24.com/x.htm")
                .unwrap(),
            "https://other.example/p"
        );
    }

    #[test]
    fn test_join_keeps_search_path() {
        let first = "https://www.chrono24.com/search/index.htm?query=rolex";
        assert_eq!(
            join_preserving_search(&origin(), "/index.htm?query=rolex&showpage=2", first).unwrap(),
            "https://www.chrono24.com/search/index.htm?query=rolex&showpage=2"
        );
        assert_eq!(
            join_preserving_search(
                &origin(),
                "/index.htm?x=1",
                "https://www.chrono24.com/rolex/index.htm"
            )
            .unwrap(),
            "https://www.chrono24.com/index.htm?x=1"
        );
    }
}
