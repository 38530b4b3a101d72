//! First-page search URL construction.

use crate::pagination::SEARCH_PATH_MARKER;
use url::form_urlencoded;

/// Builds the search-endpoint URL for a free-text query.
pub fn build_search_url(origin: &str, query: &str, page_size: u32, sort_order: u32) -> String {
    let query: String = form_urlencoded::byte_serialize(query.trim().as_bytes()).collect();
    format!(
        "{}{}?dosearch=true&query={}&sortorder={}&pageSize={}",
        origin.trim_end_matches('/'),
        SEARCH_PATH_MARKER,
        query,
        sort_order,
        page_size
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_search_url() {
        assert_eq!(
            build_search_url("https://www.chrono24.com/", "Audemars Piguet Royal Oak", 120, 5),
            "https://www.chrono24.com/search/index.htm?dosearch=true&query=Audemars+Piguet+Royal+Oak&sortorder=5&pageSize=120"
        );
    }

    #[test]
    fn test_query_is_encoded() {
        let url = build_search_url("https://www.chrono24.com", "A&B 50%", 60, 1);
        assert!(url.contains("query=A%26B+50%25&"));
    }
}
