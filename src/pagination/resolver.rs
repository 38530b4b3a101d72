//! Paginated-URL resolver.
//!
//! Answers "what is the URL of page N" for a first-page result URL. Search
//! URLs are addressed directly by parameter. Category URLs are fetched once
//! per query, classified, and the resulting template is cached so later pages
//! are derived without touching the network again. When no addressable form
//! exists the resolver follows `rel="next"` links page by page.

use super::analyzer::{PageLinks, find_next_link};
use super::cache::{CachedTemplate, QueryKey, TemplateCache};
use super::classifier::{classify_url, find_page_two_link};
use super::scheme::{PaginationScheme, Rendered, UrlTemplate};
use super::url::{ensure_page_size, is_search_url, join_preserving_search};
use crate::config::SearchConfig;
use crate::error::ResolutionError;
use crate::fetcher::PageFetcher;
use std::sync::Arc;
use url::Url;

/// Sort order used when the caller does not pick one (newest listings first).
pub const DEFAULT_SORT_ORDER: u32 = 5;

/// Page number that discovered templates are anchored at.
const TEMPLATE_ANCHOR_PAGE: u32 = 2;

/// Resolves result-page URLs for arbitrary page numbers.
pub struct PageResolver {
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<dyn TemplateCache>,
    origin: Url,
    debug: bool,
}

impl PageResolver {
    /// Creates a resolver joining relative links against `origin`.
    pub fn new(fetcher: Arc<dyn PageFetcher>, cache: Arc<dyn TemplateCache>, origin: Url) -> Self {
        Self {
            fetcher,
            cache,
            origin,
            debug: false,
        }
    }

    /// Creates a resolver for the configured site.
    pub fn from_config(
        fetcher: Arc<dyn PageFetcher>,
        cache: Arc<dyn TemplateCache>,
        config: &SearchConfig,
        debug: bool,
    ) -> Result<Self, ResolutionError> {
        let origin = Url::parse(&config.base_url).map_err(|e| {
            ResolutionError::InvalidRequest(format!("base URL '{}': {}", config.base_url, e))
        })?;

        Ok(Self::new(fetcher, cache, origin).with_debug(debug))
    }

    /// Enables resolver debug logging.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Resolves `page` of the query using the default sort order.
    pub async fn resolve(
        &self,
        first_page_url: &str,
        page: u32,
        page_size: u32,
    ) -> Result<String, ResolutionError> {
        self.resolve_sorted(first_page_url, page, page_size, DEFAULT_SORT_ORDER)
            .await
    }

    /// Resolves `page` of the query identified by URL, page size and sort order.
    pub async fn resolve_sorted(
        &self,
        first_page_url: &str,
        page: u32,
        page_size: u32,
        sort_order: u32,
    ) -> Result<String, ResolutionError> {
        validate_request(first_page_url, page, page_size)?;

        if is_search_url(first_page_url) {
            let template = UrlTemplate::new(ensure_page_size(first_page_url, page_size), 1);
            return self
                .render(first_page_url, &template, &PaginationScheme::SearchShowPage, page)
                .await;
        }

        let key = QueryKey::new(first_page_url, page_size, sort_order);

        if let Some(cached) = self.cache.get(&key) {
            self.log(&format!(
                "Cache hit for {} ({}), page {}",
                first_page_url, cached.scheme, page
            ));
            return self
                .render(first_page_url, &cached.template, &cached.scheme, page)
                .await;
        }

        self.log(&format!("Discovering pagination for {}", first_page_url));
        let html = self.fetcher.fetch(first_page_url).await?;
        let links = PageLinks::parse(&html);

        self.discover(&key, &links, page).await
    }

    /// Classifies page 1 and derives the requested page.
    async fn discover(
        &self,
        key: &QueryKey,
        links: &PageLinks,
        page: u32,
    ) -> Result<String, ResolutionError> {
        let first_page_url = key.first_page_url.as_str();

        if let Some((anchor, scheme)) = find_page_two_link(links) {
            self.log(&format!("Page-2 link '{}' classified as {}", anchor.href, scheme));
            let url = self.join(&anchor.href, first_page_url)?;
            return self.adopt(key, url, scheme, page).await;
        }

        let next = links
            .next
            .as_deref()
            .ok_or_else(|| ResolutionError::NoPagination {
                url: first_page_url.to_string(),
            })?;
        let page_two = self.join(next, first_page_url)?;
        self.log(&format!("No page-2 link, following rel=next to {}", page_two));

        if page != TEMPLATE_ANCHOR_PAGE
            && let Some(scheme) = classify_url(&page_two)
        {
            return self.adopt(key, page_two, scheme, page).await;
        }

        let entry = CachedTemplate {
            template: UrlTemplate::new(page_two, TEMPLATE_ANCHOR_PAGE),
            scheme: PaginationScheme::NextLinkOnly,
        };
        let url = self
            .render(first_page_url, &entry.template, &entry.scheme, page)
            .await?;
        self.store(key, entry);

        Ok(url)
    }

    /// Normalizes a classified page-2 URL into a template and caches it.
    async fn adopt(
        &self,
        key: &QueryKey,
        page_two: String,
        scheme: PaginationScheme,
        page: u32,
    ) -> Result<String, ResolutionError> {
        let template = UrlTemplate::new(
            ensure_page_size(&page_two, key.page_size),
            TEMPLATE_ANCHOR_PAGE,
        );

        // The page-1 form has to render before the template can be trusted.
        scheme.render(&template, 1)?;
        let url = self
            .render(&key.first_page_url, &template, &scheme, page)
            .await?;
        self.store(key, CachedTemplate { template, scheme });

        Ok(url)
    }

    /// Renders a page URL, walking next relations when the scheme requires it.
    async fn render(
        &self,
        first_page_url: &str,
        template: &UrlTemplate,
        scheme: &PaginationScheme,
        page: u32,
    ) -> Result<String, ResolutionError> {
        match scheme.render(template, page)? {
            Rendered::Url(url) => Ok(url),
            Rendered::FirstPage => Ok(first_page_url.to_string()),
            Rendered::Walk { from, hops } => {
                self.walk(first_page_url, from, template.anchor_page, hops)
                    .await
            }
        }
    }

    /// Follows `hops` next relations starting at the page-`from_page` document.
    async fn walk(
        &self,
        first_page_url: &str,
        from: String,
        from_page: u32,
        hops: u32,
    ) -> Result<String, ResolutionError> {
        let mut current = from;

        for step in 0..hops {
            let html = self.fetcher.fetch(&current).await?;
            let next = find_next_link(&html).ok_or_else(|| ResolutionError::NextLinkMissing {
                page: from_page + step,
                url: current.clone(),
            })?;
            current = self.join(&next, first_page_url)?;
            self.log(&format!("Walked to page {}: {}", from_page + step + 1, current));
        }

        Ok(current)
    }

    fn join(&self, href: &str, first_page_url: &str) -> Result<String, ResolutionError> {
        join_preserving_search(&self.origin, href, first_page_url).ok_or_else(|| {
            ResolutionError::MalformedTemplate {
                template: href.to_string(),
                reason: format!("cannot be joined to {}", self.origin),
            }
        })
    }

    fn store(&self, key: &QueryKey, entry: CachedTemplate) {
        let scheme = entry.scheme.name();
        if self.cache.insert(key.clone(), entry) {
            self.log(&format!("Cached {} template for {}", scheme, key.first_page_url));
        }
    }

    fn log(&self, message: &str) {
        if self.debug {
            eprintln!("[Resolver Debug] {}", message);
        }
    }
}

fn validate_request(first_page_url: &str, page: u32, page_size: u32) -> Result<(), ResolutionError> {
    if page == 0 {
        return Err(ResolutionError::InvalidRequest(
            "page numbers start at 1".to_string(),
        ));
    }

    if page_size == 0 {
        return Err(ResolutionError::InvalidRequest(
            "page size must be greater than 0".to_string(),
        ));
    }

    match Url::parse(first_page_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ResolutionError::InvalidRequest(format!(
            "not an absolute http(s) URL: {}",
            first_page_url
        ))),
    }
}
