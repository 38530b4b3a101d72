//! Paginated-URL resolution for result listings.
//!
//! Result pages on the site are paginated in several incompatible ways:
//! a `showpage` parameter on the search endpoint, a `showPage` parameter on
//! category pages, a page number in the last path segment, or nothing but a
//! `rel="next"` link. This module discovers which one applies to a query and
//! derives page URLs from it.

mod analyzer;
mod cache;
mod classifier;
mod resolver;
mod scheme;
mod url;

pub use analyzer::{Anchor, PageLinks, find_next_link};
pub use cache::{CachedTemplate, MemoryTemplateCache, QueryKey, TemplateCache};
pub use classifier::{classify_anchor, classify_url, find_page_two_link};
pub use resolver::{DEFAULT_SORT_ORDER, PageResolver};
pub use scheme::{PaginationScheme, Rendered, SegmentForm, UrlTemplate};
pub use self::url::{SEARCH_PATH_MARKER, ensure_page_size, is_search_url, join_preserving_search};
