//! Chronopage - paginated search-result crawler for Chrono24.
//!
//! This library provides functionality for:
//! - Resolving the URL of any result page for a query, whatever pagination scheme the site uses
//! - Fetching pages directly or through a FlareSolverr proxy
//! - Extracting listings and summarising their prices

pub mod config;
pub mod console;
pub mod error;
pub mod fetcher;
pub mod listings;
pub mod pagination;
pub mod search;
pub mod stats;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use console::Console;
pub use error::{ConfigError, FetchError, ListingError, ResolutionError, StoreError};
pub use fetcher::{PageFetcher, create_fetcher};
pub use listings::{Listing, ListingDetails, ListingPage};
pub use pagination::{MemoryTemplateCache, PageResolver, PaginationScheme, TemplateCache};
pub use stats::ListingStats;
