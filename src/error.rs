//! Error types for the Chronopage crate.
//!
//! Uses `thiserror` for structured error definitions that provide
//! clear context about what went wrong.

use thiserror::Error;

/// Error type for page fetch operations.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The rendering proxy reported a failure
    #[error("Rendering proxy error: {0}")]
    Proxy(String),

    /// All retry attempts exhausted
    #[error("All retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<FetchError> },

    /// HTTP client could not be built
    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

/// Error type for paginated URL resolution.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// Fetching a page failed
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Page 1 carries neither a pagination link nor a next relation
    #[error("No pagination mechanism discoverable on {url}")]
    NoPagination { url: String },

    /// A next-relation walk ran out of links before the target page
    #[error("Could not find further pagination (rel='next' missing) on page {page}: {url}")]
    NextLinkMissing { page: u32, url: String },

    /// A classified template does not carry the expected page marker
    #[error("Malformed template '{template}': {reason}")]
    MalformedTemplate { template: String, reason: String },

    /// The caller passed arguments the resolver cannot work with
    #[error("Invalid resolve request: {0}")]
    InvalidRequest(String),
}

/// Error type for listing extraction.
#[derive(Error, Debug)]
pub enum ListingError {
    /// The page has no listing container
    #[error("No listings were found")]
    NoListings,
}

/// Error type for listing persistence.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to read or write the listings file
    #[error("Failed to access listings file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode or decode JSON
    #[error("Failed to process listings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Result type alias using anyhow for application-level error handling.
pub type Result<T> = anyhow::Result<T>;
