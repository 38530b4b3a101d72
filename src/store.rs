//! JSON persistence for extracted listings.

use crate::error::StoreError;
use crate::listings::Listing;
use std::path::Path;

/// Default file name for a full run's listings.
pub const LISTINGS_FILENAME: &str = "all_listings.json";

/// Writes listings as pretty-printed JSON, creating parent directories.
pub fn save_listings(path: &Path, listings: &[Listing]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(listings)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Reads listings written by [`save_listings`].
pub fn load_listings(path: &Path) -> Result<Vec<Listing>, StoreError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn listing(id: &str) -> Listing {
        Listing {
            id: id.to_string(),
            url: format!("https://www.chrono24.com/rolex/--id{}.htm", id),
            manufacturer: Some("Rolex".to_string()),
            certification_status: None,
            title: Some("Daytona".to_string()),
            description: None,
            price: Some("$30,000".to_string()),
            shipping_price: "$0".to_string(),
            location: Some("Germany".to_string()),
            merchant_name: Some("Dealer".to_string()),
            badge: None,
            image_urls: Vec::new(),
            details: None,
        }
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join(LISTINGS_FILENAME);
        let listings = vec![listing("1"), listing("2")];

        save_listings(&path, &listings).unwrap();
        let loaded = load_listings(&path).unwrap();

        assert_eq!(loaded, listings);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_listings(&dir.path().join("missing.json")),
            Err(StoreError::Io(_))
        ));
    }

    #[test]
    fn test_invalid_json_is_json_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(load_listings(&path), Err(StoreError::Json(_))));
    }
}
