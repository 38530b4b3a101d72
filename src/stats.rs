//! Price statistics over extracted listings.

use crate::listings::Listing;
use std::collections::BTreeMap;

/// Parses a displayed price such as `$10,023` into a number.
pub fn parse_price(price: &str) -> Option<f64> {
    let cleaned: String = price
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | ','))
        .collect();

    if cleaned.is_empty() || cleaned == "null" {
        return None;
    }

    cleaned.parse().ok().filter(|v: &f64| v.is_finite())
}

/// Summary statistics for a set of values.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation, 0 for a single value.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl PriceSummary {
    /// Summarises `values`, or `None` if there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };
        let std_dev = if count > 1 {
            let variance =
                sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        Some(Self {
            count,
            mean,
            median,
            std_dev,
            min: sorted[0],
            max: sorted[count - 1],
        })
    }
}

/// Aggregates for one merchant kind or location.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub count: usize,
    pub avg_price: Option<f64>,
    pub avg_shipping: Option<f64>,
}

/// Statistics over a run's listings.
#[derive(Debug, Clone)]
pub struct ListingStats {
    pub price: Option<PriceSummary>,
    pub shipping: Option<PriceSummary>,
    /// Price plus shipping; missing shipping counts as free.
    pub total: Option<PriceSummary>,
    pub by_merchant: BTreeMap<String, GroupSummary>,
    pub by_location: BTreeMap<String, GroupSummary>,
}

impl ListingStats {
    pub fn from_listings(listings: &[Listing]) -> Self {
        let prices: Vec<f64> = listings
            .iter()
            .filter_map(|l| l.price.as_deref().and_then(parse_price))
            .collect();
        let shipping: Vec<f64> = listings
            .iter()
            .filter_map(|l| parse_price(&l.shipping_price))
            .collect();
        let totals: Vec<f64> = listings
            .iter()
            .filter_map(|l| {
                let price = l.price.as_deref().and_then(parse_price)?;
                Some(price + parse_price(&l.shipping_price).unwrap_or(0.0))
            })
            .collect();

        Self {
            price: PriceSummary::from_values(&prices),
            shipping: PriceSummary::from_values(&shipping),
            total: PriceSummary::from_values(&totals),
            by_merchant: group_by(listings, |l| l.merchant_name.as_deref()),
            by_location: group_by(listings, |l| l.location.as_deref()),
        }
    }
}

/// Group name for listings without a merchant kind or location.
pub const UNKNOWN_GROUP: &str = "Unknown";

fn group_by<'a, F>(listings: &'a [Listing], key: F) -> BTreeMap<String, GroupSummary>
where
    F: Fn(&'a Listing) -> Option<&'a str>,
{
    let mut groups: BTreeMap<String, Vec<&Listing>> = BTreeMap::new();
    for listing in listings {
        let name = key(listing).unwrap_or(UNKNOWN_GROUP);
        groups.entry(name.to_string()).or_default().push(listing);
    }

    groups
        .into_iter()
        .map(|(name, members)| {
            let prices: Vec<f64> = members
                .iter()
                .filter_map(|l| l.price.as_deref().and_then(parse_price))
                .collect();
            let shipping: Vec<f64> = members
                .iter()
                .filter_map(|l| parse_price(&l.shipping_price))
                .collect();

            let summary = GroupSummary {
                count: members.len(),
                avg_price: PriceSummary::from_values(&prices).map(|s| s.mean),
                avg_shipping: PriceSummary::from_values(&shipping).map(|s| s.mean),
            };
            (name, summary)
        })
        .collect()
}
