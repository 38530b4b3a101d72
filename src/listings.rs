//! Listing extraction from result pages and detail pages.

use crate::error::ListingError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Comma-grouped integer such as `1,234`.
static GROUPED_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,3}(?:,\d{3})*\b").unwrap());

/// Payment keywords recognised on detail pages.
const PAYMENT_KEYWORDS: [&str; 5] = ["visa", "mastercard", "american-express", "bankwire", "affirm"];

/// Merchant kinds as they appear in location tooltips.
const MERCHANT_KINDS: [&str; 2] = ["Dealer", "Private Seller"];

/// CSS selectors used for parsing.
struct Selectors {
    /// Listing container.
    container: Selector,
    /// Listing card inside the container.
    item: Selector,
    /// Result count heading.
    total_count: Selector,
    title: Selector,
    description: Selector,
    currency: Selector,
    shipping: Selector,
    location: Selector,
    badge: Selector,
    image: Selector,
    /// Detail-page table bodies.
    tbody: Selector,
    row: Selector,
    cell: Selector,
    payment: Selector,
    delivery: Selector,
    merchant_name: Selector,
    rating: Selector,
    reviews: Selector,
    merchant_badge: Selector,
    span: Selector,
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(|| Selectors {
    container: Selector::parse("div#wt-watches").unwrap(),
    item: Selector::parse("a.js-article-item").unwrap(),
    total_count: Selector::parse("div.h1.m-b-0.m-t-0").unwrap(),
    title: Selector::parse("div.text-bold.text-ellipsis").unwrap(),
    description: Selector::parse("div.text-ellipsis.m-b-2").unwrap(),
    currency: Selector::parse("span.currency").unwrap(),
    shipping: Selector::parse("div.text-muted.text-sm").unwrap(),
    location: Selector::parse("button.js-tooltip").unwrap(),
    badge: Selector::parse("span.article-item-article-badge").unwrap(),
    image: Selector::parse("div.js-carousel-cell img").unwrap(),
    tbody: Selector::parse("tbody").unwrap(),
    row: Selector::parse("tr").unwrap(),
    cell: Selector::parse("td").unwrap(),
    payment: Selector::parse("i.payment-icon").unwrap(),
    delivery: Selector::parse("span.js-shipping-time").unwrap(),
    merchant_name: Selector::parse("button.js-link-merchant-name").unwrap(),
    rating: Selector::parse("span.rating").unwrap(),
    reviews: Selector::parse("button.js-link-merchant-reviews").unwrap(),
    merchant_badge: Selector::parse("button.dealer-bonus-badge").unwrap(),
    span: Selector::parse("span").unwrap(),
});

/// A listing card from a results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub url: String,
    pub manufacturer: Option<String>,
    pub certification_status: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub shipping_price: String,
    pub location: Option<String>,
    pub merchant_name: Option<String>,
    pub badge: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Filled in from the listing's own page when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ListingDetails>,
}

/// Extra information from a listing's own page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingDetails {
    /// Product-detail table, keys in snake case.
    pub product: BTreeMap<String, String>,
    pub available_payments: Vec<String>,
    pub anticipated_delivery: Option<String>,
    pub merchant_name: Option<String>,
    pub merchant_rating: Option<String>,
    pub merchant_reviews: Option<String>,
    pub merchant_badges: Vec<String>,
}

/// Listings and result count parsed from one results page.
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub listings: Vec<Listing>,
    /// Total results for the query, 0 if the page does not say.
    pub total_count: u64,
}

impl ListingPage {
    /// Parses a results page, resolving listing links against `origin`.
    pub fn parse(html: &str, origin: &str) -> Result<Self, ListingError> {
        let doc = Html::parse_document(html);

        let total_count = doc
            .select(&SELECTORS.total_count)
            .next()
            .and_then(|elem| first_grouped_number(&text_of(elem)))
            .unwrap_or(0);

        let container = doc
            .select(&SELECTORS.container)
            .next()
            .ok_or(ListingError::NoListings)?;

        let listings = container
            .select(&SELECTORS.item)
            .filter_map(|item| parse_listing(item, origin))
            .collect();

        Ok(Self {
            listings,
            total_count,
        })
    }

    /// Number of result pages for `page_size` listings per page.
    pub fn total_pages(&self, page_size: u32) -> u32 {
        if page_size == 0 {
            return 0;
        }
        u32::try_from(self.total_count.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
    }
}

fn parse_listing(item: ElementRef, origin: &str) -> Option<Listing> {
    let attr = |name: &str| {
        item.value()
            .attr(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let id = attr("data-article-id")?;
    let href = attr("href")?;
    let url = if href.starts_with("http://") || href.starts_with("https://") {
        href
    } else {
        format!("{}{}", origin.trim_end_matches('/'), href)
    };

    let price = item
        .select(&SELECTORS.currency)
        .next()
        .and_then(|currency| currency.parent().and_then(ElementRef::wrap))
        .and_then(non_empty_text);

    let shipping = select_text(item, &SELECTORS.shipping)
        .as_deref()
        .and_then(first_grouped_match)
        .unwrap_or_else(|| "0".to_string());

    let (location, merchant_name) = item
        .select(&SELECTORS.location)
        .next()
        .and_then(|button| button.value().attr("data-content"))
        .and_then(split_location)
        .map(|(location, merchant)| (Some(location), Some(merchant)))
        .unwrap_or((None, None));

    let image_urls = item
        .select(&SELECTORS.image)
        .filter_map(|img| img.value().attr("data-lazy-sweet-spot-master-src"))
        .map(|src| src.to_lowercase().replace("square_size_", "ExtraLarge"))
        .collect();

    Some(Listing {
        id,
        url,
        manufacturer: attr("data-manufacturer"),
        certification_status: attr("data-watch-certification-status"),
        title: select_text(item, &SELECTORS.title),
        description: select_text(item, &SELECTORS.description),
        price,
        shipping_price: format!("${}", shipping),
        location,
        merchant_name,
        badge: select_text(item, &SELECTORS.badge),
        image_urls,
        details: None,
    })
}

/// Splits "This dealer is from Germany" into location and merchant kind.
fn split_location(tooltip: &str) -> Option<(String, String)> {
    let tooltip = tooltip.trim();
    MERCHANT_KINDS.iter().find_map(|kind| {
        let prefix = format!("This {} is from ", kind.to_lowercase());
        tooltip
            .contains(&prefix)
            .then(|| (tooltip.replace(&prefix, "").trim().to_string(), kind.to_string()))
    })
}

impl ListingDetails {
    /// Parses a listing's own page.
    pub fn parse(html: &str) -> Self {
        let doc = Html::parse_document(html);
        let root = doc.root_element();

        let mut payments: Vec<String> = doc
            .select(&SELECTORS.payment)
            .filter_map(|icon| {
                let class = icon
                    .value()
                    .attr("data-lazy-class")
                    .or_else(|| icon.value().attr("class"))
                    .unwrap_or("");
                PAYMENT_KEYWORDS
                    .iter()
                    .find(|keyword| class.contains(*keyword))
                    .map(|keyword| keyword.to_string())
            })
            .collect();
        payments.sort();
        payments.dedup();

        let merchant_badges = doc
            .select(&SELECTORS.merchant_badge)
            .filter_map(|button| button.value().attr("data-content"))
            .filter_map(|content| {
                let fragment = Html::parse_fragment(content);
                fragment
                    .select(&SELECTORS.span)
                    .find(|span| span.value().attr("class").is_none_or(str::is_empty))
                    .and_then(non_empty_text)
            })
            .collect();

        Self {
            product: parse_product_table(&doc),
            available_payments: payments,
            anticipated_delivery: select_text(root, &SELECTORS.delivery)
                .map(|text| text.replace("Anticipated delivery: ", "")),
            merchant_name: select_text(root, &SELECTORS.merchant_name),
            merchant_rating: select_text(root, &SELECTORS.rating),
            merchant_reviews: select_text(root, &SELECTORS.reviews),
            merchant_badges,
        }
    }
}

/// Reads key/value rows; a single-cell row followed by another single-cell
/// row is a section header with its body.
fn parse_product_table(doc: &Html) -> BTreeMap<String, String> {
    let mut product = BTreeMap::new();

    for tbody in doc.select(&SELECTORS.tbody) {
        let rows: Vec<Vec<ElementRef>> = tbody
            .select(&SELECTORS.row)
            .map(|row| row.select(&SELECTORS.cell).collect())
            .collect();

        for (idx, cells) in rows.iter().enumerate() {
            let Some(first) = cells.first() else {
                continue;
            };
            let key = text_of(*first).to_lowercase().replace(' ', "_");
            if key.is_empty() {
                continue;
            }

            if cells.len() == 1 {
                if let Some(body) = rows.get(idx + 1).filter(|next| next.len() == 1) {
                    product.insert(key, tidy_detail(body[0]));
                }
                continue;
            }

            product.insert(key, tidy_detail(cells[1]));
        }
    }

    product
}

fn tidy_detail(cell: ElementRef) -> String {
    text_of(cell)
        .replace('\n', " ")
        .replace("Try it on", "")
        .trim()
        .to_string()
}

fn text_of(elem: ElementRef) -> String {
    elem.text().collect::<String>().trim().to_string()
}

fn non_empty_text(elem: ElementRef) -> Option<String> {
    Some(text_of(elem)).filter(|text| !text.is_empty())
}

fn select_text(elem: ElementRef, selector: &Selector) -> Option<String> {
    elem.select(selector).next().and_then(non_empty_text)
}

fn first_grouped_match(text: &str) -> Option<String> {
    GROUPED_NUMBER_REGEX
        .find(text)
        .map(|m| m.as_str().to_string())
}

fn first_grouped_number(text: &str) -> Option<u64> {
    first_grouped_match(text)?.replace(',', "").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://www.chrono24.com";

    const RESULTS_PAGE: &str = r#"
        <html><body>
          <div class="h1 m-b-0 m-t-0">1,234 results for "royal oak"</div>
          <div id="wt-watches">
            <a class="js-article-item" href="/audemarspiguet/royal-oak--id123.htm"
               data-article-id="123" data-manufacturer="Audemars Piguet"
               data-watch-certification-status="certified">
              <div class="js-carousel-cell"><img data-lazy-sweet-spot-master-src="https://img.chrono24.com/Square_Size_/a.jpg"></div>
              <div class="text-bold text-ellipsis">Royal Oak Chronograph</div>
              <div class="text-ellipsis m-b-2">Steel, 41mm</div>
              <div><span class="currency">$</span>45,900</div>
              <div class="text-muted text-sm">+ $1,250 for shipping</div>
              <button class="js-tooltip" data-content="This dealer is from Germany"></button>
              <span class="article-item-article-badge">Popular</span>
            </a>
            <a class="js-article-item" href="/audemarspiguet/royal-oak--id456.htm" data-article-id="456">
              <button class="js-tooltip" data-content="This private seller is from Japan"></button>
            </a>
            <a class="js-article-item" href="/no-id.htm"></a>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_results_page() {
        let page = ListingPage::parse(RESULTS_PAGE, ORIGIN).unwrap();

        assert_eq!(page.total_count, 1234);
        assert_eq!(page.total_pages(120), 11);
        assert_eq!(page.listings.len(), 2);

        let first = &page.listings[0];
        assert_eq!(first.id, "123");
        assert_eq!(first.url, "https://www.chrono24.com/audemarspiguet/royal-oak--id123.htm");
        assert_eq!(first.manufacturer.as_deref(), Some("Audemars Piguet"));
        assert_eq!(first.title.as_deref(), Some("Royal Oak Chronograph"));
        assert_eq!(first.price.as_deref(), Some("$45,900"));
        assert_eq!(first.shipping_price, "$1,250");
        assert_eq!(first.location.as_deref(), Some("Germany"));
        assert_eq!(first.merchant_name.as_deref(), Some("Dealer"));
        assert_eq!(first.badge.as_deref(), Some("Popular"));
        assert_eq!(first.image_urls, vec!["https://img.chrono24.com/ExtraLarge/a.jpg"]);

        let second = &page.listings[1];
        assert_eq!(second.shipping_price, "$0");
        assert_eq!(second.merchant_name.as_deref(), Some("Private Seller"));
        assert_eq!(second.location.as_deref(), Some("Japan"));
        assert!(second.price.is_none());
    }

    #[test]
    fn test_page_without_container() {
        assert!(matches!(
            ListingPage::parse("<html><body></body></html>", ORIGIN),
            Err(ListingError::NoListings)
        ));
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = ListingPage {
            listings: Vec::new(),
            total_count: 240,
        };
        assert_eq!(page.total_pages(120), 2);
        assert_eq!(page.total_pages(0), 0);
    }

    #[test]
    fn test_total_pages_saturates() {
        let page = ListingPage {
            listings: Vec::new(),
            total_count: u64::MAX,
        };
        assert_eq!(page.total_pages(1), u32::MAX);
    }

    #[test]
    fn test_parse_details() {
        let html = r#"
            <html><body>
              <table><tbody>
                <tr><td>Reference number</td><td>26331ST</td></tr>
                <tr><td>Description</td></tr>
                <tr><td>Full set,
                    Try it on</td></tr>
              </tbody></table>
              <i class="payment-icon" data-lazy-class="payment-icon-visa"></i>
              <i class="payment-icon payment-icon-affirm"></i>
              <i class="payment-icon payment-icon-visa"></i>
              <span class="js-shipping-time">Anticipated delivery: Jun 3 - Jun 9</span>
              <button class="js-link-merchant-name">Watch House</button>
              <span class="rating">4.8</span>
              <button class="js-link-merchant-reviews">312 reviews</button>
              <button class="dealer-bonus-badge" data-content="<div><span class='icon'>*</span><span>Trusted Seller</span></div>"></button>
            </body></html>
        "#;

        let details = ListingDetails::parse(html);

        assert_eq!(details.product.get("reference_number").map(String::as_str), Some("26331ST"));
        assert_eq!(details.product.get("description").map(String::as_str), Some("Full set,"));
        assert_eq!(details.available_payments, vec!["affirm", "visa"]);
        assert_eq!(details.anticipated_delivery.as_deref(), Some("Jun 3 - Jun 9"));
        assert_eq!(details.merchant_name.as_deref(), Some("Watch House"));
        assert_eq!(details.merchant_rating.as_deref(), Some("4.8"));
        assert_eq!(details.merchant_reviews.as_deref(), Some("312 reviews"));
        assert_eq!(details.merchant_badges, vec!["Trusted Seller"]);
    }
}
