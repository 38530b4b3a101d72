//! Chronopage CLI - crawls Chrono24 search results page by page.

use anyhow::Context;
use chronopage::config::Config;
use chronopage::console::{Console, Style};
use chronopage::error::{ListingError, Result};
use chronopage::fetcher::{PageFetcher, create_fetcher};
use chronopage::listings::{Listing, ListingDetails, ListingPage};
use chronopage::pagination::{MemoryTemplateCache, PageResolver};
use chronopage::search::build_search_url;
use chronopage::stats::{GroupSummary, ListingStats, PriceSummary};
use chronopage::store::{LISTINGS_FILENAME, save_listings};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// Chrono24 search-result crawler.
#[derive(Parser, Debug)]
#[command(name = "chronopage")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Free-text search query.
    #[arg(required_unless_present = "url")]
    query: Option<String>,

    /// First results page to crawl instead of a search for QUERY.
    #[arg(long)]
    url: Option<String>,

    /// Start at result page N (1-based).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    start: u32,

    /// Stop at result page N (1-based, inclusive).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    end: Option<u32>,

    /// Listings per page (overrides config).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    page_size: Option<u32>,

    /// Sort order code (overrides config).
    #[arg(long)]
    sort_order: Option<u32>,

    /// Stop after collecting N listings.
    #[arg(long)]
    limit: Option<usize>,

    /// Only print the resolved page URLs.
    #[arg(long, requires = "end")]
    resolve_only: bool,

    /// Fetch each listing's own page for product and merchant details.
    #[arg(long)]
    details: bool,

    /// Output file for the collected listings.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let console = Console::new();

    console.section("Chronopage - Chrono24 Search Crawler");

    // Load configuration
    console.step("Loading configuration...");
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    console.success("Configuration loaded");

    if let Some(end) = args.end
        && args.start > end
    {
        anyhow::bail!(
            "Start page ({}) cannot be greater than end page ({})",
            args.start,
            end
        );
    }

    let page_size = args.page_size.unwrap_or(config.search.page_size);
    let sort_order = args.sort_order.unwrap_or(config.search.sort_order);
    let first_page_url = match (&args.url, &args.query) {
        (Some(url), _) => url.clone(),
        (None, Some(query)) => {
            build_search_url(&config.search.base_url, query, page_size, sort_order)
        }
        (None, None) => anyhow::bail!("Either a query or --url is required"),
    };

    let fetcher = create_fetcher(&config.fetch).context("Failed to create fetcher")?;
    console.success(&format!("Using {} fetcher", fetcher.name()));

    let resolver = PageResolver::from_config(
        Arc::clone(&fetcher),
        Arc::new(MemoryTemplateCache::new()),
        &config.search,
        config.fetch.debug,
    )
    .context("Failed to create resolver")?;

    console.info(&format!("First page: {}", first_page_url));

    if args.resolve_only {
        let end = args.end.unwrap_or(args.start);
        for page in args.start..=end {
            let url = resolver
                .resolve_sorted(&first_page_url, page, page_size, sort_order)
                .await
                .with_context(|| format!("Failed to resolve page {}", page))?;
            println!("{} {}", console.page_info(page, Some(end)), url);
        }
        return Ok(());
    }

    let mut listings = crawl(
        &args,
        &console,
        &resolver,
        fetcher.as_ref(),
        &config,
        &first_page_url,
        page_size,
        sort_order,
    )
    .await?;

    if args.details && !listings.is_empty() {
        console.step("Fetching listing details...");
        fetch_details(&console, fetcher.as_ref(), &mut listings).await;
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.paths.output_directory.join(LISTINGS_FILENAME));
    save_listings(&output, &listings)
        .with_context(|| format!("Failed to save listings to {}", output.display()))?;
    console.success(&format!(
        "Saved {} listings to {}",
        console.count(listings.len()),
        output.display()
    ));

    print_stats(&console, &ListingStats::from_listings(&listings));

    console.section("Done!");
    Ok(())
}

/// Walks result pages until a stop condition is reached.
#[allow(clippy::too_many_arguments)]
async fn crawl(
    args: &Args,
    console: &Console,
    resolver: &PageResolver,
    fetcher: &dyn PageFetcher,
    config: &Config,
    first_page_url: &str,
    page_size: u32,
    sort_order: u32,
) -> Result<Vec<Listing>> {
    let mut listings = Vec::new();
    let mut total_pages: Option<u32> = None;
    let mut page = args.start;

    loop {
        if let Some(end) = args.end
            && page > end
        {
            break;
        }
        if let Some(total) = total_pages
            && page > total
        {
            console.info(&format!("Reached the last page ({})", total));
            break;
        }

        let url = resolver
            .resolve_sorted(first_page_url, page, page_size, sort_order)
            .await
            .with_context(|| format!("Failed to resolve page {}", page))?;
        console.step(&format!("{} {}", console.page_info(page, total_pages), url));

        let html = fetcher
            .fetch(&url)
            .await
            .with_context(|| format!("Failed to fetch page {}", page))?;

        let parsed = match ListingPage::parse(&html, &config.search.base_url) {
            Ok(parsed) if !parsed.listings.is_empty() => parsed,
            Ok(_) | Err(ListingError::NoListings) => {
                console.warning(&format!("No listings on page {}, stopping", page));
                break;
            }
        };

        if total_pages.is_none() && parsed.total_count > 0 {
            let total = parsed.total_pages(page_size);
            console.info(&format!(
                "{} results across {} pages",
                parsed.total_count, total
            ));
            total_pages = Some(total);
        }

        console.success(&format!("Found {} listings", console.count(parsed.listings.len())));
        listings.extend(parsed.listings);

        if let Some(limit) = args.limit
            && listings.len() >= limit
        {
            listings.truncate(limit);
            console.info(&format!("Reached the listing limit ({})", limit));
            break;
        }

        page += 1;
    }

    Ok(listings)
}

/// Merges each listing's detail page into it. Failures are reported and skipped.
async fn fetch_details(console: &Console, fetcher: &dyn PageFetcher, listings: &mut [Listing]) {
    let total = listings.len();
    let mut failed = 0;

    for (i, listing) in listings.iter_mut().enumerate() {
        console.progress_update(&format!("Listing {}/{}: {}", i + 1, total, listing.id));
        match fetcher.fetch(&listing.url).await {
            Ok(html) => listing.details = Some(ListingDetails::parse(&html)),
            Err(e) => {
                failed += 1;
                console.clear_line();
                console.warning(&format!("Failed to fetch details for {}: {}", listing.id, e));
            }
        }
    }
    console.clear_line();
    println!();

    console.success(&format!(
        "Fetched details for {} of {} listings",
        console.count(total - failed),
        total
    ));
}

fn print_stats(console: &Console, stats: &ListingStats) {
    console.section("Statistics");

    print_summary(console, "Price", stats.price.as_ref());
    print_summary(console, "Shipping", stats.shipping.as_ref());
    print_summary(console, "Total", stats.total.as_ref());

    print_groups(console, "By merchant", &stats.by_merchant);
    print_groups(console, "By location", &stats.by_location);
}

fn print_summary(console: &Console, label: &str, summary: Option<&PriceSummary>) {
    let Some(s) = summary else {
        println!("  {} {}", console.style(label, &[Style::Bold]), console.muted("no data"));
        return;
    };

    println!(
        "  {} n={} mean={} median={} std={} min={} max={}",
        console.style(label, &[Style::Bold]),
        console.count(s.count),
        console.amount(s.mean),
        console.amount(s.median),
        console.amount(s.std_dev),
        console.amount(s.min),
        console.amount(s.max)
    );
}

fn print_groups(
    console: &Console,
    label: &str,
    groups: &std::collections::BTreeMap<String, GroupSummary>,
) {
    if groups.is_empty() {
        return;
    }

    println!("  {}", console.style(label, &[Style::Bold]));
    for (name, group) in groups {
        let avg = |v: Option<f64>| {
            v.map(|v| console.amount(v))
                .unwrap_or_else(|| console.muted("n/a"))
        };
        println!(
            "    {} n={} avg price={} avg shipping={}",
            name,
            console.count(group.count),
            avg(group.avg_price),
            avg(group.avg_shipping)
        );
    }
}
