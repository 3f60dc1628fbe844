//! Pagination discovery
//!
//! Walks a category's listing pages (`{url}`, then `{url}?page=N`) and
//! collects detail-page links in discovery order. Pagination ends when a
//! page has no "next" link, or when a page after the first contributes no
//! new links even though a "next" link is still present.

use crate::crawler::fetcher::Transport;
use crate::crawler::parser::{parse_selector, resolve_link};
use crate::crawler::retry::RetryController;
use crate::state::CrawlState;
use crate::ScraperError;
use scraper::Html;
use url::Url;

/// Anchors that lead to exercise detail pages
const DETAIL_LINK_SELECTOR: &str = ".node-title a[href], .view-content-button a[href]";

/// The pager's "next page" affordance
const NEXT_PAGE_SELECTOR: &str = ".pager-next a[href]";

/// What one listing page offers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Detail links in document order, possibly with repeats
    pub links: Vec<String>,
    pub has_next_page: bool,
}

/// Why pagination stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The last page had no next-page link
    NoNextPage,
    /// A page after the first yielded nothing new
    NoNewLinks,
    /// Too many pages attempted without collecting a single link
    RunawayGuard,
}

/// Summary of one discovery pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOutcome {
    pub pages_attempted: u32,
    pub urls_found: usize,
    pub stop_reason: StopReason,
}

/// Extracts detail links and the next-page flag from listing markup
pub fn parse_listing(html: &str, base_url: &Url) -> ListingPage {
    let document = Html::parse_document(html);

    let links: Vec<String> = parse_selector(DETAIL_LINK_SELECTOR)
        .map(|selector| {
            document
                .select(&selector)
                .filter_map(|element| element.value().attr("href"))
                .filter_map(|href| resolve_link(href, base_url))
                .collect()
        })
        .unwrap_or_default();

    let has_next_page = parse_selector(NEXT_PAGE_SELECTOR)
        .map(|selector| document.select(&selector).next().is_some())
        .unwrap_or(false);

    ListingPage {
        links,
        has_next_page,
    }
}

/// URL of the zero-based listing page `page`
pub fn listing_page_url(listing_url: &str, page: u32) -> String {
    if page == 0 {
        listing_url.to_string()
    } else if listing_url.contains('?') {
        format!("{}&page={}", listing_url, page)
    } else {
        format!("{}?page={}", listing_url, page)
    }
}

/// Walks the listing pages of one category
pub struct PaginationDiscoverer<'a> {
    transport: &'a Transport,
    listing_url: &'a str,
    runaway_page_limit: u32,
}

impl<'a> PaginationDiscoverer<'a> {
    pub fn new(transport: &'a Transport, listing_url: &'a str, runaway_page_limit: u32) -> Self {
        Self {
            transport,
            listing_url,
            runaway_page_limit,
        }
    }

    async fn fetch_listing(&self, page_url: &str) -> Result<ListingPage, ScraperError> {
        let html = self.transport.fetch_html(page_url).await?;
        let base_url = Url::parse(page_url)?;
        Ok(parse_listing(&html, &base_url))
    }

    /// Collects detail URLs into `state` until pagination ends
    ///
    /// Pages whose retries are exhausted are skipped. Only a fatal error,
    /// such as the global failure ceiling, aborts discovery.
    pub async fn run(
        &self,
        retry: &mut RetryController,
        state: &mut CrawlState,
    ) -> Result<DiscoveryOutcome, ScraperError> {
        tracing::info!("Fetching exercise URLs from {}", self.listing_url);
        let first_page = state.current_page();

        let stop_reason = loop {
            let page = state.current_page();
            let page_url = listing_page_url(self.listing_url, page);
            tracing::info!("Fetching page {}...", page + 1);

            let label = format!("listing page {}", page + 1);
            let page_url = page_url.as_str();
            let result = retry.run(&label, || self.fetch_listing(page_url)).await;
            self.transport.pause().await;
            state.advance_page();

            match result {
                Ok(listing) => {
                    let new_links = listing
                        .links
                        .iter()
                        .filter(|link| state.mark_discovered(link))
                        .count();
                    tracing::info!("Found {} new exercises on page {}", new_links, page + 1);
                    tracing::info!(
                        "Total exercises collected so far: {}",
                        state.detail_urls().len()
                    );

                    if new_links == 0 && page > 0 {
                        tracing::info!(
                            "No new exercises found on page {}, assuming end of pagination",
                            page + 1
                        );
                        break StopReason::NoNewLinks;
                    }
                    if !listing.has_next_page {
                        break StopReason::NoNextPage;
                    }
                }
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => {
                    tracing::warn!("Skipping page {}: {}", page + 1, error);
                }
            }

            if state.current_page() > self.runaway_page_limit && state.detail_urls().is_empty() {
                tracing::error!("Too many pages with errors and no results, stopping pagination");
                break StopReason::RunawayGuard;
            }
        };

        let outcome = DiscoveryOutcome {
            pages_attempted: state.current_page() - first_page,
            urls_found: state.detail_urls().len(),
            stop_reason,
        };
        tracing::info!(
            "Found {} unique exercise URLs in total ({} pages)",
            outcome.urls_found,
            outcome.pages_attempted
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/exercises/abs").unwrap()
    }

    #[test]
    fn test_parse_listing_links_and_pager() {
        let html = r#"
            <div class="node-title"><a href="/exercises/crunch.html">Crunch</a></div>
            <div class="view-content-button"><a href="/exercises/plank.html">View</a></div>
            <div class="node-title"><a href="/exercises/crunch.html">Crunch again</a></div>
            <a href="/exercises/unrelated.html">Sidebar</a>
            <ul class="pager"><li class="pager-next"><a href="?page=1">next</a></li></ul>
        "#;
        let listing = parse_listing(html, &base_url());

        assert_eq!(
            listing.links,
            vec![
                "https://example.com/exercises/crunch.html",
                "https://example.com/exercises/plank.html",
                "https://example.com/exercises/crunch.html",
            ]
        );
        assert!(listing.has_next_page);
    }

    #[test]
    fn test_parse_listing_without_pager() {
        let html = r#"<div class="node-title"><a href="/exercises/crunch.html">Crunch</a></div>
                      <ul class="pager"><li class="pager-next"></li></ul>"#;
        let listing = parse_listing(html, &base_url());
        assert_eq!(listing.links.len(), 1);
        assert!(!listing.has_next_page);
    }

    #[test]
    fn test_listing_page_url() {
        let url = "https://example.com/exercises/abs";
        assert_eq!(listing_page_url(url, 0), url);
        assert_eq!(listing_page_url(url, 2), "https://example.com/exercises/abs?page=2");
        assert_eq!(
            listing_page_url("https://example.com/list?sort=a", 1),
            "https://example.com/list?sort=a&page=1"
        );
    }
}
