//! Apple App Store review adapter, backed by the customer-reviews RSS feed.

use std::time::Duration;

use revdash_core::{AppConfig, DateWindow, Store};

use super::app_store_feed::{parse_json_feed, parse_xml_feed, FeedPage};
use super::{run_strategies, FetchLimits, FetchOutcome, StoreAdapter, Strategy, StrategyPayload};
use crate::date;
use crate::error::ScraperError;
use crate::http::HttpClient;
use crate::types::{AppStoreReview, RawRecord};

/// The feed serves at most this many pages per storefront.
const MAX_PAGES: u32 = 10;

#[derive(Debug, Clone)]
pub struct AppStoreSettings {
    pub base_url: String,
    /// Two-letter storefront code, e.g. `"ru"`.
    pub country: String,
}

impl AppStoreSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.app_store_base_url.clone(),
            country: config.app_store_country.clone(),
        }
    }

    fn feed_url(&self, app_id: &str, page: u32, format: &str) -> String {
        format!(
            "{}/{}/rss/customerreviews/page={page}/id={app_id}/sortby=mostrecent/{format}",
            self.base_url.trim_end_matches('/'),
            self.country
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppStoreMethod {
    RssJson,
    RssXml,
}

impl AppStoreMethod {
    const ORDER: [AppStoreMethod; 2] = [AppStoreMethod::RssJson, AppStoreMethod::RssXml];

    fn format(self) -> &'static str {
        match self {
            AppStoreMethod::RssJson => "json",
            AppStoreMethod::RssXml => "xml",
        }
    }

    fn parse(self, body: &str) -> Result<FeedPage, ScraperError> {
        match self {
            AppStoreMethod::RssJson => parse_json_feed(body),
            AppStoreMethod::RssXml => parse_xml_feed(body),
        }
    }
}

impl Strategy for AppStoreMethod {
    fn name(self) -> &'static str {
        match self {
            AppStoreMethod::RssJson => "rss_json",
            AppStoreMethod::RssXml => "rss_xml",
        }
    }
}

/// Fetches App Store reviews from the public customer-reviews feed.
#[derive(Debug, Clone)]
pub struct AppStoreAdapter {
    http: HttpClient,
    settings: AppStoreSettings,
    limits: FetchLimits,
}

impl AppStoreAdapter {
    #[must_use]
    pub fn new(http: HttpClient, settings: AppStoreSettings, limits: FetchLimits) -> Self {
        Self {
            http,
            settings,
            limits,
        }
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Ok(Self::new(
            HttpClient::from_config(config)?,
            AppStoreSettings::from_config(config),
            FetchLimits::from_config(config),
        ))
    }

    /// Walks feed pages `1..=10` with one rendition of the feed.
    ///
    /// A page that fails after the first one ends pagination but keeps what
    /// was already collected; a failing first page fails the strategy.
    async fn fetch_with(
        &self,
        app_id: &str,
        window: &DateWindow,
        method: AppStoreMethod,
    ) -> Result<StrategyPayload, ScraperError> {
        let cap = self.limits.max_reviews;
        let mut reviews: Vec<AppStoreReview> = Vec::new();
        let mut pages = 0u32;
        let mut skipped = 0usize;

        for page_number in 1..=MAX_PAGES {
            if reviews.len() >= cap {
                break;
            }
            if page_number > 1 && self.limits.inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.limits.inter_request_delay_ms)).await;
            }

            let url = self.settings.feed_url(app_id, page_number, method.format());
            let page = match self.fetch_page(&url, method).await {
                Ok(page) => page,
                Err(e) if page_number > 1 => {
                    tracing::warn!(
                        app_id,
                        method = method.name(),
                        page = page_number,
                        error = %e,
                        "app store page failed, keeping earlier pages"
                    );
                    break;
                }
                Err(e) => return Err(e),
            };
            pages += 1;
            skipped += page.skipped;

            tracing::debug!(
                app_id,
                method = method.name(),
                page = page_number,
                reviews = page.reviews.len(),
                "app store page fetched"
            );

            if page.reviews.is_empty() {
                break;
            }
            let reached_window_start = predates(&page.reviews, window);
            reviews.extend(page.reviews);
            if reached_window_start {
                break;
            }
        }

        reviews.truncate(cap);
        let shape = format!(
            "{pages} page(s), {} review(s), {skipped} skipped",
            reviews.len()
        );
        Ok(StrategyPayload {
            records: reviews.into_iter().map(RawRecord::AppStore).collect(),
            shape,
        })
    }

    async fn fetch_page(&self, url: &str, method: AppStoreMethod) -> Result<FeedPage, ScraperError> {
        let body = self.http.get_text(Store::AppStore, url, None).await?;
        method.parse(&body)
    }
}

/// `true` if the feed page, sorted newest first, reaches back before the window.
fn predates(page: &[AppStoreReview], window: &DateWindow) -> bool {
    page.iter()
        .filter_map(|r| date::normalize(&r.updated).ok())
        .min()
        .is_some_and(|oldest| oldest < window.from)
}

impl StoreAdapter for AppStoreAdapter {
    fn store(&self) -> Store {
        Store::AppStore
    }

    async fn fetch(
        &self,
        app_id: &str,
        window: &DateWindow,
        debug: bool,
    ) -> Result<FetchOutcome, ScraperError> {
        run_strategies(
            Store::AppStore,
            app_id,
            &AppStoreMethod::ORDER,
            debug,
            |method| self.fetch_with(app_id, window, method),
        )
        .await
    }
}
