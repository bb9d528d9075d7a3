//! Google Play review adapter.

use std::time::Duration;

use revdash_core::{AppConfig, DateWindow, Store};

use super::play_parse::{build_request_payload, parse_reviews_page, PlaySort};
use super::{run_strategies, FetchLimits, FetchOutcome, StoreAdapter, Strategy, StrategyPayload};
use crate::error::ScraperError;
use crate::http::{HttpClient, BROWSER_FALLBACK_UA};
use crate::types::{PlayReview, RawRecord};

/// Largest page the review rpc serves.
const PAGE_SIZE: usize = 100;

/// Where and how to reach the Play storefront.
#[derive(Debug, Clone)]
pub struct PlaySettings {
    pub base_url: String,
    /// Interface language, `hl`.
    pub lang: String,
    /// Storefront country, `gl`.
    pub country: String,
}

impl PlaySettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.play_base_url.clone(),
            lang: config.play_lang.clone(),
            country: config.play_country.clone(),
        }
    }

    fn batchexecute_url(&self) -> String {
        format!(
            "{}/_/PlayStoreUi/data/batchexecute?hl={}&gl={}",
            self.base_url.trim_end_matches('/'),
            self.lang,
            self.country
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayMethod {
    /// Newest-first reviews with the configured `User-Agent`.
    BatchNewest,
    /// Relevance-sorted reviews requested with a desktop browser profile.
    BatchBrowserProfile,
}

impl PlayMethod {
    const ORDER: [PlayMethod; 2] = [PlayMethod::BatchNewest, PlayMethod::BatchBrowserProfile];

    fn sort(self) -> PlaySort {
        match self {
            PlayMethod::BatchNewest => PlaySort::Newest,
            PlayMethod::BatchBrowserProfile => PlaySort::MostRelevant,
        }
    }

    fn user_agent(self) -> Option<&'static str> {
        match self {
            PlayMethod::BatchNewest => None,
            PlayMethod::BatchBrowserProfile => Some(BROWSER_FALLBACK_UA),
        }
    }
}

impl Strategy for PlayMethod {
    fn name(self) -> &'static str {
        match self {
            PlayMethod::BatchNewest => "batchexecute_newest",
            PlayMethod::BatchBrowserProfile => "batchexecute_browser_profile",
        }
    }
}

/// Fetches Play reviews through the storefront's `batchexecute` endpoint.
#[derive(Debug, Clone)]
pub struct PlayAdapter {
    http: HttpClient,
    settings: PlaySettings,
    limits: FetchLimits,
}

impl PlayAdapter {
    #[must_use]
    pub fn new(http: HttpClient, settings: PlaySettings, limits: FetchLimits) -> Self {
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
            PlaySettings::from_config(config),
            FetchLimits::from_config(config),
        ))
    }

    /// Pages through reviews with one strategy.
    ///
    /// Stops at the review cap, when the source has no next page, or (for the
    /// newest-first sort) once a page reaches back past `window.from`.
    async fn fetch_with(
        &self,
        app_id: &str,
        window: &DateWindow,
        method: PlayMethod,
    ) -> Result<StrategyPayload, ScraperError> {
        let url = self.settings.batchexecute_url();
        let cap = self.limits.max_reviews;
        let mut reviews: Vec<PlayReview> = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;
        let mut skipped = 0usize;

        while reviews.len() < cap {
            if pages > 0 && self.limits.inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.limits.inter_request_delay_ms)).await;
            }

            let count = (cap - reviews.len()).min(PAGE_SIZE);
            let payload = build_request_payload(app_id, method.sort(), count, token.as_deref());
            let body = self
                .http
                .post_form_text(
                    Store::Play,
                    &url,
                    &[("f.req", payload.as_str())],
                    method.user_agent(),
                )
                .await?;
            let page = parse_reviews_page(&body)?;
            pages += 1;
            skipped += page.skipped;

            tracing::debug!(
                app_id,
                method = method.name(),
                page = pages,
                reviews = page.reviews.len(),
                has_next = page.next_token.is_some(),
                "play page fetched"
            );

            if page.reviews.is_empty() {
                break;
            }
            let reached_window_start =
                method.sort() == PlaySort::Newest && predates(&page.reviews, window);
            reviews.extend(page.reviews);

            match page.next_token {
                Some(next) if !reached_window_start => token = Some(next),
                _ => break,
            }
        }

        reviews.truncate(cap);
        let shape = format!(
            "{pages} page(s), {} review(s), {skipped} skipped",
            reviews.len()
        );
        Ok(StrategyPayload {
            records: reviews.into_iter().map(RawRecord::Play).collect(),
            shape,
        })
    }
}

/// `true` if the oldest review on a newest-first page is before the window.
fn predates(page: &[PlayReview], window: &DateWindow) -> bool {
    page.iter()
        .filter_map(|r| r.at.parse::<i64>().ok())
        .min()
        .is_some_and(|oldest| oldest < window.from.timestamp())
}

impl StoreAdapter for PlayAdapter {
    fn store(&self) -> Store {
        Store::Play
    }

    async fn fetch(
        &self,
        app_id: &str,
        window: &DateWindow,
        debug: bool,
    ) -> Result<FetchOutcome, ScraperError> {
        run_strategies(Store::Play, app_id, &PlayMethod::ORDER, debug, |method| {
            self.fetch_with(app_id, window, method)
        })
        .await
    }
}
