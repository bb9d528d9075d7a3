//! Shared HTTP client for store requests.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use revdash_core::{AppConfig, Store};

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

/// Browser-like `User-Agent` for strategies that need to look like a storefront visitor.
pub(crate) const BROWSER_FALLBACK_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// HTTP client with the configured timeout, `User-Agent`, and retry policy.
///
/// Transient errors (429, 5xx, network failures) are retried with exponential
/// back-off up to `max_retries` additional attempts. Other non-2xx responses are
/// returned as typed errors.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
        })
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
            config.scraper_max_retries,
            config.scraper_retry_backoff_base_ms,
        )
    }

    /// GETs `url` and returns the body text.
    pub(crate) async fn get_text(
        &self,
        store: Store,
        url: &str,
        user_agent_override: Option<&str>,
    ) -> Result<String, ScraperError> {
        self.send_text(store, url, || {
            let request = self.client.get(url);
            with_user_agent(request, user_agent_override)
        })
        .await
    }

    /// POSTs an url-encoded form to `url` and returns the body text.
    pub(crate) async fn post_form_text(
        &self,
        store: Store,
        url: &str,
        form: &[(&str, &str)],
        user_agent_override: Option<&str>,
    ) -> Result<String, ScraperError> {
        self.send_text(store, url, || {
            let request = self.client.post(url).form(form);
            with_user_agent(request, user_agent_override)
        })
        .await
    }

    async fn send_text<B>(
        &self,
        store: Store,
        url: &str,
        build: B,
    ) -> Result<String, ScraperError>
    where
        B: Fn() -> RequestBuilder,
    {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let request = build();
            async move {
                let response = request.send().await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    return Err(ScraperError::RateLimited {
                        store,
                        retry_after_secs: retry_after_secs(response.headers()),
                    });
                }

                if status == StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound {
                        url: url.to_owned(),
                    });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_owned(),
                    });
                }

                Ok(response.text().await?)
            }
        })
        .await
    }
}

/// Delay-seconds form of `Retry-After`; HTTP-date values are ignored.
fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

fn with_user_agent(request: RequestBuilder, user_agent: Option<&str>) -> RequestBuilder {
    match user_agent {
        Some(ua) => request.header(reqwest::header::USER_AGENT, ua),
        None => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn retry_after_reads_delay_seconds() {
        assert_eq!(retry_after_secs(&headers("120")), Some(120));
        assert_eq!(retry_after_secs(&headers(" 3 ")), Some(3));
    }

    #[test]
    fn retry_after_ignores_http_dates_and_absence() {
        assert_eq!(retry_after_secs(&headers("Wed, 21 Oct 2026 07:28:00 GMT")), None);
        assert_eq!(retry_after_secs(&HeaderMap::new()), None);
    }
}
