//! Store adapters and the ordered-fallback driver they share.
//!
//! Every adapter owns a fixed list of retrieval strategies. [`run_strategies`]
//! tries them in order and stops at the first one that yields records; a
//! strategy that errors *or* comes back empty counts as a failure and hands
//! over to the next one. Only when the whole list is exhausted does the
//! adapter report [`ScraperError::SourceUnavailable`].

mod app_store;
mod app_store_feed;
mod play;
mod play_parse;

use std::future::Future;

use revdash_core::{AppConfig, AttemptOutcome, AttemptRecord, DateWindow, SourceMethod, Store};
use tracing::Level;

use crate::error::ScraperError;
use crate::types::RawRecord;

pub use app_store::{AppStoreAdapter, AppStoreSettings};
pub use play::{PlayAdapter, PlaySettings};

/// A store-side review source.
///
/// Implementations may paginate, retry, and fall back internally, but must
/// return records in the order the source produced them.
pub trait StoreAdapter: Send + Sync {
    fn store(&self) -> Store;

    /// Fetches raw reviews for `app_id`, newest first where the source allows.
    ///
    /// `window` is used only to stop paginating early; callers still filter
    /// normalized reviews against it. With `debug` set, every strategy attempt
    /// is kept in [`FetchOutcome::attempts`] (and in the `SourceUnavailable`
    /// error on total failure).
    fn fetch(
        &self,
        app_id: &str,
        window: &DateWindow,
        debug: bool,
    ) -> impl Future<Output = Result<FetchOutcome, ScraperError>> + Send;
}

/// Records from the first strategy that produced any.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub records: Vec<RawRecord>,
    pub method: SourceMethod,
    /// Empty unless the fetch ran in debug mode.
    pub attempts: Vec<AttemptRecord>,
}

/// Pagination bounds shared by both adapters.
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    /// Stop once this many raw records have been collected.
    pub max_reviews: usize,
    /// Pause between page requests within one strategy.
    pub inter_request_delay_ms: u64,
}

impl FetchLimits {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_reviews: config.max_reviews_per_store,
            inter_request_delay_ms: config.scraper_inter_request_delay_ms,
        }
    }
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            max_reviews: 100,
            inter_request_delay_ms: 0,
        }
    }
}

/// A named retrieval strategy.
pub(crate) trait Strategy: Copy {
    fn name(self) -> &'static str;
}

/// What one successful strategy call produced.
#[derive(Debug)]
pub(crate) struct StrategyPayload {
    pub(crate) records: Vec<RawRecord>,
    /// Short human description of the response, e.g. `"2 pages, 87 entries"`.
    pub(crate) shape: String,
}

/// Tries `strategies` in order until one yields at least one record.
pub(crate) async fn run_strategies<S, F, Fut>(
    store: Store,
    app_id: &str,
    strategies: &[S],
    debug: bool,
    mut attempt: F,
) -> Result<FetchOutcome, ScraperError>
where
    S: Strategy,
    F: FnMut(S) -> Fut,
    Fut: Future<Output = Result<StrategyPayload, ScraperError>>,
{
    let mut attempts = Vec::with_capacity(strategies.len());
    let mut reasons = Vec::with_capacity(strategies.len());

    for (position, strategy) in strategies.iter().copied().enumerate() {
        let method = strategy.name();
        let record = match attempt(strategy).await {
            Ok(payload) if !payload.records.is_empty() => {
                let count = payload.records.len();
                log_attempt(store, app_id, method, position, debug, None);
                attempts.push(AttemptRecord {
                    store,
                    method: method.to_owned(),
                    position,
                    outcome: AttemptOutcome::Succeeded,
                    records: count,
                    shape: Some(payload.shape),
                    reason: None,
                });
                return Ok(FetchOutcome {
                    records: payload.records,
                    method: SourceMethod::from_position(position, method),
                    attempts: if debug { attempts } else { Vec::new() },
                });
            }
            Ok(payload) => {
                let err = ScraperError::EmptyPayload { store, method };
                log_attempt(store, app_id, method, position, debug, Some(&err));
                reasons.push(format!("{method}: {err}"));
                AttemptRecord {
                    store,
                    method: method.to_owned(),
                    position,
                    outcome: AttemptOutcome::Empty,
                    records: 0,
                    shape: Some(payload.shape),
                    reason: Some(err.to_string()),
                }
            }
            Err(err) => {
                log_attempt(store, app_id, method, position, debug, Some(&err));
                reasons.push(format!("{method}: {err}"));
                AttemptRecord {
                    store,
                    method: method.to_owned(),
                    position,
                    outcome: AttemptOutcome::Failed,
                    records: 0,
                    shape: None,
                    reason: Some(err.to_string()),
                }
            }
        };
        attempts.push(record);
    }

    Err(ScraperError::SourceUnavailable {
        store,
        summary: reasons.join("; "),
        attempts: if debug { attempts } else { Vec::new() },
    })
}

/// Level an attempt is logged at: every attempt at `debug` in debug mode,
/// otherwise only failures, at `warn`.
fn attempt_level(debug: bool, failed: bool) -> Option<Level> {
    match (debug, failed) {
        (true, _) => Some(Level::DEBUG),
        (false, true) => Some(Level::WARN),
        (false, false) => None,
    }
}

fn log_attempt(
    store: Store,
    app_id: &str,
    method: &str,
    position: usize,
    debug: bool,
    error: Option<&ScraperError>,
) {
    let Some(level) = attempt_level(debug, error.is_some()) else {
        return;
    };
    match error {
        None => tracing::debug!(%store, app_id, method, position, "strategy succeeded"),
        Some(e) if level == Level::WARN => {
            tracing::warn!(%store, app_id, method, position, error = %e, "strategy failed");
        }
        Some(e) => {
            tracing::debug!(%store, app_id, method, position, error = %e, "strategy failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_mode_logs_every_attempt_at_debug() {
        assert_eq!(attempt_level(true, false), Some(Level::DEBUG));
        assert_eq!(attempt_level(true, true), Some(Level::DEBUG));
    }

    #[test]
    fn normal_mode_logs_only_failures_at_warn() {
        assert_eq!(attempt_level(false, true), Some(Level::WARN));
        assert_eq!(attempt_level(false, false), None);
    }
    use crate::types::AppStoreReview;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestStrategy {
        First,
        Second,
    }

    impl Strategy for TestStrategy {
        fn name(self) -> &'static str {
            match self {
                TestStrategy::First => "first",
                TestStrategy::Second => "second",
            }
        }
    }

    const BOTH: [TestStrategy; 2] = [TestStrategy::First, TestStrategy::Second];

    fn record(id: &str) -> RawRecord {
        RawRecord::AppStore(AppStoreReview {
            id: id.to_owned(),
            author: "a".to_owned(),
            rating: "5".to_owned(),
            title: None,
            content: "ok".to_owned(),
            updated: "2025-06-02".to_owned(),
            version: None,
            vote_count: None,
        })
    }

    fn payload(ids: &[&str]) -> StrategyPayload {
        StrategyPayload {
            records: ids.iter().map(|id| record(id)).collect(),
            shape: format!("{} entries", ids.len()),
        }
    }

    #[tokio::test]
    async fn primary_success_skips_fallback() {
        let calls = AtomicUsize::new(0);
        let outcome = run_strategies(Store::AppStore, "1", &BOTH, false, |s| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                assert_eq!(s, TestStrategy::First);
                Ok(payload(&["a"]))
            }
        })
        .await
        .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.method, SourceMethod::from_position(0, "first"));
        assert!(outcome.attempts.is_empty(), "attempts only kept in debug");
    }

    #[tokio::test]
    async fn error_falls_back_to_next_strategy() {
        let outcome = run_strategies(Store::AppStore, "1", &BOTH, true, |s| async move {
            match s {
                TestStrategy::First => Err(ScraperError::RateLimited {
                    store: Store::AppStore,
                    retry_after_secs: Some(60),
                }),
                TestStrategy::Second => Ok(payload(&["a", "b"])),
            }
        })
        .await
        .unwrap();
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.method, SourceMethod::from_position(1, "second"));
        assert_eq!(outcome.attempts.len(), 2);
        assert_eq!(outcome.attempts[0].outcome, AttemptOutcome::Failed);
        assert!(outcome.attempts[0]
            .reason
            .as_deref()
            .unwrap()
            .contains("rate limited"));
        assert_eq!(outcome.attempts[1].outcome, AttemptOutcome::Succeeded);
        assert_eq!(outcome.attempts[1].records, 2);
    }

    #[tokio::test]
    async fn empty_payload_counts_as_failure() {
        let outcome = run_strategies(Store::AppStore, "1", &BOTH, true, |s| async move {
            match s {
                TestStrategy::First => Ok(payload(&[])),
                TestStrategy::Second => Ok(payload(&["z"])),
            }
        })
        .await
        .unwrap();
        assert!(outcome.method.is_fallback());
        assert_eq!(outcome.attempts[0].outcome, AttemptOutcome::Empty);
    }

    #[tokio::test]
    async fn all_strategies_failing_is_source_unavailable() {
        let err = run_strategies(Store::Play, "com.x", &BOTH, true, |_| async {
            Err::<StrategyPayload, _>(ScraperError::UnexpectedStatus {
                status: 403,
                url: "https://play.example".to_owned(),
            })
        })
        .await
        .unwrap_err();
        match err {
            ScraperError::SourceUnavailable {
                store,
                summary,
                attempts,
            } => {
                assert_eq!(store, Store::Play);
                assert!(summary.contains("first"));
                assert!(summary.contains("second"));
                assert_eq!(attempts.len(), 2);
            }
            other => panic!("expected SourceUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn attempts_dropped_from_error_without_debug() {
        let err = run_strategies(Store::Play, "com.x", &BOTH, false, |_| async {
            Ok(payload(&[]))
        })
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ScraperError::SourceUnavailable { ref attempts, .. } if attempts.is_empty()
        ));
    }
}
