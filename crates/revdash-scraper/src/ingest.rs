//! Ingestion coordinator: runs both store adapters and merges their output.

use std::collections::HashSet;

use revdash_core::{AppConfig, DateWindow, FailureKind, IngestionResult, Store};

use crate::adapter::{AppStoreAdapter, FetchOutcome, PlayAdapter, StoreAdapter};
use crate::error::ScraperError;
use crate::normalize::normalize_review;

/// One collection request.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    /// Play package name; `None` skips the store.
    pub play_app_id: Option<String>,
    /// App Store numeric id; `None` skips the store.
    pub app_store_app_id: Option<String>,
    pub window: DateWindow,
    /// Keep per-strategy attempt records and log every attempt at `debug`.
    pub debug: bool,
}

/// Collects reviews from both stores concurrently and merges them.
///
/// Never fails: a store whose adapter fails contributes one
/// `source_unavailable` entry to `errors`, and records that cannot be
/// normalized contribute per-record entries. Surviving reviews are filtered
/// to the inclusive window, deduplicated on `(store, native_id)` keeping the
/// first occurrence, and sorted by `(timestamp, store, native_id)`.
pub async fn collect<P, A>(play: &P, app_store: &A, request: &IngestRequest) -> IngestionResult
where
    P: StoreAdapter,
    A: StoreAdapter,
{
    let mut result = IngestionResult::default();

    if request.window.is_empty() {
        tracing::info!(
            from = %request.window.from,
            to = %request.window.to,
            "date window is inverted, nothing to collect"
        );
        return result;
    }

    let (play_fetch, app_store_fetch) = tokio::join!(
        fetch_store(play, request.play_app_id.as_deref(), request),
        fetch_store(app_store, request.app_store_app_id.as_deref(), request),
    );

    let mut seen: HashSet<(Store, String)> = HashSet::new();
    for (store, app_id, fetched) in [
        (play.store(), request.play_app_id.as_deref(), play_fetch),
        (
            app_store.store(),
            request.app_store_app_id.as_deref(),
            app_store_fetch,
        ),
    ] {
        let (Some(app_id), Some(fetched)) = (app_id, fetched) else {
            continue;
        };
        match fetched {
            Ok(outcome) => {
                merge_outcome(
                    &mut result,
                    &mut seen,
                    store,
                    app_id,
                    &request.window,
                    outcome,
                );
            }
            Err(err) => {
                tracing::warn!(%store, app_id, error = %err, "store unavailable");
                if let ScraperError::SourceUnavailable { attempts, .. } = &err {
                    result.diagnostics.extend(attempts.iter().cloned());
                }
                result.record_failure(store, FailureKind::SourceUnavailable, err.to_string());
            }
        }
    }

    result.reviews.sort_by(|a, b| {
        (a.timestamp, a.store, &a.native_id).cmp(&(b.timestamp, b.store, &b.native_id))
    });

    tracing::info!(
        reviews = result.reviews.len(),
        play = result.count_for(Store::Play),
        app_store = result.count_for(Store::AppStore),
        errors = result.errors.len(),
        "ingestion complete"
    );
    result
}

async fn fetch_store<S: StoreAdapter>(
    adapter: &S,
    app_id: Option<&str>,
    request: &IngestRequest,
) -> Option<Result<FetchOutcome, ScraperError>> {
    let app_id = app_id?;
    Some(adapter.fetch(app_id, &request.window, request.debug).await)
}

fn merge_outcome(
    result: &mut IngestionResult,
    seen: &mut HashSet<(Store, String)>,
    store: Store,
    app_id: &str,
    window: &DateWindow,
    outcome: FetchOutcome,
) {
    result.source_method.insert(store, outcome.method);
    result.diagnostics.extend(outcome.attempts);

    let mut out_of_window = 0usize;
    let mut duplicates = 0usize;
    for raw in outcome.records {
        let review = match normalize_review(raw, app_id) {
            Ok(review) => review,
            Err(err) => {
                tracing::debug!(%store, app_id, error = %err, "dropping record");
                result.record_failure(store, err.failure_kind(), err.to_string());
                continue;
            }
        };
        if !window.contains(review.timestamp) {
            out_of_window += 1;
            continue;
        }
        if !seen.insert((store, review.native_id.clone())) {
            duplicates += 1;
            continue;
        }
        result.reviews.push(review);
    }

    tracing::debug!(%store, app_id, out_of_window, duplicates, "store merged");
}

/// Both production adapters, built from one [`AppConfig`].
#[derive(Debug, Clone)]
pub struct Ingestor {
    play: PlayAdapter,
    app_store: AppStoreAdapter,
}

impl Ingestor {
    #[must_use]
    pub fn new(play: PlayAdapter, app_store: AppStoreAdapter) -> Self {
        Self { play, app_store }
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if an HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Ok(Self::new(
            PlayAdapter::from_config(config)?,
            AppStoreAdapter::from_config(config)?,
        ))
    }

    pub async fn ingest(&self, request: &IngestRequest) -> IngestionResult {
        collect(&self.play, &self.app_store, request).await
    }
}

#[cfg(test)]
#[path = "ingest_test.rs"]
mod tests;
