use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One of the two storefronts reviews are collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Store {
    Play,
    AppStore,
}

impl Store {
    pub const ALL: [Store; 2] = [Store::Play, Store::AppStore];

    /// Stable machine identifier, also used as the review id prefix.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Store::Play => "play",
            Store::AppStore => "app_store",
        }
    }

    /// Human-readable storefront name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Store::Play => "Google Play",
            Store::AppStore => "App Store",
        }
    }
}

impl std::fmt::Display for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user review normalized from either storefront.
///
/// Built once by the scraper's review normalizer and consumed read-only by
/// analysis, export, and the HTTP API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// `"{store}:{native_id}"`, unique across both stores.
    pub id: String,
    /// Review id as issued by the store.
    pub native_id: String,
    pub store: Store,
    /// Display name of the reviewer. May be empty.
    pub author: String,
    /// Star rating, always in `1..=5`.
    pub rating: u8,
    /// App Store reviews carry a title; Play reviews never do.
    pub title: Option<String>,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    /// Store-specific application identifier (package name or numeric id).
    pub app_id: String,
    /// App version the review was written against, when the store reports it.
    pub app_version: Option<String>,
    /// The raw store record, kept for debugging only.
    pub raw: serde_json::Value,
}

impl Review {
    /// Builds the canonical review id for a store-native id.
    #[must_use]
    pub fn canonical_id(store: Store, native_id: &str) -> String {
        format!("{store}:{native_id}")
    }

    /// Title and body joined for text analysis.
    #[must_use]
    pub fn full_text(&self) -> String {
        match self.title.as_deref() {
            Some(title) => format!("{title} {}", self.body),
            None => self.body.clone(),
        }
    }
}

/// Which retrieval strategy produced a store's reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rank", rename_all = "snake_case")]
pub enum SourceMethod {
    Primary { name: String },
    /// `index` is 1-based: the first fallback is `Fallback { index: 1, .. }`.
    Fallback { index: usize, name: String },
}

impl SourceMethod {
    /// Maps a 0-based position in a strategy list to a method label.
    #[must_use]
    pub fn from_position(position: usize, name: impl Into<String>) -> Self {
        let name = name.into();
        if position == 0 {
            SourceMethod::Primary { name }
        } else {
            SourceMethod::Fallback {
                index: position,
                name,
            }
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            SourceMethod::Primary { name } | SourceMethod::Fallback { name, .. } => name,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, SourceMethod::Fallback { .. })
    }
}

impl std::fmt::Display for SourceMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceMethod::Primary { name } => write!(f, "primary ({name})"),
            SourceMethod::Fallback { index, name } => write!(f, "fallback {index} ({name})"),
        }
    }
}

/// Category of a non-fatal ingestion failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Every retrieval strategy for the store failed; the store contributed nothing.
    SourceUnavailable,
    /// A single record was dropped because it could not be mapped.
    InvalidRecord,
    /// A single record was dropped because its date matched no known format.
    UnparseableDate,
}

/// A partial failure reported alongside the reviews that did make it through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionFailure {
    pub store: Store,
    pub kind: FailureKind,
    pub detail: String,
}

/// Result of one retrieval attempt, as recorded in debug mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Succeeded,
    Empty,
    Failed,
}

/// Diagnostic entry for one strategy attempt against a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub store: Store,
    /// Strategy name, e.g. `"rss_json"`.
    pub method: String,
    /// 0-based position in the store's strategy list.
    pub position: usize,
    pub outcome: AttemptOutcome,
    /// Number of raw records the attempt produced.
    pub records: usize,
    /// Short description of the payload, e.g. `"3 pages, 150 entries"`.
    pub shape: Option<String>,
    pub reason: Option<String>,
}

/// Everything one ingestion call produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestionResult {
    /// Sorted by `(timestamp, store, native_id)`.
    pub reviews: Vec<Review>,
    pub errors: Vec<IngestionFailure>,
    pub source_method: BTreeMap<Store, SourceMethod>,
    /// Empty unless the call ran with `debug` enabled.
    pub diagnostics: Vec<AttemptRecord>,
}

impl IngestionResult {
    #[must_use]
    pub fn count_for(&self, store: Store) -> usize {
        self.reviews.iter().filter(|r| r.store == store).count()
    }

    /// `true` when at least one store failed outright.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.kind == FailureKind::SourceUnavailable)
    }

    pub fn record_failure(&mut self, store: Store, kind: FailureKind, detail: impl Into<String>) {
        self.errors.push(IngestionFailure {
            store,
            kind,
            detail: detail.into(),
        });
    }
}

/// Inclusive UTC time window reviews must fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateWindow {
    #[must_use]
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Covers `start` 00:00:00 through the last nanosecond of `end`, in UTC.
    #[must_use]
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        let end_of_day = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
            .unwrap_or(NaiveTime::MIN);
        Self {
            from: Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN)),
            to: Utc.from_utc_datetime(&end.and_time(end_of_day)),
        }
    }

    #[must_use]
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.from <= timestamp && timestamp <= self.to
    }

    /// A window whose start is after its end matches nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.from > self.to
    }
}

#[cfg(test)]
#[path = "reviews_test.rs"]
mod tests;
