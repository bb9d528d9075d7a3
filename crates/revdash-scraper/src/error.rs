use revdash_core::{AttemptRecord, FailureKind, Store};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("unparseable date \"{0}\"")]
    Unparseable(String),
}

/// Why a raw record could not become a [`revdash_core::Review`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidReason {
    #[error(transparent)]
    Date(#[from] DateError),

    #[error("rating {0} is outside 1..=5")]
    RatingOutOfRange(i64),

    #[error("rating \"{0}\" is not a number")]
    RatingNotNumeric(String),

    #[error("record has no review id")]
    MissingId,
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("XML parse error for {context}: {source}")]
    Xml {
        context: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("malformed payload from {context}: {reason}")]
    MalformedPayload { context: String, reason: String },

    #[error("{store} returned no reviews via {method}")]
    EmptyPayload { store: Store, method: &'static str },

    /// `retry_after_secs` is the store's `Retry-After`, when it sent one.
    #[error("rate limited by {store}")]
    RateLimited {
        store: Store,
        retry_after_secs: Option<u64>,
    },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid {store} record {native_id}: {reason}")]
    InvalidRecord {
        store: Store,
        native_id: String,
        reason: InvalidReason,
    },

    #[error("{store} unavailable: {summary}")]
    SourceUnavailable {
        store: Store,
        summary: String,
        /// Every strategy attempt, populated only in debug mode.
        attempts: Vec<AttemptRecord>,
    },

    #[error("invalid {store} app reference \"{input}\": {reason}")]
    InvalidAppReference {
        store: Store,
        input: String,
        reason: String,
    },
}

impl ScraperError {
    /// Failure category reported in [`revdash_core::IngestionResult::errors`].
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ScraperError::InvalidRecord {
                reason: InvalidReason::Date(_),
                ..
            } => FailureKind::UnparseableDate,
            ScraperError::InvalidRecord { .. } => FailureKind::InvalidRecord,
            _ => FailureKind::SourceUnavailable,
        }
    }
}
