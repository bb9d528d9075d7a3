//! Review ingestion for the Play and App Store storefronts.
//!
//! Store adapters pull raw review records through an ordered list of
//! retrieval strategies, the normalizer maps them onto
//! [`revdash_core::Review`], and [`ingest::collect`] merges both stores into
//! one [`revdash_core::IngestionResult`].

pub mod adapter;
pub mod app_id;
pub mod date;
pub mod error;
pub mod http;
pub mod ingest;
pub mod normalize;
pub mod types;

mod rate_limit;

pub use adapter::{
    AppStoreAdapter, AppStoreSettings, FetchLimits, FetchOutcome, PlayAdapter, PlaySettings,
    StoreAdapter,
};
pub use app_id::{resolve_app_store_app, resolve_play_app_id, AppStoreApp};
pub use date::normalize as normalize_date;
pub use error::{DateError, InvalidReason, ScraperError};
pub use http::HttpClient;
pub use ingest::{collect, IngestRequest, Ingestor};
pub use normalize::normalize_review;
pub use types::{AppStoreReview, PlayReview, RawRecord};
