//! Store-native review records, exactly as the adapters extract them.
//!
//! ## Play (`batchexecute`, rpc `UsvDTd`)
//! Reviews arrive as positional JSON arrays. The adapter lifts the fields it
//! knows into [`PlayReview`]; the timestamp stays in Play's native epoch-seconds
//! form and is only interpreted by the normalizer. `content` is `null` for
//! star-only reviews.
//!
//! ## App Store (customer-review RSS, JSON and Atom renditions)
//! Every value is a string `label`, including the rating (`"5"`) and the
//! timestamp (`"2025-06-02T09:44:08-07:00"`). The feed's first entry on some
//! storefronts is app metadata with no rating; adapters drop it before it
//! becomes a record.

use revdash_core::Store;
use serde::{Deserialize, Serialize};

/// One Play review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayReview {
    /// Opaque review id, e.g. `"gp:AOqpTOH..."`.
    pub review_id: String,
    pub user_name: String,
    /// Star score. Should be 1..=5 but is not validated here.
    pub score: i64,
    #[serde(default)]
    pub content: Option<String>,
    /// Creation time as epoch seconds, rendered as a decimal string.
    pub at: String,
    #[serde(default)]
    pub thumbs_up_count: i64,
    #[serde(default)]
    pub app_version: Option<String>,
    #[serde(default)]
    pub reply_content: Option<String>,
}

/// One App Store review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppStoreReview {
    pub id: String,
    pub author: String,
    /// Rating label as the feed sends it, e.g. `"4"`.
    pub rating: String,
    pub title: Option<String>,
    pub content: String,
    /// `updated` label, ISO-8601 with the storefront's local offset.
    pub updated: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub vote_count: Option<String>,
}

/// A raw review tagged with the store it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "store", rename_all = "snake_case")]
pub enum RawRecord {
    Play(PlayReview),
    AppStore(AppStoreReview),
}

impl RawRecord {
    #[must_use]
    pub fn store(&self) -> Store {
        match self {
            RawRecord::Play(_) => Store::Play,
            RawRecord::AppStore(_) => Store::AppStore,
        }
    }

    /// The store-issued review id.
    #[must_use]
    pub fn native_id(&self) -> &str {
        match self {
            RawRecord::Play(r) => &r.review_id,
            RawRecord::AppStore(r) => &r.id,
        }
    }

    /// The raw timestamp string, before normalization.
    #[must_use]
    pub fn raw_timestamp(&self) -> &str {
        match self {
            RawRecord::Play(r) => &r.at,
            RawRecord::AppStore(r) => &r.updated,
        }
    }
}
