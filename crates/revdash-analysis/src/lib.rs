//! Review analytics for the dashboard.
//!
//! Everything here works on already-normalized [`revdash_core::Review`]s:
//! word frequencies, keyword topic buckets, rating statistics and a lexicon
//! sentiment score run locally, and an optional `DeepSeek` pass extracts
//! per-review sentiment, entities and topics.

pub mod deepseek;
pub mod error;
pub mod insights;
pub mod pipeline;
pub mod scorer;
pub mod stats;
pub mod text;
pub mod topics;
pub mod types;

pub use deepseek::{DeepSeekClient, DeepSeekRun};
pub use error::AnalysisError;
pub use insights::extract_insights;
pub use pipeline::run_analysis;
pub use scorer::lexicon_score;
pub use stats::rating_summary;
pub use text::{tokenize, word_frequencies};
pub use topics::group_topics;
pub use types::{
    AiInsights, AiReviewResult, AnalysisReport, Assessment, EntityExample, EntityInsight,
    RatingSummary, StoreRatings, StoreTotals, TopicGroup, TopicInsight, WordCount,
};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{TimeZone, Utc};
    use revdash_core::{Review, Store};

    /// A Play review on 2025-06-02 with the given rating, title and body.
    pub(crate) fn review(native_id: &str, rating: u8, title: Option<&str>, body: &str) -> Review {
        Review {
            id: Review::canonical_id(Store::Play, native_id),
            native_id: native_id.to_owned(),
            store: Store::Play,
            author: "tester".to_owned(),
            rating,
            title: title.map(str::to_owned),
            body: body.to_owned(),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 2, 9, 44, 8).unwrap(),
            app_id: "com.example.app".to_owned(),
            app_version: None,
            raw: serde_json::Value::Null,
        }
    }

    pub(crate) fn in_store(mut review: Review, store: Store) -> Review {
        review.id = Review::canonical_id(store, &review.native_id);
        review.store = store;
        review
    }
}
