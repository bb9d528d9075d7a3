use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use revdash_core::Store;
use serde::{Deserialize, Serialize};

/// One word and how often it appears across the analysed reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// A keyword topic bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicGroup {
    /// Stable identifier, e.g. `"crashes_bugs"`.
    pub topic: String,
    pub label: String,
    /// Number of reviews that mention the topic at least once.
    pub count: usize,
    /// Up to three canonical review ids, in input order.
    pub example_ids: Vec<String>,
}

/// Rating statistics for one store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreRatings {
    pub count: usize,
    /// `None` when `count` is zero.
    pub average_rating: Option<f64>,
    /// `histogram[0]` counts one-star reviews, `histogram[4]` five-star ones.
    pub histogram: [usize; 5],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub overall: StoreRatings,
    pub by_store: BTreeMap<Store, StoreRatings>,
}

/// Review counts as shown in the dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreTotals {
    pub total: usize,
    pub play: usize,
    pub app_store: usize,
}

/// What the model said about one review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiReviewResult {
    /// 1.0 (very negative) to 5.0 (very positive). `None` if the model omitted it.
    pub sentiment: Option<f64>,
    pub entities: Vec<String>,
    pub topics: Vec<String>,
}

/// An [`AiReviewResult`] tied back to the review it describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Index into the review slice that was analysed.
    pub review_index: usize,
    pub result: AiReviewResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityExample {
    pub text: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityInsight {
    /// Lowercased entity text.
    pub entity: String,
    pub count: usize,
    pub examples: Vec<EntityExample>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicInsight {
    pub topic: String,
    pub count: usize,
}

/// Aggregated model output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiInsights {
    /// Top 15 entities by mention count.
    pub entities: Vec<EntityInsight>,
    /// Top 10 topics by mention count.
    pub topics: Vec<TopicInsight>,
    pub sentiments: Vec<f64>,
    /// Mean of `sentiments`; `0.0` when there are none.
    pub avg_sentiment: f64,
    /// Sentiments above 3.5.
    pub positive_count: usize,
    /// Sentiments below 2.0.
    pub critical_count: usize,
    /// Reviews the model returned a result for.
    pub analyzed_reviews: usize,
    /// `true` if the run stopped early on a rate limit.
    pub rate_limited: bool,
}

/// Everything `run_analysis` computes for one review set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub totals: StoreTotals,
    pub ratings: RatingSummary,
    pub word_frequencies: Vec<WordCount>,
    pub topics: Vec<TopicGroup>,
    /// Mean lexicon score in `[-1.0, 1.0]`; `0.0` for no reviews.
    pub lexicon_sentiment: f32,
    /// Present only when a `DeepSeek` client was supplied.
    pub ai: Option<AiInsights>,
}
