//! Analysis pipeline orchestration.

use revdash_core::Review;

use crate::deepseek::DeepSeekClient;
use crate::insights::extract_insights;
use crate::scorer::lexicon_score;
use crate::stats::{rating_summary, store_totals};
use crate::text::word_frequencies;
use crate::topics::group_topics;
use crate::types::AnalysisReport;

/// Number of words kept in [`AnalysisReport::word_frequencies`].
pub const TOP_WORDS: usize = 30;

/// Run the full analysis over one review set.
///
/// 1. Count reviews per store and summarise ratings.
/// 2. Count word frequencies and bucket reviews into keyword topics.
/// 3. Average the lexicon score across reviews.
/// 4. If `ai` is supplied, send the reviews to `DeepSeek` and aggregate the
///    results. Failed or rate-limited batches reduce coverage but never fail
///    the report.
///
/// Empty review sets produce a neutral report with a lexicon score of `0.0`.
pub async fn run_analysis(reviews: &[Review], ai: Option<&DeepSeekClient>) -> AnalysisReport {
    let lexicon_sentiment = if reviews.is_empty() {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let denom = reviews.len() as f32;
        let sum: f32 = reviews.iter().map(|r| lexicon_score(&r.full_text())).sum();
        sum / denom
    };

    let ai = match ai {
        Some(client) if !reviews.is_empty() => {
            let run = client.analyze(reviews).await;
            let mut insights = extract_insights(reviews, &run.assessments);
            insights.rate_limited = run.rate_limited;
            Some(insights)
        }
        Some(_) => {
            tracing::info!("no reviews to send to DeepSeek");
            Some(extract_insights(reviews, &[]))
        }
        None => None,
    };

    AnalysisReport {
        totals: store_totals(reviews),
        ratings: rating_summary(reviews),
        word_frequencies: word_frequencies(reviews, TOP_WORDS),
        topics: group_topics(reviews),
        lexicon_sentiment,
        ai,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{in_store, review};
    use revdash_core::Store;

    #[tokio::test]
    async fn empty_input_is_neutral() {
        let report = run_analysis(&[], None).await;
        assert_eq!(report.totals.total, 0);
        assert_eq!(report.lexicon_sentiment, 0.0);
        assert!(report.word_frequencies.is_empty());
        assert!(report.topics.is_empty());
        assert!(report.ai.is_none());
    }

    #[tokio::test]
    async fn local_analysis_without_ai() {
        let reviews = vec![
            review("1", 1, None, "Постоянно вылетает, ужасно"),
            in_store(review("2", 5, Some("Супер"), "Очень удобно"), Store::AppStore),
        ];
        let report = run_analysis(&reviews, None).await;

        assert_eq!(report.totals.total, 2);
        assert_eq!(report.totals.play, 1);
        assert_eq!(report.totals.app_store, 1);
        assert_eq!(report.ratings.overall.average_rating, Some(3.0));
        assert!(report.topics.iter().any(|t| t.topic == "crashes_bugs"));
        assert!(report.ai.is_none());
    }

    #[tokio::test]
    async fn ai_client_with_no_reviews_sends_nothing() {
        let client = DeepSeekClient::new("http://127.0.0.1:9", "k", "deepseek-chat", 5).unwrap();
        let report = run_analysis(&[], Some(&client)).await;
        let ai = report.ai.expect("insights present when a client is supplied");
        assert_eq!(ai.analyzed_reviews, 0);
    }
}
