//! Aggregation of per-review model output into dashboard insights.

use std::collections::HashMap;

use revdash_core::Review;

use crate::types::{AiInsights, Assessment, EntityExample, EntityInsight, TopicInsight};

const TOP_ENTITIES: usize = 15;
const TOP_TOPICS: usize = 10;
const MAX_ENTITY_EXAMPLES: usize = 3;
const POSITIVE_ABOVE: f64 = 3.5;
const CRITICAL_BELOW: f64 = 2.0;

/// Counts keyed by lowercased text, remembering first-seen order for ties.
#[derive(Default)]
struct Counter {
    index: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

impl Counter {
    /// Returns the entry's position.
    fn add(&mut self, key: String) -> usize {
        if let Some(&slot) = self.index.get(&key) {
            self.entries[slot].1 += 1;
            return slot;
        }
        let slot = self.entries.len();
        self.index.insert(key.clone(), slot);
        self.entries.push((key, 1));
        slot
    }

    /// `(slot, key, count)` for the `n` most frequent keys.
    fn most_common(self, n: usize) -> Vec<(usize, String, usize)> {
        let mut ranked: Vec<_> = self
            .entries
            .into_iter()
            .enumerate()
            .map(|(slot, (key, count))| (slot, key, count))
            .collect();
        ranked.sort_by(|a, b| b.2.cmp(&a.2));
        ranked.truncate(n);
        ranked
    }
}

/// Folds model results into entity, topic and sentiment aggregates.
///
/// `reviews` must be the slice the assessments were produced from; an
/// assessment pointing past its end contributes counts but no examples.
#[must_use]
pub fn extract_insights(reviews: &[Review], assessments: &[Assessment]) -> AiInsights {
    let mut insights = AiInsights {
        analyzed_reviews: assessments.len(),
        ..AiInsights::default()
    };

    let mut entities = Counter::default();
    let mut entity_examples: Vec<Vec<EntityExample>> = Vec::new();
    let mut topics = Counter::default();

    for assessment in assessments {
        let result = &assessment.result;
        if let Some(sentiment) = result.sentiment {
            insights.sentiments.push(sentiment);
        }

        for entity in &result.entities {
            let slot = entities.add(entity.trim().to_lowercase());
            if slot == entity_examples.len() {
                entity_examples.push(Vec::new());
            }
            let examples = &mut entity_examples[slot];
            if examples.len() < MAX_ENTITY_EXAMPLES {
                if let Some(review) = reviews.get(assessment.review_index) {
                    examples.push(EntityExample {
                        text: review.body.clone(),
                        date: review.timestamp,
                    });
                }
            }
        }

        for topic in &result.topics {
            topics.add(topic.trim().to_lowercase());
        }
    }

    insights.entities = entities
        .most_common(TOP_ENTITIES)
        .into_iter()
        .map(|(slot, entity, count)| EntityInsight {
            entity,
            count,
            examples: std::mem::take(&mut entity_examples[slot]),
        })
        .collect();

    insights.topics = topics
        .most_common(TOP_TOPICS)
        .into_iter()
        .map(|(_, topic, count)| TopicInsight { topic, count })
        .collect();

    if !insights.sentiments.is_empty() {
        #[allow(clippy::cast_precision_loss)]
        let denom = insights.sentiments.len() as f64;
        insights.avg_sentiment = insights.sentiments.iter().sum::<f64>() / denom;
    }
    insights.positive_count = insights
        .sentiments
        .iter()
        .filter(|s| **s > POSITIVE_ABOVE)
        .count();
    insights.critical_count = insights
        .sentiments
        .iter()
        .filter(|s| **s < CRITICAL_BELOW)
        .count();

    insights
}
