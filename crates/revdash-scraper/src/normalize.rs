//! Normalization from raw store records to [`revdash_core::Review`].
//!
//! Timestamp parsing is delegated to [`crate::date`]; this module owns the
//! field mapping and the rating policy. Out-of-range ratings are rejected,
//! never clamped.

use revdash_core::Review;

use crate::date;
use crate::error::{InvalidReason, ScraperError};
use crate::types::{AppStoreReview, PlayReview, RawRecord};

/// Normalizes one raw record into a [`Review`].
///
/// # Errors
///
/// Returns [`ScraperError::InvalidRecord`] when the record has no id, its
/// rating is not an integer in 1..=5, or its timestamp matches no known
/// date format. The record is meant to be dropped by the caller.
pub fn normalize_review(raw: RawRecord, app_id: &str) -> Result<Review, ScraperError> {
    let store = raw.store();
    let native_id = raw.native_id().trim().to_owned();
    let invalid = |reason: InvalidReason| ScraperError::InvalidRecord {
        store,
        native_id: native_id.clone(),
        reason,
    };

    if native_id.is_empty() {
        return Err(invalid(InvalidReason::MissingId));
    }

    let timestamp = date::normalize(raw.raw_timestamp()).map_err(|e| invalid(e.into()))?;
    let raw_value = serde_json::to_value(&raw).unwrap_or(serde_json::Value::Null);

    let fields = match raw {
        RawRecord::Play(review) => play_fields(review),
        RawRecord::AppStore(review) => app_store_fields(review),
    };
    let rating = fields.rating.map_err(invalid)?;

    Ok(Review {
        id: Review::canonical_id(store, &native_id),
        native_id,
        store,
        author: fields.author.trim().to_owned(),
        rating,
        title: fields
            .title
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty()),
        body: fields.body.trim().to_owned(),
        timestamp,
        app_id: app_id.to_owned(),
        app_version: fields.app_version.filter(|v| !v.trim().is_empty()),
        raw: raw_value,
    })
}

/// Store-agnostic view of the fields a review needs.
struct MappedFields {
    author: String,
    rating: Result<u8, InvalidReason>,
    title: Option<String>,
    body: String,
    app_version: Option<String>,
}

fn play_fields(review: PlayReview) -> MappedFields {
    MappedFields {
        author: review.user_name,
        rating: validate_rating(review.score),
        title: None,
        body: review.content.unwrap_or_default(),
        app_version: review.app_version,
    }
}

fn app_store_fields(review: AppStoreReview) -> MappedFields {
    let rating = review
        .rating
        .trim()
        .parse::<i64>()
        .map_err(|_| InvalidReason::RatingNotNumeric(review.rating.clone()))
        .and_then(validate_rating);

    MappedFields {
        author: review.author,
        rating,
        title: review.title,
        body: review.content,
        app_version: review.version,
    }
}

fn validate_rating(value: i64) -> Result<u8, InvalidReason> {
    match u8::try_from(value) {
        Ok(rating @ 1..=5) => Ok(rating),
        _ => Err(InvalidReason::RatingOutOfRange(value)),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
