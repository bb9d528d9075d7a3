//! Request building and response parsing for Play's `batchexecute` review rpc.
//!
//! The response body starts with the `)]}'` XSSI guard, followed by a JSON
//! array of envelopes. The review envelope is `["wrb.fr", "UsvDTd", "<json>", ...]`
//! where the third element is itself a JSON document encoded as a string:
//! `[[review, ...], ..., [null, "<continuation token>"], ...]`.
//!
//! Review arrays are positional:
//!
//! | Index | Field |
//! |-------|-------|
//! | `0` | review id |
//! | `1.0` | user name |
//! | `2` | score |
//! | `4` | content (null for star-only reviews) |
//! | `5.0` | created at, epoch seconds |
//! | `6` | thumbs-up count |
//! | `7.1` | developer reply |
//! | `10` | app version |

use serde_json::{json, Value};

use crate::error::ScraperError;
use crate::types::PlayReview;

pub(super) const REVIEWS_RPC_ID: &str = "UsvDTd";
const XSSI_GUARD: &str = ")]}'";

/// Sort orders accepted by the review rpc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PlaySort {
    MostRelevant = 1,
    Newest = 2,
}

/// One parsed page of reviews.
#[derive(Debug, Default)]
pub(super) struct PlayPage {
    pub(super) reviews: Vec<PlayReview>,
    pub(super) next_token: Option<String>,
    /// Entries that were present but lacked a review id.
    pub(super) skipped: usize,
}

/// Builds the `f.req` form value for one page.
pub(super) fn build_request_payload(
    app_id: &str,
    sort: PlaySort,
    count: usize,
    token: Option<&str>,
) -> String {
    let inner = json!([
        null,
        null,
        [2, sort as i32, [count, null, token], null, []],
        [app_id, 7]
    ]);
    json!([[[REVIEWS_RPC_ID, inner.to_string(), null, "generic"]]]).to_string()
}

/// Parses a raw `batchexecute` response body.
///
/// An envelope whose payload is `null` means "no reviews" and yields an empty
/// page rather than an error.
///
/// # Errors
///
/// Returns [`ScraperError::MalformedPayload`] if the XSSI guard or the review
/// envelope is missing, and [`ScraperError::Deserialize`] if either JSON layer
/// does not parse.
pub(super) fn parse_reviews_page(body: &str) -> Result<PlayPage, ScraperError> {
    let trimmed = body.trim_start();
    let json_text = trimmed
        .strip_prefix(XSSI_GUARD)
        .ok_or_else(|| malformed("response does not start with the XSSI guard"))?;

    let envelopes: Value =
        serde_json::from_str(json_text.trim()).map_err(|e| ScraperError::Deserialize {
            context: "play batchexecute envelope".to_owned(),
            source: e,
        })?;

    let envelope = envelopes
        .as_array()
        .into_iter()
        .flatten()
        .find(|e| {
            e.get(0).and_then(Value::as_str) == Some("wrb.fr")
                && e.get(1).and_then(Value::as_str) == Some(REVIEWS_RPC_ID)
        })
        .ok_or_else(|| malformed("no review envelope in response"))?;

    let Some(payload_text) = envelope.get(2).and_then(Value::as_str) else {
        return Ok(PlayPage::default());
    };

    let payload: Value =
        serde_json::from_str(payload_text).map_err(|e| ScraperError::Deserialize {
            context: "play review payload".to_owned(),
            source: e,
        })?;

    let mut page = PlayPage {
        next_token: extract_token(&payload),
        ..PlayPage::default()
    };

    for entry in payload
        .get(0)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        match parse_review(entry) {
            Some(review) => page.reviews.push(review),
            None => page.skipped += 1,
        }
    }

    Ok(page)
}

fn parse_review(entry: &Value) -> Option<PlayReview> {
    let review_id = str_at(entry, &[0])?.to_owned();
    Some(PlayReview {
        review_id,
        user_name: str_at(entry, &[1, 0]).unwrap_or_default().to_owned(),
        score: at(entry, &[2]).and_then(Value::as_i64).unwrap_or(0),
        content: str_at(entry, &[4]).map(str::to_owned),
        at: at(entry, &[5, 0])
            .and_then(Value::as_i64)
            .map(|secs| secs.to_string())
            .unwrap_or_default(),
        thumbs_up_count: at(entry, &[6]).and_then(Value::as_i64).unwrap_or(0),
        app_version: str_at(entry, &[10]).map(str::to_owned),
        reply_content: str_at(entry, &[7, 1]).map(str::to_owned),
    })
}

/// The continuation token lives in the last element of the second-to-last
/// array of the payload.
fn extract_token(payload: &Value) -> Option<String> {
    let items = payload.as_array()?;
    let holder = items.len().checked_sub(2).and_then(|i| items.get(i))?;
    holder
        .as_array()?
        .last()?
        .as_str()
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

fn at<'a>(value: &'a Value, path: &[usize]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, &index| current.get(index))
        .filter(|v| !v.is_null())
}

fn str_at<'a>(value: &'a Value, path: &[usize]) -> Option<&'a str> {
    at(value, path).and_then(Value::as_str)
}

fn malformed(reason: &str) -> ScraperError {
    ScraperError::MalformedPayload {
        context: "play batchexecute".to_owned(),
        reason: reason.to_owned(),
    }
}
