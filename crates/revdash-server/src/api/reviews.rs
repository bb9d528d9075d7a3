//! Review collection and analysis handlers.

use std::collections::BTreeMap;

use axum::{extract::State, Extension, Json};
use chrono::NaiveDate;
use revdash_analysis::{run_analysis, AnalysisReport};
use revdash_core::{DateWindow, IngestionFailure, IngestionResult, SourceMethod, Store};
use revdash_scraper::{resolve_app_store_app, resolve_play_app_id, IngestRequest};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct CollectRequest {
    /// Play listing URL or package name.
    pub play: Option<String>,
    /// App Store listing URL or numeric id.
    pub app_store: Option<String>,
    /// `YYYY-MM-DD`, inclusive.
    pub from: String,
    /// `YYYY-MM-DD`, inclusive.
    pub to: String,
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    #[serde(flatten)]
    pub target: CollectRequest,
    #[serde(default)]
    pub ai: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalyzeData {
    pub source_method: BTreeMap<Store, SourceMethod>,
    pub errors: Vec<IngestionFailure>,
    pub report: AnalysisReport,
}

fn parse_date(req_id: &str, field: &str, value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ApiError::new(
            req_id,
            "validation_error",
            format!("'{field}' must be a YYYY-MM-DD date, got '{value}'"),
        )
    })
}

fn build_ingest_request(req_id: &str, body: &CollectRequest) -> Result<IngestRequest, ApiError> {
    if body.play.is_none() && body.app_store.is_none() {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "at least one of 'play' or 'app_store' is required",
        ));
    }

    let from = parse_date(req_id, "from", &body.from)?;
    let to = parse_date(req_id, "to", &body.to)?;
    if from > to {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            format!("'from' ({from}) is after 'to' ({to})"),
        ));
    }

    let invalid = |e: revdash_scraper::ScraperError| {
        ApiError::new(req_id, "validation_error", e.to_string())
    };
    let play_app_id = body
        .play
        .as_deref()
        .map(resolve_play_app_id)
        .transpose()
        .map_err(invalid)?;
    let app_store_app_id = body
        .app_store
        .as_deref()
        .map(resolve_app_store_app)
        .transpose()
        .map_err(invalid)?
        .map(|app| app.id);

    Ok(IngestRequest {
        play_app_id,
        app_store_app_id,
        window: DateWindow::from_dates(from, to),
        debug: body.debug,
    })
}

async fn ingest(state: &AppState, request: &IngestRequest) -> IngestionResult {
    let result = state.ingestor.ingest(request).await;
    if result.is_degraded() {
        tracing::warn!(
            failures = result.errors.len(),
            reviews = result.reviews.len(),
            "collection degraded"
        );
    }
    result
}

/// POST /api/v1/reviews/collect: normalized reviews plus partial failures.
pub(super) async fn collect_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CollectRequest>,
) -> Result<Json<ApiResponse<IngestionResult>>, ApiError> {
    let request = build_ingest_request(&req_id.0, &body)?;
    let data = ingest(&state, &request).await;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/reviews/analyze: collect, then run the analysis pipeline.
pub(super) async fn analyze_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalyzeData>>, ApiError> {
    let rid = &req_id.0;
    let request = build_ingest_request(rid, &body.target)?;
    let ai = if body.ai {
        let client = state.ai.as_ref().ok_or_else(|| {
            ApiError::new(
                rid,
                "ai_unavailable",
                "AI analysis is not configured on this server",
            )
        })?;
        Some(client)
    } else {
        None
    };

    let result = ingest(&state, &request).await;
    let report = run_analysis(&result.reviews, ai).await;

    Ok(Json(ApiResponse {
        data: AnalyzeData {
            source_method: result.source_method,
            errors: result.errors,
            report,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
