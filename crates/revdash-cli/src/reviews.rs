//! Review command handlers for the CLI.
//!
//! Both commands run one ingestion. A store that fails outright is logged
//! and reported in the output, never turned into a non-zero exit.

use std::collections::BTreeMap;
use std::path::Path;

use revdash_analysis::{run_analysis, AnalysisReport, DeepSeekClient};
use revdash_core::{
    AppConfig, DateWindow, IngestionFailure, IngestionResult, SourceMethod, Store,
};
use revdash_scraper::{resolve_app_store_app, resolve_play_app_id, IngestRequest, Ingestor};
use serde::Serialize;

use crate::output::{open_sink, write_csv, write_json};
use crate::{OutputFormat, TargetArgs};

/// What `analyze` prints: the report plus enough ingestion context to tell
/// a quiet app from a failed store.
#[derive(Debug, Serialize)]
struct AnalyzeOutput<'a> {
    source_method: &'a BTreeMap<Store, SourceMethod>,
    errors: &'a [IngestionFailure],
    report: AnalysisReport,
}

/// Turns command-line targets into an ingestion request.
///
/// # Errors
///
/// Returns an error if neither store is given, `--from` is after `--to`, or
/// a store reference cannot be resolved to an app id.
pub(crate) fn build_request(target: &TargetArgs) -> anyhow::Result<IngestRequest> {
    if target.play.is_none() && target.app_store.is_none() {
        anyhow::bail!("nothing to collect; pass --play and/or --app-store");
    }
    if target.from > target.to {
        anyhow::bail!("--from {} is after --to {}", target.from, target.to);
    }

    let play_app_id = target
        .play
        .as_deref()
        .map(resolve_play_app_id)
        .transpose()?;
    let app_store_app_id = target
        .app_store
        .as_deref()
        .map(resolve_app_store_app)
        .transpose()?
        .map(|app| app.id);

    Ok(IngestRequest {
        play_app_id,
        app_store_app_id,
        window: DateWindow::from_dates(target.from, target.to),
        debug: target.debug,
    })
}

async fn ingest(config: &AppConfig, target: &TargetArgs) -> anyhow::Result<IngestionResult> {
    let request = build_request(target)?;
    let ingestor = Ingestor::from_config(config)?;
    let result = ingestor.ingest(&request).await;
    log_summary(&result);
    Ok(result)
}

fn log_summary(result: &IngestionResult) {
    for (store, method) in &result.source_method {
        tracing::info!(
            store = %store,
            method = %method,
            reviews = result.count_for(*store),
            "store collected"
        );
    }
    for failure in &result.errors {
        tracing::warn!(
            store = %failure.store,
            kind = ?failure.kind,
            detail = %failure.detail,
            "ingestion failure"
        );
    }
}

/// Collect reviews and write them as JSON (the whole result) or CSV
/// (reviews only).
///
/// # Errors
///
/// Returns an error if the request is invalid, the HTTP client cannot be
/// built, or the output cannot be written.
pub(crate) async fn run_collect(
    config: &AppConfig,
    target: &TargetArgs,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let result = ingest(config, target).await?;
    let sink = open_sink(output)?;
    match format {
        OutputFormat::Json => write_json(sink, &result),
        OutputFormat::Csv => write_csv(sink, &result.reviews),
    }
}

/// Collect reviews, analyse them and write the report as JSON.
///
/// # Errors
///
/// Returns an error if the request is invalid, `--ai` is given without a
/// `DeepSeek` key, or the output cannot be written.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    target: &TargetArgs,
    ai: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let ai_client = if ai {
        Some(DeepSeekClient::from_config(config)?)
    } else {
        None
    };

    let result = ingest(config, target).await?;
    let report = run_analysis(&result.reviews, ai_client.as_ref()).await;

    let sink = open_sink(output)?;
    write_json(
        sink,
        &AnalyzeOutput {
            source_method: &result.source_method,
            errors: &result.errors,
            report,
        },
    )
}
