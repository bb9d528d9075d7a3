//! `DeepSeek` chat-completions client for per-review sentiment, entities and topics.

use std::time::Duration;

use reqwest::StatusCode;
use revdash_core::{AppConfig, Review};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AnalysisError;
use crate::types::{AiReviewResult, Assessment};

const TEMPERATURE: f32 = 0.3;
const REQUEST_TIMEOUT_SECS: u64 = 60;

const PROMPT_HEADER: &str = "Analyse the following app store reviews. \
Reply with a JSON object {\"results\": [...]} holding one element per review, in the same order. \
Each element has: sentiment (a number from 1 to 5), entities (list of things named in the text), \
topics (key themes). Reviews:";

/// `DeepSeek` HTTP client.
#[derive(Clone)]
pub struct DeepSeekClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    batch_size: usize,
}

impl std::fmt::Debug for DeepSeekClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepSeekClient")
            .field("url", &self.url)
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

/// Everything one [`DeepSeekClient::analyze`] call produced.
#[derive(Debug, Clone, Default)]
pub struct DeepSeekRun {
    pub assessments: Vec<Assessment>,
    /// Batches that failed for reasons other than a rate limit.
    pub failed_batches: usize,
    /// `true` if a 429 stopped the run before every batch was sent.
    pub rate_limited: bool,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage; 1],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ResultsEnvelope {
    #[serde(default)]
    results: Vec<RawResult>,
}

#[derive(Deserialize)]
struct RawResult {
    #[serde(default)]
    sentiment: Option<Value>,
    #[serde(default)]
    entities: Vec<Value>,
    #[serde(default)]
    topics: Vec<Value>,
}

impl RawResult {
    fn into_result(self) -> AiReviewResult {
        AiReviewResult {
            sentiment: self.sentiment.as_ref().and_then(number_like),
            entities: strings_only(self.entities),
            topics: strings_only(self.topics),
        }
    }
}

/// Accepts `4`, `4.5` and `"4"`.
fn number_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn strings_only(values: Vec<Value>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        })
        .collect()
}

impl DeepSeekClient {
    /// # Errors
    ///
    /// Returns [`AnalysisError::Http`] if the HTTP client cannot be built.
    pub fn new(
        url: &str,
        api_key: &str,
        model: &str,
        batch_size: usize,
    ) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            url: url.to_owned(),
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            batch_size: batch_size.max(1),
        })
    }

    /// # Errors
    ///
    /// Returns [`AnalysisError::MissingApiKey`] if `DEEPSEEK_API_KEY` is unset.
    pub fn from_config(config: &AppConfig) -> Result<Self, AnalysisError> {
        let api_key = config
            .deepseek_api_key
            .as_deref()
            .ok_or(AnalysisError::MissingApiKey)?;
        Self::new(
            &config.deepseek_api_url,
            api_key,
            &config.deepseek_model,
            config.ai_batch_size,
        )
    }

    /// Sends review bodies in batches and collects the model's assessments.
    ///
    /// A 429 stops the run and keeps what earlier batches returned. Any other
    /// batch failure is logged and the batch skipped. Results are matched to
    /// reviews by position inside their batch; surplus results are dropped.
    pub async fn analyze(&self, reviews: &[Review]) -> DeepSeekRun {
        let mut run = DeepSeekRun::default();

        for (batch_index, batch) in reviews.chunks(self.batch_size).enumerate() {
            let offset = batch_index * self.batch_size;
            match self.analyze_batch(batch).await {
                Ok(results) => {
                    let returned = results.len();
                    run.assessments.extend(
                        results
                            .into_iter()
                            .take(batch.len())
                            .enumerate()
                            .map(|(i, result)| Assessment {
                                review_index: offset + i,
                                result,
                            }),
                    );
                    if returned != batch.len() {
                        tracing::warn!(
                            batch = batch_index,
                            expected = batch.len(),
                            returned,
                            "DeepSeek returned a different number of results than reviews sent"
                        );
                    }
                }
                Err(AnalysisError::RateLimited) => {
                    tracing::warn!(
                        batch = batch_index,
                        "DeepSeek rate limit reached, stopping analysis"
                    );
                    run.rate_limited = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!(batch = batch_index, error = %e, "DeepSeek batch failed, skipping");
                    run.failed_batches += 1;
                }
            }
        }

        tracing::info!(
            reviews = reviews.len(),
            assessed = run.assessments.len(),
            failed_batches = run.failed_batches,
            rate_limited = run.rate_limited,
            "DeepSeek analysis finished"
        );
        run
    }

    async fn analyze_batch(&self, batch: &[Review]) -> Result<Vec<AiReviewResult>, AnalysisError> {
        let texts: Vec<&str> = batch.iter().map(|r| r.body.as_str()).collect();
        let reviews_json = serde_json::to_string(&texts).map_err(|e| AnalysisError::Deserialize {
            context: "request batch",
            source: e,
        })?;
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: format!("{PROMPT_HEADER} {reviews_json}"),
            }],
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AnalysisError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let chat: ChatResponse =
            serde_json::from_str(&body).map_err(|e| AnalysisError::Deserialize {
                context: "chat completion",
                source: e,
            })?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(AnalysisError::EmptyCompletion)?;
        let envelope: ResultsEnvelope =
            serde_json::from_str(&content).map_err(|e| AnalysisError::Deserialize {
                context: "completion content",
                source: e,
            })?;

        Ok(envelope
            .results
            .into_iter()
            .map(RawResult::into_result)
            .collect())
    }
}
