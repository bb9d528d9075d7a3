use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("DeepSeek rate limit reached")]
    RateLimited,

    #[error("DeepSeek returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("DeepSeek response parse error for {context}: {source}")]
    Deserialize {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("DeepSeek response had no choices")]
    EmptyCompletion,

    #[error("DEEPSEEK_API_KEY is not set")]
    MissingApiKey,
}
