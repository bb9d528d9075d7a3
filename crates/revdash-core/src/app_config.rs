use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_ms: u64,
    pub scraper_inter_request_delay_ms: u64,
    /// Upper bound on raw reviews pulled per store per call.
    pub max_reviews_per_store: usize,
    pub play_lang: String,
    pub play_country: String,
    pub app_store_country: String,
    pub play_base_url: String,
    pub app_store_base_url: String,
    pub deepseek_api_key: Option<String>,
    pub deepseek_api_url: String,
    pub deepseek_model: String,
    pub ai_batch_size: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field(
                "scraper_retry_backoff_base_ms",
                &self.scraper_retry_backoff_base_ms,
            )
            .field(
                "scraper_inter_request_delay_ms",
                &self.scraper_inter_request_delay_ms,
            )
            .field("max_reviews_per_store", &self.max_reviews_per_store)
            .field("play_lang", &self.play_lang)
            .field("play_country", &self.play_country)
            .field("app_store_country", &self.app_store_country)
            .field("play_base_url", &self.play_base_url)
            .field("app_store_base_url", &self.app_store_base_url)
            .field(
                "deepseek_api_key",
                &self.deepseek_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("deepseek_api_url", &self.deepseek_api_url)
            .field("deepseek_model", &self.deepseek_model)
            .field("ai_batch_size", &self.ai_batch_size)
            .finish()
    }
}
