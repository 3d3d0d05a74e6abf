use anyhow::{Context, Result};

const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_LLM_MODEL: &str = "deepseek-ai/deepseek-coder-33b-instruct";
const DEFAULT_FEEDBACK_MODEL: &str = "tngtech/deepseek-r1t2-chimera:free";
const DEFAULT_LIGHTCAST_AUTH_URL: &str = "https://auth.emsicloud.com/connect/token";
const DEFAULT_LIGHTCAST_API_URL: &str = "https://emsiservices.com/skills";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub openrouter_api_key: String,
    pub openrouter_base_url: String,
    pub llm_model: String,
    pub feedback_model: String,
    pub lightcast: LightcastConfig,
    pub cache_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct LightcastConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub api_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        // DEEPSEEK_API_KEY is the legacy name for the OpenRouter key.
        let openrouter_api_key = require_env("OPENROUTER_API_KEY")
            .or_else(|_| require_env("DEEPSEEK_API_KEY"))
            .context("Set OPENROUTER_API_KEY (or DEEPSEEK_API_KEY)")?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            openrouter_api_key,
            openrouter_base_url: env_or("OPENROUTER_BASE_URL", DEFAULT_OPENROUTER_BASE_URL),
            llm_model: env_or("LLM_MODEL", DEFAULT_LLM_MODEL),
            feedback_model: env_or("FEEDBACK_MODEL", DEFAULT_FEEDBACK_MODEL),
            lightcast: LightcastConfig {
                client_id: env_or("LIGHTCAST_CLIENT_ID", ""),
                client_secret: env_or("LIGHTCAST_CLIENT_SECRET", ""),
                auth_url: env_or("LIGHTCAST_AUTH_URL", DEFAULT_LIGHTCAST_AUTH_URL),
                api_url: env_or("LIGHTCAST_API_URL", DEFAULT_LIGHTCAST_API_URL),
            },
            cache_ttl_secs: env_or("CACHE_TTL_SECS", "3600")
                .parse::<u64>()
                .context("CACHE_TTL_SECS must be a whole number of seconds")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
