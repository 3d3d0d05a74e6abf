//! Lightcast Open Skills client: OAuth client-credentials tokens cached per scope,
//! plus the skill search endpoint.

pub mod handlers;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::LightcastConfig;

pub const DEFAULT_SCOPE: &str = "emsi_open";
const SKILLS_VERSION: &str = "latest";
const SEARCH_FIELDS: &str = "id,name,type,infoUrl";
/// Tokens are refreshed this long before the server says they expire.
const EXPIRY_BUFFER: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum LightcastError {
    #[error("Lightcast credentials are not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Lightcast returned {status}: {message}")]
    Api { status: u16, message: String },
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Access tokens keyed by OAuth scope.
#[derive(Default)]
pub struct TokenCache {
    tokens: Mutex<HashMap<String, CachedToken>>,
}

impl TokenCache {
    /// The cached token for `scope` if it is still valid at `now`.
    pub async fn get(&self, scope: &str, now: Instant) -> Option<String> {
        let tokens = self.tokens.lock().await;
        tokens
            .get(scope)
            .filter(|t| t.expires_at > now)
            .map(|t| t.access_token.clone())
    }

    pub async fn store(&self, scope: &str, access_token: String, expires_in: Duration, now: Instant) {
        let lifetime = expires_in.saturating_sub(EXPIRY_BUFFER);
        self.tokens.lock().await.insert(
            scope.to_string(),
            CachedToken {
                access_token,
                expires_at: now + lifetime,
            },
        );
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillType {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub skill_type: Option<SkillType>,
    pub info_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SkillsEnvelope {
    #[serde(default)]
    data: Vec<Skill>,
}

pub struct LightcastClient {
    http: Client,
    config: LightcastConfig,
    tokens: TokenCache,
}

impl LightcastClient {
    pub fn new(config: LightcastConfig) -> Result<Self, LightcastError> {
        Ok(Self {
            http: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            config,
            tokens: TokenCache::default(),
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.config.client_id.is_empty() && !self.config.client_secret.is_empty()
    }

    pub async fn access_token(&self, scope: &str) -> Result<String, LightcastError> {
        if let Some(token) = self.tokens.get(scope, Instant::now()).await {
            return Ok(token);
        }
        if !self.is_configured() {
            return Err(LightcastError::NotConfigured);
        }

        let response = self
            .http
            .post(&self.config.auth_url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("grant_type", "client_credentials"),
                ("scope", scope),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LightcastError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = response.json().await?;
        info!("Obtained Lightcast token for scope {scope} (expires in {}s)", token.expires_in);
        self.tokens
            .store(
                scope,
                token.access_token.clone(),
                Duration::from_secs(token.expires_in),
                Instant::now(),
            )
            .await;
        Ok(token.access_token)
    }

    /// Searches the skills taxonomy. Retries 429 with exponential backoff.
    pub async fn search_skills(&self, query: &str, limit: u32) -> Result<Vec<Skill>, LightcastError> {
        let url = format!(
            "{}/versions/{SKILLS_VERSION}/skills",
            self.config.api_url.trim_end_matches('/')
        );
        let limit = limit.to_string();

        let mut last_error: Option<LightcastError> = None;
        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!("Lightcast search rate limited, retrying after {}ms...", delay.as_millis());
                tokio::time::sleep(delay).await;
            }

            let token = self.access_token(DEFAULT_SCOPE).await?;
            let response = self
                .http
                .get(&url)
                .bearer_auth(token)
                .query(&[("q", query), ("limit", limit.as_str()), ("fields", SEARCH_FIELDS)])
                .send()
                .await?;

            let status = response.status();
            if status.as_u16() == 429 {
                last_error = Some(LightcastError::Api {
                    status: 429,
                    message: "rate limited".to_string(),
                });
                continue;
            }
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(LightcastError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let envelope: SkillsEnvelope = response.json().await?;
            return Ok(envelope.data);
        }

        Err(last_error.unwrap_or(LightcastError::Api {
            status: 429,
            message: "rate limited".to_string(),
        }))
    }
}
