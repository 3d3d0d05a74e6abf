use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRow {
    pub id: Uuid,
    pub user_id: String,
    pub job_id: String,
    pub action: String,
    pub consent: bool,
    pub recipient_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An application email waiting for the mail worker. Rows are only ever inserted here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OutboundEmailRow {
    pub id: Uuid,
    pub user_id: String,
    pub job_id: String,
    pub recipient_email: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
