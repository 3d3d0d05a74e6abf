use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRow {
    pub id: Uuid,
    pub user_id: String,
    pub job_id: String,
    pub job_title: String,
    pub company_name: String,
    pub job_url: Option<String>,
    pub application_method: String,
    pub status: String,
    pub compatibility_score: Option<i32>,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub notes: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
