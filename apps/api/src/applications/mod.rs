//! Application tracking: persistence plus the insights and follow-up views built on it.

pub mod follow_up;
pub mod insights;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::ApplicationRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationMethod {
    Email,
    #[default]
    Manual,
    Linkedin,
    Indeed,
    CompanyPortal,
}

impl ApplicationMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationMethod::Email => "email",
            ApplicationMethod::Manual => "manual",
            ApplicationMethod::Linkedin => "linkedin",
            ApplicationMethod::Indeed => "indeed",
            ApplicationMethod::CompanyPortal => "company_portal",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    #[default]
    Applied,
    UnderReview,
    InterviewScheduled,
    Rejected,
    Accepted,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::InterviewScheduled => "interview_scheduled",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackApplicationRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub application_method: ApplicationMethod,
    #[serde(default)]
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub compatibility_score: Option<u32>,
    #[serde(default)]
    pub matching_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    pub job_url: Option<String>,
}

impl TrackApplicationRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [&self.user_id, &self.job_id, &self.job_title, &self.company_name];
        if required.iter().any(|v| v.trim().is_empty()) {
            return Err(AppError::Validation(
                "userId, jobId, jobTitle, and companyName are required".to_string(),
            ));
        }
        if self.compatibility_score.is_some_and(|s| s > 100) {
            return Err(AppError::Validation(
                "compatibilityScore must be between 0 and 100".to_string(),
            ));
        }
        Ok(())
    }
}

pub async fn insert_application(
    pool: &PgPool,
    req: &TrackApplicationRequest,
) -> Result<ApplicationRow, AppError> {
    let row: ApplicationRow = sqlx::query_as(
        r#"
        INSERT INTO applications
            (id, user_id, job_id, job_title, company_name, job_url, application_method,
             status, compatibility_score, matching_skills, missing_skills, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.user_id.trim())
    .bind(req.job_id.trim())
    .bind(&req.job_title)
    .bind(&req.company_name)
    .bind(&req.job_url)
    .bind(req.application_method.as_str())
    .bind(req.status.as_str())
    .bind(req.compatibility_score.map(|s| s as i32))
    .bind(&req.matching_skills)
    .bind(&req.missing_skills)
    .bind(&req.notes)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// All applications for a user, newest first.
pub async fn list_applications(pool: &PgPool, user_id: &str) -> Result<Vec<ApplicationRow>, AppError> {
    let rows = sqlx::query_as(
        "SELECT * FROM applications WHERE user_id = $1 ORDER BY applied_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_application(pool: &PgPool, id: Uuid) -> Result<ApplicationRow, AppError> {
    let row: Option<ApplicationRow> = sqlx::query_as("SELECT * FROM applications WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
}
