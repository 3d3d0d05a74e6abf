//! Consent records and the outbound email queue.

use serde::Deserialize;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::consent::{ConsentRow, OutboundEmailRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentAction {
    ResumeRefactor,
    SendEmail,
}

impl ConsentAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ConsentAction::ResumeRefactor => "resume_refactor",
            ConsentAction::SendEmail => "send_email",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeConsentRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub job_id: String,
    pub consent: Option<bool>,
}

impl ResumeConsentRequest {
    /// Returns the consent decision once the required fields are present.
    pub fn validate(&self) -> Result<bool, AppError> {
        match self.consent {
            Some(consent) if !self.user_id.trim().is_empty() && !self.job_id.trim().is_empty() => {
                Ok(consent)
            }
            _ => Err(AppError::Validation(
                "userId, jobId, and consent are required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailConsentRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub recipient_email: String,
    pub consent: Option<bool>,
}

impl EmailConsentRequest {
    pub fn validate(&self) -> Result<bool, AppError> {
        let fields = [&self.user_id, &self.job_id, &self.recipient_email];
        match self.consent {
            Some(consent) if fields.iter().all(|f| !f.trim().is_empty()) => {
                if !looks_like_email(&self.recipient_email) {
                    return Err(AppError::Validation(format!(
                        "'{}' is not a valid email address",
                        self.recipient_email
                    )));
                }
                Ok(consent)
            }
            _ => Err(AppError::Validation(
                "userId, jobId, recipientEmail, and consent are required".to_string(),
            )),
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

pub async fn record_consent<'e>(
    db: impl PgExecutor<'e>,
    user_id: &str,
    job_id: &str,
    action: ConsentAction,
    consent: bool,
    recipient_email: Option<&str>,
) -> Result<ConsentRow, AppError> {
    let row = sqlx::query_as(
        r#"
        INSERT INTO consents (id, user_id, job_id, action, consent, recipient_email)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(job_id)
    .bind(action.as_str())
    .bind(consent)
    .bind(recipient_email)
    .fetch_one(db)
    .await?;
    Ok(row)
}

/// Queues an application email. Delivery belongs to the mail worker, not this service.
pub async fn queue_outbound_email<'e>(
    db: impl PgExecutor<'e>,
    user_id: &str,
    job_id: &str,
    recipient_email: &str,
) -> Result<OutboundEmailRow, AppError> {
    let row = sqlx::query_as(
        r#"
        INSERT INTO outbound_emails (id, user_id, job_id, recipient_email, status)
        VALUES ($1, $2, $3, $4, 'queued')
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(job_id)
    .bind(recipient_email.trim())
    .fetch_one(db)
    .await?;
    Ok(row)
}

/// Records an email consent and, when granted, queues the email in the same
/// transaction. Returns the queued row, or `None` for a manual-apply choice.
pub async fn record_email_consent(
    pool: &PgPool,
    user_id: &str,
    job_id: &str,
    recipient_email: &str,
    consent: bool,
) -> Result<Option<OutboundEmailRow>, AppError> {
    let mut tx = pool.begin().await?;
    record_consent(
        &mut *tx,
        user_id,
        job_id,
        ConsentAction::SendEmail,
        consent,
        Some(recipient_email),
    )
    .await?;

    let queued = if consent {
        Some(queue_outbound_email(&mut *tx, user_id, job_id, recipient_email).await?)
    } else {
        None
    };
    tx.commit().await?;
    Ok(queued)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resume_consent_requires_flag() {
        let req: ResumeConsentRequest =
            serde_json::from_value(json!({"userId": "u", "jobId": "j"})).unwrap();
        assert!(req.validate().is_err());

        let req: ResumeConsentRequest =
            serde_json::from_value(json!({"userId": "u", "jobId": "j", "consent": false})).unwrap();
        assert!(!req.validate().unwrap());
    }

    #[test]
    fn test_email_consent_checks_address() {
        let req: EmailConsentRequest = serde_json::from_value(json!({
            "userId": "u", "jobId": "j", "recipientEmail": "hr@initech", "consent": true
        }))
        .unwrap();
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));

        let req: EmailConsentRequest = serde_json::from_value(json!({
            "userId": "u", "jobId": "j", "recipientEmail": "hr@initech.com", "consent": true
        }))
        .unwrap();
        assert!(req.validate().unwrap());
    }

    #[test]
    fn test_email_consent_requires_recipient() {
        let req: EmailConsentRequest =
            serde_json::from_value(json!({"userId": "u", "jobId": "j", "consent": true})).unwrap();
        assert!(req.validate().is_err());
    }
}
