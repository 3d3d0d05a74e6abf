use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::application::ApplicationRow;

/// Days after applying when a follow-up is customary.
const FOLLOW_UP_AFTER_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub application_id: Uuid,
    pub email_subject: String,
    pub follow_up_content: String,
    pub days_since_applied: i64,
    pub suggested_send_date: DateTime<Utc>,
}

/// Builds the follow-up email for a tracked application. `days_since_applied`
/// defaults to the days elapsed since `applied_at`.
pub fn build_follow_up(
    application: &ApplicationRow,
    days_since_applied: Option<i64>,
    now: DateTime<Utc>,
) -> FollowUp {
    let days = days_since_applied
        .unwrap_or_else(|| (now - application.applied_at).num_days())
        .max(0);
    let wait = (FOLLOW_UP_AFTER_DAYS - days).max(0);

    let content = format!(
        "Dear Hiring Manager,

I hope this email finds you well. I wanted to follow up on my application for the {title} role at {company} that I submitted on {date}.

I remain very interested in this opportunity and would welcome the chance to discuss how my skills and experience align with your team's needs.

Thank you for your time and consideration.

Best regards,
[Your Name]",
        title = application.job_title,
        company = application.company_name,
        date = application.applied_at.format("%B %-d, %Y"),
    );

    FollowUp {
        application_id: application.id,
        email_subject: format!("Following up: {} application", application.job_title),
        follow_up_content: content,
        days_since_applied: days,
        suggested_send_date: now + Duration::days(wait),
    }
}
