use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::agent::accounts::{load_agent_context, load_plan};
use crate::agent::consent::{
    record_consent, record_email_consent, ConsentAction, EmailConsentRequest,
    ResumeConsentRequest,
};
use crate::agent::gates::{plan_overview, PlanOverview};
use crate::agent::models::{WebhookPayload, WorkflowInput, WorkflowOutcome};
use crate::agent::workflow::AgentWorkflow;
use crate::applications::follow_up::{build_follow_up, FollowUp};
use crate::applications::insights::{compute_insights, ApplicationInsights};
use crate::applications::{
    get_application, insert_application, list_applications, TrackApplicationRequest,
};
use crate::documents::{document_key, sanitize_segment, DocumentKind, PDF_CONTENT_TYPE};
use crate::errors::AppError;
use crate::models::application::ApplicationRow;
use crate::models::consent::ConsentRow;
use crate::refactor::templates::{template_catalog, TemplateCatalog};
use crate::routes::envelope::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/ai-agent/process-webhook
pub async fn handle_process_webhook(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> Result<ApiResponse<WorkflowOutcome>, AppError> {
    let input = WorkflowInput::try_from(payload)?;
    let ctx = load_agent_context(&state.db, &input.user_id).await;

    let outcome = AgentWorkflow::new(state.llm.as_ref(), &state.cache, state.documents.as_ref())
        .process(&input, &ctx)
        .await;

    let message = match &outcome {
        WorkflowOutcome::Completed(_) => "AI Agent workflow completed successfully",
        WorkflowOutcome::Failed(_) => "AI Agent workflow failed, manual steps provided",
    };
    Ok(ApiResponse::ok(outcome, message))
}

/// POST /api/v1/ai-agent/consent/resume-refactor
pub async fn handle_resume_consent(
    State(state): State<AppState>,
    Json(req): Json<ResumeConsentRequest>,
) -> Result<ApiResponse<ConsentRow>, AppError> {
    let consent = req.validate()?;
    let row = record_consent(
        &state.db,
        req.user_id.trim(),
        req.job_id.trim(),
        ConsentAction::ResumeRefactor,
        consent,
        None,
    )
    .await?;
    Ok(ApiResponse::ok(row, "Consent recorded successfully"))
}

/// POST /api/v1/ai-agent/consent/send-email
pub async fn handle_email_consent(
    State(state): State<AppState>,
    Json(req): Json<EmailConsentRequest>,
) -> Result<ApiResponse<Value>, AppError> {
    let consent = req.validate()?;
    let (user_id, job_id) = (req.user_id.trim(), req.job_id.trim());

    let queued = record_email_consent(
        &state.db,
        user_id,
        job_id,
        req.recipient_email.trim(),
        consent,
    )
    .await?;

    let Some(queued) = queued else {
        return Ok(ApiResponse::ok(
            json!({ "action": "manual_apply" }),
            "User chose manual application",
        ));
    };
    info!(user_id, job_id, "Queued application email {}", queued.id);

    Ok(ApiResponse::ok(
        json!({
            "userId": queued.user_id,
            "jobId": queued.job_id,
            "recipientEmail": queued.recipient_email,
            "queued": true,
            "messageId": queued.id,
            "timestamp": queued.created_at,
        }),
        "Application email queued successfully",
    ))
}

/// POST /api/v1/ai-agent/track-application
pub async fn handle_track_application(
    State(state): State<AppState>,
    Json(req): Json<TrackApplicationRequest>,
) -> Result<ApiResponse<ApplicationRow>, AppError> {
    req.validate()?;
    let row = insert_application(&state.db, &req).await?;
    Ok(ApiResponse::created(row, "Application tracked successfully"))
}

/// GET /api/v1/ai-agent/insights/:userId
pub async fn handle_insights(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<ApplicationInsights>, AppError> {
    let applications = list_applications(&state.db, &user_id).await?;
    Ok(ApiResponse::ok(
        compute_insights(&applications),
        "Application insights retrieved successfully",
    ))
}

/// GET /api/v1/ai-agent/monetization-gates/:userId
pub async fn handle_monetization_gates(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<PlanOverview>, AppError> {
    let plan = load_plan(&state.db, &user_id).await?;
    Ok(ApiResponse::ok(
        plan_overview(plan),
        "Monetization gates retrieved successfully",
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadQuery {
    pub user_id: Option<String>,
}

/// GET /api/v1/ai-agent/download/:type/:jobId?userId=
pub async fn handle_download(
    State(state): State<AppState>,
    Path((kind, job_id)): Path<(String, String)>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, AppError> {
    let kind: DocumentKind = kind.parse().map_err(AppError::Validation)?;
    let user_id = query
        .user_id
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::Validation("userId query parameter is required".to_string()))?;

    let key = document_key(&user_id, &job_id, kind);
    let bytes = state
        .documents
        .get(&key)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("No {kind} generated for job {job_id}")))?;

    let disposition = format!(
        "attachment; filename=\"{kind}_{}.pdf\"",
        sanitize_segment(&job_id)
    );
    Ok((
        [
            (header::CONTENT_TYPE, PDF_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpRequest {
    pub days_since_applied: Option<i64>,
}

/// POST /api/v1/ai-agent/follow-up/:applicationId
pub async fn handle_follow_up(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    body: Option<Json<FollowUpRequest>>,
) -> Result<ApiResponse<FollowUp>, AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    if req.days_since_applied.is_some_and(|d| d < 0) {
        return Err(AppError::Validation(
            "daysSinceApplied cannot be negative".to_string(),
        ));
    }

    let application = get_application(&state.db, application_id).await?;
    Ok(ApiResponse::ok(
        build_follow_up(&application, req.days_since_applied, Utc::now()),
        "Follow-up content generated successfully",
    ))
}

/// GET /api/v1/ai-agent/templates
pub async fn handle_templates() -> ApiResponse<TemplateCatalog> {
    ApiResponse::ok(template_catalog(), "Templates retrieved successfully")
}
