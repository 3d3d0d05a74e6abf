pub mod envelope;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::agent::handlers;
use crate::extraction::handle_extract;
use crate::lightcast::handlers::handle_search_skills;
use crate::research::handlers::handle_research_plan;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // AI agent (n8n webhook + follow-up actions)
        .route(
            "/api/v1/ai-agent/process-webhook",
            post(handlers::handle_process_webhook),
        )
        .route(
            "/api/v1/ai-agent/consent/resume-refactor",
            post(handlers::handle_resume_consent),
        )
        .route(
            "/api/v1/ai-agent/consent/send-email",
            post(handlers::handle_email_consent),
        )
        .route(
            "/api/v1/ai-agent/track-application",
            post(handlers::handle_track_application),
        )
        .route(
            "/api/v1/ai-agent/insights/:user_id",
            get(handlers::handle_insights),
        )
        .route(
            "/api/v1/ai-agent/monetization-gates/:user_id",
            get(handlers::handle_monetization_gates),
        )
        .route(
            "/api/v1/ai-agent/download/:kind/:job_id",
            get(handlers::handle_download),
        )
        .route(
            "/api/v1/ai-agent/follow-up/:application_id",
            post(handlers::handle_follow_up),
        )
        .route("/api/v1/ai-agent/templates", get(handlers::handle_templates))
        // Supporting services
        .route("/api/v1/resume/extract", post(handle_extract))
        .route("/api/v1/lightcast/skills", get(handle_search_skills))
        .route("/api/v1/research/plan", post(handle_research_plan))
        .with_state(state)
}
