use axum::extract::{Query, State};
use serde::Deserialize;

use crate::errors::AppError;
use crate::lightcast::Skill;
use crate::routes::envelope::ApiResponse;
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct SkillSearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<u32>,
}

/// GET /api/v1/lightcast/skills?q=&limit=
pub async fn handle_search_skills(
    State(state): State<AppState>,
    Query(params): Query<SkillSearchQuery>,
) -> Result<ApiResponse<Vec<Skill>>, AppError> {
    let q = params.q.trim();
    if q.is_empty() {
        return Err(AppError::Validation("Query parameter 'q' is required".to_string()));
    }
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let skills = state.lightcast.search_skills(q, limit).await?;
    Ok(ApiResponse::ok(skills, "Skills retrieved successfully"))
}
