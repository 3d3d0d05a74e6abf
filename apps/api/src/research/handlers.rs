use axum::Json;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::research::{
    build_queries, categories_for, next_refresh_time, should_refresh, Category, ResearchProfile,
    ResearchQuery, DEFAULT_REFRESH_HOURS,
};
use crate::routes::envelope::ApiResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchPlanRequest {
    #[serde(flatten)]
    pub profile: ResearchProfile,
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchPlan {
    pub categories: Vec<Category>,
    pub queries: Vec<ResearchQuery>,
    pub should_refresh: bool,
    pub next_refresh: DateTime<Utc>,
}

pub fn plan_research(req: &ResearchPlanRequest, now: DateTime<Utc>) -> ResearchPlan {
    let categories = categories_for(now);
    ResearchPlan {
        queries: build_queries(&req.profile, &categories, now.year()),
        categories,
        should_refresh: should_refresh(req.last_update, now, DEFAULT_REFRESH_HOURS),
        next_refresh: next_refresh_time(now),
    }
}

/// POST /api/v1/research/plan
pub async fn handle_research_plan(Json(req): Json<ResearchPlanRequest>) -> ApiResponse<ResearchPlan> {
    ApiResponse::ok(plan_research(&req, Utc::now()), "Research plan generated successfully")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_plan_from_wire_request() {
        let req: ResearchPlanRequest = serde_json::from_value(json!({
            "skills": ["Rust"],
            "targetRole": "SRE",
            "industry": "Cloud",
            "lastUpdate": "2026-03-02T01:00:00Z"
        }))
        .unwrap();
        // Monday 2026-03-02, 08:00
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        let plan = plan_research(&req, now);

        assert_eq!(
            plan.categories,
            vec![Category::Industry, Category::Skills, Category::Interview]
        );
        assert_eq!(plan.queries.len(), 3);
        assert!(!plan.should_refresh);
        assert_eq!(plan.next_refresh, Utc.with_ymd_and_hms(2026, 3, 3, 6, 0, 0).unwrap());
    }
}
