//! Per-user account facts: subscription plan and mailbox connection.

use sqlx::PgPool;
use tracing::warn;

use crate::agent::gates::Plan;
use crate::agent::workflow::AgentContext;

/// Plan of the user's active subscription; `Free` when none is active.
pub async fn load_plan(pool: &PgPool, user_id: &str) -> Result<Plan, sqlx::Error> {
    let plan: Option<String> = sqlx::query_scalar(
        r#"
        SELECT plan FROM subscriptions
        WHERE user_id = $1 AND status = 'active' AND current_period_end > now()
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(plan.as_deref().map(Plan::from_db).unwrap_or_default())
}

pub async fn has_email_connection(pool: &PgPool, user_id: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM email_connections WHERE user_id = $1)")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

/// Loads the workflow context. Lookup failures degrade to a free, unconnected user
/// so a database hiccup never blocks the workflow.
pub async fn load_agent_context(pool: &PgPool, user_id: &str) -> AgentContext {
    let (plan, email_connected) =
        tokio::join!(load_plan(pool, user_id), has_email_connection(pool, user_id));

    AgentContext {
        plan: plan.unwrap_or_else(|e| {
            warn!(user_id, "Subscription lookup failed, assuming free plan: {e}");
            Plan::Free
        }),
        email_connected: email_connected.unwrap_or_else(|e| {
            warn!(user_id, "Email connection lookup failed: {e}");
            false
        }),
    }
}
