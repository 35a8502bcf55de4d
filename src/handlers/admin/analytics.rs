// handlers/admin/analytics.rs - GET /api/admin/analytics

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::{authorize, bearer_token};
use crate::error::ApiError;
use crate::supabase::SelectQuery;
use crate::AppState;

/// GET /api/admin/analytics - raw order series plus the user count
pub async fn analytics_get(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    authorize(state.backend.as_ref(), bearer_token(&headers)).await?;

    let backend = state.backend.as_ref();
    let (orders, user_count) = tokio::try_join!(
        backend.select(
            "orders",
            SelectQuery::default()
                .columns("id,status,total,created_at")
                .order_desc("created_at"),
        ),
        backend.count("profiles"),
    )?;

    Ok(Json(json!({
        "orders": orders,
        "userCount": user_count,
    })))
}
