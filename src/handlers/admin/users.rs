// handlers/admin/users.rs - /api/admin/users handlers

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{authorize, bearer_token, Role};
use crate::error::ApiError;
use crate::supabase::SelectQuery;
use crate::AppState;

use super::{avatar_url, display_name, parse_body, required};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub user_id: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserRequest {
    pub user_id: Option<String>,
}

/// GET /api/admin/users - list every profile, reshaped for the admin UI
pub async fn users_get(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    authorize(state.backend.as_ref(), bearer_token(&headers)).await?;

    let rows = state
        .backend
        .select("profiles", SelectQuery::default().order_desc("created_at"))
        .await?;
    let users: Vec<Value> = rows.iter().map(shape_user).collect();

    Ok(Json(json!({ "users": users })))
}

/// PATCH /api/admin/users - change an account's role
pub async fn users_patch(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    authorize(state.backend.as_ref(), bearer_token(&headers)).await?;

    let request: UpdateUserRequest = parse_body(&body)?;
    let user_id = required(request.user_id, "userId")?;
    let role = request
        .role
        .as_deref()
        .and_then(Role::parse)
        .ok_or_else(|| ApiError::bad_request("Invalid role. Allowed values: user, admin"))?;

    let patch = json!({
        "role": role.as_str(),
        "updated_at": chrono::Utc::now().to_rfc3339(),
    });
    let user = state.backend.update("profiles", &user_id, patch).await?;

    Ok(Json(json!({ "user": user })))
}

/// DELETE /api/admin/users - remove an account
///
/// One admin delete call; the backend cascade removes the profile and any
/// dependent rows.
pub async fn users_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    authorize(state.backend.as_ref(), bearer_token(&headers)).await?;

    let request: DeleteUserRequest = parse_body(&body)?;
    let user_id = required(request.user_id, "userId")?;

    state.backend.delete_user(&user_id).await?;

    Ok(Json(json!({ "message": "User deleted successfully" })))
}

fn shape_user(row: &Value) -> Value {
    let field = |key: &str| row.get(key).and_then(Value::as_str);

    let name = display_name(field("first_name"), field("last_name"));
    json!({
        "id": row.get("id").cloned().unwrap_or(Value::Null),
        "name": name,
        "email": field("email").unwrap_or(""),
        "role": field("role").unwrap_or("user"),
        "profilePicture": avatar_url(field("profile_picture"), &name),
        "created_at": row.get("created_at").cloned().unwrap_or(Value::Null),
    })
}
