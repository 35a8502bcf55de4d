// handlers/admin/mod.rs - Admin resource handlers
//
// users, orders, dashboard, analytics. Every handler follows the same
// sequence: extract bearer token -> authorization gate -> dispatch.

pub mod analytics;
pub mod dashboard;
pub mod orders;
pub mod users;

pub use analytics::analytics_get;
pub use dashboard::dashboard_get;
pub use orders::{orders_get, orders_patch};
pub use users::{users_delete, users_get, users_patch};

use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::{json, Value};

use crate::auth::{authorize, bearer_token};
use crate::error::ApiError;
use crate::AppState;

/// Shared fallback for methods a resource does not support. The gate still
/// runs first: an unauthenticated caller sees the same 403 as on any other
/// request, never a 405.
pub async fn method_not_allowed(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiError {
    match authorize(state.backend.as_ref(), bearer_token(&headers)).await {
        Ok(_) => ApiError::method_not_allowed("Method not allowed"),
        Err(err) => err.into(),
    }
}

/// Parse a JSON request body after the gate has passed. Validation never
/// runs before authorization.
pub(crate) fn parse_body<T: serde::de::DeserializeOwned>(
    body: &axum::body::Bytes,
) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))
}

pub(crate) fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::bad_request(format!("{} is required", field))),
    }
}

/// Join first/last name parts, trimming stray whitespace. Profiles with
/// no name at all display as "User".
pub(crate) fn display_name(first: Option<&str>, last: Option<&str>) -> String {
    let joined = format!("{} {}", first.unwrap_or(""), last.unwrap_or(""));
    let name = joined.trim();
    if name.is_empty() {
        "User".to_string()
    } else {
        name.to_string()
    }
}

/// Stored avatar URL, or a generated one when the profile has none.
pub(crate) fn avatar_url(stored: Option<&str>, name: &str) -> String {
    match stored {
        Some(url) if !url.trim().is_empty() => url.to_string(),
        _ => format!(
            "https://ui-avatars.com/api/?name={}&background=random",
            name.replace(' ', "+")
        ),
    }
}

/// Customer summary attached to order rows, synthesized from the matching
/// profile. Orders whose account no longer has a profile still surface,
/// with the defaults.
pub(crate) fn customer_summary(profile: Option<&Value>) -> Value {
    let field = |key: &str| profile.and_then(|p| p.get(key)).and_then(Value::as_str);

    let name = display_name(field("first_name"), field("last_name"));
    json!({
        "name": name,
        "email": field("email").unwrap_or(""),
        "profilePicture": avatar_url(field("profile_picture"), &name),
    })
}
