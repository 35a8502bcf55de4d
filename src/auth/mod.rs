// Admin authorization gate
//
// Every admin handler funnels through `authorize`: resolve the bearer token
// to an account, load its profile, and accept only the `admin` role. The
// principal is re-derived on every request - nothing is cached, so a
// revoked or demoted account loses access on its next request.

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::supabase::Backend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved identity for the current request.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

/// Single failure variant: the HTTP surface must not distinguish a bad
/// token from a non-admin role. The reason is for logs and tests only.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },
}

impl AuthError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        AuthError::Unauthorized {
            reason: reason.into(),
        }
    }
}

/// Extract the raw token from `Authorization: Bearer <token>`. An absent,
/// malformed, or empty header all count as "no token".
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Verify the token and require the `admin` role.
///
/// Two backend round-trips per call: token verification, then the profile
/// lookup for the role. A missing token short-circuits before either.
pub async fn authorize(
    backend: &dyn Backend,
    token: Option<&str>,
) -> Result<Principal, AuthError> {
    let token = token.ok_or_else(|| AuthError::unauthorized("missing bearer token"))?;

    let account_id = backend
        .verify_token(token)
        .await
        .map_err(|e| AuthError::unauthorized(format!("token verification failed: {}", e)))?;

    let profile = backend
        .fetch_profile(account_id)
        .await
        .map_err(|e| AuthError::unauthorized(format!("profile lookup failed: {}", e)))?;

    if profile.role != Role::Admin.as_str() {
        return Err(AuthError::unauthorized(format!(
            "account {} has role '{}', not admin",
            account_id, profile.role
        )));
    }

    Ok(Principal {
        id: account_id,
        role: Role::Admin,
    })
}
