// Supabase backend binding
//
// Everything stateful lives behind the hosted backend: GoTrue issues and
// verifies session tokens, PostgREST serves the tables. This module wraps
// both behind the `Backend` trait so handlers and the authorization gate
// can be exercised against a test double. One HTTP call per operation,
// no retries; errors propagate to the caller.

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    #[error("supabase request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("supabase returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("unexpected supabase response: {0}")]
    Decode(String),
}

/// Profile row from the `profiles` table. Only the fields the admin API
/// reads; the table itself is owned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub role: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// Read predicates for a table select, mapped onto PostgREST query params.
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    pub columns: Option<String>,
    pub order_by: Option<(String, bool)>, // (column, descending)
    pub limit: Option<u32>,
}

impl SelectQuery {
    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_string());
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order_by = Some((column.to_string(), true));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![(
            "select".to_string(),
            self.columns.clone().unwrap_or_else(|| "*".to_string()),
        )];
        if let Some((column, descending)) = &self.order_by {
            let direction = if *descending { "desc" } else { "asc" };
            params.push(("order".to_string(), format!("{}.{}", column, direction)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

/// The capabilities the admin API needs from the hosted backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Resolve a caller-supplied bearer token to the account it was issued
    /// for. Any error means the token does not identify an account.
    async fn verify_token(&self, token: &str) -> Result<Uuid, SupabaseError>;

    /// Load the profile row for an account.
    async fn fetch_profile(&self, id: Uuid) -> Result<Profile, SupabaseError>;

    /// Read rows from a table.
    async fn select(&self, table: &str, query: SelectQuery) -> Result<Vec<Value>, SupabaseError>;

    /// Exact row count of a table.
    async fn count(&self, table: &str) -> Result<u64, SupabaseError>;

    /// Patch a single row by id and return the updated representation.
    async fn update(&self, table: &str, id: &str, patch: Value) -> Result<Value, SupabaseError>;

    /// Delete an account via the GoTrue admin API. The backend's
    /// referential-integrity cascade removes dependent rows.
    async fn delete_user(&self, id: &str) -> Result<(), SupabaseError>;
}

/// Live client over one shared `reqwest::Client`. Constructed once at
/// startup and injected into handlers through the router state.
pub struct SupabaseClient {
    http: reqwest::Client,
    endpoint: String,
    service_role_key: String,
}

impl SupabaseClient {
    pub fn new(endpoint: &str, service_role_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            service_role_key: service_role_key.to_string(),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.endpoint, table)
    }

    /// Request builder authenticated with the service-level credential.
    fn service_request(&self, method: Method, url: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SupabaseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(SupabaseError::Status {
        status: status.as_u16(),
        message,
    })
}

fn parse_content_range(value: &str) -> Result<u64, SupabaseError> {
    // PostgREST reports exact counts as "<range>/<total>", e.g. "0-24/3573"
    let total = value.rsplit('/').next().unwrap_or("");
    total
        .parse()
        .map_err(|_| SupabaseError::Decode(format!("unparseable content-range '{}'", value)))
}

#[async_trait]
impl Backend for SupabaseClient {
    async fn verify_token(&self, token: &str) -> Result<Uuid, SupabaseError> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.endpoint))
            .header("apikey", &self.service_role_key)
            .bearer_auth(token)
            .send()
            .await?;
        let body: Value = ensure_success(response).await?.json().await?;

        let id = body
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| SupabaseError::Decode("auth response missing user id".to_string()))?;
        Uuid::parse_str(id)
            .map_err(|_| SupabaseError::Decode(format!("invalid account id '{}'", id)))
    }

    async fn fetch_profile(&self, id: Uuid) -> Result<Profile, SupabaseError> {
        let response = self
            .service_request(Method::GET, self.rest_url("profiles"))
            .query(&[
                ("select", "*".to_string()),
                ("id", format!("eq.{}", id)),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;
        let rows: Vec<Profile> = ensure_success(response).await?.json().await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| SupabaseError::NotFound(format!("no profile for account {}", id)))
    }

    async fn select(&self, table: &str, query: SelectQuery) -> Result<Vec<Value>, SupabaseError> {
        let response = self
            .service_request(Method::GET, self.rest_url(table))
            .query(&query.to_params())
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn count(&self, table: &str) -> Result<u64, SupabaseError> {
        let response = self
            .service_request(Method::HEAD, self.rest_url(table))
            .header("Prefer", "count=exact")
            .query(&[("select", "id")])
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| SupabaseError::Decode("missing content-range header".to_string()))?;
        parse_content_range(range)
    }

    async fn update(&self, table: &str, id: &str, patch: Value) -> Result<Value, SupabaseError> {
        let response = self
            .service_request(Method::PATCH, self.rest_url(table))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        let rows: Vec<Value> = ensure_success(response).await?.json().await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| SupabaseError::NotFound(format!("no {} row with id {}", table, id)))
    }

    async fn delete_user(&self, id: &str) -> Result<(), SupabaseError> {
        let response = self
            .service_request(
                Method::DELETE,
                format!("{}/auth/v1/admin/users/{}", self.endpoint, id),
            )
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}
