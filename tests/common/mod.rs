// Shared test harness: an in-memory Backend double plus request helpers
// for driving the router with `tower::ServiceExt::oneshot`.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use uuid::Uuid;

use trekgear_api::supabase::{Backend, Profile, SelectQuery, SupabaseError};
use trekgear_api::{app, AppState};

pub const ADMIN_TOKEN: &str = "admin-token";
pub const USER_TOKEN: &str = "user-token";

pub fn admin_id() -> Uuid {
    Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap()
}

pub fn user_id() -> Uuid {
    Uuid::parse_str("22222222-2222-2222-2222-222222222222").unwrap()
}

/// Backend double with canned tables, recording every call it receives.
pub struct MockBackend {
    pub profiles: Vec<Value>,
    pub orders: Vec<Value>,
    pub counts: HashMap<String, u64>,
    pub failing_counts: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
    pub deleted_users: Mutex<Vec<String>>,
    pub updates: Mutex<Vec<(String, String, Value)>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        let profiles = vec![
            json!({
                "id": admin_id().to_string(),
                "first_name": "Asha",
                "last_name": "Rai",
                "email": "asha@trekgear.test",
                "role": "admin",
                "created_at": "2024-01-01T00:00:00Z",
            }),
            json!({
                "id": user_id().to_string(),
                "first_name": "",
                "last_name": "",
                "email": "blank@trekgear.test",
                "role": "user",
                "created_at": "2024-02-01T00:00:00Z",
            }),
        ];
        let orders = vec![
            json!({
                "id": "order-1",
                "user_id": admin_id().to_string(),
                "status": "delivered",
                "total": 100.0,
                "created_at": "2024-03-02T00:00:00Z",
                "updated_at": "2024-03-02T00:00:00Z",
            }),
            json!({
                "id": "order-2",
                "user_id": "ghost-user",
                "status": "cancelled",
                "total": 50.0,
                "created_at": "2024-03-01T00:00:00Z",
                "updated_at": "2024-03-01T00:00:00Z",
            }),
        ];
        let counts = HashMap::from([
            ("profiles".to_string(), 2),
            ("products".to_string(), 12),
            ("orders".to_string(), 2),
        ]);

        Self {
            profiles,
            orders,
            counts,
            failing_counts: HashSet::new(),
            calls: Mutex::new(Vec::new()),
            deleted_users: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
        }
    }
}

impl MockBackend {
    pub fn failing_count(table: &str) -> Self {
        let mut mock = Self::default();
        mock.failing_counts.insert(table.to_string());
        mock
    }

    pub fn backend_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn verify_token(&self, token: &str) -> Result<Uuid, SupabaseError> {
        self.record(format!("verify_token:{}", token));
        match token {
            ADMIN_TOKEN => Ok(admin_id()),
            USER_TOKEN => Ok(user_id()),
            _ => Err(SupabaseError::Status {
                status: 401,
                message: "invalid JWT".to_string(),
            }),
        }
    }

    async fn fetch_profile(&self, id: Uuid) -> Result<Profile, SupabaseError> {
        self.record(format!("fetch_profile:{}", id));
        let role = if id == admin_id() { "admin" } else { "user" };
        Ok(Profile {
            id,
            role: role.to_string(),
            first_name: None,
            last_name: None,
            email: None,
            profile_picture: None,
        })
    }

    async fn select(&self, table: &str, _query: SelectQuery) -> Result<Vec<Value>, SupabaseError> {
        self.record(format!("select:{}", table));
        match table {
            "orders" => Ok(self.orders.clone()),
            "profiles" => Ok(self.profiles.clone()),
            _ => Ok(Vec::new()),
        }
    }

    async fn count(&self, table: &str) -> Result<u64, SupabaseError> {
        self.record(format!("count:{}", table));
        if self.failing_counts.contains(table) {
            return Err(SupabaseError::Status {
                status: 500,
                message: format!("{} stats unavailable", table),
            });
        }
        Ok(*self.counts.get(table).unwrap_or(&0))
    }

    async fn update(&self, table: &str, id: &str, patch: Value) -> Result<Value, SupabaseError> {
        self.record(format!("update:{}:{}", table, id));
        self.updates
            .lock()
            .unwrap()
            .push((table.to_string(), id.to_string(), patch.clone()));

        let rows = match table {
            "orders" => &self.orders,
            "profiles" => &self.profiles,
            _ => return Err(SupabaseError::NotFound(format!("unknown table {}", table))),
        };
        let mut row = rows
            .iter()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
            .cloned()
            .unwrap_or_else(|| json!({ "id": id }));
        if let (Value::Object(target), Value::Object(changes)) = (&mut row, &patch) {
            for (key, value) in changes {
                target.insert(key.clone(), value.clone());
            }
        }
        Ok(row)
    }

    async fn delete_user(&self, id: &str) -> Result<(), SupabaseError> {
        self.record(format!("delete_user:{}", id));
        self.deleted_users.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

pub fn app_with(mock: MockBackend) -> (axum::Router, Arc<MockBackend>) {
    let backend = Arc::new(mock);
    let state = AppState {
        backend: backend.clone(),
    };
    (app(state), backend)
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: axum::response::Response) -> Result<Value> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}
