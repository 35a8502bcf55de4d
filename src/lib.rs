pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod supabase;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::supabase::Backend;

/// Shared handler state. The backend client is injected here rather than
/// reached through a module-level singleton so tests can substitute a
/// double.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Admin API (bearer token, admin role)
        .merge(admin_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn admin_routes() -> Router<AppState> {
    use handlers::admin;

    Router::new()
        .route(
            "/api/admin/users",
            get(admin::users_get)
                .patch(admin::users_patch)
                .delete(admin::users_delete)
                .fallback(admin::method_not_allowed),
        )
        .route(
            "/api/admin/orders",
            get(admin::orders_get)
                .patch(admin::orders_patch)
                .fallback(admin::method_not_allowed),
        )
        .route(
            "/api/admin/dashboard",
            get(admin::dashboard_get).fallback(admin::method_not_allowed),
        )
        .route(
            "/api/admin/analytics",
            get(admin::analytics_get).fallback(admin::method_not_allowed),
        )
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Trekgear Admin API",
            "version": version,
            "description": "Admin API for the Trekgear storefront, backed by Supabase",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "users": "/api/admin/users (admin token required)",
                "orders": "/api/admin/orders (admin token required)",
                "dashboard": "/api/admin/dashboard (admin token required)",
                "analytics": "/api/admin/analytics (admin token required)",
            }
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }
    }))
}
