// handlers/admin/orders.rs - /api/admin/orders handlers

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{authorize, bearer_token};
use crate::error::ApiError;
use crate::supabase::SelectQuery;
use crate::AppState;

use super::{customer_summary, parse_body, required};

/// The only statuses an order may be moved to.
pub const ORDER_STATUSES: [&str; 5] =
    ["pending", "processing", "shipped", "delivered", "cancelled"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub order_id: Option<String>,
    pub status: Option<String>,
}

/// GET /api/admin/orders - every order with a synthesized customer object
pub async fn orders_get(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    authorize(state.backend.as_ref(), bearer_token(&headers)).await?;

    let backend = state.backend.as_ref();
    // Orders and profiles are independent reads, issued together
    let (orders, profiles) = tokio::try_join!(
        backend.select("orders", SelectQuery::default().order_desc("created_at")),
        backend.select("profiles", SelectQuery::default()),
    )?;

    let profiles_by_id: HashMap<&str, &Value> = profiles
        .iter()
        .filter_map(|p| p.get("id").and_then(Value::as_str).map(|id| (id, p)))
        .collect();

    let orders: Vec<Value> = orders
        .iter()
        .map(|order| {
            let profile = order
                .get("user_id")
                .and_then(Value::as_str)
                .and_then(|id| profiles_by_id.get(id).copied());
            attach_customer(order, profile)
        })
        .collect();

    Ok(Json(json!({ "orders": orders })))
}

/// PATCH /api/admin/orders - move an order to a new status
pub async fn orders_patch(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    authorize(state.backend.as_ref(), bearer_token(&headers)).await?;

    let request: UpdateOrderRequest = parse_body(&body)?;
    let order_id = required(request.order_id, "orderId")?;
    let status = request.status.unwrap_or_default();
    if !ORDER_STATUSES.contains(&status.as_str()) {
        return Err(ApiError::bad_request(format!(
            "Invalid status '{}'. Allowed values: {}",
            status,
            ORDER_STATUSES.join(", ")
        )));
    }

    let patch = json!({
        "status": status,
        "updated_at": chrono::Utc::now().to_rfc3339(),
    });
    let order = state.backend.update("orders", &order_id, patch).await?;

    Ok(Json(json!({ "order": order })))
}

fn attach_customer(order: &Value, profile: Option<&Value>) -> Value {
    let mut shaped = order.clone();
    if let Value::Object(map) = &mut shaped {
        map.insert("customer".to_string(), customer_summary(profile));
    }
    shaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_customer_joins_profile() {
        let order = json!({ "id": "o1", "user_id": "u1", "total": 120 });
        let profile = json!({ "id": "u1", "first_name": "Sita", "last_name": "Gurung" });
        let shaped = attach_customer(&order, Some(&profile));
        assert_eq!(shaped["customer"]["name"], "Sita Gurung");
        assert_eq!(shaped["total"], 120);
    }

    #[test]
    fn attach_customer_defaults_without_profile() {
        let shaped = attach_customer(&json!({ "id": "o2" }), None);
        assert_eq!(shaped["customer"]["name"], "User");
    }

    #[test]
    fn status_enumeration_is_closed() {
        for status in ORDER_STATUSES {
            assert!(ORDER_STATUSES.contains(&status));
        }
        assert!(!ORDER_STATUSES.contains(&"refunded"));
        assert!(!ORDER_STATUSES.contains(&"Shipped"));
    }
}
