// handlers/admin/dashboard.rs - GET /api/admin/dashboard

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::{authorize, bearer_token};
use crate::error::ApiError;
use crate::supabase::SelectQuery;
use crate::AppState;

/// GET /api/admin/dashboard - storefront stats plus the newest orders
///
/// All five reads are independent and issued as one fan-out; any branch
/// failing fails the whole request.
pub async fn dashboard_get(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    authorize(state.backend.as_ref(), bearer_token(&headers)).await?;

    let backend = state.backend.as_ref();
    let (total_users, total_products, total_orders, recent_orders, order_totals) = tokio::try_join!(
        backend.count("profiles"),
        backend.count("products"),
        backend.count("orders"),
        backend.select("orders", SelectQuery::default().order_desc("created_at").limit(5)),
        backend.select("orders", SelectQuery::default().columns("total,status")),
    )?;

    Ok(Json(json!({
        "stats": {
            "totalUsers": total_users,
            "totalProducts": total_products,
            "totalOrders": total_orders,
            "totalRevenue": total_revenue(&order_totals),
        },
        "recentOrders": recent_orders,
    })))
}

/// Sum of order totals, excluding cancelled orders. Totals may arrive as
/// JSON numbers or numeric strings depending on the column type.
fn total_revenue(rows: &[Value]) -> f64 {
    rows.iter()
        .filter(|row| row.get("status").and_then(Value::as_str) != Some("cancelled"))
        .filter_map(order_total)
        .sum()
}

fn order_total(row: &Value) -> Option<f64> {
    match row.get("total") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}
