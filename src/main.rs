use std::sync::Arc;

use trekgear_api::supabase::SupabaseClient;
use trekgear_api::{app, config, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up SUPABASE_URL and friends.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration; missing secrets are fatal here, before the
    // listener is bound.
    let config = config::config();
    tracing::info!("Starting Trekgear admin API in {:?} mode", config.environment);

    let backend = SupabaseClient::new(&config.supabase.url, &config.supabase.service_role_key);
    let state = AppState {
        backend: Arc::new(backend),
    };

    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Trekgear admin API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
