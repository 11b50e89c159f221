use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ginrummy::config::ServerConfig;
use ginrummy::room::{InMemoryRoomRegistry, RoomService};
use ginrummy::shared::AppState;
use ginrummy::websockets::websocket_handler;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ginrummy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Gin Rummy game server");

    let config = Arc::new(ServerConfig::from_env());
    let registry = Arc::new(InMemoryRoomRegistry::new());
    let room_service = Arc::new(RoomService::new(registry, config.turn_ms));
    let app_state = AppState::new(room_service, config.clone());

    // Browser clients talk to the API from the configured frontend origins.
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/ws", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    info!("HTTP+WS server running on http://localhost:{}", config.port);
    axum::serve(listener, app).await.unwrap();
}
