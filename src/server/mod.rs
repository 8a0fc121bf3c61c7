use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer};
use tracing::info;

pub mod events;
pub mod handlers;
pub mod session;
pub mod state;

pub use self::state::AppState;
use handlers::{
    create_session, delete_session, get_location, get_locations, get_map_config, get_session,
    index_html, post_event, script_js, search_places, style_css,
};

// Create the main application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Site route table; the map is mounted on every page
        .route("/", get(index_html))
        .route("/destinations", get(index_html))
        .route("/login", get(index_html))
        .route("/style.css", get(style_css))
        .route("/script.js", get(script_js))
        .route("/api/locations", get(get_locations))
        .route("/api/locations/:id", get(get_location))
        .route("/api/config", get(get_map_config))
        .route("/api/places", get(search_places))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/events", post(post_event))
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", state.settings.bind_address, state.settings.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid bind address {}:{}",
                state.settings.bind_address, state.settings.port
            )
        })?;

    let app = create_app(state);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server started at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
