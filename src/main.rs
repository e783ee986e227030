use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use servicebot::config::AppConfig;
use servicebot::db;
use servicebot::handlers;
use servicebot::services::backend::SqliteBookingBackend;
use servicebot::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    tracing::info!(
        categories = ?config.service_categories,
        session_max_age_hours = config.session_max_age_hours,
        "loaded configuration"
    );

    let conn = db::init_db(&config.database_url)?;
    let db = Arc::new(Mutex::new(conn));

    let state = Arc::new(AppState {
        db: Arc::clone(&db),
        config: config.clone(),
        backend: Box::new(SqliteBookingBackend::new(db)),
        session: tokio::sync::Mutex::new(()),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/chat", get(handlers::chat::get_chat))
        .route("/api/chat/message", post(handlers::chat::send_message))
        .route("/api/chat/confirm", post(handlers::chat::confirm))
        .route("/api/chat/restart", post(handlers::chat::restart))
        .route("/api/bookings", get(handlers::bookings::list_bookings))
        .route("/api/bookings/:id", get(handlers::bookings::get_booking))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
