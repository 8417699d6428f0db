use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use crack_core::game::SecretPhrase;
use crack_core::guard::{GuardConfig, GuardService};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod error;
mod extract;
mod middleware;
mod routes;
mod state;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CRACK PROTOCOL API",
        version = "0.1.0",
        description = "Backend for CRACK PROTOCOL: talk NEO into giving up its seed phrase."
    ),
    paths(
        routes::health::health_check,
        routes::users::register_user,
        routes::users::get_user,
        routes::chat::send_message,
        routes::history::get_chat_history,
        routes::history::get_user_sessions,
        routes::leaderboard::get_leaderboard,
        routes::leaderboard::get_stats,
        routes::predictions::get_predictions,
        routes::predictions::vote_prediction,
    ),
    components(schemas(
        HealthResponse,
        crack_core::error::ApiError,
        crack_core::game::Sender,
        crack_core::models::RegisterRequest,
        crack_core::models::UserResponse,
        crack_core::models::ChatRequest,
        crack_core::models::ChatResponse,
        crack_core::models::MessageResponse,
        crack_core::models::SessionResponse,
        crack_core::models::LeaderboardEntry,
        crack_core::models::StatsResponse,
        crack_core::models::PredictionChoice,
        crack_core::models::VoteRequest,
        crack_core::models::PredictionStats,
    ))
)]
struct ApiDoc;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// "online" when NEO is backed by the completion endpoint, "fallback" otherwise
    pub persona: String,
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crack_api=debug,crack_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Database connection
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    sqlx::migrate!("../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Persona pipeline: built once, shared by every request
    let secret = SecretPhrase::from_env();
    let guard_config = GuardConfig::from_env();
    tracing::info!(config = ?guard_config, "Guard configured");
    let guard = GuardService::new(&guard_config, secret.clone())
        .expect("Failed to build completion client");

    let app_state = state::AppState {
        db: pool,
        guard: Arc::new(guard),
        secret: Arc::new(secret),
    };

    let cors_layer = middleware::cors::build_cors_layer();

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(routes::health::router())
        .merge(routes::users::register_router().layer(middleware::rate_limit::register_layer()))
        .merge(routes::users::router())
        .merge(routes::chat::router().layer(middleware::rate_limit::chat_layer()))
        .merge(routes::history::router())
        .merge(routes::leaderboard::router())
        .merge(routes::predictions::router())
        .merge(routes::predictions::vote_router().layer(middleware::rate_limit::vote_layer()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer),
        )
        .with_state(app_state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("CRACK PROTOCOL API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
