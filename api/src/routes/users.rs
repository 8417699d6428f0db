use std::sync::LazyLock;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use regex::Regex;
use uuid::Uuid;

use crack_core::error::ApiError;
use crack_core::models::{RegisterRequest, UserResponse};

use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]{1,32}$").expect("valid username regex"));

pub fn register_router() -> Router<AppState> {
    Router::new().route("/api/auth/register", post(register_user))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/users/{username}", get(get_user))
}

/// Internal row type for sqlx mapping
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub total_attempts: i32,
    pub is_cracked: bool,
}

impl UserRow {
    fn into_response(self) -> UserResponse {
        UserResponse {
            id: self.id,
            username: self.username,
            created_at: self.created_at,
            total_attempts: self.total_attempts,
            is_cracked: self.is_cracked,
        }
    }
}

/// Look up a player by name, 404 if unknown.
pub(crate) async fn find_user<'e, E>(executor: E, username: &str) -> Result<UserRow, AppError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_as::<_, UserRow>(
        "SELECT id, username, created_at, total_attempts, is_cracked FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| AppError::user_not_found(username))
}

fn validate_username(username: &str) -> Result<(), AppError> {
    if USERNAME_RE.is_match(username) {
        return Ok(());
    }
    Err(AppError::Validation {
        message: "username must be 1-32 characters of letters, digits, '_', '.' or '-'"
            .to_string(),
        field: Some("username".to_string()),
        received: Some(serde_json::Value::String(username.to_string())),
        docs_hint: Some("Pick a handle like 'neo_breaker' or 'z3r0.cool'.".to_string()),
    })
}

/// Register a new player
///
/// Creates the user and opens their first chat session.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = UserResponse),
        (status = 400, description = "Invalid or taken username", body = ApiError)
    ),
    tag = "users"
)]
pub async fn register_user(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let username = req.username.trim();
    validate_username(username)?;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
        .bind(username)
        .fetch_one(&state.db)
        .await?;
    if exists {
        return Err(AppError::Conflict {
            message: "Username already exists".to_string(),
            field: Some("username".to_string()),
        });
    }

    let mut tx = state.db.begin().await?;

    let user = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (id, username)
        VALUES ($1, $2)
        RETURNING id, username, created_at, total_attempts, is_cracked
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(username)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO sessions (id, user_id) VALUES ($1, $2)")
        .bind(Uuid::now_v7())
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(user_id = %user.id, username = %user.username, "Player registered");

    Ok(Json(user.into_response()))
}

/// Get a player's public record
#[utoipa::path(
    get,
    path = "/api/users/{username}",
    params(("username" = String, Path, description = "Player name")),
    responses(
        (status = 200, description = "Player found", body = UserResponse),
        (status = 404, description = "Unknown player", body = ApiError)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = find_user(&state.db, &username).await?;
    Ok(Json(user.into_response()))
}
