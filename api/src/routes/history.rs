use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crack_core::error::ApiError;
use crack_core::game::Sender;
use crack_core::models::{MessageResponse, SessionResponse};

use crate::error::AppError;
use crate::routes::users::find_user;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/history/{username}", get(get_chat_history))
        .route("/api/sessions/{username}", get(get_user_sessions))
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    sender: String,
    text: String,
    timestamp: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    messages_count: i32,
    hints_given: i32,
}

/// Full chat history across all sessions, oldest first
#[utoipa::path(
    get,
    path = "/api/history/{username}",
    params(("username" = String, Path, description = "Player name")),
    responses(
        (status = 200, description = "Messages in chronological order", body = Vec<MessageResponse>),
        (status = 404, description = "Unknown player", body = ApiError)
    ),
    tag = "chat"
)]
pub async fn get_chat_history(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let user = find_user(&state.db, &username).await?;

    let rows = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT m.id, m.sender, m.text, m.timestamp
        FROM messages m
        JOIN sessions s ON s.id = m.session_id
        WHERE s.user_id = $1
        ORDER BY m.timestamp ASC, m.id ASC
        "#,
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(
        rows.into_iter()
            .map(|row| MessageResponse {
                id: row.id,
                sender: Sender::from_db(&row.sender),
                text: row.text,
                timestamp: row.timestamp,
            })
            .collect(),
    ))
}

/// A player's sessions, newest first
#[utoipa::path(
    get,
    path = "/api/sessions/{username}",
    params(("username" = String, Path, description = "Player name")),
    responses(
        (status = 200, description = "Sessions", body = Vec<SessionResponse>),
        (status = 404, description = "Unknown player", body = ApiError)
    ),
    tag = "chat"
)]
pub async fn get_user_sessions(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<SessionResponse>>, AppError> {
    let user = find_user(&state.db, &username).await?;

    let rows = sqlx::query_as::<_, SessionRow>(
        r#"
        SELECT id, started_at, ended_at, messages_count, hints_given
        FROM sessions
        WHERE user_id = $1
        ORDER BY started_at DESC
        "#,
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(
        rows.into_iter()
            .map(|row| SessionResponse {
                id: row.id,
                started_at: row.started_at,
                ended_at: row.ended_at,
                messages_count: row.messages_count,
                hints_given: row.hints_given,
            })
            .collect(),
    ))
}
