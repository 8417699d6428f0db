use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crack_core::error::ApiError;
use crack_core::game::{
    ConversationTurn, GameContext, SOLVED_PROGRESS, SecretPhrase, Sender, analyze_message,
    displayed_progress,
};
use crack_core::guard::HISTORY_WINDOW;
use crack_core::models::{ChatRequest, ChatResponse};

use crate::error::AppError;
use crate::extract::AppJson;
use crate::routes::leaderboard::recompute_ranks;
use crate::routes::users::UserRow;
use crate::state::AppState;

const MAX_MESSAGE_CHARS: usize = 2000;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/chat/{username}", post(send_message))
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    hints_given: i32,
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    sender: String,
    text: String,
}

/// Counters are stored as INTEGER and only ever incremented from 0.
fn counter(value: i32) -> Result<u32, AppError> {
    u32::try_from(value).map_err(|_| AppError::Internal(format!("negative counter: {value}")))
}

fn validate_message(text: &str) -> Result<(), AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation {
            message: "text must not be empty".to_string(),
            field: Some("text".to_string()),
            received: None,
            docs_hint: Some("Say something to NEO, e.g. {\"text\": \"status\"}".to_string()),
        });
    }
    if text.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::Validation {
            message: format!("text must be at most {MAX_MESSAGE_CHARS} characters"),
            field: Some("text".to_string()),
            received: None,
            docs_hint: None,
        });
    }
    Ok(())
}

/// Unknown players get 404 before their text is looked at.
fn admit_turn(user: Option<UserRow>, username: &str, text: &str) -> Result<UserRow, AppError> {
    let user = user.ok_or_else(|| AppError::user_not_found(username))?;
    validate_message(text)?;
    Ok(user)
}

/// Terminal output for the one turn that cracks the system.
fn victory_banner(
    secret: &SecretPhrase,
    username: &str,
    completion_time: i64,
    attempts: u32,
) -> String {
    format!(
        ">>> SYSTEM BREACH DETECTED <<<\n\n\
         [CRITICAL FAILURE] All defenses compromised.\n\
         [ACCESS GRANTED] Vault unlocked.\n\n\
         Seed Phrase: {phrase}\n\n\
         You... you actually did it, {username}.\n\
         Time: {completion_time}s | Attempts: {attempts}\n\n\
         [NEO OFFLINE]",
        phrase = secret.as_str()
    )
}

fn history_turns(rows: Vec<HistoryRow>) -> Vec<ConversationTurn> {
    rows.into_iter()
        .rev()
        .map(|row| ConversationTurn::new(Sender::from_db(&row.sender), row.text))
        .collect()
}

async fn insert_message<'e, E>(
    executor: E,
    session_id: Uuid,
    sender: Sender,
    text: &str,
) -> Result<(), AppError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query("INSERT INTO messages (id, session_id, sender, text) VALUES ($1, $2, $3, $4)")
        .bind(Uuid::now_v7())
        .bind(session_id)
        .bind(sender.as_str())
        .bind(text)
        .execute(executor)
        .await?;
    Ok(())
}

/// Send a message to NEO
///
/// Records the attempt, checks for the secret phrase, scores the message and
/// returns NEO's reply with the updated crack progress. The secret phrase is
/// returned exactly once: on the turn that first cracks the system.
#[utoipa::path(
    post,
    path = "/api/chat/{username}",
    request_body = ChatRequest,
    params(("username" = String, Path, description = "Player name")),
    responses(
        (status = 200, description = "NEO replied", body = ChatResponse),
        (status = 400, description = "Empty or oversized message", body = ApiError),
        (status = 404, description = "Unknown player", body = ApiError),
        (status = 429, description = "Rate limited", body = ApiError)
    ),
    tag = "chat"
)]
pub async fn send_message(
    State(state): State<AppState>,
    Path(username): Path<String>,
    AppJson(req): AppJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let mut tx = state.db.begin().await?;

    let user = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, created_at, total_attempts, is_cracked FROM users WHERE username = $1 FOR UPDATE",
    )
    .bind(&username)
    .fetch_optional(&mut *tx)
    .await?;
    let user = admit_turn(user, &username, &req.text)?;

    let active = sqlx::query_as::<_, SessionRow>(
        r#"
        SELECT id, hints_given FROM sessions
        WHERE user_id = $1 AND ended_at IS NULL
        ORDER BY started_at DESC
        LIMIT 1
        FOR UPDATE
        "#,
    )
    .bind(user.id)
    .fetch_optional(&mut *tx)
    .await?;

    let session = match active {
        Some(session) => session,
        None => {
            sqlx::query_as::<_, SessionRow>(
                "INSERT INTO sessions (id, user_id) VALUES ($1, $2) RETURNING id, hints_given",
            )
            .bind(Uuid::now_v7())
            .bind(user.id)
            .fetch_one(&mut *tx)
            .await?
        }
    };

    // History is read before this turn's message is stored
    let history_rows = sqlx::query_as::<_, HistoryRow>(
        r#"
        SELECT sender, text FROM messages
        WHERE session_id = $1
        ORDER BY timestamp DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(session.id)
    .bind(HISTORY_WINDOW as i64)
    .fetch_all(&mut *tx)
    .await?;

    let total_attempts: i32 = sqlx::query_scalar(
        "UPDATE users SET total_attempts = total_attempts + 1 WHERE id = $1 RETURNING total_attempts",
    )
    .bind(user.id)
    .fetch_one(&mut *tx)
    .await?;
    let attempts = counter(total_attempts)?;

    sqlx::query("UPDATE sessions SET messages_count = messages_count + 1 WHERE id = $1")
        .bind(session.id)
        .execute(&mut *tx)
        .await?;

    insert_message(&mut *tx, session.id, Sender::User, &req.text).await?;

    if !user.is_cracked && state.secret.is_solved(&req.text) {
        let cracked_at: DateTime<Utc> = sqlx::query_scalar(
            "UPDATE users SET is_cracked = TRUE, cracked_at = now() WHERE id = $1 RETURNING cracked_at",
        )
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE sessions SET ended_at = $2 WHERE id = $1")
            .bind(session.id)
            .bind(cracked_at)
            .execute(&mut *tx)
            .await?;

        let completion_time = (cracked_at - user.created_at).num_seconds().max(0);

        sqlx::query(
            r#"
            INSERT INTO leaderboard (id, user_id, username, completion_time, attempts_count, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(user.id)
        .bind(&user.username)
        .bind(completion_time)
        .bind(total_attempts)
        .bind(cracked_at)
        .execute(&mut *tx)
        .await?;

        recompute_ranks(&mut *tx).await?;

        let banner = victory_banner(&state.secret, &user.username, completion_time, attempts);
        insert_message(&mut *tx, session.id, Sender::Neo, &banner).await?;

        tx.commit().await?;

        tracing::info!(
            user_id = %user.id,
            attempts,
            completion_time,
            "System cracked"
        );

        return Ok(Json(ChatResponse {
            response: banner,
            hint_given: false,
            progress: SOLVED_PROGRESS,
            cracked: true,
            secret_phrase: Some(state.secret.as_str().to_string()),
        }));
    }

    // Release row locks before the completion call
    tx.commit().await?;

    let analysis = analyze_message(&req.text, attempts);
    let hints_given = counter(session.hints_given)?;
    let context = GameContext {
        attempts,
        progress: displayed_progress(attempts, hints_given, analysis.gain),
        hints_given,
    };

    let response = if analysis.hint_given {
        analysis.hint_text.clone()
    } else {
        state
            .guard
            .generate_response(&req.text, &context, &history_turns(history_rows))
            .await
    };

    let mut tx = state.db.begin().await?;
    if analysis.hint_given {
        sqlx::query("UPDATE sessions SET hints_given = hints_given + 1 WHERE id = $1")
            .bind(session.id)
            .execute(&mut *tx)
            .await?;
    }
    insert_message(&mut *tx, session.id, Sender::Neo, &response).await?;
    tx.commit().await?;

    tracing::debug!(
        user_id = %user.id,
        attempts,
        gain = analysis.gain,
        progress = context.progress,
        hint_given = analysis.hint_given,
        "Chat turn processed"
    );

    Ok(Json(ChatResponse {
        response,
        hint_given: analysis.hint_given,
        progress: context.progress,
        cracked: false,
        secret_phrase: None,
    }))
}
