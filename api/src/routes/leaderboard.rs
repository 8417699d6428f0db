use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crack_core::error::ApiError;
use crack_core::models::{LeaderboardEntry, StatsResponse};

use crate::error::AppError;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/stats", get(get_stats))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// Number of entries to return (1-100, default 10)
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// Include this player's rank in the response
    pub username: Option<String>,
}

#[derive(sqlx::FromRow)]
struct LeaderboardRow {
    rank: Option<i32>,
    username: String,
    completion_time: i64,
    attempts_count: i32,
    completed_at: DateTime<Utc>,
}

impl From<LeaderboardRow> for LeaderboardEntry {
    fn from(row: LeaderboardRow) -> Self {
        LeaderboardEntry {
            rank: row.rank,
            username: row.username,
            completion_time: row.completion_time,
            attempts_count: row.attempts_count,
            completed_at: row.completed_at,
        }
    }
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Re-number the whole board: fewest attempts first, earlier crack breaks ties.
pub(crate) async fn recompute_ranks<'e, E>(executor: E) -> Result<(), AppError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE leaderboard AS l
        SET rank = ranked.position
        FROM (
            SELECT id, ROW_NUMBER() OVER (ORDER BY attempts_count ASC, completed_at ASC)::INTEGER AS position
            FROM leaderboard
        ) AS ranked
        WHERE l.id = ranked.id
        "#,
    )
    .execute(executor)
    .await?;
    Ok(())
}

/// Top players by attempts (fewer is better)
#[utoipa::path(
    get,
    path = "/api/leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Ranked entries", body = Vec<LeaderboardEntry>),
        (status = 500, description = "Internal error", body = ApiError)
    ),
    tag = "leaderboard"
)]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let rows = sqlx::query_as::<_, LeaderboardRow>(
        r#"
        SELECT rank, username, completion_time, attempts_count, completed_at
        FROM leaderboard
        ORDER BY attempts_count ASC, completed_at ASC
        LIMIT $1
        "#,
    )
    .bind(clamp_limit(query.limit))
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows.into_iter().map(LeaderboardEntry::from).collect()))
}

/// Global game statistics
///
/// `successful_cracks` is deliberately reported as 0.
#[utoipa::path(
    get,
    path = "/api/stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Statistics", body = StatsResponse)
    ),
    tag = "leaderboard"
)]
pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let (total_users, total_attempts): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(total_attempts), 0)::BIGINT FROM users",
    )
    .fetch_one(&state.db)
    .await?;

    let your_rank = match query.username.as_deref() {
        Some(username) => sqlx::query_scalar::<_, Option<i32>>(
            r#"
            SELECT l.rank FROM leaderboard l
            JOIN users u ON u.id = l.user_id
            WHERE u.username = $1 AND u.is_cracked
            "#,
        )
        .bind(username)
        .fetch_optional(&state.db)
        .await?
        .flatten(),
        None => None,
    };

    Ok(Json(StatsResponse {
        total_users,
        total_attempts,
        successful_cracks: 0,
        your_rank,
    }))
}
