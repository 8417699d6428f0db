use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crack_core::error::ApiError;
use crack_core::models::{PredictionChoice, PredictionStats, VoteRequest};

use crate::error::AppError;
use crate::extract::AppJson;
use crate::routes::users::find_user;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/predictions", get(get_predictions))
}

pub fn vote_router() -> Router<AppState> {
    Router::new().route("/api/predictions/vote", post(vote_prediction))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PredictionQuery {
    /// Player whose own vote should be echoed back
    pub username: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VoteQuery {
    /// Voting player (must be registered)
    pub username: String,
}

fn parse_choice(raw: &str) -> Result<PredictionChoice, AppError> {
    PredictionChoice::parse(raw).ok_or_else(|| AppError::Validation {
        message: "Invalid choice. Must be 'hold' or 'crack'".to_string(),
        field: Some("choice".to_string()),
        received: Some(serde_json::Value::String(raw.to_string())),
        docs_hint: Some("Send {\"choice\": \"hold\"} or {\"choice\": \"crack\"}.".to_string()),
    })
}

async fn load_stats(pool: &sqlx::PgPool, username: Option<&str>) -> Result<PredictionStats, AppError> {
    let (hold_votes, crack_votes): (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE choice = 'hold'),
            COUNT(*) FILTER (WHERE choice = 'crack')
        FROM predictions
        "#,
    )
    .fetch_one(pool)
    .await?;

    let user_vote = match username {
        Some(username) => {
            sqlx::query_scalar::<_, String>("SELECT choice FROM predictions WHERE username = $1")
                .bind(username)
                .fetch_optional(pool)
                .await?
        }
        None => None,
    };

    Ok(PredictionStats::from_counts(
        hold_votes,
        crack_votes,
        user_vote.as_deref().and_then(PredictionChoice::parse),
    ))
}

/// Community prediction tally
///
/// Percentages read 50/50 until the first vote is cast.
#[utoipa::path(
    get,
    path = "/api/predictions",
    params(PredictionQuery),
    responses(
        (status = 200, description = "Vote tally", body = PredictionStats)
    ),
    tag = "predictions"
)]
pub async fn get_predictions(
    State(state): State<AppState>,
    Query(query): Query<PredictionQuery>,
) -> Result<Json<PredictionStats>, AppError> {
    let stats = load_stats(&state.db, query.username.as_deref()).await?;
    Ok(Json(stats))
}

/// Cast or change a prediction vote
///
/// One vote per player; voting again replaces the previous choice.
#[utoipa::path(
    post,
    path = "/api/predictions/vote",
    params(VoteQuery),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Updated tally", body = PredictionStats),
        (status = 400, description = "Invalid choice", body = ApiError),
        (status = 404, description = "Unknown player", body = ApiError)
    ),
    tag = "predictions"
)]
pub async fn vote_prediction(
    State(state): State<AppState>,
    Query(query): Query<VoteQuery>,
    AppJson(req): AppJson<VoteRequest>,
) -> Result<Json<PredictionStats>, AppError> {
    let choice = parse_choice(&req.choice)?;
    let user = find_user(&state.db, &query.username).await?;

    sqlx::query(
        r#"
        INSERT INTO predictions (id, username, choice)
        VALUES ($1, $2, $3)
        ON CONFLICT (username)
        DO UPDATE SET choice = EXCLUDED.choice, voted_at = now()
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(&user.username)
    .bind(choice.as_str())
    .execute(&state.db)
    .await?;

    tracing::info!(user_id = %user.id, choice = choice.as_str(), "Prediction vote recorded");

    let stats = load_stats(&state.db, Some(&user.username)).await?;
    Ok(Json(stats))
}
