//! `AppJson<T>`: drop-in replacement for `axum::Json<T>` in handler arguments.
//!
//! Body rejections become `AppError::Validation` JSON instead of axum's
//! plain-text 400/422, so the terminal client can show them like any other
//! API error.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};

use crate::error::AppError;

pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(rejection_to_error(&rejection.body_text())),
        }
    }
}

fn rejection_to_error(body_text: &str) -> AppError {
    AppError::Validation {
        message: format!("Invalid request body: {body_text}"),
        field: Some(field_from_serde_message(body_text).unwrap_or_else(|| "body".to_string())),
        received: None,
        docs_hint: Some("See /swagger-ui for the request schema of this endpoint.".to_string()),
    }
}

/// Pulls `name` out of serde's "missing field `name`" / "unknown field `name`".
fn field_from_serde_message(msg: &str) -> Option<String> {
    ["missing field `", "unknown field `"].iter().find_map(|marker| {
        let after = &msg[msg.find(marker)? + marker.len()..];
        after.find('`').map(|end| after[..end].to_string())
    })
}
