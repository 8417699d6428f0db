use crack_core::models::{PredictionChoice, VoteRequest};

use crate::util::{api_request, exit_error};

pub async fn list(api_url: &str, username: Option<&str>) -> i32 {
    let query: Vec<(&str, String)> = username
        .map(|u| vec![("username", u.to_string())])
        .unwrap_or_default();
    api_request(
        api_url,
        reqwest::Method::GET,
        &["api", "predictions"],
        &query,
        None,
    )
    .await
}

fn vote_body(choice: &str) -> Option<serde_json::Value> {
    let choice = PredictionChoice::parse(choice)?;
    serde_json::to_value(VoteRequest {
        choice: choice.as_str().to_string(),
    })
    .ok()
}

pub async fn vote(api_url: &str, username: &str, choice: &str) -> i32 {
    let Some(body) = vote_body(choice) else {
        exit_error(
            &format!("Invalid choice '{choice}'"),
            Some("Vote with `crack vote hold` or `crack vote crack`."),
        );
    };
    api_request(
        api_url,
        reqwest::Method::POST,
        &["api", "predictions", "vote"],
        &[("username", username.to_string())],
        Some(body),
    )
    .await
}
