use crate::util::api_request;

pub async fn history(api_url: &str, username: &str) -> i32 {
    api_request(
        api_url,
        reqwest::Method::GET,
        &["api", "history", username],
        &[],
        None,
    )
    .await
}

pub async fn sessions(api_url: &str, username: &str) -> i32 {
    api_request(
        api_url,
        reqwest::Method::GET,
        &["api", "sessions", username],
        &[],
        None,
    )
    .await
}
