use crate::util::api_request;

pub async fn leaderboard(api_url: &str, limit: Option<u32>) -> i32 {
    let query: Vec<(&str, String)> = limit
        .map(|l| vec![("limit", l.to_string())])
        .unwrap_or_default();
    api_request(
        api_url,
        reqwest::Method::GET,
        &["api", "leaderboard"],
        &query,
        None,
    )
    .await
}

/// Global stats; includes the player's rank when one is known.
pub async fn stats(api_url: &str, username: Option<&str>) -> i32 {
    let query: Vec<(&str, String)> = username
        .map(|u| vec![("username", u.to_string())])
        .unwrap_or_default();
    api_request(api_url, reqwest::Method::GET, &["api", "stats"], &query, None).await
}
