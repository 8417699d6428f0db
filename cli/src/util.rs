use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

/// Player profile saved by `crack register`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub api_url: String,
}

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}

pub fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{value}"),
    }
}

pub fn eprint_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => eprintln!("{text}"),
        Err(_) => eprintln!("{value}"),
    }
}

pub fn exit_error(message: &str, docs_hint: Option<&str>) -> ! {
    let mut err = json!({
        "error": "cli_error",
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    eprint_json(&err);
    std::process::exit(1);
}

pub fn profile_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("crack-protocol")
        .join("profile.json")
}

pub fn load_profile() -> Option<Profile> {
    let data = std::fs::read_to_string(profile_path()).ok()?;
    serde_json::from_str(&data).ok()
}

pub fn save_profile(profile: &Profile) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = profile_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, serde_json::to_string_pretty(profile)?)?;
    Ok(path)
}

/// Username priority: --username / CRACK_USERNAME, then the saved profile.
pub fn resolve_username(explicit: Option<String>) -> String {
    if let Some(username) = explicit.filter(|u| !u.trim().is_empty()) {
        return username;
    }
    match load_profile() {
        Some(profile) => profile.username,
        None => exit_error(
            "No player selected",
            Some("Run `crack register <username>`, or pass --username / set CRACK_USERNAME."),
        ),
    }
}

/// API URL priority: --api-url / CRACK_API_URL, then the URL the profile was
/// registered against, then localhost.
pub fn resolve_api_url(explicit: Option<String>, profile: Option<&Profile>) -> String {
    explicit
        .filter(|u| !u.trim().is_empty())
        .or_else(|| profile.map(|p| p.api_url.clone()))
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Join path segments onto the API base URL, percent-encoding each segment.
pub fn endpoint_url(
    api_url: &str,
    segments: &[&str],
    query: &[(&str, String)],
) -> Result<Url, String> {
    let mut url = Url::parse(api_url).map_err(|e| format!("Invalid API URL '{api_url}': {e}"))?;
    url.path_segments_mut()
        .map_err(|_| format!("API URL '{api_url}' cannot be used as a base"))?
        .pop_if_empty()
        .extend(segments);
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in query {
            pairs.append_pair(k, v);
        }
    }
    Ok(url)
}

#[derive(Debug)]
pub enum RequestError {
    Usage(String),
    Connection(String),
}

impl RequestError {
    pub fn exit_code(&self) -> i32 {
        match self {
            RequestError::Usage(_) => 1,
            RequestError::Connection(_) => 3,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            RequestError::Usage(message) => json!({
                "error": "cli_error",
                "message": message
            }),
            RequestError::Connection(message) => json!({
                "error": "connection_error",
                "message": message,
                "docs_hint": "Is the API server running? Check CRACK_API_URL."
            }),
        }
    }
}

/// Send a request and return the status with the JSON body (no printing).
pub async fn raw_api_request(
    api_url: &str,
    method: reqwest::Method,
    segments: &[&str],
    query: &[(&str, String)],
    body: Option<serde_json::Value>,
) -> Result<(u16, serde_json::Value), RequestError> {
    let url = endpoint_url(api_url, segments, query).map_err(RequestError::Usage)?;
    tracing::debug!(%url, %method, "API request");

    let mut req = client().request(method, url);
    if let Some(b) = body {
        req = req.json(&b);
    }

    let resp = req
        .send()
        .await
        .map_err(|e| RequestError::Connection(e.to_string()))?;
    let status = resp.status().as_u16();
    let body = match resp.json::<serde_json::Value>().await {
        Ok(v) => v,
        Err(e) => json!({"raw_error": format!("Failed to parse response as JSON: {e}")}),
    };
    Ok((status, body))
}

pub fn exit_code_for_status(status: u16) -> i32 {
    match status {
        200..=299 => 0,
        400..=499 => 1,
        _ => 2,
    }
}

/// Execute an API request, print the response and return the exit code.
///
/// Exit codes: 0=success (2xx), 1=client error (4xx) or usage error,
///             2=server error (5xx), 3=connection error
pub async fn api_request(
    api_url: &str,
    method: reqwest::Method,
    segments: &[&str],
    query: &[(&str, String)],
    body: Option<serde_json::Value>,
) -> i32 {
    match raw_api_request(api_url, method, segments, query, body).await {
        Ok((status, body)) => {
            let code = exit_code_for_status(status);
            if code == 0 {
                print_json(&body);
            } else {
                eprint_json(&body);
            }
            code
        }
        Err(e) => report(e),
    }
}

/// Print a request failure as structured JSON and return its exit code.
pub fn report(err: RequestError) -> i32 {
    eprint_json(&err.to_json());
    err.exit_code()
}
