use crack_core::models::{RegisterRequest, UserResponse};

use crate::util::{
    Profile, RequestError, eprint_json, exit_code_for_status, print_json, raw_api_request, report,
    save_profile,
};

/// Register a player and remember it as the default for later commands.
pub async fn run(api_url: &str, username: &str) -> i32 {
    let body = match serde_json::to_value(RegisterRequest {
        username: username.to_string(),
    }) {
        Ok(v) => v,
        Err(e) => return report(RequestError::Usage(e.to_string())),
    };

    let (status, body) = match raw_api_request(
        api_url,
        reqwest::Method::POST,
        &["api", "auth", "register"],
        &[],
        Some(body),
    )
    .await
    {
        Ok(r) => r,
        Err(e) => return report(e),
    };

    let code = exit_code_for_status(status);
    if code != 0 {
        eprint_json(&body);
        return code;
    }

    // Server-side normalization (trimming) wins over what was typed
    let registered = serde_json::from_value::<UserResponse>(body.clone())
        .map(|user| user.username)
        .unwrap_or_else(|_| username.trim().to_string());

    let profile = Profile {
        username: registered,
        api_url: api_url.to_string(),
    };
    match save_profile(&profile) {
        Ok(path) => tracing::info!(path = %path.display(), "Profile saved"),
        Err(e) => tracing::warn!(error = %e, "Could not save profile"),
    }

    print_json(&body);
    0
}
