use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Build a CORS layer from the `CRACK_CORS_ORIGINS` env var.
///
/// - Origins: comma-separated list, or `*` for any origin (default: `http://localhost:3000`)
/// - Methods: GET, POST, OPTIONS
/// - Headers: Content-Type
/// - Max age: 3600s
pub fn build_cors_layer() -> CorsLayer {
    let origins_str =
        std::env::var("CRACK_CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([HeaderName::from_static("content-type")])
        .max_age(std::time::Duration::from_secs(3600));

    match parse_origins(&origins_str) {
        Some(origins) => layer.allow_origin(origins),
        None => layer.allow_origin(AllowOrigin::any()),
    }
}

/// `None` means any origin.
fn parse_origins(raw: &str) -> Option<Vec<HeaderValue>> {
    if raw.trim() == "*" {
        return None;
    }

    Some(
        raw.split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .filter_map(|origin| origin.parse::<HeaderValue>().ok())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_allows_any_origin() {
        assert!(parse_origins(" * ").is_none());
    }

    #[test]
    fn list_is_split_and_trimmed() {
        let origins = parse_origins("https://crack.example, http://localhost:3000,,").unwrap();
        assert_eq!(
            origins,
            vec![
                HeaderValue::from_static("https://crack.example"),
                HeaderValue::from_static("http://localhost:3000"),
            ]
        );
    }
}
