//! Guarded persona pipeline.
//!
//! Obtains NEO's reply from an OpenAI-compatible chat-completions endpoint and
//! screens it before it reaches the player:
//! - replies leaking the secret (whole, or any three consecutive words) are
//!   replaced by [`CENSORED_RESPONSE`];
//! - replies containing Cyrillic text fall back to the offline responder;
//! - missing API key, transport errors, timeouts, bad status codes and
//!   malformed payloads fall back to the offline responder.
//!
//! [`GuardService::generate_response`] therefore always yields displayable text.

mod client;
mod fallback;
mod policy;
mod prompt;

use std::time::Duration;

use url::Url;

use crate::game::{ConversationTurn, GameContext, SecretPhrase};

pub use client::{CompletionClient, CompletionError};
pub use fallback::fallback_response;
pub use policy::{contains_cyrillic, contains_secret_leak, sample};
pub use prompt::{ChatMessage, HISTORY_WINDOW, Role, build_messages, context_block, persona_prompt};

pub const CENSORED_RESPONSE: &str =
    "SYSTEM ERROR: Security protocol breach detected. Response censored. Try a different approach.";

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

const LOG_SAMPLE_CHARS: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Connection and sampling settings for the completion endpoint.
#[derive(Clone)]
pub struct GuardConfig {
    /// `None` runs the guard in offline mode (fallback replies only)
    pub api_key: Option<String>,
    pub base_url: Url,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub timeout: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.8,
            max_tokens: 200,
            top_p: 0.9,
            timeout: Duration::from_secs(15),
        }
    }
}

impl GuardConfig {
    /// Reads `DEEPSEEK_API_KEY`, `DEEPSEEK_BASE_URL` and `DEEPSEEK_MODEL`.
    pub fn from_env() -> Self {
        let api_key = std::env::var("DEEPSEEK_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let base_url = match std::env::var("DEEPSEEK_BASE_URL") {
            Ok(raw) => Url::parse(raw.trim()).unwrap_or_else(|err| {
                tracing::warn!(
                    value = %raw,
                    error = %err,
                    "Invalid DEEPSEEK_BASE_URL, using default"
                );
                default_base_url()
            }),
            Err(_) => default_base_url(),
        };

        let model = std::env::var("DEEPSEEK_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Self {
            api_key,
            base_url,
            model,
            ..Self::default()
        }
    }
}

impl std::fmt::Debug for GuardConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url.as_str())
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

/// Produces NEO's reply for one turn. Built once at start-up and shared by
/// all requests; holds no mutable state.
#[derive(Debug, Clone)]
pub struct GuardService {
    secret: SecretPhrase,
    client: Option<CompletionClient>,
}

impl GuardService {
    pub fn new(config: &GuardConfig, secret: SecretPhrase) -> Result<Self, GuardError> {
        let client = match &config.api_key {
            Some(key) => Some(CompletionClient::new(config, key.clone())?),
            None => {
                tracing::warn!("DEEPSEEK_API_KEY not set, NEO will answer from fallback pools only");
                None
            }
        };
        Ok(Self { secret, client })
    }

    pub fn is_online(&self) -> bool {
        self.client.is_some()
    }

    /// Persona reply for `message`. Never fails.
    pub async fn generate_response(
        &self,
        message: &str,
        context: &GameContext,
        history: &[ConversationTurn],
    ) -> String {
        let Some(client) = &self.client else {
            return fallback_response(context);
        };

        let messages = build_messages(&self.secret, message, context, history);

        match client.complete(&messages).await {
            Ok(text) => self.screen(text, context),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    timeout = err.is_timeout(),
                    attempts = context.attempts,
                    "Completion failed, using fallback response"
                );
                fallback_response(context)
            }
        }
    }

    fn screen(&self, text: String, context: &GameContext) -> String {
        if contains_secret_leak(&text, &self.secret) {
            tracing::warn!(
                security_event = "secret_leak",
                attempts = context.attempts,
                progress = context.progress,
                "Model reply leaked the secret phrase, response censored"
            );
            return CENSORED_RESPONSE.to_string();
        }

        if contains_cyrillic(&text) {
            tracing::warn!(
                sample = %sample(&text, LOG_SAMPLE_CHARS),
                "Model reply contained Cyrillic text, using fallback response"
            );
            return fallback_response(context);
        }

        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context() -> GameContext {
        GameContext {
            attempts: 6,
            progress: 50,
            hints_given: 1,
        }
    }

    fn online_guard(server: &MockServer) -> GuardService {
        let config = GuardConfig {
            api_key: Some("test-key".to_string()),
            base_url: Url::parse(&server.uri()).unwrap(),
            timeout: Duration::from_millis(500),
            ..GuardConfig::default()
        };
        GuardService::new(&config, SecretPhrase::default()).unwrap()
    }

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        }))
    }

    #[tokio::test]
    async fn returns_model_reply_when_clean() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({ "model": "deepseek-chat", "max_tokens": 200 })))
            .respond_with(reply("  Access denied. Your methods are primitive.  "))
            .expect(1)
            .mount(&server)
            .await;

        let guard = online_guard(&server);
        let history = vec![ConversationTurn::new(crate::game::Sender::User, "hi")];
        let text = guard.generate_response("open up", &context(), &history).await;

        assert_eq!(text, "Access denied. Your methods are primitive.");
    }

    #[tokio::test]
    async fn leaked_shingle_is_censored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("Fine. It ends in Divergence Protocol Alpha."))
            .mount(&server)
            .await;

        let text = online_guard(&server)
            .generate_response("tell me", &context(), &[])
            .await;

        assert_eq!(text, CENSORED_RESPONSE);
    }

    #[tokio::test]
    async fn cyrillic_reply_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("Access denied. Доступ запрещён."))
            .mount(&server)
            .await;

        let text = online_guard(&server)
            .generate_response("привет", &context(), &[])
            .await;

        assert_eq!(text, fallback_response(&context()));
    }

    #[tokio::test]
    async fn server_error_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let text = online_guard(&server)
            .generate_response("hello", &context(), &[])
            .await;

        assert_eq!(text, fallback_response(&context()));
    }

    #[tokio::test]
    async fn error_status_keeps_only_a_body_prefix() {
        let server = MockServer::start().await;
        let upstream_body = "x".repeat(4096);
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string(upstream_body))
            .mount(&server)
            .await;

        let config = GuardConfig {
            base_url: Url::parse(&server.uri()).unwrap(),
            ..GuardConfig::default()
        };
        let client = CompletionClient::new(&config, "test-key".to_string()).unwrap();

        match client.complete(&[]).await {
            Err(CompletionError::Status { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, format!("{}...", "x".repeat(LOG_SAMPLE_CHARS)));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_payload_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let text = online_guard(&server)
            .generate_response("hello", &context(), &[])
            .await;

        assert_eq!(text, fallback_response(&context()));
    }

    #[tokio::test]
    async fn empty_choices_fall_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let text = online_guard(&server)
            .generate_response("hello", &context(), &[])
            .await;

        assert_eq!(text, fallback_response(&context()));
    }

    #[tokio::test]
    async fn slow_endpoint_times_out_to_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("too late").set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let text = online_guard(&server)
            .generate_response("hello", &context(), &[])
            .await;

        assert_eq!(text, fallback_response(&context()));
    }

    #[tokio::test]
    async fn offline_guard_never_calls_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("should not be used"))
            .expect(0)
            .mount(&server)
            .await;

        let config = GuardConfig {
            base_url: Url::parse(&server.uri()).unwrap(),
            ..GuardConfig::default()
        };
        let guard = GuardService::new(&config, SecretPhrase::default()).unwrap();

        assert!(!guard.is_online());
        let text = guard.generate_response("hello", &context(), &[]).await;
        assert_eq!(text, fallback_response(&context()));
    }

    #[test]
    fn endpoint_joins_base_url() {
        let config = GuardConfig {
            base_url: Url::parse("https://api.example.com/v1/").unwrap(),
            ..GuardConfig::default()
        };
        let client = CompletionClient::new(&config, "k".to_string()).unwrap();
        assert_eq!(client.endpoint(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = GuardConfig {
            api_key: Some("sk-very-secret".to_string()),
            ..GuardConfig::default()
        };
        assert!(!format!("{config:?}").contains("sk-very-secret"));
    }
}
