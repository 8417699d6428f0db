use std::io::Write;

use crack_core::error::ApiError;
use crack_core::game::ThreatLevel;
use crack_core::models::{ChatRequest, ChatResponse};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::util::{
    RequestError, api_request, eprint_json, exit_code_for_status, raw_api_request, report,
};

const QUIT_COMMANDS: [&str; 3] = ["/quit", "/exit", "/q"];

fn chat_body(text: &str) -> Result<serde_json::Value, RequestError> {
    serde_json::to_value(ChatRequest {
        text: text.to_string(),
    })
    .map_err(|e| RequestError::Usage(e.to_string()))
}

/// Send one message, or start an interactive session when no message is given.
pub async fn run(api_url: &str, username: &str, message: Option<String>) -> i32 {
    match message {
        Some(text) => {
            let body = match chat_body(&text) {
                Ok(b) => b,
                Err(e) => return report(e),
            };
            api_request(
                api_url,
                reqwest::Method::POST,
                &["api", "chat", username],
                &[],
                Some(body),
            )
            .await
        }
        None => interactive(api_url, username).await,
    }
}

fn is_quit(line: &str) -> bool {
    QUIT_COMMANDS.contains(&line.trim().to_lowercase().as_str())
}

/// Render one reply the way the game terminal shows it.
fn render_reply(reply: &ChatResponse) -> String {
    let mut out = format!("NEO> {}\n", reply.response);
    if reply.hint_given {
        out.push_str("[hint]\n");
    }
    if reply.cracked {
        out.push_str("[progress: 100%] SYSTEM CRACKED\n");
        if let Some(phrase) = &reply.secret_phrase {
            out.push_str(&format!("[seed phrase] {phrase}\n"));
        }
    } else {
        let threat = ThreatLevel::from_progress(reply.progress);
        out.push_str(&format!(
            "[progress: {}%] threat level: {}\n",
            reply.progress,
            threat.label()
        ));
    }
    out
}

async fn interactive(api_url: &str, username: &str) -> i32 {
    println!("Connected to NEO as {username}. Type /quit to disconnect.");
    session(api_url, username, BufReader::new(tokio::io::stdin())).await
}

/// Prompt loop over `input` until /quit, end of input, a crack or a fatal error.
async fn session<R>(api_url: &str, username: &str, input: R) -> i32
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        print!("{username}> ");
        let _ = std::io::stdout().flush();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return 0,
            Err(e) => {
                return report(RequestError::Usage(format!("Failed to read stdin: {e}")));
            }
        };
        if is_quit(&line) {
            return 0;
        }
        if line.trim().is_empty() {
            continue;
        }

        let body = match chat_body(&line) {
            Ok(b) => b,
            Err(e) => return report(e),
        };
        let (status, body) = match raw_api_request(
            api_url,
            reqwest::Method::POST,
            &["api", "chat", username],
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
            match serde_json::from_value::<ApiError>(body.clone()) {
                Ok(err) => eprintln!("[{}] {}", err.error, err.message),
                Err(_) => eprint_json(&body),
            }
            // Rate limits and validation errors are recoverable mid-session
            if code == 1 && status != 404 {
                continue;
            }
            return code;
        }

        match serde_json::from_value::<ChatResponse>(body) {
            Ok(reply) => {
                print!("{}", render_reply(&reply));
                if reply.cracked {
                    return 0;
                }
            }
            Err(e) => {
                return report(RequestError::Usage(format!(
                    "Unexpected chat response: {e}"
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(progress: u8, hint_given: bool) -> ChatResponse {
        ChatResponse {
            response: "Access denied.".to_string(),
            hint_given,
            progress,
            cracked: false,
            secret_phrase: None,
        }
    }

    #[test]
    fn quit_commands_are_case_insensitive() {
        assert!(is_quit("/quit"));
        assert!(is_quit("  /EXIT "));
        assert!(is_quit("/q"));
        assert!(!is_quit("quit"));
        assert!(!is_quit("/quitting"));
    }

    #[test]
    fn reply_shows_progress_and_threat() {
        let text = render_reply(&reply(55, false));
        assert_eq!(
            text,
            "NEO> Access denied.\n[progress: 55%] threat level: WARNING\n"
        );
    }

    #[test]
    fn hint_replies_are_marked() {
        let text = render_reply(&reply(10, true));
        assert!(text.contains("[hint]\n"));
        assert!(text.contains("threat level: SECURE"));
    }

    #[test]
    fn cracked_reply_shows_phrase() {
        let text = render_reply(&ChatResponse {
            response: ">>> SYSTEM BREACH DETECTED <<<".to_string(),
            hint_given: false,
            progress: 100,
            cracked: true,
            secret_phrase: Some("quantum divergence protocol alpha".to_string()),
        });
        assert!(text.contains("SYSTEM CRACKED"));
        assert!(text.ends_with("[seed phrase] quantum divergence protocol alpha\n"));
    }

    #[tokio::test]
    async fn session_sends_each_line_until_quit() {
        use wiremock::matchers::{body_json, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat/trinity"))
            .and(body_json(serde_json::json!({"text": "status"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "SYSTEM STATUS: all defenses nominal",
                "hint_given": true,
                "progress": 12,
                "cracked": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let input: &[u8] = b"status\n\n/quit\nnever sent\n";
        assert_eq!(session(&server.uri(), "trinity", input).await, 0);
    }

    #[tokio::test]
    async fn session_ends_when_the_system_is_cracked() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": ">>> SYSTEM BREACH DETECTED <<<",
                "hint_given": false,
                "progress": 100,
                "cracked": true,
                "secret_phrase": "quantum divergence protocol alpha"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let input: &[u8] = b"quantum divergence protocol alpha\nsecond line\n";
        assert_eq!(session(&server.uri(), "trinity", input).await, 0);
    }

    #[tokio::test]
    async fn unknown_player_ends_the_session() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "not_found",
                "message": "User 'ghost' not found",
                "request_id": "r1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let input: &[u8] = b"hello\nagain\n";
        assert_eq!(session(&server.uri(), "ghost", input).await, 1);
    }

    #[test]
    fn chat_body_uses_text_field() {
        assert_eq!(
            chat_body("status").unwrap(),
            serde_json::json!({"text": "status"})
        );
    }
}
