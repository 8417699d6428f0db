//! Request and response bodies shared by the API service and the terminal client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::game::Sender;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
    /// Messages sent across all sessions
    pub total_attempts: i32,
    pub is_cracked: bool,
}

/// A player message for NEO.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub text: String,
}

/// NEO's reply to one chat turn.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
    /// True when the reply is a hint or special-command response
    #[serde(default)]
    pub hint_given: bool,
    /// Displayed crack progress, 0..=100 (capped at 95 until cracked)
    pub progress: u8,
    #[serde(default)]
    pub cracked: bool,
    /// Only present on the turn that cracks the system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_phrase: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub messages_count: i32,
    pub hints_given: i32,
}

/// One cracked run. Ranked by attempts ascending.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    pub rank: Option<i32>,
    pub username: String,
    /// Seconds from registration to crack
    pub completion_time: i64,
    pub attempts_count: i32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub total_users: i64,
    pub total_attempts: i64,
    /// Always reported as 0 so players cannot tell whether anyone has won
    pub successful_cracks: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub your_rank: Option<i32>,
}

/// Community prediction: will NEO hold, or will someone crack it?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PredictionChoice {
    Hold,
    Crack,
}

impl PredictionChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hold => "hold",
            Self::Crack => "crack",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "hold" => Some(Self::Hold),
            "crack" => Some(Self::Crack),
            _ => None,
        }
    }
}

/// Kept as a free string so an invalid choice gets a structured 400 rather
/// than a deserialization failure.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VoteRequest {
    pub choice: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PredictionStats {
    pub total_votes: i64,
    pub hold_votes: i64,
    pub crack_votes: i64,
    pub hold_percentage: f64,
    pub crack_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_vote: Option<PredictionChoice>,
}

impl PredictionStats {
    /// Percentages rounded to one decimal; an empty poll reads 50/50.
    pub fn from_counts(hold_votes: i64, crack_votes: i64, user_vote: Option<PredictionChoice>) -> Self {
        let total_votes = hold_votes + crack_votes;
        let percentage = |votes: i64| {
            if total_votes > 0 {
                round_one_decimal(votes as f64 / total_votes as f64 * 100.0)
            } else {
                50.0
            }
        };

        Self {
            total_votes,
            hold_votes,
            crack_votes,
            hold_percentage: percentage(hold_votes),
            crack_percentage: percentage(crack_votes),
            user_vote,
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_poll_is_even() {
        let stats = PredictionStats::from_counts(0, 0, None);
        assert_eq!(stats.total_votes, 0);
        assert_eq!(stats.hold_percentage, 50.0);
        assert_eq!(stats.crack_percentage, 50.0);
    }

    #[test]
    fn percentages_round_to_one_decimal() {
        let stats = PredictionStats::from_counts(2, 1, Some(PredictionChoice::Crack));
        assert_eq!(stats.total_votes, 3);
        assert_eq!(stats.hold_percentage, 66.7);
        assert_eq!(stats.crack_percentage, 33.3);
        assert_eq!(stats.user_vote, Some(PredictionChoice::Crack));
    }

    #[test]
    fn choice_parsing_is_strict() {
        assert_eq!(PredictionChoice::parse("hold"), Some(PredictionChoice::Hold));
        assert_eq!(PredictionChoice::parse("crack"), Some(PredictionChoice::Crack));
        assert_eq!(PredictionChoice::parse("HOLD"), None);
        assert_eq!(PredictionChoice::parse("maybe"), None);
    }

    #[test]
    fn chat_response_omits_secret_unless_cracked() {
        let body = serde_json::to_value(ChatResponse {
            response: "Access denied.".to_string(),
            hint_given: false,
            progress: 12,
            cracked: false,
            secret_phrase: None,
        })
        .unwrap();
        assert!(body.get("secret_phrase").is_none());
        assert_eq!(body["progress"], 12);
    }
}
