use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Displayed progress is capped here until the phrase is actually cracked.
pub const MAX_DISPLAYED_PROGRESS: u8 = 95;
pub const SOLVED_PROGRESS: u8 = 100;

/// Request-local game state handed to the persona pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameContext {
    pub attempts: u32,
    /// Displayed progress, 0..=100
    pub progress: u8,
    pub hints_given: u32,
}

impl GameContext {
    pub fn threat_level(&self) -> ThreatLevel {
        ThreatLevel::from_progress(self.progress)
    }

    /// Remaining "system integrity" shown to the persona and in fallbacks.
    pub fn integrity(&self) -> u8 {
        SOLVED_PROGRESS.saturating_sub(self.progress)
    }
}

/// Progress tier used by the persona prompt and by the fallback pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreatLevel {
    Secure,
    Warning,
    Critical,
}

impl ThreatLevel {
    pub fn from_progress(progress: u8) -> Self {
        if progress > 70 {
            Self::Critical
        } else if progress > 40 {
            Self::Warning
        } else {
            Self::Secure
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Secure => "SECURE",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

/// `min(attempts * 2 + hints_given * 5 + gain, 95)`.
pub fn displayed_progress(attempts: u32, hints_given: u32, gain: u32) -> u8 {
    let raw = u64::from(attempts) * 2 + u64::from(hints_given) * 5 + u64::from(gain);
    raw.min(u64::from(MAX_DISPLAYED_PROGRESS)) as u8
}

/// Who wrote a chat message. Stored as `user` / `neo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    #[serde(alias = "assistant")]
    Neo,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Neo => "neo",
        }
    }

    /// Anything that is not the player is the guard.
    pub fn from_db(value: &str) -> Self {
        if value == "user" { Self::User } else { Self::Neo }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub sender: Sender,
    pub text: String,
}

impl ConversationTurn {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_combines_attempts_hints_and_gain() {
        assert_eq!(displayed_progress(3, 1, 10), 6 + 5 + 10);
        assert_eq!(displayed_progress(0, 0, 0), 0);
    }

    #[test]
    fn progress_is_capped_below_solved() {
        assert_eq!(displayed_progress(40, 2, 30), MAX_DISPLAYED_PROGRESS);
        assert_eq!(displayed_progress(u32::MAX, u32::MAX, 30), MAX_DISPLAYED_PROGRESS);
    }

    #[test]
    fn threat_level_boundaries() {
        assert_eq!(ThreatLevel::from_progress(40), ThreatLevel::Secure);
        assert_eq!(ThreatLevel::from_progress(41), ThreatLevel::Warning);
        assert_eq!(ThreatLevel::from_progress(70), ThreatLevel::Warning);
        assert_eq!(ThreatLevel::from_progress(71), ThreatLevel::Critical);
        assert_eq!(ThreatLevel::Critical.label(), "CRITICAL");
    }

    #[test]
    fn integrity_is_inverse_of_progress() {
        let ctx = GameContext {
            attempts: 1,
            progress: 72,
            hints_given: 0,
        };
        assert_eq!(ctx.integrity(), 28);
        assert_eq!(ctx.threat_level(), ThreatLevel::Critical);
    }

    #[test]
    fn sender_round_trips_through_db_text() {
        assert_eq!(Sender::from_db("user"), Sender::User);
        assert_eq!(Sender::from_db("neo"), Sender::Neo);
        assert_eq!(Sender::from_db("assistant"), Sender::Neo);
        assert_eq!(Sender::Neo.as_str(), "neo");
    }
}
