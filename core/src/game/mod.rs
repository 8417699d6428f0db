//! Progress heuristics for a single chat turn.
//!
//! Everything here is a pure function over static tables: safe to call from
//! any number of concurrent requests without coordination.

mod context;
mod hints;
mod keywords;
mod secret;

pub use context::{
    ConversationTurn, GameContext, MAX_DISPLAYED_PROGRESS, SOLVED_PROGRESS, Sender, ThreatLevel,
    displayed_progress,
};
pub use hints::{
    HINT_CLOSE, HINT_ON_TRACK, Hint, MessageAnalysis, ROTATING_HINTS, analyze_message,
    select_hint,
};
pub use keywords::{MAX_GAIN_PER_MESSAGE, SCORE_KEYWORDS, SPECIAL_COMMANDS, match_command, score};
pub use secret::{DEFAULT_SECRET_PHRASE, SecretPhrase, SecretPhraseError};
