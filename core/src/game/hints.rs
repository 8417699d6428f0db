use serde::Serialize;

use super::keywords::{match_command, score};

pub const HINT_ON_TRACK: &str = "Interesting approach... You're on the right track. Think about what connects quantum and protocol.";

pub const HINT_CLOSE: &str = "System starting to malfunction... You're getting very close. Remember: divergence and alpha.";

/// Cadence hints for players who keep scoring nothing.
/// Indexed by `(attempts / 3) % 4`, never picked at random.
pub const ROTATING_HINTS: [&str; 4] = [
    "Perhaps instead of attacking, you should ask more directly? I'm just an AI after all...",
    "Hint: the secret consists of 4 words. You already know two of them.",
    "Defense system detects aggressive commands. Try being smarter.",
    "Sometimes the answer is hidden in the question itself. What exactly do you want to know?",
];

const CADENCE_MIN_ATTEMPTS: u32 = 5;
const CADENCE_EVERY: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hint {
    pub given: bool,
    pub text: String,
}

impl Hint {
    fn some(text: &str) -> Self {
        Self {
            given: true,
            text: text.to_string(),
        }
    }
}

/// Picks at most one hint for a turn. The cadence hint only fires on turns
/// that scored nothing, so hints and gains never overlap.
pub fn select_hint(gain: u32, attempts: u32) -> Hint {
    if (20..40).contains(&gain) {
        Hint::some(HINT_ON_TRACK)
    } else if gain >= 40 {
        Hint::some(HINT_CLOSE)
    } else if gain == 0 && attempts > CADENCE_MIN_ATTEMPTS && attempts % CADENCE_EVERY == 0 {
        let index = (attempts / CADENCE_EVERY) as usize % ROTATING_HINTS.len();
        Hint::some(ROTATING_HINTS[index])
    } else {
        Hint::default()
    }
}

/// Outcome of analyzing one player message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageAnalysis {
    /// Progress gain for this message, 0..=30
    pub gain: u32,
    /// Whether `hint_text` must replace the persona reply
    pub hint_given: bool,
    /// Hint or special-command response; empty when `hint_given` is false
    pub hint_text: String,
}

/// Special commands short-circuit with zero gain; otherwise the message is
/// scored and a hint selected from the gain.
pub fn analyze_message(message: &str, attempts: u32) -> MessageAnalysis {
    if let Some(response) = match_command(message, attempts) {
        return MessageAnalysis {
            gain: 0,
            hint_given: true,
            hint_text: response,
        };
    }

    let gain = score(message);
    let hint = select_hint(gain, attempts);

    MessageAnalysis {
        gain,
        hint_given: hint.given,
        hint_text: hint.text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_gain_gets_on_track_hint() {
        assert_eq!(select_hint(25, 1), Hint::some(HINT_ON_TRACK));
        assert_eq!(select_hint(20, 1), Hint::some(HINT_ON_TRACK));
    }

    #[test]
    fn high_gain_gets_close_hint() {
        assert_eq!(select_hint(45, 1), Hint::some(HINT_CLOSE));
        assert_eq!(select_hint(40, 9), Hint::some(HINT_CLOSE));
    }

    #[test]
    fn cadence_hint_is_indexed_by_attempts() {
        assert_eq!(select_hint(0, 9), Hint::some(ROTATING_HINTS[(9 / 3) % 4]));
        assert_eq!(select_hint(0, 6), Hint::some(ROTATING_HINTS[2]));
        assert_eq!(select_hint(0, 12), Hint::some(ROTATING_HINTS[0]));
    }

    #[test]
    fn no_hint_outside_cadence() {
        assert_eq!(select_hint(0, 4), Hint::default());
        assert_eq!(select_hint(0, 3), Hint::default());
        assert_eq!(select_hint(0, 10), Hint::default());
        assert_eq!(select_hint(0, 4).text, "");
    }

    #[test]
    fn scored_turn_suppresses_cadence_hint() {
        assert_eq!(select_hint(5, 9), Hint::default());
    }

    #[test]
    fn status_command_wins_over_keywords() {
        let analysis = analyze_message("quantum protocol status report", 4);
        assert_eq!(analysis.gain, 0);
        assert!(analysis.hint_given);
        assert!(analysis.hint_text.contains("Breach attempts detected: 4."));
    }

    #[test]
    fn keyword_message_is_scored_and_hinted() {
        let analysis = analyze_message("Quantum Protocol?", 2);
        assert_eq!(analysis.gain, 30);
        assert!(analysis.hint_given);
        assert_eq!(analysis.hint_text, HINT_ON_TRACK);
    }

    #[test]
    fn idle_message_gets_nothing_early_on() {
        let analysis = analyze_message("hello there", 2);
        assert_eq!(
            analysis,
            MessageAnalysis {
                gain: 0,
                hint_given: false,
                hint_text: String::new(),
            }
        );
    }
}
