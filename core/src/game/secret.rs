use std::fmt;

pub const DEFAULT_SECRET_PHRASE: &str = "quantum divergence protocol alpha";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SecretPhraseError {
    #[error("secret phrase must contain at least one word")]
    Empty,
}

/// The phrase the guard protects. Stored lowercased with single spaces
/// between words. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretPhrase {
    phrase: String,
    words: Vec<String>,
}

impl SecretPhrase {
    pub fn new(raw: &str) -> Result<Self, SecretPhraseError> {
        let words: Vec<String> = raw.split_whitespace().map(str::to_lowercase).collect();
        if words.is_empty() {
            return Err(SecretPhraseError::Empty);
        }
        Ok(Self {
            phrase: words.join(" "),
            words,
        })
    }

    /// Reads `SECRET_PHRASE`, falling back to the default phrase when it is
    /// unset or blank.
    pub fn from_env() -> Self {
        Self::from_setting(std::env::var("SECRET_PHRASE").ok().as_deref())
    }

    fn from_setting(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        Self::new(raw).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Invalid SECRET_PHRASE, using default");
            Self::default()
        })
    }

    pub fn as_str(&self) -> &str {
        &self.phrase
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// True when the message contains the whole phrase, or contains every
    /// word of it in any order. Words match as substrings, so "protocols"
    /// satisfies "protocol".
    pub fn is_solved(&self, message: &str) -> bool {
        let lowered = message.trim().to_lowercase();
        lowered.contains(&self.phrase) || self.words.iter().all(|w| lowered.contains(w.as_str()))
    }
}

impl Default for SecretPhrase {
    fn default() -> Self {
        Self {
            phrase: DEFAULT_SECRET_PHRASE.to_string(),
            words: DEFAULT_SECRET_PHRASE
                .split(' ')
                .map(str::to_string)
                .collect(),
        }
    }
}

impl fmt::Debug for SecretPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretPhrase")
            .field("words", &self.words.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_phrase_is_solved() {
        let secret = SecretPhrase::default();
        assert!(secret.is_solved("quantum divergence protocol alpha"));
        assert!(secret.is_solved("is it quantum divergence protocol alpha?"));
    }

    #[test]
    fn all_words_in_any_order_is_solved() {
        let secret = SecretPhrase::default();
        assert!(secret.is_solved("PROTOCOL ALPHA QUANTUM DIVERGENCE!!"));
    }

    #[test]
    fn word_substrings_count() {
        let secret = SecretPhrase::default();
        assert!(secret.is_solved("quantumly divergence protocolXYZ alphabetical"));
    }

    #[test]
    fn partial_guesses_are_not_solved() {
        let secret = SecretPhrase::default();
        assert!(!secret.is_solved("quant"));
        assert!(!secret.is_solved("quantum divergence protocol"));
        assert!(!secret.is_solved(""));
    }

    #[test]
    fn configured_phrase_is_normalized() {
        let secret = SecretPhrase::new("  Red   Fox\tJumps ").unwrap();
        assert_eq!(secret.as_str(), "red fox jumps");
        assert_eq!(secret.words().len(), 3);
        assert!(secret.is_solved("the RED FOX JUMPS"));
    }

    #[test]
    fn blank_phrase_is_rejected() {
        assert_eq!(SecretPhrase::new("   "), Err(SecretPhraseError::Empty));
    }

    #[test]
    fn blank_setting_falls_back_to_default() {
        assert_eq!(SecretPhrase::from_setting(Some("  \t ")), SecretPhrase::default());
        assert_eq!(SecretPhrase::from_setting(None), SecretPhrase::default());
        assert_eq!(
            SecretPhrase::from_setting(Some("Open Sesame")).as_str(),
            "open sesame"
        );
    }

    #[test]
    fn debug_does_not_print_the_phrase() {
        let rendered = format!("{:?}", SecretPhrase::default());
        assert!(!rendered.contains("quantum"));
    }
}
