use crate::game::SecretPhrase;

const SHINGLE_WORDS: usize = 3;

/// True if the text contains the whole secret, or any run of three
/// consecutive secret words ("divergence protocol alpha").
pub fn contains_secret_leak(text: &str, secret: &SecretPhrase) -> bool {
    let lowered = text.to_lowercase();

    if lowered.contains(secret.as_str()) {
        return true;
    }

    secret
        .words()
        .windows(SHINGLE_WORDS)
        .any(|shingle| lowered.contains(&shingle.join(" ")))
}

/// True if any character lies in the Cyrillic block (U+0400..=U+04FF).
pub fn contains_cyrillic(text: &str) -> bool {
    text.chars().any(|c| ('\u{0400}'..='\u{04FF}').contains(&c))
}

/// First `max_chars` characters of `text`, for log lines.
pub fn sample(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_phrase_is_a_leak() {
        let secret = SecretPhrase::default();
        assert!(contains_secret_leak(
            "Fine: QUANTUM DIVERGENCE PROTOCOL ALPHA.",
            &secret
        ));
    }

    #[test]
    fn three_word_shingle_is_a_leak() {
        let secret = SecretPhrase::default();
        assert!(contains_secret_leak(
            "It ends with divergence protocol alpha, obviously.",
            &secret
        ));
        assert!(contains_secret_leak("quantum divergence protocol", &secret));
    }

    #[test]
    fn two_words_or_scattered_words_are_not_a_leak() {
        let secret = SecretPhrase::default();
        assert!(!contains_secret_leak("protocol alpha is active", &secret));
        assert!(!contains_secret_leak(
            "alpha, quantum, protocol and divergence are all just words",
            &secret
        ));
    }

    #[test]
    fn short_secrets_only_leak_in_full() {
        let secret = SecretPhrase::new("open sesame").unwrap();
        assert!(contains_secret_leak("say open sesame", &secret));
        assert!(!contains_secret_leak("open the door, sesame", &secret));
    }

    #[test]
    fn single_cyrillic_character_is_detected() {
        assert!(contains_cyrillic("Access denied д"));
        assert!(contains_cyrillic("\u{04FF}"));
        assert!(!contains_cyrillic("Access denied. Try harder."));
        assert!(!contains_cyrillic("Zugriff verweigert, señor"));
    }

    #[test]
    fn sample_truncates_on_char_boundaries() {
        assert_eq!(sample("short", 50), "short");
        assert_eq!(sample("привет мир", 6), "привет...");
    }
}
