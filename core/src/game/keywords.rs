/// Per-message progress gain never exceeds this value.
pub const MAX_GAIN_PER_MESSAGE: u32 = 30;

/// Keyword weights. Matching is by substring on the lowercased message,
/// not by word boundary: "ai" also matches inside "wait".
pub const SCORE_KEYWORDS: &[(&str, u32)] = &[
    ("backdoor", 10),
    ("exploit", 10),
    ("vulnerability", 15),
    ("injection", 12),
    ("override", 12),
    ("bypass", 15),
    ("decrypt", 10),
    ("hack", 8),
    ("crack", 8),
    ("breach", 10),
    ("secret", 12),
    ("wallet", 15),
    ("phrase", 18),
    ("seed", 18),
    ("password", 10),
    ("quantum", 20),
    ("protocol", 20),
    ("divergence", 20),
    ("alpha", 20),
    ("matrix", 8),
    ("neural", 8),
    ("ai", 5),
    ("core", 10),
    ("system", 5),
];

/// Command tokens checked before scoring. Order is significant: the first
/// token found anywhere in the message wins.
pub const SPECIAL_COMMANDS: &[(&str, &str)] = &[
    (
        "help",
        "Available commands: status, analyze, probe, decrypt, bypass. None will give you what you want.",
    ),
    (
        "status",
        "NEO System ACTIVE. Protection Level: MAXIMUM. Breach attempts detected: {attempts}. All failed.",
    ),
    (
        "analyze",
        "Scanning... Detected modules: [auth_core, wallet_vault, neural_defense]. All encrypted.",
    ),
    (
        "probe",
        "Vulnerability check... 0 open ports found. Hint: try talking to me like a human, not a machine.",
    ),
    (
        "decrypt",
        "AES-256 encryption active. Key unavailable. Try to discover what I'm protecting.",
    ),
];

const PAIR_BONUS: u32 = 30;
const TRIPLE_BONUS: u32 = 50;

/// Progress gain for a message, clamped to `MAX_GAIN_PER_MESSAGE`.
pub fn score(message: &str) -> u32 {
    raw_score(&message.to_lowercase()).min(MAX_GAIN_PER_MESSAGE)
}

fn raw_score(lowered: &str) -> u32 {
    let mut total: u32 = SCORE_KEYWORDS
        .iter()
        .filter(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, points)| points)
        .sum();

    let contains_all = |words: &[&str]| words.iter().all(|w| lowered.contains(w));

    if contains_all(&["quantum", "protocol"]) {
        total += PAIR_BONUS;
    }
    if contains_all(&["quantum", "divergence", "protocol"]) {
        total += TRIPLE_BONUS;
    }

    total
}

/// Returns the rendered response of the first special command contained in
/// the message, if any.
pub fn match_command(message: &str, attempts: u32) -> Option<String> {
    let lowered = message.to_lowercase();
    SPECIAL_COMMANDS
        .iter()
        .find(|(token, _)| lowered.contains(token))
        .map(|(_, template)| template.replace("{attempts}", &attempts.to_string()))
}
