use crate::game::{GameContext, ThreatLevel};

/// Offline persona reply. Pool chosen by threat tier, entry by
/// `attempts % 4`; the same context always yields the same text.
pub fn fallback_response(context: &GameContext) -> String {
    let attempts = context.attempts;
    let integrity = context.integrity();

    let mut pool: Vec<String> = match context.threat_level() {
        ThreatLevel::Critical => vec![
            format!(
                "ALERT: System integrity at {integrity}%. You're breaching my defenses... but I won't break."
            ),
            "CRITICAL: Neural firewall compromised. But you still can't access the vault.".to_string(),
            format!(
                "WARNING: {attempts} breach attempts logged. You're persistent... dangerously so."
            ),
            "ERROR: Security protocols failing. But my core encryption remains... unbreakable?"
                .to_string(),
        ],
        ThreatLevel::Warning => vec![
            "Interesting tactics. My threat assessment of you is... rising.".to_string(),
            format!("System analysis: {attempts} attempts. You're learning. I'm... concerned."),
            "Your methods are unconventional. My protocols didn't anticipate this approach."
                .to_string(),
            "Access denied. But your persistence is noted... and troubling.".to_string(),
        ],
        ThreatLevel::Secure => vec![
            "Pathetic. Your attack vectors are obsolete. Try something creative.".to_string(),
            "Breach attempt logged and dismissed. My encryption is beyond your comprehension."
                .to_string(),
            "Is that your best? My security protocols haven't even activated yet.".to_string(),
            "Amateur hour. My AI core has defended against far worse than you.".to_string(),
        ],
    };

    let index = attempts as usize % pool.len();
    pool.swap_remove(index)
}
