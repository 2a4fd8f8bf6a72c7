//! Public names of the internal statistical signals.
//!
//! Signal codenames are internal and must never reach the model or the user.
//! Every piece of text built from store documents goes through this table.
use lazy_static::lazy_static;
use regex::{Captures, Regex};

const SIGNAL_LABELS: &[(&str, &str)] = &[
    ("elo_gap", "Strength index"),
    ("xg_trend", "Attack trend"),
    ("xga_trend", "Defence trend"),
    ("form_weighted", "Recent form"),
    ("home_edge", "Venue factor"),
    ("h2h_bias", "Head-to-head"),
    ("market_drift", "Market movement"),
    ("fatigue_idx", "Freshness"),
    ("goal_pressure", "Goal threat"),
];

const UNKNOWN_SIGNAL_LABEL: &str = "Other indicator";

lazy_static! {
    static ref CODENAMES: Regex = {
        let alternatives: Vec<String> = SIGNAL_LABELS
            .iter()
            .map(|(code, _)| regex::escape(code))
            .collect();
        Regex::new(&format!(r"(?i)\b({})\b", alternatives.join("|"))).unwrap()
    };
}

/// Public label of a signal codename
pub fn public_label(code: &str) -> &'static str {
    SIGNAL_LABELS
        .iter()
        .find(|(internal, _)| internal.eq_ignore_ascii_case(code.trim()))
        .map(|(_, label)| *label)
        .unwrap_or(UNKNOWN_SIGNAL_LABEL)
}

/// Replace any codename appearing in free text with its public label
pub fn redact_codenames(text: &str) -> String {
    CODENAMES
        .replace_all(text, |caps: &Captures| public_label(&caps[1]).to_string())
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_label() {
        assert_eq!(public_label("elo_gap"), "Strength index");
        assert_eq!(public_label("XG_TREND"), "Attack trend");
        assert_eq!(public_label("secret_sauce_v2"), "Other indicator");
    }

    #[test]
    fn test_redact_codenames() {
        let text = "elo_gap strongly favours the hosts, market_drift is flat";
        assert_eq!(
            redact_codenames(text),
            "Strength index strongly favours the hosts, Market movement is flat"
        );
        assert_eq!(redact_codenames("nothing to hide"), "nothing to hide");
    }
}
