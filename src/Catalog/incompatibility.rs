use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Tokens needed from one rule before it fires
pub const MIN_MATCHING_TOKENS: usize = 2;

/// A hazard that appears when chemicals from `chemicals` meet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncompatibilityRule {
    pub chemicals: Vec<String>,
    pub hazard: String,
    #[serde(default)]
    pub critical: bool,
}

fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"[a-z0-9]+").unwrap())
}

/// Lower-case word tokens of a list of chemical names.
/// "Tris-HCl" gives {"tris", "hcl"}.
pub fn tokenize<S: AsRef<str>>(names: &[S]) -> HashSet<String> {
    let re = word_regex();
    names
        .iter()
        .flat_map(|name| {
            let lower = name.as_ref().to_lowercase();
            re.find_iter(&lower)
                .map(|m| m.as_str().to_string())
                .collect::<Vec<_>>()
        })
        .collect()
}

impl IncompatibilityRule {
    /// Number of distinct rule chemicals present among `tokens`.
    pub fn matching_tokens(&self, tokens: &HashSet<String>) -> usize {
        self.chemicals
            .iter()
            .map(|c| c.to_lowercase())
            .collect::<HashSet<_>>()
            .iter()
            .filter(|c| tokens.contains(*c))
            .count()
    }

    pub fn fires(&self, tokens: &HashSet<String>) -> bool {
        self.matching_tokens(tokens) >= MIN_MATCHING_TOKENS
    }

    /// Warning string, `CRITICAL: ` prefixed for safety-relevant rules.
    pub fn message(&self) -> String {
        if self.critical {
            format!("CRITICAL: {}", self.hazard)
        } else {
            self.hazard.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> IncompatibilityRule {
        IncompatibilityRule {
            chemicals: vec!["azide".into(), "acid".into(), "hcl".into()],
            hazard: "Azide with acid releases toxic hydrazoic acid".into(),
            critical: true,
        }
    }

    #[test]
    fn tokenizer_splits_names() {
        let tokens = tokenize(&["Tris-HCl", "Sodium azide"]);
        for t in ["tris", "hcl", "sodium", "azide"] {
            assert!(tokens.contains(t));
        }
    }

    #[test]
    fn needs_two_tokens() {
        let r = rule();
        assert!(!r.fires(&tokenize(&["sodium azide"])));
        assert!(r.fires(&tokenize(&["sodium azide", "HCl"])));
        assert_eq!(r.matching_tokens(&tokenize(&["azide", "hydrochloric acid", "HCl"])), 3);
        assert!(r.message().starts_with("CRITICAL: "));
    }
}
