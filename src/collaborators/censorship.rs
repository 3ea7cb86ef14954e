// Word-list prompt filter

use super::Censor;
use std::collections::HashSet;

const BLOCKED_WORDS: &[&str] = &[
    "nude", "nudity", "naked", "nsfw", "porn", "porno", "pornographic", "sex", "sexy", "erotic",
    "hentai", "gore", "gory", "bloody", "blood", "decapitated", "dismembered", "corpse", "torture",
    "suicide", "fuck", "shit", "bitch",
];

/// Drops blocked words, matched whole and case-insensitively
#[derive(Debug, Clone)]
pub struct WordListCensor {
    blocked: HashSet<String>,
}

impl WordListCensor {
    pub fn new() -> Self {
        Self {
            blocked: BLOCKED_WORDS.iter().map(|word| word.to_string()).collect(),
        }
    }

    /// Add words on top of the built-in list
    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.blocked.extend(
            words
                .into_iter()
                .map(|word| word.as_ref().trim().to_lowercase())
                .filter(|word| !word.is_empty()),
        );
        self
    }

    fn is_blocked(&self, token: &str) -> bool {
        let bare = token.trim_matches(|c: char| !c.is_alphanumeric());
        !bare.is_empty() && self.blocked.contains(&bare.to_lowercase())
    }
}

impl Default for WordListCensor {
    fn default() -> Self {
        Self::new()
    }
}

impl Censor for WordListCensor {
    fn filter(&self, text: &str) -> String {
        text.split_whitespace()
            .filter(|token| !self.is_blocked(token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_prompt_unchanged_apart_from_spacing() {
        let censor = WordListCensor::new();
        assert_eq!(censor.filter("a quiet  beach at sunset"), "a quiet beach at sunset");
    }

    #[test]
    fn test_blocked_words_removed_case_insensitively() {
        let censor = WordListCensor::new();
        assert_eq!(censor.filter("a NAKED statue, gore"), "a statue,");
    }

    #[test]
    fn test_partial_matches_kept() {
        let censor = WordListCensor::new();
        assert_eq!(censor.filter("bloodhound in sussex"), "bloodhound in sussex");
    }

    #[test]
    fn test_extra_words() {
        let censor = WordListCensor::new().with_words(["Castle"]);
        assert_eq!(censor.filter("castle on a hill"), "on a hill");
    }

    #[test]
    fn test_non_ascii_text_passes_through() {
        let censor = WordListCensor::new();
        assert_eq!(censor.filter("清晨 火星"), "清晨 火星");
    }
}
