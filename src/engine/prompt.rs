// Prompt assembly

use crate::config::PromptConfig;

/// True when the prompt holds only ASCII letters and whitespace.
///
/// Anything else (digits, punctuation, CJK, accents) is sent through the
/// translator first.
pub fn is_english(prompt: &str) -> bool {
    prompt
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
}

/// Join the configured phrases around the sanitized subject
pub fn build_full_prompt(config: &PromptConfig, subject: &str) -> String {
    config
        .prefix
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(subject.trim()))
        .chain(config.suffix.iter().map(String::as_str))
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prompt for one tile, tagged with its position so the model draws a panel
pub fn segment_prompt(base: &str, index: usize, count: usize) -> String {
    format!(
        "{}, segment {} of {}, extended view for panorama",
        base,
        index + 1,
        count
    )
}
