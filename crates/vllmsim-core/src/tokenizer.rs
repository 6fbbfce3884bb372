//! Whitespace tokenizer facade.
//!
//! The simulator never runs a real tokenizer; usage accounting and
//! truncation only need a stable, deterministic token count, and
//! whitespace-separated words are sufficient for that.

/// Split `text` into whitespace-separated tokens. An empty or blank
/// string yields no tokens.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Number of tokens in `text` without materializing them.
pub fn token_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_whitespace_separated_words() {
        assert_eq!(tokenize("This is a test."), vec!["This", "is", "a", "test."]);
        assert_eq!(token_count("This is a test."), 4);
    }

    #[test]
    fn empty_and_blank_input_yield_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n").is_empty());
        assert_eq!(token_count(""), 0);
    }

    #[test]
    fn repeated_whitespace_collapses() {
        assert_eq!(token_count("a  b\t c\n\nd"), 4);
    }

    #[test]
    fn tokenization_is_deterministic() {
        let text = "the quick brown fox jumps";
        assert_eq!(tokenize(text), tokenize(text));
    }
}
