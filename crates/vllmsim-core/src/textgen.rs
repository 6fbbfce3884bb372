//! Response-text synthesis for echo and random modes.
//!
//! Generated text is always rebuilt from its whitespace tokens, so the
//! non-streaming body and the reassembled stream deltas are identical for
//! the same request.

use crate::tokenizer::tokenize;
use rand::Rng;

/// Finish reason when generation ran to natural completion.
pub const FINISH_STOP: &str = "stop";
/// Finish reason when generation was cut at the completion cap.
pub const FINISH_LENGTH: &str = "length";

/// Preset bank the random mode draws from. Tests can verify an output is
/// plausible with [`is_valid_text`].
const PASSAGES: &[&str] = &[
    "Today it is partially cloudy and raining.",
    "I am a language model and I like to write code.",
    "The capital of France is Paris and it is known for the Eiffel Tower.",
    "Deep learning models require large amounts of training data to perform well.",
    "Once upon a time there was a small village near a great forest.",
    "The quick brown fox jumps over the lazy dog while the cat watches.",
    "Inference servers batch requests to make better use of accelerator memory.",
    "A good cup of coffee in the morning makes everything a little easier.",
];

/// Echo-mode synthesis: reflect `source`, truncated to `max_tokens`.
pub fn echo_text(max_tokens: usize, source: &str) -> (String, &'static str) {
    clip(max_tokens, source)
}

/// Random-mode synthesis: a preset passage, truncated to `max_tokens`.
pub fn random_text(max_tokens: usize) -> (String, &'static str) {
    let passage = PASSAGES[rand::thread_rng().gen_range(0..PASSAGES.len())];
    clip(max_tokens, passage)
}

/// Whether `text` is a possible random-mode output, i.e. a token prefix of
/// one of the preset passages.
pub fn is_valid_text(text: &str) -> bool {
    let tokens = tokenize(text);
    PASSAGES.iter().any(|passage| {
        let passage_tokens = tokenize(passage);
        tokens.len() <= passage_tokens.len() && tokens == passage_tokens[..tokens.len()]
    })
}

fn clip(max_tokens: usize, text: &str) -> (String, &'static str) {
    let tokens = tokenize(text);
    if tokens.len() <= max_tokens {
        (tokens.join(" "), FINISH_STOP)
    } else {
        (tokens[..max_tokens].join(" "), FINISH_LENGTH)
    }
}
