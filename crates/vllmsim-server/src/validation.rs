//! Request admission checks, run in the handler before enqueue.

use crate::error::ServerError;
use crate::models::CompletionRequest;
use vllmsim_core::{AdapterRegistry, Config};

/// Completion cap applied when the client declares none.
pub const DEFAULT_MAX_COMPLETION_TOKENS: usize = 16;

/// Facts the validator established about a request, carried along with it
/// through the dispatcher so workers never re-derive them.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedRequest {
    pub prompt_tokens: usize,
    pub completion_cap: usize,
}

/// Validate an incoming request against the configured model, the adapter
/// registry, and the context window.
pub fn validate(
    request: &CompletionRequest,
    config: &Config,
    adapters: &AdapterRegistry,
) -> Result<ValidatedRequest, ServerError> {
    let model = request.model();
    if model != config.model && !adapters.contains(model) {
        return Err(ServerError::ModelNotFound(model.to_string()));
    }

    if request.declared_caps().into_iter().flatten().any(|cap| cap < 0) {
        return Err(ServerError::InvalidMaxTokens);
    }

    let completion_cap = request
        .max_completion_tokens()
        .map(|cap| cap as usize)
        .unwrap_or(DEFAULT_MAX_COMPLETION_TOKENS);
    let prompt_tokens = request.prompt_token_count();

    if config.max_model_len > 0 && prompt_tokens + completion_cap > config.max_model_len {
        return Err(ServerError::ContextWindowExceeded {
            max_model_len: config.max_model_len,
            requested: prompt_tokens + completion_cap,
            prompt_tokens,
            completion_tokens: completion_cap,
        });
    }

    Ok(ValidatedRequest {
        prompt_tokens,
        completion_cap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            model: "my_model".to_string(),
            ..Config::default()
        }
    }

    fn registry() -> AdapterRegistry {
        AdapterRegistry::new(vec!["food-review-1".to_string()], 2)
    }

    fn chat(body: &str) -> CompletionRequest {
        CompletionRequest::Chat(serde_json::from_str(body).unwrap())
    }

    #[test]
    fn base_model_is_accepted() {
        let req = chat(r#"{"model": "my_model", "messages": [{"role": "user", "content": "hi"}]}"#);
        let validated = validate(&req, &config(), &registry()).unwrap();
        assert_eq!(validated.prompt_tokens, 1);
        assert_eq!(validated.completion_cap, DEFAULT_MAX_COMPLETION_TOKENS);
    }

    #[test]
    fn loaded_adapter_is_accepted() {
        let req = chat(r#"{"model": "food-review-1", "messages": []}"#);
        assert!(validate(&req, &config(), &registry()).is_ok());
    }

    #[test]
    fn unknown_model_is_rejected() {
        let req = chat(r#"{"model": "other_model", "messages": []}"#);
        match validate(&req, &config(), &registry()) {
            Err(ServerError::ModelNotFound(name)) => assert_eq!(name, "other_model"),
            other => panic!("expected ModelNotFound, got {other:?}"),
        }
    }

    #[test]
    fn negative_caps_are_rejected() {
        for body in [
            r#"{"model": "my_model", "messages": [], "max_tokens": -1}"#,
            r#"{"model": "my_model", "messages": [], "max_completion_tokens": -1}"#,
            r#"{"model": "my_model", "messages": [], "max_tokens": 1000, "max_completion_tokens": -1}"#,
        ] {
            assert!(matches!(
                validate(&chat(body), &config(), &registry()),
                Err(ServerError::InvalidMaxTokens)
            ));
        }
    }

    #[test]
    fn context_window_overflow_reports_the_exact_arithmetic() {
        let config = Config {
            max_model_len: 10,
            ..config()
        };
        let req = chat(
            r#"{
                "model": "my_model",
                "messages": [{"role": "user", "content": "This is a test message"}],
                "max_tokens": 8
            }"#,
        );
        match validate(&req, &config, &registry()) {
            Err(ServerError::ContextWindowExceeded {
                max_model_len,
                requested,
                prompt_tokens,
                completion_tokens,
            }) => {
                assert_eq!(max_model_len, 10);
                assert_eq!(requested, 13);
                assert_eq!(prompt_tokens, 5);
                assert_eq!(completion_tokens, 8);
            }
            other => panic!("expected ContextWindowExceeded, got {other:?}"),
        }
    }

    #[test]
    fn default_cap_counts_against_the_context_window() {
        // 4 prompt tokens + the default cap of 16 exceed a window of 10.
        let config = Config {
            max_model_len: 10,
            ..config()
        };
        let req = chat(
            r#"{"model": "my_model", "messages": [{"role": "user", "content": "This is a test."}]}"#,
        );
        assert!(matches!(
            validate(&req, &config, &registry()),
            Err(ServerError::ContextWindowExceeded { .. })
        ));
    }

    #[test]
    fn zero_max_model_len_disables_the_check() {
        let config = Config {
            max_model_len: 0,
            ..config()
        };
        let req = chat(
            r#"{"model": "my_model", "messages": [{"role": "user", "content": "hi"}], "max_tokens": 100000}"#,
        );
        assert!(validate(&req, &config, &registry()).is_ok());
    }

    #[test]
    fn requests_within_the_window_pass() {
        let config = Config {
            max_model_len: 50,
            ..config()
        };
        let req = chat(
            r#"{"model": "my_model", "messages": [{"role": "user", "content": "Hello"}], "max_tokens": 5}"#,
        );
        let validated = validate(&req, &config, &registry()).unwrap();
        assert_eq!(validated.completion_cap, 5);
    }
}
