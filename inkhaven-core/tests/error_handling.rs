use inkhaven_core::{
    ConfigError, CoreError, ErrorExt, ErrorReporter, FeedError, LlmError, StoreError,
};

#[test]
fn test_error_codes() {
    let feed_error = CoreError::Feed(FeedError::MissingChannel);
    assert_eq!(feed_error.error_code(), "FEED");

    let store_error = CoreError::Store(StoreError::Corrupt {
        path: "tagged_posts.json".to_string(),
        details: "expected value".to_string(),
    });
    assert_eq!(store_error.error_code(), "STORE");

    let llm_error = CoreError::Llm(LlmError::InvalidApiKey {
        provider: "anthropic".to_string(),
    });
    assert_eq!(llm_error.error_code(), "LLM");

    let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "ANTHROPIC_API_KEY".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG");

    let validation_error = CoreError::Validation {
        message: "Tag cannot be empty".to_string(),
    };
    assert_eq!(validation_error.error_code(), "VALIDATION");
}

#[test]
fn test_retryable_errors() {
    let retryable_error = CoreError::Llm(LlmError::RateLimitExceeded {
        provider: "anthropic".to_string(),
        retry_after: 30,
    });
    assert!(retryable_error.is_retryable());

    let server_error = CoreError::Llm(LlmError::RequestFailed {
        provider: "anthropic".to_string(),
        status_code: 529,
        message: "overloaded".to_string(),
    });
    assert!(server_error.is_retryable());

    let bad_request = CoreError::Llm(LlmError::RequestFailed {
        provider: "anthropic".to_string(),
        status_code: 400,
        message: "bad request".to_string(),
    });
    assert!(!bad_request.is_retryable());

    let non_retryable_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "ANTHROPIC_API_KEY".to_string(),
    });
    assert!(!non_retryable_error.is_retryable());
}

#[test]
fn test_user_friendly_messages() {
    let llm_error = CoreError::Llm(LlmError::AuthenticationFailed {
        provider: "anthropic".to_string(),
    });
    let message = llm_error.user_friendly_message();
    assert!(message.contains("check your API key"));

    let validation_error = CoreError::Validation {
        message: "Tag cannot be empty".to_string(),
    };
    assert_eq!(validation_error.user_friendly_message(), "Tag cannot be empty");

    let store_error = CoreError::Store(StoreError::WriteFailed {
        path: "community_tags.json".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    });
    let message = store_error.user_friendly_message();
    assert!(message.contains("community_tags.json"));
}

#[test]
fn test_error_reporter() {
    let reporter = ErrorReporter::new()
        .with_error_reporting(true)
        .with_warning_reporting(true);
    let error = CoreError::Feed(FeedError::MalformedXml {
        details: "unexpected end of file".to_string(),
    });

    // This test just ensures the methods don't panic
    reporter.report_error(&error);
    reporter.report_warning(&error);
}
