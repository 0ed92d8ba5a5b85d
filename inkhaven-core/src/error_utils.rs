use crate::error::*;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    /// Whether a later run can be expected to succeed where this one failed.
    fn is_retryable(&self) -> bool;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Feed(e) => {
                error!("Feed error details: {:?}", e);
            }
            CoreError::Store(e) => {
                error!("Store error details: {:?}", e);
            }
            CoreError::Llm(e) => {
                error!("LLM error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::Llm(e) => e.is_retryable(),
            CoreError::Store(e) => e.is_retryable(),
            CoreError::Network(_) => true,
            _ => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Feed(e) => e.user_friendly_message(),
            CoreError::Store(e) => e.user_friendly_message(),
            CoreError::Llm(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::Validation { message } => message.clone(),
            CoreError::NotFound { resource } => format!("Could not find: {}", resource),
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::Feed(_) => "FEED".to_string(),
            CoreError::Store(_) => "STORE".to_string(),
            CoreError::Llm(_) => "LLM".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::Validation { .. } => "VALIDATION".to_string(),
            CoreError::NotFound { .. } => "NOT_FOUND".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }
}

impl ErrorExt for FeedError {
    fn log_error(&self) -> &Self {
        error!("FeedError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("FeedError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn user_friendly_message(&self) -> String {
        match self {
            FeedError::MalformedXml { .. } => {
                "The feed could not be parsed. Please check the XML file.".to_string()
            }
            FeedError::MissingChannel => {
                "The feed does not contain a <channel> element.".to_string()
            }
            FeedError::InvalidAuthorTable { .. } => {
                "The author lookup table is invalid. Please check its TOML syntax.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            FeedError::MalformedXml { .. } => "FEED_MALFORMED_XML".to_string(),
            FeedError::MissingChannel => "FEED_MISSING_CHANNEL".to_string(),
            FeedError::InvalidAuthorTable { .. } => "FEED_INVALID_AUTHOR_TABLE".to_string(),
        }
    }
}

impl ErrorExt for StoreError {
    fn log_error(&self) -> &Self {
        error!("StoreError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("StoreError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Sql(sqlx::Error::PoolTimedOut) | StoreError::Sql(sqlx::Error::Io(_))
        )
    }

    fn user_friendly_message(&self) -> String {
        match self {
            StoreError::ReadFailed { path, .. } => {
                format!("Could not read '{}'. Please check file permissions.", path)
            }
            StoreError::WriteFailed { path, .. } => format!(
                "Could not save '{}'. Please check disk space and file permissions.",
                path
            ),
            StoreError::Corrupt { path, .. } => format!(
                "'{}' is not a valid store document. Please repair or remove it.",
                path
            ),
            StoreError::Sql(_) => "Database error occurred. Please try again.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            StoreError::ReadFailed { .. } => "STORE_READ_FAILED".to_string(),
            StoreError::WriteFailed { .. } => "STORE_WRITE_FAILED".to_string(),
            StoreError::Corrupt { .. } => "STORE_CORRUPT".to_string(),
            StoreError::Sql(_) => "STORE_SQL_ERROR".to_string(),
        }
    }
}

impl ErrorExt for LlmError {
    fn log_error(&self) -> &Self {
        error!("LlmError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("LlmError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimitExceeded { .. }
            | LlmError::ServiceUnavailable { .. }
            | LlmError::RequestTimeout { .. }
            | LlmError::InvalidResponseFormat { .. }
            | LlmError::EmptyResponse { .. } => true,
            LlmError::RequestFailed { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            LlmError::AuthenticationFailed { provider } => format!(
                "Authentication failed for {}. Please check your API key.",
                provider
            ),
            LlmError::InvalidApiKey { provider } => format!(
                "Invalid API key for {}. Please update your credentials.",
                provider
            ),
            LlmError::RateLimitExceeded {
                provider,
                retry_after,
            } => format!(
                "Rate limit exceeded for {}. Please wait {} seconds.",
                provider, retry_after
            ),
            LlmError::ServiceUnavailable { provider } => format!(
                "{} service is temporarily unavailable. Please try again later.",
                provider
            ),
            LlmError::RequestTimeout { provider } => {
                format!("Request to {} timed out. Please try again.", provider)
            }
            _ => "AI service error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            LlmError::AuthenticationFailed { .. } => "LLM_AUTH_FAILED".to_string(),
            LlmError::InvalidApiKey { .. } => "LLM_INVALID_API_KEY".to_string(),
            LlmError::RateLimitExceeded { .. } => "LLM_RATE_LIMIT".to_string(),
            LlmError::ServiceUnavailable { .. } => "LLM_SERVICE_UNAVAILABLE".to_string(),
            LlmError::RequestTimeout { .. } => "LLM_TIMEOUT".to_string(),
            LlmError::RequestFailed { .. } => "LLM_REQUEST_FAILED".to_string(),
            LlmError::InvalidResponseFormat { .. } => "LLM_INVALID_RESPONSE".to_string(),
            LlmError::EmptyResponse { .. } => "LLM_EMPTY_RESPONSE".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false // Config errors need user intervention
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::MissingEnvironmentVariable { var_name } => format!(
                "Environment variable '{}' is required but not set.",
                var_name
            ),
            ConfigError::Parse(_) => {
                "Configuration file format is invalid. Please check the settings.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::MissingEnvironmentVariable { .. } => "CONFIG_MISSING_ENV_VAR".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

pub struct ErrorReporter {
    report_errors: bool,
    report_warnings: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            report_errors: true,
            report_warnings: true,
        }
    }

    pub fn with_error_reporting(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn with_warning_reporting(mut self, enabled: bool) -> Self {
        self.report_warnings = enabled;
        self
    }

    pub fn report_error(&self, error: &CoreError) {
        if self.report_errors {
            error.log_error();
            info!("Error code: {}", error.error_code());
            info!("User message: {}", error.user_friendly_message());
        }
    }

    pub fn report_warning(&self, error: &CoreError) {
        if self.report_warnings {
            error.log_warn();
            if error.is_retryable() {
                info!("Error is transient; the next run will retry");
            }
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
