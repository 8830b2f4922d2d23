use std::fmt::{Display, Formatter};

use crate::analytics::constants::PLUGIN_NAME;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnalyticsErrorCode {
    InvalidArgument,
    NotInitialized,
    OptionsMissing,
    LoadTimeout,
    LoadFailed,
    Unimplemented,
    Internal,
}

impl AnalyticsErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsErrorCode::InvalidArgument => "analytics/invalid-argument",
            AnalyticsErrorCode::NotInitialized => "analytics/not-initialized",
            AnalyticsErrorCode::OptionsMissing => "analytics/options-missing",
            AnalyticsErrorCode::LoadTimeout => "analytics/load-timeout",
            AnalyticsErrorCode::LoadFailed => "analytics/load-failed",
            AnalyticsErrorCode::Unimplemented => "analytics/unimplemented",
            AnalyticsErrorCode::Internal => "analytics/internal",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyticsError {
    pub code: AnalyticsErrorCode,
    message: String,
}

impl AnalyticsError {
    pub fn new(code: AnalyticsErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    /// The human readable message, without the error code suffix.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for AnalyticsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for AnalyticsError {}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

pub fn invalid_argument(message: impl Into<String>) -> AnalyticsError {
    AnalyticsError::new(AnalyticsErrorCode::InvalidArgument, message)
}

/// Validation failure for a required call property, e.g. `userId property is missing`.
pub fn missing_property(property: &str) -> AnalyticsError {
    invalid_argument(format!("{property} property is missing"))
}

pub fn not_initialized() -> AnalyticsError {
    AnalyticsError::new(
        AnalyticsErrorCode::NotInitialized,
        "Firebase analytics is not initialized. Make sure initializeFirebase() is called once",
    )
}

pub fn options_missing() -> AnalyticsError {
    AnalyticsError::new(AnalyticsErrorCode::OptionsMissing, "Firebase options are missing")
}

pub fn load_timeout() -> AnalyticsError {
    AnalyticsError::new(AnalyticsErrorCode::LoadTimeout, "Firebase fails to load")
}

pub fn load_failed(message: impl Into<String>) -> AnalyticsError {
    AnalyticsError::new(AnalyticsErrorCode::LoadFailed, message)
}

pub fn unimplemented(method: &str) -> AnalyticsError {
    AnalyticsError::new(
        AnalyticsErrorCode::Unimplemented,
        format!("{method} is not implemented by the {PLUGIN_NAME} plugin"),
    )
}

pub fn internal_error(message: impl Into<String>) -> AnalyticsError {
    AnalyticsError::new(AnalyticsErrorCode::Internal, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_property_names_the_field() {
        let err = missing_property("userId");
        assert_eq!(err.code, AnalyticsErrorCode::InvalidArgument);
        assert_eq!(err.message(), "userId property is missing");
        assert_eq!(
            err.to_string(),
            "userId property is missing (analytics/invalid-argument)"
        );
    }

    #[test]
    fn load_errors_carry_distinct_codes() {
        assert_eq!(load_timeout().code_str(), "analytics/load-timeout");
        assert_eq!(load_failed("boom").code_str(), "analytics/load-failed");
        assert_eq!(not_initialized().code_str(), "analytics/not-initialized");
    }
}
