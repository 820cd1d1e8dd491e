//! Structured error types for herdctl-core.
//!
//! The binary (herdctl-cli) wraps these with `anyhow` context; library
//! consumers get typed errors.

use thiserror::Error;

/// Configuration could not be turned into a backend selection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable is set but its value is unusable
    #[error("invalid value for {var}: {reason}")]
    InvalidVar { var: &'static str, reason: String },
}

/// Result type alias for herdctl-core operations
pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    /// Create an invalid variable error
    pub fn invalid_var(var: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidVar {
            var,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::invalid_var("MYSQL_PORT", "not a port number");
        assert_eq!(
            err.to_string(),
            "invalid value for MYSQL_PORT: not a port number"
        );
    }
}
