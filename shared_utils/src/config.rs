use thiserror::Error;

use crate::env::MissingEnvVarError;

/// Errors related to application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable required by the application is not set.
    #[error(transparent)]
    MissingEnvVar(#[from] MissingEnvVarError),

    /// A configuration field holds a value outside its accepted range.
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidValue`].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_names_the_field() {
        let err = ConfigError::invalid("lookback", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid value for `lookback`: must be at least 1"
        );
    }

    #[test]
    fn missing_env_var_is_transparent() {
        let err: ConfigError = MissingEnvVarError("CRYPTO_API_KEY".into()).into();
        assert_eq!(err.to_string(), "Missing environment variable: CRYPTO_API_KEY");
    }
}
