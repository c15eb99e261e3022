use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required environment variables: {}", keys.join(", "))]
    MissingKeys { keys: Vec<String> },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("unknown timezone: {timezone}")]
    UnknownTimezone { timezone: String },
}

impl Error {
    #[must_use]
    pub fn invalid_value(key: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn unknown_timezone(timezone: impl Into<String>) -> Self {
        Self::UnknownTimezone {
            timezone: timezone.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
