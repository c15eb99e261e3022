use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid cron expression '{expr}': {message}")]
    InvalidExpression { expr: String, message: String },

    #[error("job not found: {name}")]
    JobNotFound { name: String },

    #[error("job already registered: {name}")]
    DuplicateJob { name: String },

    #[error("job {name} failed: {message}")]
    JobFailed { name: String, message: String },

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn job_not_found(name: impl Into<String>) -> Self {
        Self::JobNotFound { name: name.into() }
    }

    #[must_use]
    pub fn invalid_expression(expr: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::InvalidExpression {
            expr: expr.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
