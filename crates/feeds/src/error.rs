use std::error::Error as StdError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The upstream API answered with a non-success status.
    #[error("{source_name} returned HTTP {status}: {body}")]
    Status {
        source_name: &'static str,
        status: u16,
        body: String,
    },

    /// The response parsed but lacked the fields we need.
    #[error("malformed {source_name} response: {message}")]
    Malformed {
        source_name: &'static str,
        message: String,
    },

    #[error("{context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn malformed(source_name: &'static str, message: impl Into<String>) -> Self {
        Self::Malformed {
            source_name,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
