use crate::Source;
use strum_macros::Display;

/// Broad classification of an [`Error`], handy for matching without
/// caring about the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorKind {
    Transport,
    Decode,
    EmptyQuery,
    Config,
    Abandoned,
}

/// Everything that can go wrong while fetching or comparing recommendations.
///
/// Errors are cloned into every observer of a failed cache entry, so all
/// variants carry plain strings instead of the underlying error types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("{provider} request failed: {reason}")]
    Transport { provider: Source, reason: String },
    #[error("{provider} response could not be decoded: {reason}")]
    Decode { provider: Source, reason: String },
    #[error("Query must not be empty")]
    EmptyQuery,
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Fetch for {key} ended without a result")]
    Abandoned { key: String },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport { .. } => ErrorKind::Transport,
            Error::Decode { .. } => ErrorKind::Decode,
            Error::EmptyQuery => ErrorKind::EmptyQuery,
            Error::Config(_) => ErrorKind::Config,
            Error::Abandoned { .. } => ErrorKind::Abandoned,
        }
    }

    pub(crate) fn transport(provider: Source, err: impl std::fmt::Display) -> Self {
        Error::Transport {
            provider,
            reason: err.to_string(),
        }
    }

    pub(crate) fn decode(provider: Source, err: impl std::fmt::Display) -> Self {
        Error::Decode {
            provider,
            reason: err.to_string(),
        }
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
