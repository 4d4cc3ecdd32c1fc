use thiserror::Error;

/// All the ways a search can go wrong
///
/// Per-tier launch failures never show up here directly: the dispatcher
/// recovers them by moving to the next tier, and only exhaustion of every
/// applicable tier becomes a `UriLaunchFailure`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("query is empty and this platform requires one")]
    InvalidQuery,

    #[error("no channel could open a search on {0}")]
    UriLaunchFailure(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("upstream response did not match the expected shape: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Copyable classification carried on a `DispatchOutcome`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidQuery => ErrorKind::InvalidQuery,
            Error::UriLaunchFailure(_) => ErrorKind::UriLaunchFailure,
            Error::NetworkError(_) => ErrorKind::NetworkError,
            Error::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Error::ConfigError(_) | Error::IoError(_) => ErrorKind::Other,
        }
    }
}

impl From<feedskip_api::reddit::RedditError> for Error {
    fn from(err: feedskip_api::reddit::RedditError) -> Self {
        use feedskip_api::reddit::RedditError;
        match err {
            RedditError::MalformedResponse(e) => Error::MalformedResponse(e.to_string()),
            other => Error::NetworkError(other.to_string()),
        }
    }
}

impl From<feedskip_api::tiktok::TikTokError> for Error {
    fn from(err: feedskip_api::tiktok::TikTokError) -> Self {
        Error::NetworkError(err.to_string())
    }
}

/// What went wrong, without the baggage of the full error value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidQuery,
    UriLaunchFailure,
    NetworkError,
    MalformedResponse,
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_classifies_every_variant() {
        assert_eq!(Error::InvalidQuery.kind(), ErrorKind::InvalidQuery);
        assert_eq!(
            Error::UriLaunchFailure("YouTube".into()).kind(),
            ErrorKind::UriLaunchFailure
        );
        assert_eq!(
            Error::NetworkError("down".into()).kind(),
            ErrorKind::NetworkError
        );
        assert_eq!(
            Error::MalformedResponse("not a listing".into()).kind(),
            ErrorKind::MalformedResponse
        );
        assert_eq!(Error::ConfigError("bad".into()).kind(), ErrorKind::Other);
    }
}
