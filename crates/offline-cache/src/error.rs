//! Error type shared by the cache worker and its storage/network backends.

use crate::worker::WorkerState;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The request never produced a response (offline, DNS, aborted).
    #[error("network request for {url} failed: {message}")]
    Network { url: String, message: String },

    /// A response arrived but is unusable for the app shell.
    #[error("{url} answered with status {status}")]
    BadStatus { url: String, status: u16 },

    /// Cache Storage rejected an open/match/put/delete.
    #[error("cache storage error: {0}")]
    Storage(String),

    /// A lifecycle step was invoked out of order.
    #[error("cannot {operation} while the worker is {state:?}")]
    InvalidTransition {
        operation: &'static str,
        state: WorkerState,
    },

    #[error("invalid shell manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Shell assets must share the scope's origin.
    #[error("shell asset {url} is not on the worker's origin")]
    ForeignAsset { url: String },

    #[error("cache name must not be empty")]
    EmptyCacheName,
}

impl CacheError {
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_resource() {
        let err = CacheError::BadStatus {
            url: "https://x.test/app.js".into(),
            status: 404,
        };
        assert_eq!(err.to_string(), "https://x.test/app.js answered with status 404");

        let err = CacheError::InvalidTransition {
            operation: "activate",
            state: WorkerState::Installing,
        };
        assert_eq!(err.to_string(), "cannot activate while the worker is Installing");
    }

    #[test]
    fn json_errors_convert() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CacheError = parse.into();
        assert!(matches!(err, CacheError::Manifest(_)));
    }
}
