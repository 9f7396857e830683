//! Error handling.

use thiserror::Error;

/// Statistics pipeline error type
///
/// This type encapsulates the various errors that may occur.
/// Each variant maps to a process exit status.
#[derive(Debug, Error)]
pub enum StatsError {
    /// A required configuration value was not supplied
    #[error("environment variable {name} is required")]
    MissingConfig { name: &'static str },

    /// Error communicating with the search backend
    #[error("failed to query the search backend")]
    Backend(#[from] reqwest::Error),

    /// The search backend returned a non-success status
    #[error("search backend returned {status}: {body}")]
    BackendStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The search response did not have the expected structure
    #[error("search response is missing {context}")]
    MalformedResponse { context: &'static str },

    /// Error writing a CSV snapshot
    #[error("failed to write CSV snapshot")]
    Csv(#[from] csv::Error),

    /// Filesystem error
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// Error (de)serialising JSON
    #[error("failed to (de)serialise JSON")]
    Json(#[from] serde_json::Error),

    /// Error constructing the backend URL
    #[error("invalid backend URL")]
    Url(#[from] url::ParseError),
}

impl StatsError {
    /// Return the process exit status for a fatal error.
    ///
    /// Missing configuration exits with 2 so that callers can distinguish a
    /// misconfigured environment from a failed run.
    pub fn exit_code(&self) -> i32 {
        match self {
            StatsError::MissingConfig { .. } => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_exit_code() {
        let error = StatsError::MissingConfig { name: "FOO" };
        assert_eq!(error.exit_code(), 2);
        assert_eq!(error.to_string(), "environment variable FOO is required");
    }

    #[test]
    fn backend_status_exit_code() {
        let error = StatsError::BackendStatus {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        };
        assert_eq!(error.exit_code(), 1);
        assert_eq!(
            error.to_string(),
            "search backend returned 500 Internal Server Error: boom"
        );
    }

    #[test]
    fn io_exit_code() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = StatsError::from(io_error);
        assert_eq!(error.exit_code(), 1);
    }
}
