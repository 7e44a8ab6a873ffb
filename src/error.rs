//! Errors raised inside a refresh routine.
//!
//! These never escape a routine: each routine has one top-level handler that
//! logs the error and renders its fallback state.

use std::fmt;

use reqwest::StatusCode;

/// Which remote call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    SpotifyToken,
    CurrentlyPlaying,
    RecentlyPlayed,
    Presence,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Endpoint::SpotifyToken => "spotify token exchange",
            Endpoint::CurrentlyPlaying => "spotify currently-playing",
            Endpoint::RecentlyPlayed => "spotify recently-played",
            Endpoint::Presence => "lanyard presence",
        })
    }
}

/// The two error kinds a routine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The refresh-token exchange failed.
    Auth,
    /// Any other request failed or returned something unusable.
    Api,
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("token exchange rejected with status {status}")]
    Auth { status: StatusCode },

    #[error("{endpoint} returned status {status}")]
    Status {
        endpoint: Endpoint,
        status: StatusCode,
    },

    #[error("{endpoint} returned a malformed body: {source}")]
    Malformed {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    #[error("{endpoint} request failed: {message}")]
    Transport { endpoint: Endpoint, message: String },
}

impl RefreshError {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            RefreshError::Auth { .. } => Endpoint::SpotifyToken,
            RefreshError::Status { endpoint, .. }
            | RefreshError::Malformed { endpoint, .. }
            | RefreshError::Transport { endpoint, .. } => *endpoint,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.endpoint() {
            Endpoint::SpotifyToken => ErrorKind::Auth,
            _ => ErrorKind::Api,
        }
    }

    /// Stable code for log lines.
    pub fn error_code(&self) -> &'static str {
        match self {
            RefreshError::Auth { .. } => "AUTH_REJECTED",
            RefreshError::Status { .. } => "API_STATUS",
            RefreshError::Malformed { .. } => "API_MALFORMED",
            RefreshError::Transport { .. } => "API_TRANSPORT",
        }
    }

    pub(crate) fn transport(endpoint: Endpoint, err: anyhow::Error) -> Self {
        RefreshError::Transport {
            endpoint,
            message: format!("{err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_failures_are_auth_kind() {
        let rejected = RefreshError::Auth {
            status: StatusCode::BAD_REQUEST,
        };
        assert_eq!(rejected.kind(), ErrorKind::Auth);

        let malformed = RefreshError::Malformed {
            endpoint: Endpoint::SpotifyToken,
            source: serde_json::from_str::<u8>("{").unwrap_err(),
        };
        assert_eq!(malformed.kind(), ErrorKind::Auth);
        assert_eq!(malformed.error_code(), "API_MALFORMED");
    }

    #[test]
    fn other_failures_are_api_kind() {
        let err = RefreshError::Status {
            endpoint: Endpoint::Presence,
            status: StatusCode::NOT_FOUND,
        };
        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(
            err.to_string(),
            "lanyard presence returned status 404 Not Found"
        );
    }

    #[test]
    fn transport_error_keeps_context_chain() {
        let err = RefreshError::transport(
            Endpoint::RecentlyPlayed,
            anyhow::anyhow!("connection reset").context("send request"),
        );
        assert_eq!(err.endpoint(), Endpoint::RecentlyPlayed);
        assert_eq!(
            err.to_string(),
            "spotify recently-played request failed: send request: connection reset"
        );
    }
}
