//! Failure taxonomy for a registration attempt.

use std::{path::PathBuf, time::Duration};

use crate::types::SessionStatus;

pub type Result<T> = std::result::Result<T, RegistrationError>;

/// Every way a registration attempt can fail. None of these are retried
/// locally; the caller decides whether to start over with a fresh challenge.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("OpenClaw identity not found at {}", .0.display())]
    IdentityNotFound(PathBuf),

    #[error("OpenClaw identity file is missing required fields: {}", .0.join(", "))]
    InvalidIdentity(Vec<&'static str>),

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("ClawKey {operation} failed: {status} {body}")]
    RemoteError {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("ClawKey registration {reason}")]
    HandshakeTerminated { reason: SessionStatus },

    #[error("ClawKey registration timeout after {0:?}")]
    HandshakeTimeout(Duration),

    #[error("ClawKey verification failed: {body}")]
    VerificationFailed { body: String },

    #[error("Agent registration failed: {status} {body}")]
    RegistrationFailed { status: u16, body: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_carry_status_and_body() {
        let err = RegistrationError::RemoteError {
            operation: "init",
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(err.to_string(), "ClawKey init failed: 500 boom");

        let err = RegistrationError::RegistrationFailed {
            status: 403,
            body: "name taken".into(),
        };
        assert_eq!(err.to_string(), "Agent registration failed: 403 name taken");
    }

    #[test]
    fn invalid_identity_lists_missing_fields() {
        let err = RegistrationError::InvalidIdentity(vec!["deviceId", "privateKeyPem"]);
        assert_eq!(
            err.to_string(),
            "OpenClaw identity file is missing required fields: deviceId, privateKeyPem"
        );
    }

    #[test]
    fn terminated_names_the_remote_status() {
        let err = RegistrationError::HandshakeTerminated {
            reason: SessionStatus::Expired,
        };
        assert_eq!(err.to_string(), "ClawKey registration expired");
    }
}
