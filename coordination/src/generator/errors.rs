//! Generation error taxonomy.
//!
//! | Variant                 | HTTP status            | Retried |
//! |-------------------------|------------------------|---------|
//! | `InvalidMessage`        | 400                    | no      |
//! | `Upstream`              | upstream status or 500 | no      |
//! | `EmptyUpstreamResponse` | 500                    | no      |
//!
//! Transport failures (connect errors, timeouts, undecodable JSON) are folded
//! into `Upstream { status: 500 }` with the underlying message as the body, so
//! no `reqwest` type ever reaches a caller.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The message was empty after sanitation and this was not a debate turn.
    #[error("Message content is required")]
    InvalidMessage,

    /// The upstream provider answered with a non-success status, or could not
    /// be reached at all.
    #[error("Failed to communicate with AI service")]
    Upstream { status: u16, body: String },

    /// The upstream answered successfully but carried no text block.
    #[error("No response text received from API")]
    EmptyUpstreamResponse,
}

impl GenerationError {
    /// Normalize a transport-level failure into `Upstream { status: 500 }`.
    pub fn transport(err: impl fmt::Display) -> Self {
        Self::Upstream {
            status: 500,
            body: err.to_string(),
        }
    }

    /// HTTP status to surface to the caller.
    ///
    /// Upstream statuses outside the 4xx/5xx range are reported as 500.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidMessage => 400,
            Self::Upstream { status, .. } if (400..=599).contains(status) => *status,
            Self::Upstream { .. } => 500,
            Self::EmptyUpstreamResponse => 500,
        }
    }

    /// Extra detail suitable for an error response body.
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Upstream { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }

    /// Text shown in the transcript when a turn fails.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidMessage => "Invalid request. Please try again.",
            Self::Upstream { .. } | Self::EmptyUpstreamResponse => {
                "Sorry, I encountered an error processing your message."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_is_passed_through() {
        let err = GenerationError::Upstream {
            status: 429,
            body: "rate limited".into(),
        };
        assert_eq!(err.status_code(), 429);
        assert_eq!(err.details(), Some("rate limited"));
    }

    #[test]
    fn non_error_upstream_status_becomes_500() {
        let err = GenerationError::Upstream {
            status: 302,
            body: String::new(),
        };
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.details(), None);
    }

    #[test]
    fn transport_errors_become_500_with_message() {
        let err = GenerationError::transport("connection refused");
        assert_eq!(
            err,
            GenerationError::Upstream {
                status: 500,
                body: "connection refused".into()
            }
        );
    }

    #[test]
    fn invalid_message_is_a_client_error() {
        let err = GenerationError::InvalidMessage;
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.user_message(), "Invalid request. Please try again.");
        assert_eq!(err.to_string(), "Message content is required");
    }
}
