//! Error taxonomy for remote operations against the hosted backend.
use thiserror::Error;

/// Failure of a gateway operation. Every remote call in the crate returns
/// this type; no failure is fatal and every path is safe to retry.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Network-level failure, including a request that hit the client timeout.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status. `message` is the
    /// backend's own text and is surfaced to the user verbatim.
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// The backend answered 2xx but the body was not in the expected shape.
    #[error("invalid response from backend: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Status code of a backend-reported failure, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}
