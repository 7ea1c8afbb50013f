//! Error types for the remote API client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur talking to the task service
#[derive(Debug, Error)]
pub enum ClientError {
    /// Request could not be sent or the connection failed
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the task record shape
    #[error("Invalid response: {message}")]
    Decode { message: String },
}

impl ClientError {
    /// Create a Status error
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::Status { status, .. } => Some(*status),
            Self::Decode { .. } => None,
        }
    }
}

impl From<ClientError> for mat_core::Error {
    fn from(e: ClientError) -> Self {
        let status = e.status_code();
        let message = match e {
            ClientError::Status { body, .. } if !body.is_empty() => body,
            other => other.to_string(),
        };
        mat_core::Error::remote(status, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_maps_to_remote_error() {
        let err: mat_core::Error = ClientError::status(422, "title is required").into();
        match err {
            mat_core::Error::Remote { status, message } => {
                assert_eq!(status, Some(422));
                assert_eq!(message, "title is required");
            }
            e => panic!("Expected Remote error, got: {:?}", e),
        }
    }

    #[test]
    fn test_empty_body_uses_display() {
        let err: mat_core::Error = ClientError::status(500, "").into();
        assert_eq!(err.to_string(), "Remote API error (500): Service returned 500: ");
    }
}
