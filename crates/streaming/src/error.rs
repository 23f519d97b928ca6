use thiserror::Error;

/// Failure talking to the clustering service.
///
/// `Network` and `Status` mean the request did not complete; retrying later
/// may help. `Malformed` means the service answered with something that does
/// not match the expected schema.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Init(#[source] reqwest::Error),

    #[error("request to {endpoint} failed: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} answered HTTP {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed response from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },
}

impl ClientError {
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network { .. } | ClientError::Status { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ClientError::Malformed { .. })
    }

    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ClientError::Init(_) => None,
            ClientError::Network { endpoint, .. }
            | ClientError::Status { endpoint, .. }
            | ClientError::Malformed { endpoint, .. } => Some(endpoint),
        }
    }
}
