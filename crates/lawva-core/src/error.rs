//! Error types for `lawva-core`.
//!
//! Every failure a certification fetch can end in is one [`FetchError`].
//! Cancellation is not an error: a superseded request is discarded by the
//! fetch lifecycle and never reaches this type.

/// Errors from fetching and decoding a certification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The transport failed before a response arrived.
    #[error("network failure: {reason}")]
    Network { reason: String },

    /// The endpoint answered with a non-2xx status.
    #[error("{}", http_message(*status))]
    Http { status: u16 },

    /// The response body does not have the certification shape.
    #[error("malformed certification payload: {reason}")]
    Decode { reason: String },
}

impl FetchError {
    /// Whether the endpoint reported the certification as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404 | 410 })
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status } => Some(*status),
            Self::Network { .. } | Self::Decode { .. } => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode {
                reason: err.to_string(),
            }
        } else {
            Self::Network {
                reason: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode {
            reason: err.to_string(),
        }
    }
}

fn http_message(status: u16) -> String {
    match status {
        404 | 410 => format!("certification not found (HTTP {status})"),
        400..=499 => format!("request rejected: HTTP {status}"),
        _ => format!("server error: HTTP {status}"),
    }
}
