use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The request never produced an HTTP response.
    Network,
    /// The server answered with a non-2xx status.
    Status,
    /// The response body could not be read or parsed.
    Decode,
}

/// Every failure a [`crate::transport::Transport`] can surface, in one shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.status_code, .message))]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub status_code: Option<u16>,
    pub message: String,
}

fn describe(status_code: &Option<u16>, message: &str) -> String {
    match status_code {
        Some(code) => format!("Error {code}: {message}"),
        None => format!("Error: {message}"),
    }
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Network,
            status_code: None,
            message: message.into(),
        }
    }

    pub fn status(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Status,
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    pub fn decode(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Decode,
            status_code,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(value: reqwest::Error) -> Self {
        let status_code = value.status().map(|status| status.as_u16());
        if value.is_timeout() {
            Self::network(value.to_string())
        } else if value.is_decode() || value.is_body() {
            Self::decode(status_code, value.to_string())
        } else if let Some(code) = status_code {
            Self::status(code, value.to_string())
        } else {
            Self::network(value.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportSetupError {
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}
