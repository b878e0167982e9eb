use std::time::Duration;

use async_trait::async_trait;
use puncher_shared::protocol::PunchRequest;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::{TransportError, TransportSetupError};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The fixed set of server endpoints the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Status,
    Punch { test: bool },
    Stop,
}

impl Endpoint {
    pub fn method(self) -> Method {
        match self {
            Self::Status => Method::GET,
            Self::Punch { .. } | Self::Stop => Method::POST,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Status => "/status",
            Self::Punch { .. } => "/punch",
            Self::Stop => "/stop",
        }
    }

    pub fn query(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Punch { test: true } => Some(("test", "true")),
            _ => None,
        }
    }
}

/// Successful (2xx) response with its body read as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status_code: u16,
    pub body: String,
}

impl Response {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: body.into(),
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_str(&self.body).map_err(|err| {
            TransportError::decode(
                Some(self.status_code),
                format!("malformed JSON response: {err}"),
            )
        })
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(
        &self,
        endpoint: Endpoint,
        body: Option<&PunchRequest>,
    ) -> Result<Response, TransportError>;
}

pub struct HttpTransport {
    http: Client,
    server_url: String,
}

impl HttpTransport {
    pub fn new(server_url: &str) -> Result<Self, TransportSetupError> {
        Self::with_timeout(server_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Requests still unanswered after `timeout` fail as network errors.
    pub fn with_timeout(server_url: &str, timeout: Duration) -> Result<Self, TransportSetupError> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::with_client(http, server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self, TransportSetupError> {
        let parsed = Url::parse(server_url)?;
        Ok(Self {
            http,
            server_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.server_url, endpoint.path())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(
        &self,
        endpoint: Endpoint,
        body: Option<&PunchRequest>,
    ) -> Result<Response, TransportError> {
        let url = self.endpoint_url(endpoint);
        let mut request = self.http.request(endpoint.method(), &url);
        if let Some(pair) = endpoint.query() {
            request = request.query(&[pair]);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(endpoint = ?endpoint, %url, "sending request");
        let res = request.send().await?;
        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            let message = if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                text
            };
            warn!(endpoint = ?endpoint, status_code = status.as_u16(), "request rejected");
            return Err(TransportError::status(status.as_u16(), message));
        }

        Ok(Response {
            status_code: status.as_u16(),
            body: text,
        })
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
