//! HTTP Client port

use async_trait::async_trait;
use thiserror::Error;

use dnac_domain::{ControllerRequest, ControllerResponse};

/// Transport-level failures. A response with any status code is not an error here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HttpClientError {
    /// The request URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request did not complete in time.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// The host name could not be resolved.
    #[error("could not resolve {host}: {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Resolver message.
        message: String,
    },

    /// The controller refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The TLS handshake failed and the trust policy did not cover it.
    #[error("TLS handshake failed: {0}")]
    Tls(String),

    /// Any other connection failure.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The HTTP client could not be built or failed otherwise.
    #[error("{0}")]
    Other(String),
}

/// Port for executing HTTP requests against the controller.
///
/// This trait abstracts the HTTP client implementation, allowing
/// the session core to be independent of specific HTTP libraries
/// and to run against a scripted client in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Executes a request and returns the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error if no response was received: network issues,
    /// timeout, or a rejected TLS handshake.
    async fn execute(
        &self,
        request: &ControllerRequest,
    ) -> Result<ControllerResponse, HttpClientError>;
}
