//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! Every HTTPS request first raises a [`ServerTrustChallenge`] with the
//! configured [`ServerTrustEvaluator`]. An `Accept` decision sends the request
//! through a client with certificate validation disabled; `DefaultHandling`
//! uses the verifying client.

use std::error::Error as _;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Certificate, Client, ClientBuilder, Method, Url};
use dnac_application::ports::{HttpClient, HttpClientError};
use dnac_domain::{
    ControllerRequest, ControllerResponse, Header, Headers, HttpMethod, ServerTrustChallenge,
    ServerTrustEvaluator, SessionSettings, TrustDecision, TrustPolicy,
};

/// HTTP client implementation using reqwest.
///
/// Holds two `reqwest::Client`s: one that validates server certificates and
/// one that accepts any certificate. The trust evaluator picks between them
/// per request.
pub struct ReqwestHttpClient {
    verifying: Client,
    trusting: Client,
    evaluator: Arc<dyn ServerTrustEvaluator>,
    timeout_ms: Option<u64>,
}

impl ReqwestHttpClient {
    /// Creates a client whose trust decisions follow `settings.trust`.
    ///
    /// Redirects are not followed, so the login status and its `Set-Cookie`
    /// headers are seen exactly as the controller sent them.
    ///
    /// # Errors
    ///
    /// Returns an error if a CA certificate cannot be read or the client
    /// cannot be created.
    pub fn new(settings: &SessionSettings) -> Result<Self, HttpClientError> {
        Self::with_evaluator(settings, Arc::new(settings.trust.clone()))
    }

    /// Creates a client with a custom trust evaluator.
    ///
    /// # Errors
    ///
    /// Returns an error if a CA certificate cannot be read or the client
    /// cannot be created.
    pub fn with_evaluator(
        settings: &SessionSettings,
        evaluator: Arc<dyn ServerTrustEvaluator>,
    ) -> Result<Self, HttpClientError> {
        for warning in settings.trust.security_warnings() {
            tracing::warn!(warning = warning.message(), "insecure TLS trust policy in use");
        }

        let mut verifying = Self::base_builder(settings);
        for certificate in Self::load_ca_certificates(&settings.trust)? {
            verifying = verifying.add_root_certificate(certificate);
        }
        let verifying = verifying
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        let trusting = Self::base_builder(settings)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self {
            verifying,
            trusting,
            evaluator,
            timeout_ms: settings.request_timeout_secs.map(|secs| secs * 1000),
        })
    }

    /// Creates a client from prebuilt reqwest clients.
    #[must_use]
    pub fn with_clients(
        verifying: Client,
        trusting: Client,
        evaluator: Arc<dyn ServerTrustEvaluator>,
    ) -> Self {
        Self {
            verifying,
            trusting,
            evaluator,
            timeout_ms: None,
        }
    }

    fn base_builder(settings: &SessionSettings) -> ClientBuilder {
        let mut builder = Client::builder()
            .user_agent(settings.user_agent.clone())
            .redirect(reqwest::redirect::Policy::none());
        if settings.no_proxy {
            builder = builder.no_proxy();
        }

        match settings.request_timeout_secs {
            Some(secs) => builder.timeout(Duration::from_secs(secs)),
            None => builder,
        }
    }

    fn load_ca_certificates(policy: &TrustPolicy) -> Result<Vec<Certificate>, HttpClientError> {
        if policy.force_trust {
            return Ok(Vec::new());
        }

        policy
            .ca_certificates
            .iter()
            .map(|path| {
                let pem = std::fs::read(path).map_err(|e| {
                    HttpClientError::Other(format!("cannot read CA certificate {}: {e}", path.display()))
                })?;
                Certificate::from_pem(&pem).map_err(|e| {
                    HttpClientError::Other(format!("invalid CA certificate {}: {e}", path.display()))
                })
            })
            .collect()
    }

    /// Picks the client for `url`, consulting the evaluator for HTTPS.
    fn client_for(&self, url: &Url) -> (&Client, TrustDecision) {
        if url.scheme() != "https" {
            return (&self.verifying, TrustDecision::DefaultHandling);
        }

        let challenge = ServerTrustChallenge::new(
            url.host_str().unwrap_or_default(),
            url.port_or_known_default().unwrap_or(443),
        );
        match self.evaluator.evaluate(&challenge) {
            TrustDecision::Accept => (&self.trusting, TrustDecision::Accept),
            TrustDecision::DefaultHandling => (&self.verifying, TrustDecision::DefaultHandling),
        }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        }
    }

    /// Joins an error with its sources; reqwest keeps the useful part there.
    fn error_chain(error: &reqwest::Error) -> String {
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }

    /// Maps reqwest errors to `HttpClientError`.
    fn map_error(&self, error: &reqwest::Error, url: &Url) -> HttpClientError {
        let host = url.host_str().unwrap_or("unknown").to_string();

        if error.is_timeout() {
            return HttpClientError::Timeout {
                timeout_ms: self.timeout_ms.unwrap_or_default(),
            };
        }

        let message = Self::error_chain(error);
        let lower = message.to_lowercase();

        if error.is_connect() {
            if lower.contains("dns") || lower.contains("resolve") {
                return HttpClientError::DnsError { host, message };
            }
            if lower.contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host,
                    port: url.port_or_known_default().unwrap_or(443),
                };
            }
            if lower.contains("certificate") || lower.contains("tls") || lower.contains("handshake")
            {
                return HttpClientError::Tls(message);
            }
            return HttpClientError::ConnectionFailed(message);
        }

        HttpClientError::Other(message)
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(
        &self,
        request: &ControllerRequest,
    ) -> Result<ControllerResponse, HttpClientError> {
        let url = Url::parse(&request.url)
            .map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {}", request.url)))?;

        let (client, decision) = self.client_for(&url);
        // Header `Debug` redacts credentials and cookies.
        tracing::trace!(url = %url, ?decision, headers = ?request.headers, "sending request");

        let mut builder = client.request(Self::to_reqwest_method(request.method), url.clone());
        for (name, value) in request.headers.pairs() {
            builder = builder.header(name, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_error(&e, &url))?;

        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .map(|(k, v)| Header::new(k.as_str(), v.to_str().unwrap_or("<binary>")))
            .collect();
        tracing::trace!(status, ?headers, "response received");

        let body = response
            .text()
            .await
            .map_err(|e| HttpClientError::Other(format!("Failed to read body: {e}")))?;

        Ok(ControllerResponse::new(status, headers, body))
    }
}
