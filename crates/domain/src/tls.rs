//! TLS trust policy for controller connections.
//!
//! Lab controllers usually present self-signed certificates. [`TrustPolicy`]
//! makes bypassing certificate validation an explicit opt-in: the default
//! policy verifies certificates, and [`TrustPolicy::force_trust`] must be chosen
//! deliberately.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Decides how server certificates are treated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrustPolicy {
    /// Accept any server certificate, self-signed or otherwise (dangerous!).
    #[serde(default)]
    pub force_trust: bool,

    /// Extra PEM root certificates trusted in addition to the platform roots.
    /// Ignored when `force_trust` is set.
    #[serde(default)]
    pub ca_certificates: Vec<PathBuf>,
}

impl TrustPolicy {
    /// Standard certificate validation.
    #[must_use]
    pub fn verify() -> Self {
        Self::default()
    }

    /// Accept every server certificate.
    /// WARNING: only for lab controllers with self-signed certificates.
    #[must_use]
    pub fn force_trust() -> Self {
        Self {
            force_trust: true,
            ..Self::default()
        }
    }

    /// Add a PEM root certificate.
    #[must_use]
    pub fn with_ca_pem_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_certificates.push(path.into());
        self
    }

    /// Check if this policy weakens certificate validation.
    #[must_use]
    pub fn security_warnings(&self) -> Vec<TlsSecurityWarning> {
        let mut warnings = vec![];

        if self.force_trust {
            warnings.push(TlsSecurityWarning::CertificateVerificationDisabled);
            warnings.push(TlsSecurityWarning::AcceptingInvalidHostnames);
        }

        warnings
    }

    /// Check if this is a secure policy.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.security_warnings().is_empty()
    }
}

/// A server trust challenge raised before talking to a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerTrustChallenge {
    /// Host presenting the certificate.
    pub host: String,
    /// Port of the connection.
    pub port: u16,
}

impl ServerTrustChallenge {
    /// Creates a challenge for `host:port`.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

/// Outcome of evaluating a trust challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustDecision {
    /// Trust the presented certificate without validation.
    Accept,
    /// Let the HTTP client validate the certificate chain.
    DefaultHandling,
}

/// Answers server trust challenges.
pub trait ServerTrustEvaluator: Send + Sync {
    /// Decide how to treat the certificate presented for `challenge`.
    fn evaluate(&self, challenge: &ServerTrustChallenge) -> TrustDecision;
}

impl ServerTrustEvaluator for TrustPolicy {
    fn evaluate(&self, _challenge: &ServerTrustChallenge) -> TrustDecision {
        if self.force_trust {
            TrustDecision::Accept
        } else {
            TrustDecision::DefaultHandling
        }
    }
}

/// TLS security warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsSecurityWarning {
    /// Certificate verification is disabled.
    CertificateVerificationDisabled,
    /// Accepting invalid hostnames.
    AcceptingInvalidHostnames,
}

impl TlsSecurityWarning {
    /// Get a user-friendly message for this warning.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::CertificateVerificationDisabled => {
                "Certificate verification is disabled. This makes connections vulnerable to \
                 man-in-the-middle attacks."
            }
            Self::AcceptingInvalidHostnames => {
                "Accepting invalid hostnames. The server identity is not being verified."
            }
        }
    }
}
