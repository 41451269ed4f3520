//! Controller addressing and login credentials.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// URL scheme used to reach the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP (test benches only).
    Http,
    /// HTTPS (default).
    #[default]
    Https,
}

impl Scheme {
    /// Returns the scheme as it appears in a URL.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(DomainError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// Host (IP or hostname, optionally with `:port`) of a controller.
///
/// The address is the lookup key for persisted sessions and the base of every
/// URL the session manager composes. It is kept verbatim: malformed input is
/// passed through unchanged and only surfaces when a URL is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControllerAddress(String);

impl ControllerAddress {
    /// Wraps a host string.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Returns the raw address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the host part without any port, lowercased.
    ///
    /// Used as the default cookie domain.
    #[must_use]
    pub fn host(&self) -> String {
        let raw = self.0.trim();
        // Bracketed IPv6 literal: [::1]:443
        if let Some(rest) = raw.strip_prefix('[') {
            return rest
                .split(']')
                .next()
                .unwrap_or_default()
                .to_ascii_lowercase();
        }
        raw.split(':').next().unwrap_or_default().to_ascii_lowercase()
    }

    /// `scheme://address`
    #[must_use]
    pub fn base_url(&self, scheme: Scheme) -> String {
        format!("{scheme}://{}", self.0)
    }

    /// `scheme://address` followed by `path` verbatim.
    #[must_use]
    pub fn service_url(&self, scheme: Scheme, path: &str) -> String {
        format!("{}{path}", self.base_url(scheme))
    }
}

impl fmt::Display for ControllerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ControllerAddress {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ControllerAddress {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Username and password for the login exchange.
///
/// Never persisted. `Debug` output redacts the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Value for the `Authorization` header: `Basic base64(username:password)`.
    #[must_use]
    pub fn basic_authorization(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_base_and_service_url() {
        let address = ControllerAddress::new("10.0.0.1");
        assert_eq!(address.base_url(Scheme::Https), "https://10.0.0.1");
        assert_eq!(
            address.service_url(Scheme::Https, "/api/v1/network-device"),
            "https://10.0.0.1/api/v1/network-device"
        );
    }

    #[test]
    fn test_service_url_passes_malformed_input_through() {
        let address = ControllerAddress::new("bad host");
        assert_eq!(address.service_url(Scheme::Http, "x"), "http://bad hostx");
    }

    #[test]
    fn test_host_strips_port() {
        assert_eq!(ControllerAddress::new("DNAC.lab:8443").host(), "dnac.lab");
        assert_eq!(ControllerAddress::new("[::1]:443").host(), "::1");
        assert_eq!(ControllerAddress::new("10.0.0.1").host(), "10.0.0.1");
    }

    #[test]
    fn test_scheme_parse() {
        assert_eq!("HTTPS".parse::<Scheme>().unwrap(), Scheme::Https);
        assert_eq!("http".parse::<Scheme>().unwrap(), Scheme::Http);
        assert!("ftp".parse::<Scheme>().is_err());
    }

    #[test]
    fn test_basic_authorization() {
        let credentials = Credentials::new("user", "pass");
        assert_eq!(credentials.basic_authorization(), "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials::new("admin", "s3cret");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("s3cret"));
    }
}
