//! Session settings domain model.
//!
//! Describes how the session manager reaches a controller and where it keeps
//! its state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::controller::Scheme;
use crate::request::HttpMethod;
use crate::tls::TrustPolicy;

/// Login path of the controller's auth endpoint.
pub const DEFAULT_LOGIN_PATH: &str = "/api/system/v1/auth/login";

/// Settings for talking to a controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// URL scheme for all controller calls.
    #[serde(default)]
    pub scheme: Scheme,

    /// Path of the login endpoint, starting with `/`.
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Method used for the login call.
    #[serde(default)]
    pub login_method: HttpMethod,

    /// Server certificate policy.
    #[serde(default)]
    pub trust: TrustPolicy,

    /// Request timeout in seconds. `None` keeps the HTTP client's default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// User-Agent sent to the controller.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Directory holding the persisted session file.
    /// `None` selects the platform data directory.
    #[serde(default)]
    pub store_dir: Option<PathBuf>,

    /// Connect directly, ignoring `HTTP(S)_PROXY` environment variables.
    #[serde(default)]
    pub no_proxy: bool,
}

fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

fn default_user_agent() -> String {
    concat!("dnac-session/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            scheme: Scheme::default(),
            login_path: default_login_path(),
            login_method: HttpMethod::default(),
            trust: TrustPolicy::default(),
            request_timeout_secs: None,
            user_agent: default_user_agent(),
            store_dir: None,
            no_proxy: false,
        }
    }
}

impl SessionSettings {
    /// Settings for lab controllers with self-signed certificates.
    #[must_use]
    pub fn lab() -> Self {
        Self {
            trust: TrustPolicy::force_trust(),
            ..Self::default()
        }
    }

    /// Override the scheme.
    #[must_use]
    pub const fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Override the login path.
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Bypass any proxy configured in the environment.
    #[must_use]
    pub const fn without_proxy(mut self) -> Self {
        self.no_proxy = true;
        self
    }

    /// Override the login method.
    #[must_use]
    pub const fn with_login_method(mut self, method: HttpMethod) -> Self {
        self.login_method = method;
        self
    }
}
