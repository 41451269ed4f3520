//! DNAC Session Domain - Core types
//!
//! This crate defines the domain model for controller sessions.
//! All types here are pure Rust with no I/O dependencies.

pub mod controller;
pub mod cookie;
pub mod error;
pub mod headers;
pub mod request;
pub mod response;
pub mod session;
pub mod settings;
pub mod tls;

pub use controller::{ControllerAddress, Credentials, Scheme};
pub use cookie::{SessionCookie, SessionCookieSet};
pub use error::{DomainError, DomainResult};
pub use headers::AuthHeaders;
pub use request::{ControllerRequest, Header, Headers, HttpMethod};
pub use response::ControllerResponse;
pub use session::{SessionState, StoredSession};
pub use settings::{DEFAULT_LOGIN_PATH, SessionSettings};
pub use tls::{
    ServerTrustChallenge, ServerTrustEvaluator, TlsSecurityWarning, TrustDecision, TrustPolicy,
};
