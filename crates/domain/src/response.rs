//! Controller response type

use serde::{Deserialize, Serialize};

use crate::request::Headers;

/// The parts of a controller response the session manager inspects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, repeated names preserved
    pub headers: Headers,
    /// Response body as string
    pub body: String,
}

impl ControllerResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, headers: Headers, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Returns true for exactly `200 OK`, the only status the login endpoint
    /// uses for success.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }
}
