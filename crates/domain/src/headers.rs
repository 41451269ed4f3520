//! Request headers derived from a controller session.

use serde::Serialize;

use crate::cookie::SessionCookieSet;

/// Header carrying the session cookies.
pub const COOKIE_HEADER: &str = "Cookie";
/// Content type header name.
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
/// JSON content type sent on every controller call.
pub const JSON_CONTENT_TYPE: &str = "application/json";
/// Marker header the controller API expects alongside the session.
pub const VERIFY_HEADER: &str = "verify";
/// Value of the `verify` marker.
pub const VERIFY_VALUE: &str = "False";

/// Headers to attach to an authenticated controller call.
///
/// Derived from the stored cookie set on every request and never stored itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthHeaders {
    cookie: String,
}

impl AuthHeaders {
    /// Derive the header set from a cookie set.
    #[must_use]
    pub fn from_cookies(cookies: &SessionCookieSet) -> Self {
        Self {
            cookie: cookies.cookie_header(),
        }
    }

    /// Value of the `Cookie` header.
    #[must_use]
    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    /// All header pairs, in the order they should be applied.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, &str); 3] {
        [
            (COOKIE_HEADER, self.cookie.as_str()),
            (VERIFY_HEADER, VERIFY_VALUE),
            (CONTENT_TYPE_HEADER, JSON_CONTENT_TYPE),
        ]
    }

    /// Look up a header value by case-insensitive name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries()
            .into_iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}
