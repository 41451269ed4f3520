//! Session cookie types.
//!
//! The controller issues its session as one or more `Set-Cookie` headers on the
//! login response. These types hold the parsed cookies and render them back into
//! a `Cookie` request header.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A single HTTP cookie issued by the controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionCookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Domain the cookie belongs to.
    pub domain: String,
    /// Path the cookie applies to.
    #[serde(default = "default_path")]
    pub path: String,
    /// Expiration time (None for session cookies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    /// Secure flag.
    #[serde(default)]
    pub secure: bool,
    /// HttpOnly flag.
    #[serde(default)]
    pub http_only: bool,
}

fn default_path() -> String {
    "/".to_string()
}

impl SessionCookie {
    /// Create a new cookie with path `/` and no expiry.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: default_path(),
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    /// Set the path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the expiration.
    #[must_use]
    pub const fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Set Secure flag.
    #[must_use]
    pub const fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Check if the cookie is past its expiry at `now`.
    ///
    /// Informational only: stored cookies are replayed until cleared.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|exp| exp < now)
    }

    /// `name=value` pair for the Cookie header.
    #[must_use]
    pub fn to_cookie_pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    /// Parse a `Set-Cookie` header value.
    ///
    /// `request_domain` is used when the header carries no `Domain` attribute.
    /// `now` anchors `Max-Age`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidSetCookie`] if the header has no `name=value`
    /// pair or the name is empty.
    pub fn from_set_cookie(
        header: &str,
        request_domain: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let mut parts = header.split(';');

        let (name, value) = parts
            .next()
            .and_then(|pair| pair.split_once('='))
            .ok_or(DomainError::InvalidSetCookie)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidSetCookie);
        }
        let value = value.trim().trim_matches('"');
        let mut cookie = Self::new(name, value, request_domain.to_ascii_lowercase());

        let mut max_age = None;
        for part in parts {
            let part = part.trim();
            if let Some((attr, val)) = part.split_once('=') {
                let val = val.trim();
                match attr.trim().to_ascii_lowercase().as_str() {
                    "domain" if !val.is_empty() => {
                        cookie.domain = val.trim_start_matches('.').to_ascii_lowercase();
                    }
                    "path" if val.starts_with('/') => cookie.path = val.to_string(),
                    "expires" => {
                        if let Some(exp) = parse_cookie_date(val) {
                            cookie.expires = Some(exp);
                        }
                    }
                    "max-age" => max_age = val.parse::<i64>().ok(),
                    _ => {}
                }
            } else {
                match part.to_ascii_lowercase().as_str() {
                    "secure" => cookie.secure = true,
                    "httponly" => cookie.http_only = true,
                    _ => {}
                }
            }
        }

        // Max-Age wins over Expires regardless of attribute order. A value
        // past chrono's range leaves the cookie without an expiry.
        if let Some(secs) = max_age {
            cookie.expires = TimeDelta::try_seconds(secs).and_then(|d| now.checked_add_signed(d));
        }

        Ok(cookie)
    }
}

/// Parses the date formats seen in `Expires` attributes.
fn parse_cookie_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(exp) = DateTime::parse_from_rfc2822(value) {
        return Some(exp.with_timezone(&Utc));
    }
    // Netscape format: Wed, 21-Oct-2015 07:28:00 GMT
    NaiveDateTime::parse_from_str(value, "%a, %d-%b-%Y %H:%M:%S GMT")
        .ok()
        .map(|naive| naive.and_utc())
}

/// The cookies that make up an authenticated controller session.
///
/// A cookie with the same name and path as an existing one replaces it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SessionCookieSet {
    cookies: Vec<SessionCookie>,
}

impl SessionCookieSet {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cookies: Vec::new(),
        }
    }

    /// Add a cookie, replacing any cookie with the same name and path.
    pub fn insert(&mut self, cookie: SessionCookie) {
        self.cookies
            .retain(|c| c.name != cookie.name || c.path != cookie.path);
        self.cookies.push(cookie);
    }

    /// Look up a cookie by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SessionCookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    /// Iterate over the cookies in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SessionCookie> {
        self.cookies.iter()
    }

    /// Number of cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Check if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Render the `Cookie` request header value: `a=1; b=2`.
    #[must_use]
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(SessionCookie::to_cookie_pair)
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Collect cookies from the `Set-Cookie` headers of a response.
    ///
    /// Unparsable headers are skipped; the caller decides whether an empty
    /// result is an error.
    #[must_use]
    pub fn from_response_headers<'a, I>(headers: I, request_domain: &str, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut set = Self::new();
        for (name, value) in headers {
            if name.eq_ignore_ascii_case("set-cookie") {
                if let Ok(cookie) = SessionCookie::from_set_cookie(value, request_domain, now) {
                    set.insert(cookie);
                }
            }
        }
        set
    }
}

impl FromIterator<SessionCookie> for SessionCookieSet {
    fn from_iter<T: IntoIterator<Item = SessionCookie>>(iter: T) -> Self {
        let mut set = Self::new();
        for cookie in iter {
            set.insert(cookie);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SessionCookieSet {
    type Item = &'a SessionCookie;
    type IntoIter = std::slice::Iter<'a, SessionCookie>;

    fn into_iter(self) -> Self::IntoIter {
        self.cookies.iter()
    }
}
