//! Login request construction and response interpretation.

use chrono::{DateTime, Utc};
use dnac_domain::headers::{CONTENT_TYPE_HEADER, JSON_CONTENT_TYPE, VERIFY_HEADER, VERIFY_VALUE};
use dnac_domain::{
    ControllerAddress, ControllerRequest, ControllerResponse, Credentials, SessionCookieSet,
    SessionSettings,
};

use crate::error::{SessionError, SessionResult};

/// Builds the login request for `address`.
///
/// `scheme://address<login_path>` with basic auth, JSON content type and the
/// `verify` marker.
#[must_use]
pub fn build_login_request(
    settings: &SessionSettings,
    address: &ControllerAddress,
    credentials: &Credentials,
) -> ControllerRequest {
    let url = address.service_url(settings.scheme, &settings.login_path);

    ControllerRequest::new(settings.login_method, url)
        .with_header("Authorization", credentials.basic_authorization())
        .with_header(CONTENT_TYPE_HEADER, JSON_CONTENT_TYPE)
        .with_header(VERIFY_HEADER, VERIFY_VALUE)
}

/// Turns the login response into the session cookie set.
///
/// # Errors
///
/// - [`SessionError::AuthRejected`] if the status is not 200.
/// - [`SessionError::MissingSessionCookie`] if no `Set-Cookie` header parses.
pub fn session_cookies(
    response: &ControllerResponse,
    address: &ControllerAddress,
    now: DateTime<Utc>,
) -> SessionResult<SessionCookieSet> {
    if !response.is_ok() {
        return Err(SessionError::AuthRejected {
            status: response.status,
        });
    }

    let cookies =
        SessionCookieSet::from_response_headers(response.headers.pairs(), &address.host(), now);
    if cookies.is_empty() {
        return Err(SessionError::MissingSessionCookie);
    }

    Ok(cookies)
}
