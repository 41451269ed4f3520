//! Authentication session manager.
//!
//! Drives the login exchange against a controller, persists the returned
//! cookies through a [`SessionCredentialStore`] and derives the headers later
//! API calls need.
//!
//! The manager is an explicit value owned by the composition root. Clones
//! share state. Login exchanges are serialized: a second
//! `start_authentication` while one is in flight is queued behind it, and
//! each attempt reports against the address it was started with.

use std::collections::HashMap;
use std::sync::Arc;

use dnac_domain::{
    AuthHeaders, ControllerAddress, ControllerRequest, ControllerResponse, Credentials,
    HttpMethod, SessionSettings, SessionState, StoredSession,
};
use parking_lot::{Mutex, RwLock};
use tokio::sync::oneshot;
use tracing::Instrument;

use super::events::{LoginAttemptId, NoopObserver, SessionEvent, SessionObserver};
use super::login::{build_login_request, session_cookies};
use crate::error::{SessionError, SessionResult};
use crate::ports::{Clock, HttpClient, SessionCredentialStore};

/// Resolves to the outcome of one login attempt.
#[derive(Debug)]
pub struct LoginHandle {
    attempt: LoginAttemptId,
    address: ControllerAddress,
    outcome: oneshot::Receiver<SessionResult<StoredSession>>,
}

impl LoginHandle {
    /// Attempt id, matching the ids on emitted events.
    #[must_use]
    pub const fn attempt(&self) -> LoginAttemptId {
        self.attempt
    }

    /// Address the attempt targets.
    #[must_use]
    pub const fn address(&self) -> &ControllerAddress {
        &self.address
    }

    /// Waits for the attempt to finish.
    ///
    /// # Errors
    ///
    /// Returns the same error delivered with the `Failed` event, or
    /// [`SessionError::Aborted`] if the login task died without reporting.
    pub async fn outcome(self) -> SessionResult<StoredSession> {
        self.outcome.await.unwrap_or(Err(SessionError::Aborted))
    }
}

struct Inner {
    settings: SessionSettings,
    http: Arc<dyn HttpClient>,
    store: Arc<dyn SessionCredentialStore>,
    clock: Arc<dyn Clock>,
    observer: RwLock<Arc<dyn SessionObserver>>,
    active: RwLock<Option<ControllerAddress>>,
    /// Attempts queued or running, per address.
    in_flight: Mutex<HashMap<ControllerAddress, usize>>,
    login_gate: tokio::sync::Mutex<()>,
}

/// Owns the session lifecycle for one application.
#[derive(Clone)]
pub struct AuthenticationSessionManager {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for AuthenticationSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationSessionManager")
            .field("settings", &self.inner.settings)
            .field("active", &*self.inner.active.read())
            .finish_non_exhaustive()
    }
}

impl AuthenticationSessionManager {
    /// Creates a manager with no active controller and no observer.
    #[must_use]
    pub fn new(
        settings: SessionSettings,
        http: Arc<dyn HttpClient>,
        store: Arc<dyn SessionCredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings,
                http,
                store,
                clock,
                observer: RwLock::new(Arc::new(NoopObserver)),
                active: RwLock::new(None),
                in_flight: Mutex::new(HashMap::new()),
                login_gate: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Replaces the event observer. Attempts already running report to the
    /// new observer from their next event on.
    pub fn set_observer(&self, observer: Arc<dyn SessionObserver>) {
        *self.inner.observer.write() = observer;
    }

    /// Settings the manager was built with.
    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.inner.settings
    }

    /// The controller set by the most recent `start_authentication`.
    #[must_use]
    pub fn active_address(&self) -> Option<ControllerAddress> {
        self.inner.active.read().clone()
    }

    /// Makes `address` the active controller without logging in.
    ///
    /// Lets a new process use a session persisted by an earlier one.
    pub fn select_controller(&self, address: impl Into<ControllerAddress>) {
        let address = address.into();
        tracing::debug!(address = %address, "controller selected");
        *self.inner.active.write() = Some(address);
    }

    /// Starts a login against `address` and returns immediately.
    ///
    /// Sets the active controller, emits `Started`, then runs the exchange on
    /// the Tokio runtime. The outcome arrives as exactly one `Succeeded` or
    /// `Failed` event and through the returned handle.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start_authentication(
        &self,
        address: impl Into<ControllerAddress>,
        credentials: Credentials,
    ) -> LoginHandle {
        let address = address.into();
        let attempt = LoginAttemptId::new();

        *self.inner.active.write() = Some(address.clone());
        *self
            .inner
            .in_flight
            .lock()
            .entry(address.clone())
            .or_insert(0) += 1;

        self.inner.emit(&SessionEvent::Started {
            attempt,
            address: address.clone(),
        });

        let (tx, rx) = oneshot::channel();
        let guard = AttemptGuard {
            inner: Arc::clone(&self.inner),
            attempt,
            address: address.clone(),
            outcome: Some(tx),
        };
        let span = tracing::info_span!("login", %attempt, address = %address);

        tokio::spawn(
            async move {
                let mut guard = guard;
                let result = guard
                    .inner
                    .login(attempt, &guard.address, &credentials)
                    .await;
                guard.settle(result);
            }
            .instrument(span),
        );

        LoginHandle {
            attempt,
            address,
            outcome: rx,
        }
    }

    /// Clears the stored session for the active controller.
    ///
    /// Idempotent; a no-op when nothing is stored or no controller is active.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store cannot be updated.
    pub async fn end_session(&self) -> SessionResult<()> {
        let Some(address) = self.active_address() else {
            return Ok(());
        };
        self.inner.store.clear(&address).await?;
        tracing::info!(address = %address, "controller session ended");
        Ok(())
    }

    /// Headers for an authenticated call to the active controller.
    ///
    /// Recomputed from the store on every call.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NoActiveController`] before any `start_authentication`.
    /// - [`SessionError::MissingSessionData`] if no usable session is stored.
    /// - [`SessionError::Store`] if the store itself fails.
    pub async fn auth_headers(&self) -> SessionResult<AuthHeaders> {
        let address = self
            .active_address()
            .ok_or(SessionError::NoActiveController)?;

        let session = match self.inner.store.load(&address).await {
            Ok(session) => session,
            Err(e) if e.is_not_authenticated() => {
                tracing::debug!(address = %address, error = %e, "no usable stored session");
                return Err(SessionError::MissingSessionData { address });
            }
            Err(e) => return Err(e.into()),
        };

        if session.cookies.is_empty() {
            return Err(SessionError::MissingSessionData { address });
        }

        // Expired cookies are still replayed; the controller has the final say.
        let expired = self.inner.clock.expired_cookies(&session).len();
        if expired > 0 {
            tracing::debug!(address = %address, expired, "stored session has expired cookies");
        }

        Ok(AuthHeaders::from_cookies(&session.cookies))
    }

    /// `scheme://address` for the active controller.
    #[must_use]
    pub fn base_url(&self) -> Option<String> {
        self.active_address()
            .map(|address| address.base_url(self.inner.settings.scheme))
    }

    /// `scheme://address<path>` for the active controller.
    #[must_use]
    pub fn service_url(&self, path: &str) -> Option<String> {
        self.active_address()
            .map(|address| address.service_url(self.inner.settings.scheme, path))
    }

    /// Authentication state of `address`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store fails for a reason other
    /// than a missing or corrupt entry.
    pub async fn session_state(&self, address: &ControllerAddress) -> SessionResult<SessionState> {
        if self.inner.in_flight.lock().contains_key(address) {
            return Ok(SessionState::Authenticating);
        }

        match self.inner.store.load(address).await {
            Ok(session) if !session.cookies.is_empty() => Ok(SessionState::Authenticated),
            Ok(_) => Ok(SessionState::Unauthenticated),
            Err(e) if e.is_not_authenticated() => Ok(SessionState::Unauthenticated),
            Err(e) => Err(e.into()),
        }
    }

    /// Builds an authenticated request for `path` on the active controller.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::auth_headers`].
    pub async fn authorized_request(
        &self,
        method: HttpMethod,
        path: &str,
    ) -> SessionResult<ControllerRequest> {
        let headers = self.auth_headers().await?;
        let url = self
            .service_url(path)
            .ok_or(SessionError::NoActiveController)?;

        let request = headers
            .entries()
            .into_iter()
            .fold(ControllerRequest::new(method, url), |request, (name, value)| {
                request.with_header(name, value)
            });
        Ok(request)
    }

    /// Sends an authenticated GET for `path` and returns the response as is.
    ///
    /// A 401/403 here means the controller dropped the session; the stored
    /// cookies are left in place and the caller decides whether to log in again.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::auth_headers`], or with [`SessionError::Transport`].
    pub async fn get(&self, path: &str) -> SessionResult<ControllerResponse> {
        let request = self.authorized_request(HttpMethod::Get, path).await?;
        tracing::debug!(url = %request.url, "controller call");
        Ok(self.inner.http.execute(&request).await?)
    }
}

/// Ends one login attempt: clears its in-flight mark, emits its terminal
/// event and resolves its handle. Dropped unsettled (the attempt panicked or
/// was cancelled), it still does all three, reporting `Aborted`.
struct AttemptGuard {
    inner: Arc<Inner>,
    attempt: LoginAttemptId,
    address: ControllerAddress,
    outcome: Option<oneshot::Sender<SessionResult<StoredSession>>>,
}

impl AttemptGuard {
    fn settle(&mut self, result: SessionResult<StoredSession>) {
        let Some(outcome) = self.outcome.take() else {
            return;
        };
        self.inner.finish(&self.address);

        let event = match &result {
            Ok(_) => {
                tracing::info!("controller session established");
                SessionEvent::Succeeded {
                    attempt: self.attempt,
                    address: self.address.clone(),
                }
            }
            Err(error) => {
                tracing::warn!(%error, "controller login failed");
                SessionEvent::Failed {
                    attempt: self.attempt,
                    address: self.address.clone(),
                    error: error.clone(),
                }
            }
        };
        self.inner.emit(&event);

        // The caller may have dropped the handle.
        let _ = outcome.send(result);
    }
}

impl Drop for AttemptGuard {
    fn drop(&mut self) {
        if self.outcome.is_some() {
            tracing::error!(attempt = %self.attempt, address = %self.address, "login attempt aborted");
            self.settle(Err(SessionError::Aborted));
        }
    }
}

impl Inner {
    fn emit(&self, event: &SessionEvent) {
        let observer = self.observer.read().clone();
        observer.notify(event);
    }

    fn finish(&self, address: &ControllerAddress) {
        let mut in_flight = self.in_flight.lock();
        if let Some(count) = in_flight.get_mut(address) {
            *count -= 1;
            if *count == 0 {
                in_flight.remove(address);
            }
        }
    }

    async fn login(
        &self,
        attempt: LoginAttemptId,
        address: &ControllerAddress,
        credentials: &Credentials,
    ) -> SessionResult<StoredSession> {
        let _gate = self.login_gate.lock().await;

        let request = build_login_request(&self.settings, address, credentials);
        tracing::debug!(method = %request.method, url = %request.url, user = credentials.username(), "sending login request");

        let response = self.http.execute(&request).await?;
        tracing::debug!(status = response.status, "login response received");

        let now = self.clock.now();
        let cookies = session_cookies(&response, address, now)?;
        let session = StoredSession::new(address.clone(), cookies, now);

        self.store.save(&session).await?;
        tracing::debug!(cookies = session.cookies.len(), "session cookies saved");
        self.emit(&SessionEvent::CookieSaved {
            attempt,
            address: address.clone(),
        });

        Ok(session)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::auth::InMemoryCredentialStore;
    use crate::ports::{CredentialStoreError, HttpClientError};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use dnac_domain::{Header, Headers, SessionCookie, SessionCookieSet};
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        }
    }

    /// Replays queued results and records every request it sees.
    #[derive(Default)]
    struct ScriptedHttpClient {
        responses: Mutex<VecDeque<Result<ControllerResponse, HttpClientError>>>,
        requests: Mutex<Vec<ControllerRequest>>,
        /// When set, each request waits for one permit before answering.
        gate: Option<Semaphore>,
    }

    impl ScriptedHttpClient {
        fn new(responses: Vec<Result<ControllerResponse, HttpClientError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                ..Self::default()
            }
        }

        fn gated(responses: Vec<Result<ControllerResponse, HttpClientError>>) -> Self {
            Self {
                gate: Some(Semaphore::new(0)),
                ..Self::new(responses)
            }
        }

        fn urls(&self) -> Vec<String> {
            self.requests.lock().iter().map(|r| r.url.clone()).collect()
        }
    }

    #[async_trait]
    impl HttpClient for ScriptedHttpClient {
        async fn execute(
            &self,
            request: &ControllerRequest,
        ) -> Result<ControllerResponse, HttpClientError> {
            self.requests.lock().push(request.clone());
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(HttpClientError::Other("no scripted response".into())))
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<SessionEvent>>,
    }

    impl RecordingObserver {
        fn events(&self) -> Vec<SessionEvent> {
            self.events.lock().clone()
        }

        fn count(&self, pred: impl Fn(&SessionEvent) -> bool) -> usize {
            self.events.lock().iter().filter(|e| pred(e)).count()
        }
    }

    impl SessionObserver for RecordingObserver {
        fn notify(&self, event: &SessionEvent) {
            self.events.lock().push(event.clone());
        }
    }

    struct CorruptStore;

    #[async_trait]
    impl SessionCredentialStore for CorruptStore {
        async fn save(&self, _session: &StoredSession) -> Result<(), CredentialStoreError> {
            Err(CredentialStoreError::Storage("disk full".into()))
        }

        async fn load(
            &self,
            address: &ControllerAddress,
        ) -> Result<StoredSession, CredentialStoreError> {
            Err(CredentialStoreError::Corrupt {
                address: address.clone(),
                reason: "expected value at line 1".into(),
            })
        }

        async fn clear(&self, _address: &ControllerAddress) -> Result<(), CredentialStoreError> {
            Ok(())
        }

        async fn addresses(&self) -> Result<Vec<ControllerAddress>, CredentialStoreError> {
            Ok(vec![])
        }
    }

    fn ok_with_cookie(cookie: &str) -> Result<ControllerResponse, HttpClientError> {
        let headers: Headers = std::iter::once(Header::new("Set-Cookie", cookie)).collect();
        Ok(ControllerResponse::new(200, headers, "{}"))
    }

    fn status(code: u16) -> Result<ControllerResponse, HttpClientError> {
        Ok(ControllerResponse::new(code, Headers::new(), ""))
    }

    struct Fixture {
        manager: AuthenticationSessionManager,
        http: Arc<ScriptedHttpClient>,
        store: InMemoryCredentialStore,
        observer: Arc<RecordingObserver>,
    }

    fn fixture(http: ScriptedHttpClient) -> Fixture {
        let http = Arc::new(http);
        let store = InMemoryCredentialStore::new();
        let observer = Arc::new(RecordingObserver::default());
        let manager = AuthenticationSessionManager::new(
            SessionSettings::default(),
            http.clone(),
            Arc::new(store.clone()),
            Arc::new(FixedClock),
        );
        manager.set_observer(observer.clone());
        Fixture {
            manager,
            http,
            store,
            observer,
        }
    }

    fn seed(address: &str, value: &str) -> StoredSession {
        let cookies: SessionCookieSet =
            std::iter::once(SessionCookie::new("session", value, address)).collect();
        StoredSession::new(ControllerAddress::new(address), cookies, FixedClock.now())
    }

    #[tokio::test]
    async fn test_successful_login_persists_cookie_and_notifies_once() {
        let f = fixture(ScriptedHttpClient::new(vec![ok_with_cookie(
            "session=abc123; Path=/",
        )]));

        let handle = f
            .manager
            .start_authentication("10.0.0.1", Credentials::new("user", "pass"));
        let attempt = handle.attempt();
        let session = handle.outcome().await.unwrap();
        assert_eq!(session.cookies.get("session").unwrap().value, "abc123");

        let address = ControllerAddress::new("10.0.0.1");
        assert_eq!(
            f.observer.events(),
            vec![
                SessionEvent::Started {
                    attempt,
                    address: address.clone()
                },
                SessionEvent::CookieSaved {
                    attempt,
                    address: address.clone()
                },
                SessionEvent::Succeeded {
                    attempt,
                    address: address.clone()
                },
            ]
        );

        let stored = f.store.load(&address).await.unwrap();
        assert_eq!(stored.cookies.get("session").unwrap().value, "abc123");
        assert_eq!(stored.saved_at, FixedClock.now());

        let headers = f.manager.auth_headers().await.unwrap();
        assert!(headers.cookie().contains("session=abc123"));
        assert_eq!(headers.get("verify"), Some("False"));
        assert_eq!(headers.get("Content-Type"), Some("application/json"));

        let requests = f.http.requests.lock().clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://10.0.0.1/api/system/v1/auth/login"
        );
        assert_eq!(
            requests[0].headers.get("Authorization"),
            Some("Basic dXNlcjpwYXNz")
        );
    }

    #[tokio::test]
    async fn test_rejected_login_keeps_prior_cookie() {
        let f = fixture(ScriptedHttpClient::new(vec![status(401)]));
        f.store.save(&seed("10.0.0.1", "previous")).await.unwrap();

        let err = f
            .manager
            .start_authentication("10.0.0.1", Credentials::new("user", "wrong"))
            .outcome()
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::AuthRejected { status: 401 });

        assert_eq!(
            f.observer
                .count(|e| matches!(e, SessionEvent::Failed { .. })),
            1
        );
        assert_eq!(
            f.observer
                .count(|e| matches!(e, SessionEvent::Succeeded { .. } | SessionEvent::CookieSaved { .. })),
            0
        );

        let stored = f.store.load(&ControllerAddress::new("10.0.0.1")).await.unwrap();
        assert_eq!(stored.cookies.get("session").unwrap().value, "previous");
    }

    #[tokio::test]
    async fn test_transport_error_reports_failure() {
        let f = fixture(ScriptedHttpClient::new(vec![Err(
            HttpClientError::ConnectionRefused {
                host: "10.0.0.9".into(),
                port: 443,
            },
        )]));

        let err = f
            .manager
            .start_authentication("10.0.0.9", Credentials::new("u", "p"))
            .outcome()
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Transport(_)));
        assert!(err.is_retryable());
        let events = f.observer.events();
        assert!(matches!(
            events.last(),
            Some(SessionEvent::Failed { error: SessionError::Transport(_), .. })
        ));
        assert_eq!(f.store.count().await, 0);
    }

    #[tokio::test]
    async fn test_ok_without_cookie_fails() {
        let f = fixture(ScriptedHttpClient::new(vec![status(200)]));

        let err = f
            .manager
            .start_authentication("10.0.0.1", Credentials::new("u", "p"))
            .outcome()
            .await
            .unwrap_err();

        assert_eq!(err, SessionError::MissingSessionCookie);
        assert_eq!(f.store.count().await, 0);
    }

    #[tokio::test]
    async fn test_store_failure_reports_failure_without_cookie_saved() {
        let http = Arc::new(ScriptedHttpClient::new(vec![ok_with_cookie("session=abc")]));
        let observer = Arc::new(RecordingObserver::default());
        let manager = AuthenticationSessionManager::new(
            SessionSettings::default(),
            http,
            Arc::new(CorruptStore),
            Arc::new(FixedClock),
        );
        manager.set_observer(observer.clone());

        let err = manager
            .start_authentication("10.0.0.1", Credentials::new("u", "p"))
            .outcome()
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Store(CredentialStoreError::Storage(_))));
        assert_eq!(
            observer.count(|e| matches!(e, SessionEvent::CookieSaved { .. })),
            0
        );
    }

    #[tokio::test]
    async fn test_auth_headers_before_login_fails() {
        let f = fixture(ScriptedHttpClient::default());
        assert_eq!(
            f.manager.auth_headers().await.unwrap_err(),
            SessionError::NoActiveController
        );
    }

    #[tokio::test]
    async fn test_auth_headers_for_never_authenticated_address_fails() {
        let f = fixture(ScriptedHttpClient::new(vec![status(403)]));
        let _ = f
            .manager
            .start_authentication("10.0.0.2", Credentials::new("u", "p"))
            .outcome()
            .await;

        assert_eq!(
            f.manager.auth_headers().await.unwrap_err(),
            SessionError::MissingSessionData {
                address: ControllerAddress::new("10.0.0.2")
            }
        );
    }

    #[tokio::test]
    async fn test_corrupt_store_is_not_authenticated() {
        let http = Arc::new(ScriptedHttpClient::new(vec![status(500)]));
        let manager = AuthenticationSessionManager::new(
            SessionSettings::default(),
            http,
            Arc::new(CorruptStore),
            Arc::new(FixedClock),
        );
        let address = ControllerAddress::new("10.0.0.1");
        let _ = manager
            .start_authentication(address.clone(), Credentials::new("u", "p"))
            .outcome()
            .await;

        assert_eq!(
            manager.auth_headers().await.unwrap_err(),
            SessionError::MissingSessionData {
                address: address.clone()
            }
        );
        assert_eq!(
            manager.session_state(&address).await.unwrap(),
            SessionState::Unauthenticated
        );
    }

    #[tokio::test]
    async fn test_end_session_is_idempotent() {
        let f = fixture(ScriptedHttpClient::new(vec![ok_with_cookie("session=abc")]));
        let address = ControllerAddress::new("10.0.0.1");
        f.manager
            .start_authentication(address.clone(), Credentials::new("u", "p"))
            .outcome()
            .await
            .unwrap();
        assert_eq!(
            f.manager.session_state(&address).await.unwrap(),
            SessionState::Authenticated
        );

        f.manager.end_session().await.unwrap();
        f.manager.end_session().await.unwrap();

        assert_eq!(
            f.manager.session_state(&address).await.unwrap(),
            SessionState::Unauthenticated
        );
        assert!(f.store.load(&address).await.is_err());
        assert!(f.manager.auth_headers().await.is_err());
    }

    #[tokio::test]
    async fn test_end_session_without_active_controller_is_noop() {
        let f = fixture(ScriptedHttpClient::default());
        f.manager.end_session().await.unwrap();
        assert_eq!(f.manager.active_address(), None);
    }

    #[tokio::test]
    async fn test_switching_controller_keeps_previous_cookies() {
        let f = fixture(ScriptedHttpClient::new(vec![
            ok_with_cookie("session=first"),
            ok_with_cookie("session=second"),
        ]));

        f.manager
            .start_authentication("10.0.0.1", Credentials::new("u", "p"))
            .outcome()
            .await
            .unwrap();
        f.manager
            .start_authentication("10.0.0.2", Credentials::new("u", "p"))
            .outcome()
            .await
            .unwrap();

        assert_eq!(
            f.manager.active_address(),
            Some(ControllerAddress::new("10.0.0.2"))
        );
        assert_eq!(
            f.manager.auth_headers().await.unwrap().cookie(),
            "session=second"
        );
        let first = f.store.load(&ControllerAddress::new("10.0.0.1")).await.unwrap();
        assert_eq!(first.cookies.get("session").unwrap().value, "first");
    }

    #[tokio::test]
    async fn test_relogin_keeps_old_cookie_until_success() {
        let f = fixture(ScriptedHttpClient::gated(vec![ok_with_cookie("session=new")]));
        let address = ControllerAddress::new("10.0.0.1");
        f.store.save(&seed("10.0.0.1", "old")).await.unwrap();

        let handle = f
            .manager
            .start_authentication(address.clone(), Credentials::new("u", "p"));
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(
            f.manager.session_state(&address).await.unwrap(),
            SessionState::Authenticating
        );
        assert_eq!(f.manager.auth_headers().await.unwrap().cookie(), "session=old");

        f.http.gate.as_ref().unwrap().add_permits(1);
        handle.outcome().await.unwrap();

        assert_eq!(
            f.manager.session_state(&address).await.unwrap(),
            SessionState::Authenticated
        );
        assert_eq!(f.manager.auth_headers().await.unwrap().cookie(), "session=new");
    }

    #[tokio::test]
    async fn test_overlapping_logins_are_serialized_and_reported_per_address() {
        let f = fixture(ScriptedHttpClient::gated(vec![
            status(401),
            ok_with_cookie("session=b"),
        ]));
        let a = ControllerAddress::new("10.0.0.1");
        let b = ControllerAddress::new("10.0.0.2");

        let first = f
            .manager
            .start_authentication(a.clone(), Credentials::new("u", "p"));
        let second = f
            .manager
            .start_authentication(b.clone(), Credentials::new("u", "p"));
        tokio::time::sleep(Duration::from_millis(20)).await;

        // The second exchange waits for the first.
        assert_eq!(f.http.urls().len(), 1);
        assert_eq!(f.manager.active_address(), Some(b.clone()));

        f.http.gate.as_ref().unwrap().add_permits(2);
        let first_attempt = first.attempt();
        let second_attempt = second.attempt();
        assert!(first.outcome().await.is_err());
        assert!(second.outcome().await.is_ok());

        assert_eq!(
            f.http.urls(),
            vec![
                "https://10.0.0.1/api/system/v1/auth/login".to_string(),
                "https://10.0.0.2/api/system/v1/auth/login".to_string(),
            ]
        );

        let terminal: Vec<_> = f
            .observer
            .events()
            .into_iter()
            .filter(SessionEvent::is_terminal)
            .collect();
        assert_eq!(terminal.len(), 2);
        assert!(terminal.iter().any(|e| matches!(
            e,
            SessionEvent::Failed { attempt, address, .. } if *attempt == first_attempt && *address == a
        )));
        assert!(terminal.iter().any(|e| matches!(
            e,
            SessionEvent::Succeeded { attempt, address } if *attempt == second_attempt && *address == b
        )));
    }

    #[tokio::test]
    async fn test_urls_follow_active_controller() {
        let f = fixture(ScriptedHttpClient::new(vec![status(401)]));
        assert_eq!(f.manager.base_url(), None);

        let _ = f
            .manager
            .start_authentication("dnac.lab:8443", Credentials::new("u", "p"))
            .outcome()
            .await;

        assert_eq!(f.manager.base_url().as_deref(), Some("https://dnac.lab:8443"));
        assert_eq!(
            f.manager
                .service_url("/dna/intent/api/v1/network-device")
                .as_deref(),
            Some("https://dnac.lab:8443/dna/intent/api/v1/network-device")
        );
    }

    #[tokio::test]
    async fn test_get_attaches_session_headers() {
        let f = fixture(ScriptedHttpClient::new(vec![
            ok_with_cookie("X-JWT-ACCESS-TOKEN=tok"),
            Ok(ControllerResponse::new(200, Headers::new(), r#"{"response": []}"#)),
        ]));
        f.manager
            .start_authentication("10.0.0.1", Credentials::new("u", "p"))
            .outcome()
            .await
            .unwrap();

        let response = f.manager.get("/api/v1/network-device").await.unwrap();
        assert_eq!(response.body, r#"{"response": []}"#);

        let requests = f.http.requests.lock().clone();
        let call = &requests[1];
        assert_eq!(call.url, "https://10.0.0.1/api/v1/network-device");
        assert_eq!(call.headers.get("Cookie"), Some("X-JWT-ACCESS-TOKEN=tok"));
        assert_eq!(call.headers.get("verify"), Some("False"));
        assert_eq!(call.headers.get("Authorization"), None);
    }

    #[tokio::test]
    async fn test_select_controller_reuses_stored_session() {
        let f = fixture(ScriptedHttpClient::default());
        let cookies: SessionCookieSet =
            std::iter::once(SessionCookie::new("session", "persisted", "10.0.0.1")).collect();
        f.store
            .save(&StoredSession::new(
                ControllerAddress::new("10.0.0.1"),
                cookies,
                FixedClock.now(),
            ))
            .await
            .unwrap();

        f.manager.select_controller("10.0.0.1");

        let headers = f.manager.auth_headers().await.unwrap();
        assert_eq!(headers.cookie(), "session=persisted");
        assert!(f.http.urls().is_empty());
        assert!(f.observer.events().is_empty());
    }

    #[tokio::test]
    async fn test_unbounded_max_age_still_logs_in() {
        let f = fixture(ScriptedHttpClient::new(vec![ok_with_cookie(
            "session=abc; Max-Age=9223372036854775807; Path=/",
        )]));

        let session = f
            .manager
            .start_authentication("10.0.0.1", Credentials::new("u", "p"))
            .outcome()
            .await
            .unwrap();

        assert_eq!(session.cookies.get("session").unwrap().expires, None);
        assert_eq!(
            f.observer.count(|e| matches!(e, SessionEvent::Succeeded { .. })),
            1
        );
        assert_eq!(
            f.manager
                .session_state(&ControllerAddress::new("10.0.0.1"))
                .await
                .unwrap(),
            SessionState::Authenticated
        );
    }

    /// Store whose `save` panics, standing in for any bug inside an attempt.
    struct PanickingStore;

    #[async_trait]
    impl SessionCredentialStore for PanickingStore {
        async fn save(&self, _session: &StoredSession) -> Result<(), CredentialStoreError> {
            panic!("store exploded");
        }

        async fn load(
            &self,
            address: &ControllerAddress,
        ) -> Result<StoredSession, CredentialStoreError> {
            Err(CredentialStoreError::NotFound(address.clone()))
        }

        async fn clear(&self, _address: &ControllerAddress) -> Result<(), CredentialStoreError> {
            Ok(())
        }

        async fn addresses(&self) -> Result<Vec<ControllerAddress>, CredentialStoreError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_panicking_attempt_reports_one_failure_and_settles_state() {
        let observer = Arc::new(RecordingObserver::default());
        let manager = AuthenticationSessionManager::new(
            SessionSettings::default(),
            Arc::new(ScriptedHttpClient::new(vec![ok_with_cookie("session=abc")])),
            Arc::new(PanickingStore),
            Arc::new(FixedClock),
        );
        manager.set_observer(observer.clone());

        let err = manager
            .start_authentication("10.0.0.1", Credentials::new("u", "p"))
            .outcome()
            .await
            .unwrap_err();

        assert_eq!(err, SessionError::Aborted);
        assert_eq!(observer.count(SessionEvent::is_terminal), 1);
        assert!(matches!(
            observer.events().last(),
            Some(SessionEvent::Failed {
                error: SessionError::Aborted,
                ..
            })
        ));
        assert_eq!(
            manager
                .session_state(&ControllerAddress::new("10.0.0.1"))
                .await
                .unwrap(),
            SessionState::Unauthenticated
        );
    }
}
