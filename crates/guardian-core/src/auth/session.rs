//! The session state machine.
//!
//! [`SessionManager`] is the only writer of authentication state. Everyone
//! else reads immutable [`Session`] snapshots, either on demand or by
//! subscribing to changes, and learns about login/logout transitions through
//! [`SessionEvent`]s that also say where the UI should navigate next.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::clock::Clock;
use crate::routes::Route;

use super::claims::{self, Claims, DecodeError};
use super::store::{Credential, TokenPair, TokenStore};

/// Capacity of the session event channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Anonymous,
    Authenticating,
    Authenticated,
}

/// Snapshot of who is logged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    identity: Option<Claims>,
    status: SessionStatus,
    credential: Option<Credential>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self {
            identity: None,
            status: SessionStatus::Anonymous,
            credential: None,
        }
    }

    fn authenticating() -> Self {
        Self {
            identity: None,
            status: SessionStatus::Authenticating,
            credential: None,
        }
    }

    fn authenticated(claims: Claims, credential: Credential) -> Self {
        Self {
            identity: Some(claims),
            status: SessionStatus::Authenticated,
            credential: Some(credential),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn identity(&self) -> Option<&Claims> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    /// The bearer token to present, only while authenticated.
    pub fn credential(&self) -> Option<&Credential> {
        if self.is_authenticated() {
            self.credential.as_ref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    UserRequested,
    Expired,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { username: String },
    LoggedOut { reason: LogoutReason },
}

impl SessionEvent {
    /// Where the UI should go after this transition.
    pub fn destination(&self) -> Route {
        match self {
            SessionEvent::LoggedIn { .. } => Route::Dashboard,
            SessionEvent::LoggedOut { .. } => Route::Login,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Username and password required")]
    MissingCredentials,

    #[error("Invalid username or password")]
    Rejected,

    #[error("Connection timed out. Please try again.")]
    Timeout,

    #[error("Unable to connect to server. Check your internet connection.")]
    Unreachable(String),

    #[error("Login failed: {0}")]
    Server(String),

    #[error("Server returned an unreadable token: {0}")]
    InvalidToken(#[from] DecodeError),

    #[error("Server returned a token that has already expired")]
    ExpiredToken,
}

impl LoginError {
    /// Classify a failed authentication request.
    fn from_request(err: anyhow::Error) -> Self {
        if let Some(api) = err.downcast_ref::<ApiError>() {
            return match api {
                ApiError::Unauthorized | ApiError::BadRequest(_) => LoginError::Rejected,
                ApiError::NetworkError(e) => Self::from_transport(e),
                other => LoginError::Server(other.to_string()),
            };
        }
        if let Some(e) = err.downcast_ref::<reqwest::Error>() {
            return Self::from_transport(e);
        }
        LoginError::Server(format!("{:#}", err))
    }

    fn from_transport(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            LoginError::Timeout
        } else {
            LoginError::Unreachable(e.to_string())
        }
    }
}

pub struct SessionManager {
    store: TokenStore,
    clock: Arc<dyn Clock>,
    state: watch::Sender<Session>,
    events: broadcast::Sender<SessionEvent>,
    // Bumped every time a session ends
    generation: AtomicU64,
}

impl SessionManager {
    /// Create a manager over the given store. If the store holds a token the
    /// session starts out `Authenticating` until [`restore`](Self::restore)
    /// has decided whether it is still good.
    pub fn new(store: TokenStore, clock: Arc<dyn Clock>) -> Self {
        let initial = if store.load().is_some() {
            Session::authenticating()
        } else {
            Session::anonymous()
        };
        let (state, _) = watch::channel(initial);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            store,
            clock,
            state,
            events,
            generation: AtomicU64::new(0),
        }
    }

    /// Create a manager and immediately restore any stored session.
    pub fn open(store: TokenStore, clock: Arc<dyn Clock>) -> Self {
        let manager = Self::new(store, clock);
        manager.restore();
        manager
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receive every new session snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Receive login/logout transitions.
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// The current instant according to the session's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Today's date according to the session's clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Decide the startup state from whatever the token store holds.
    pub fn restore(&self) -> SessionStatus {
        let Some(credential) = self.store.load() else {
            debug!("No stored token");
            self.state.send_replace(Session::anonymous());
            return SessionStatus::Anonymous;
        };

        match claims::parse(credential.as_str()) {
            Ok(claims) if !claims.is_expired(self.clock.now()) => {
                debug!(
                    user = claims.display_name(),
                    minutes_left = claims.minutes_until_expiry(self.clock.now()),
                    "Restored stored session"
                );
                self.state
                    .send_replace(Session::authenticated(claims, credential));
                SessionStatus::Authenticated
            }
            Ok(_) => {
                info!("Stored session has expired");
                self.end(LogoutReason::Expired);
                SessionStatus::Anonymous
            }
            Err(e) => {
                warn!(error = %e, "Stored token could not be decoded");
                self.end(LogoutReason::Invalid);
                SessionStatus::Anonymous
            }
        }
    }

    /// Re-check expiry of the current session, ending it if the token has
    /// run out. Returns the snapshot after the check.
    pub fn validate(&self) -> Session {
        let expired = {
            let session = self.state.borrow();
            session.is_authenticated()
                && session
                    .identity
                    .as_ref()
                    .map_or(true, |claims| claims.is_expired(self.clock.now()))
        };
        if expired {
            info!("Session expired");
            self.end(LogoutReason::Expired);
        }
        self.snapshot()
    }

    /// Exchange a username and password for a session.
    ///
    /// Nothing is written to the token store unless the server accepted the
    /// credentials and returned a token that decodes and has not expired. On
    /// failure the previous session is put back untouched, unless the session
    /// was ended while the request was in flight.
    pub async fn login(
        &self,
        api: &ApiClient,
        username: &str,
        password: &str,
    ) -> Result<Claims, LoginError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let previous = self.state.send_replace(Session::authenticating());

        match self.authenticate(api, username.trim(), password).await {
            Ok((claims, tokens)) => {
                if let Err(e) = self.store.save(&tokens) {
                    warn!(error = %e, "Failed to persist tokens, session will not survive a restart");
                }
                let credential = Credential::new(tokens.access);
                self.state
                    .send_replace(Session::authenticated(claims.clone(), credential));
                info!(user = claims.display_name(), "Login successful");
                let _ = self.events.send(SessionEvent::LoggedIn {
                    username: claims.display_name().to_string(),
                });
                Ok(claims)
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                let restored = self.state.send_if_modified(|current| {
                    if self.generation.load(Ordering::SeqCst) != generation {
                        return false;
                    }
                    *current = previous;
                    true
                });
                if !restored {
                    debug!("Session ended during login, not restoring it");
                }
                Err(e)
            }
        }
    }

    async fn authenticate(
        &self,
        api: &ApiClient,
        username: &str,
        password: &str,
    ) -> Result<(Claims, TokenPair), LoginError> {
        let tokens = api
            .authenticate(username, password)
            .await
            .map_err(LoginError::from_request)?;
        let claims = claims::parse(&tokens.access)?;
        if claims.is_expired(self.clock.now()) {
            return Err(LoginError::ExpiredToken);
        }
        Ok((claims, tokens))
    }

    /// End the session. Safe to call when nobody is logged in; subscribers
    /// are notified either way.
    pub fn logout(&self) {
        self.end(LogoutReason::UserRequested);
    }

    fn end(&self, reason: LogoutReason) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear stored tokens");
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(Session::anonymous());
        debug!(?reason, "Session ended");
        let _ = self.events.send(SessionEvent::LoggedOut { reason });
    }
}
