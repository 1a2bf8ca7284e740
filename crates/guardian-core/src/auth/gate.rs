//! Route-level access control.
//!
//! The gate holds no state of its own. Every evaluation re-reads the live
//! session (after an expiry check), so a logout from anywhere revokes access
//! on the very next render.

use std::sync::Arc;

use tokio::sync::watch;

use crate::routes::Route;

use super::claims::Claims;
use super::session::{Session, SessionManager, SessionStatus};

/// What the current session allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Session is still being resolved
    Pending,
    Granted(Claims),
    Denied,
}

impl Access {
    pub fn from_session(session: &Session) -> Self {
        match session.status() {
            SessionStatus::Authenticating => Access::Pending,
            SessionStatus::Authenticated => match session.identity() {
                Some(claims) => Access::Granted(claims.clone()),
                None => Access::Denied,
            },
            SessionStatus::Anonymous => Access::Denied,
        }
    }
}

/// Outcome of rendering through the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision<T> {
    /// Show a neutral loading indicator
    Loading,
    Render(T),
    Redirect(Route),
}

impl<T> GateDecision<T> {
    pub fn is_render(&self) -> bool {
        matches!(self, GateDecision::Render(_))
    }
}

#[derive(Clone)]
pub struct AuthGate {
    session: Arc<SessionManager>,
}

impl AuthGate {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    pub fn check(&self) -> Access {
        Access::from_session(&self.session.validate())
    }

    /// Render protected content. `children` only runs when the session is
    /// authenticated.
    pub fn render<T, F>(&self, children: F) -> GateDecision<T>
    where
        F: FnOnce(&Claims) -> T,
    {
        match self.check() {
            Access::Pending => GateDecision::Loading,
            Access::Granted(claims) => GateDecision::Render(children(&claims)),
            Access::Denied => GateDecision::Redirect(Route::Login),
        }
    }

    /// Render a route, gating it only if it is protected.
    pub fn guard<T, F>(&self, route: &Route, children: F) -> GateDecision<T>
    where
        F: FnOnce(Option<&Claims>) -> T,
    {
        if !route.is_protected() {
            let session = self.session.snapshot();
            return GateDecision::Render(children(session.identity()));
        }
        self.render(|claims| children(Some(claims)))
    }

    /// Session changes to re-render on.
    pub fn changes(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::tests::{manager_at, noon, token_expiring_at};
    use crate::auth::store::{KeyValueStore, MemoryStorage, ACCESS_KEY};
    use chrono::Duration;

    fn gate_with_token(valid_for: Duration) -> (AuthGate, Arc<SessionManager>) {
        let storage = MemoryStorage::new();
        storage.set(ACCESS_KEY, &token_expiring_at(noon() + valid_for)).unwrap();
        let manager = Arc::new(manager_at(storage, noon()));
        (AuthGate::new(manager.clone()), manager)
    }

    #[test]
    fn test_loading_while_resolving() {
        let (gate, _manager) = gate_with_token(Duration::hours(1));
        let mut rendered = false;
        let decision = gate.render(|_| rendered = true);
        assert_eq!(decision, GateDecision::Loading);
        assert!(!rendered);
    }

    #[test]
    fn test_renders_when_authenticated() {
        let (gate, manager) = gate_with_token(Duration::hours(1));
        manager.restore();

        let decision = gate.render(|claims| claims.display_name().to_string());
        assert_eq!(decision, GateDecision::Render("agent.smith".to_string()));
    }

    #[test]
    fn test_redirects_when_anonymous() {
        let manager = Arc::new(manager_at(MemoryStorage::new(), noon()));
        let gate = AuthGate::new(manager);

        let mut rendered = false;
        let decision = gate.render(|_| rendered = true);
        assert_eq!(decision, GateDecision::Redirect(Route::Login));
        assert!(!rendered);
    }

    #[test]
    fn test_logout_revokes_immediately() {
        let (gate, manager) = gate_with_token(Duration::hours(1));
        manager.restore();
        assert!(gate.render(|_| ()).is_render());

        manager.logout();

        assert_eq!(gate.check(), Access::Denied);
        assert_eq!(gate.render(|_| ()), GateDecision::Redirect(Route::Login));
    }

    #[test]
    fn test_never_renders_for_anonymous_across_lifecycle() {
        let (gate, manager) = gate_with_token(Duration::hours(1));
        let mut rx = gate.changes();

        let mut observed = vec![gate.render(|_| ())];
        manager.restore();
        observed.push(gate.render(|_| ()));
        manager.logout();
        observed.push(gate.render(|_| ()));
        manager.logout();
        observed.push(gate.render(|_| ()));

        assert_eq!(
            observed,
            vec![
                GateDecision::Loading,
                GateDecision::Render(()),
                GateDecision::Redirect(Route::Login),
                GateDecision::Redirect(Route::Login),
            ]
        );
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().status(), SessionStatus::Anonymous);
    }

    #[test]
    fn test_login_route_is_public() {
        let manager = Arc::new(manager_at(MemoryStorage::new(), noon()));
        let gate = AuthGate::new(manager);

        let decision = gate.guard(&Route::Login, |claims| claims.is_none());
        assert_eq!(decision, GateDecision::Render(true));

        let protected = gate.guard(&Route::Clients, |_| ());
        assert_eq!(protected, GateDecision::Redirect(Route::Login));
    }

    #[test]
    fn test_access_from_session() {
        assert_eq!(Access::from_session(&Session::anonymous()), Access::Denied);
    }
}
