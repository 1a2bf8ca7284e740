//! View models shared by the front ends.
//!
//! Each view gathers what one page needs. When a page needs more than one
//! request, they run concurrently and the view only exists once all of them
//! succeeded; any failure turns the whole view into `LoadState::Failed`.

pub mod client_details;
pub mod dashboard;
pub mod policy_form;

use tracing::warn;

use crate::api::ApiError;
use crate::models::Client;

pub use client_details::ClientDetails;
pub use dashboard::{greeting, Dashboard, DashboardTab, PolicyRow};
pub use policy_form::PolicyFormOptions;

/// Loading state of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> LoadState<T> {
    /// Convert a fetch result, logging the failure. The session is never
    /// touched here, whatever the error was; a refused credential only
    /// changes the message.
    pub fn from_result(result: anyhow::Result<T>, view: &str) -> Self {
        match result {
            Ok(value) => LoadState::Ready(value),
            Err(e) => {
                warn!(view = view, error = %e, "Failed to load view");
                let rejected = e
                    .downcast_ref::<ApiError>()
                    .is_some_and(ApiError::is_auth_failure);
                if rejected {
                    LoadState::Failed(format!("{:#}. Your session was rejected, log in again.", e))
                } else {
                    LoadState::Failed(format!("{:#}", e))
                }
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Clients whose name or email contains `term`, in their original order.
pub fn filter_clients<'a>(clients: &'a [Client], term: &str) -> Vec<&'a Client> {
    clients.iter().filter(|c| c.matches_search(term)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_state_from_result() {
        let ok: LoadState<u32> = LoadState::from_result(Ok(3), "test");
        assert_eq!(ok.ready(), Some(&3));
        assert!(ok.error().is_none());

        let failed: LoadState<u32> =
            LoadState::from_result(Err(ApiError::NotFound("missing".into()).into()), "test");
        assert_eq!(failed.error(), Some("Resource not found: missing"));
        assert!(failed.ready().is_none());
        assert!(!failed.is_loading());
    }

    #[test]
    fn test_refused_credential_asks_for_login() {
        let failed: LoadState<u32> =
            LoadState::from_result(Err(ApiError::Unauthorized.into()), "test");
        let message = failed.error().unwrap();
        assert!(message.starts_with("Unauthorized"), "{}", message);
        assert!(message.ends_with("log in again."));

        let not_found: LoadState<u32> =
            LoadState::from_result(Err(ApiError::NotFound("x".into()).into()), "test");
        assert!(!not_found.error().unwrap().contains("log in again"));
    }

    #[test]
    fn test_filter_clients() {
        let clients: Vec<Client> = serde_json::from_str(
            r#"[
                {"id": 1, "name": "Priya Sharma", "email": "priya@example.com"},
                {"id": 2, "name": "Ravi Kumar", "email": "ravi@example.com"},
                {"id": 3, "name": "Anita Rao", "email": "anita@sharma-family.net"}
            ]"#,
        )
        .unwrap();

        let ids: Vec<i64> = filter_clients(&clients, "SHARMA").iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(filter_clients(&clients, "").len(), 3);
        assert!(filter_clients(&clients, "nobody").is_empty());
    }
}
