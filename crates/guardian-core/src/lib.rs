//! Core library for the Revenue Guardian agent back office.
//!
//! This crate holds everything the front ends share:
//!
//! - `auth`: token storage, the session state machine, and the route gate
//! - `api`: the REST client that attaches the session's bearer token
//! - `models`: clients, carriers, policies and their editable drafts
//! - `renewals`: renewal-window and status-tag classification
//! - `views`: view models that join and shape fetched data for display
//! - `config`, `clock`, `routes`, `utils`: supporting pieces

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod models;
pub mod renewals;
pub mod routes;
pub mod utils;
pub mod views;

pub use api::{ApiClient, ApiError};
pub use auth::{
    Access, AuthGate, Claims, Credential, GateDecision, LoginError, LogoutReason, Session,
    SessionEvent, SessionManager, SessionStatus, TokenPair, TokenStore,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, StorageBackend};
pub use routes::Route;
