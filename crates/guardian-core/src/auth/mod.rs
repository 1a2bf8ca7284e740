//! Authentication: token storage, session lifecycle and route gating.
//!
//! This module provides:
//! - `TokenStore`: persistence of the access/refresh tokens under fixed keys
//! - `SessionManager`: the login/logout state machine and its subscribers
//! - `AuthGate`: decides whether a protected route may render
//! - `claims`: side-effect-free decoding of a token's identity claims

pub mod claims;
pub mod credentials;
pub mod gate;
pub mod session;
pub mod store;

pub use claims::{Claims, DecodeError};
pub use credentials::KeyringStorage;
pub use gate::{Access, AuthGate, GateDecision};
pub use session::{LoginError, LogoutReason, Session, SessionEvent, SessionManager, SessionStatus};
pub use store::{Credential, FileStorage, KeyValueStore, MemoryStorage, TokenPair, TokenStore};
