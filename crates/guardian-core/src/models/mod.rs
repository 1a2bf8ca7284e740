//! Data models for back-office entities.
//!
//! This module contains the structures exchanged with the REST API:
//!
//! - `Client`, `ClientDraft`: policy holders owned by the logged-in agent
//! - `Carrier`: insurance companies (reference data for policy forms)
//! - `Policy`, `PolicyDraft`, `PolicyStatus`, `PolicyType`: insurance contracts
//! - `UserProfile`: the agent behind the current session
//!
//! Server responses are read tolerantly: missing fields fall back to
//! defaults and display helpers substitute placeholders.

pub mod carrier;
pub mod client;
pub mod policy;
pub mod user;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

pub use carrier::Carrier;
pub use client::{Client, ClientDraft};
pub use policy::{Policy, PolicyDraft, PolicyStatus, PolicyType};
pub use user::UserProfile;

/// A draft rejected before it was sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Enter a valid email address")]
    InvalidEmail,

    #[error("Gender must be M, F or O")]
    InvalidGender,

    #[error("{0} must be a non-negative amount")]
    InvalidAmount(&'static str),

    #[error("End date must be after start date.")]
    EndBeforeStart,

    #[error("Unknown {0} selected")]
    UnknownSelection(&'static str),
}

/// Decimal fields arrive as strings ("1200.00") but some servers send numbers.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
