//! REST API client module for the Revenue Guardian back office.
//!
//! This module provides the `ApiClient` for logging in and for the client,
//! policy and carrier endpoints.
//!
//! The API uses JWT bearer token authentication. Every request made while a
//! session is authenticated carries the session's access token; the login
//! request never does.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
