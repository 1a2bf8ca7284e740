//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, TimeZone, Utc};
use guardian_core::auth::MemoryStorage;
use guardian_core::{ApiClient, FixedClock, SessionManager, TokenStore};
use serde_json::{json, Value};
use wiremock::MockServer;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
}

fn segment(value: &Value) -> String {
    URL_SAFE_NO_PAD.encode(value.to_string())
}

/// An unsigned token for user 42 valid for `valid_for` from [`now`].
pub fn access_token(valid_for: Duration) -> String {
    let exp = now() + valid_for;
    format!(
        "{}.{}.{}",
        segment(&json!({"alg": "HS256", "typ": "JWT"})),
        segment(&json!({
            "token_type": "access",
            "user_id": 42,
            "username": "agent007",
            "iat": now().timestamp(),
            "exp": exp.timestamp(),
        })),
        "c2lnbmF0dXJl"
    )
}

pub fn login_body(access: &str) -> Value {
    json!({"access": access, "refresh": "refresh-token"})
}

pub fn manager(storage: &MemoryStorage) -> Arc<SessionManager> {
    Arc::new(SessionManager::open(
        TokenStore::new(storage.clone()),
        Arc::new(FixedClock::new(now())),
    ))
}

pub fn api_for(server: &MockServer, session: &Arc<SessionManager>) -> ApiClient {
    ApiClient::new(&format!("{}/api/", server.uri()))
        .expect("failed to create client")
        .with_session(session.clone())
}
