//! Decoding of identity claims from an access token.
//!
//! Access tokens are JWTs issued by the back office. The client never verifies
//! the signature (it has no key); it only reads the payload to learn who is
//! logged in and when the token stops being accepted.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Token must have 3 segments, found {0}")]
    Malformed(usize),

    #[error("Token payload is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Token payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Token is missing the '{0}' claim")]
    MissingClaim(&'static str),

    #[error("Token claim '{0}' is not a valid timestamp")]
    InvalidTimestamp(&'static str),
}

/// Identity fields carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub subject: String,
    pub username: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub token_type: Option<String>,
}

impl Claims {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn time_until_expiry(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        self.time_until_expiry(now).num_minutes().max(0)
    }

    /// Name to greet the agent with: the username claim, else the subject.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.subject)
    }
}

// Payload as issued. `user_id` is what the back office puts in its tokens;
// `sub` is accepted too so standard issuers work.
#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: Option<Value>,
    user_id: Option<Value>,
    username: Option<String>,
    iat: Option<i64>,
    exp: Option<i64>,
    token_type: Option<String>,
}

/// Decode the claims of a JWT without verifying its signature.
pub fn parse(token: &str) -> Result<Claims, DecodeError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeError::Malformed(segments.len()));
    }

    let payload = URL_SAFE_NO_PAD.decode(segments[1].trim_end_matches('='))?;
    let raw: RawClaims = serde_json::from_slice(&payload)?;

    let subject = raw
        .sub
        .or(raw.user_id)
        .and_then(|v| match v {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .ok_or(DecodeError::MissingClaim("sub"))?;

    let exp = raw.exp.ok_or(DecodeError::MissingClaim("exp"))?;
    let expires_at =
        DateTime::from_timestamp(exp, 0).ok_or(DecodeError::InvalidTimestamp("exp"))?;

    let issued_at = match raw.iat {
        Some(iat) => {
            Some(DateTime::from_timestamp(iat, 0).ok_or(DecodeError::InvalidTimestamp("iat"))?)
        }
        None => None,
    };

    Ok(Claims {
        subject,
        username: raw.username,
        issued_at,
        expires_at,
        token_type: raw.token_type,
    })
}

/// Build an unsigned token around a JSON payload.
#[cfg(test)]
pub(crate) fn encode_unsigned(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.signature", header, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_parse_back_office_token() {
        let token = encode_unsigned(&json!({
            "token_type": "access",
            "exp": 1_790_000_000,
            "iat": 1_789_999_700,
            "jti": "6f1c",
            "user_id": 42,
            "username": "agent.smith"
        }));

        let claims = parse(&token).expect("token should decode");
        assert_eq!(claims.subject, "42");
        assert_eq!(claims.username.as_deref(), Some("agent.smith"));
        assert_eq!(claims.token_type.as_deref(), Some("access"));
        assert_eq!(claims.expires_at.timestamp(), 1_790_000_000);
        assert_eq!(claims.issued_at.map(|t| t.timestamp()), Some(1_789_999_700));
        assert_eq!(claims.display_name(), "agent.smith");
    }

    #[test]
    fn test_parse_prefers_sub() {
        let token = encode_unsigned(&json!({"sub": "abc", "user_id": 7, "exp": 1_790_000_000}));
        let claims = parse(&token).unwrap();
        assert_eq!(claims.subject, "abc");
        assert_eq!(claims.display_name(), "abc");
    }

    #[test]
    fn test_parse_tolerates_padding() {
        let token = encode_unsigned(&json!({"user_id": 1, "exp": 1_790_000_000}));
        let parts: Vec<&str> = token.split('.').collect();
        let padded = format!("{}.{}==.{}", parts[0], parts[1], parts[2]);
        assert!(parse(&padded).is_ok());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse("not-a-token"), Err(DecodeError::Malformed(1))));
        assert!(matches!(parse("a.b.c.d"), Err(DecodeError::Malformed(4))));
        assert!(matches!(parse("a.@@@.c"), Err(DecodeError::Base64(_))));

        let not_json = format!("x.{}.y", URL_SAFE_NO_PAD.encode("hello"));
        assert!(matches!(parse(&not_json), Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_parse_requires_subject_and_expiry() {
        let no_exp = encode_unsigned(&json!({"user_id": 1}));
        assert!(matches!(parse(&no_exp), Err(DecodeError::MissingClaim("exp"))));

        let no_sub = encode_unsigned(&json!({"exp": 1_790_000_000}));
        assert!(matches!(parse(&no_sub), Err(DecodeError::MissingClaim("sub"))));
    }

    #[test]
    fn test_expiry() {
        let claims = Claims {
            subject: "1".to_string(),
            username: None,
            issued_at: None,
            expires_at: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
            token_type: None,
        };
        let before = Utc.with_ymd_and_hms(2026, 1, 1, 11, 30, 0).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();

        assert!(!claims.is_expired(before));
        assert!(claims.is_expired(at));
        assert_eq!(claims.minutes_until_expiry(before), 30);
        assert_eq!(claims.minutes_until_expiry(at + Duration::hours(1)), 0);
    }
}
