//! API client for the Revenue Guardian REST API.
//!
//! The client asks the session for its credential on every request, so a
//! login or logout is picked up without rebuilding it and an expired token
//! is never sent.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::{SessionManager, TokenPair};
use crate::models::{Carrier, Client as PolicyHolder, ClientDraft, Policy, PolicyDraft, UserProfile};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL used when neither the environment nor the config names one.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/";

/// HTTP request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// API client for the agency back office.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Option<Arc<SessionManager>>,
}

impl ApiClient {
    /// Create a new API client rooted at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            client,
            base_url,
            session: None,
        })
    }

    /// Create a client that attaches the credential of `session`, sharing the
    /// connection pool.
    pub fn with_session(&self, session: Arc<SessionManager>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            session: Some(session),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Exchange a username and password for a token pair.
    ///
    /// This request never carries an Authorization header, whatever the
    /// state of the session.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<TokenPair> {
        let url = self.url("auth/login/");
        debug!(username = username, "Sending login request");

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&LoginRequest { username, password })
            .send()
            .await
            .context("Failed to send authentication request")?;

        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .context("Failed to parse authentication response")
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(ref session) = self.session {
            // Ends the session first if the token has run out
            let snapshot = session.validate();
            if let Some(credential) = snapshot.credential() {
                headers.insert(
                    header::AUTHORIZATION,
                    header::HeaderValue::from_str(&format!("Bearer {}", credential.as_str()))
                        .context("Access token is not a valid header value")?,
                );
            }
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            Self::check_response(response).await.map(Some)
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Send a request built by `build`, retrying with exponential backoff
    /// while the server answers 429.
    async fn send<T, F>(&self, method: &str, url: &str, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = build()
                .headers(self.auth_headers()?)
                .send()
                .await
                .with_context(|| format!("Failed to send {} request to {}", method, url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response
                        .json()
                        .await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.send("GET", url, || self.client.get(url)).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> Result<T> {
        self.send("POST", url, || self.client.post(url).json(body)).await
    }

    async fn put<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> Result<T> {
        self.send("PUT", url, || self.client.put(url).json(body)).await
    }

    // ===== Profile =====

    pub async fn fetch_profile(&self) -> Result<UserProfile> {
        self.get(&self.url("auth/me/")).await
    }

    // ===== Clients =====

    pub async fn fetch_clients(&self) -> Result<Vec<PolicyHolder>> {
        let clients: Vec<PolicyHolder> = self.get(&self.url("clients/")).await?;
        debug!(count = clients.len(), "Fetched clients");
        Ok(clients)
    }

    pub async fn fetch_client(&self, id: i64) -> Result<PolicyHolder> {
        self.get(&self.url(&format!("clients/{}/", id))).await
    }

    /// Create a client. The draft is validated before anything is sent.
    pub async fn create_client(&self, draft: &ClientDraft) -> Result<PolicyHolder> {
        draft.validate()?;
        self.post(&self.url("clients/"), draft).await
    }

    pub async fn update_client(&self, id: i64, draft: &ClientDraft) -> Result<PolicyHolder> {
        draft.validate()?;
        self.put(&self.url(&format!("clients/{}/", id)), draft).await
    }

    // ===== Policies =====

    pub async fn fetch_policies(&self) -> Result<Vec<Policy>> {
        let policies: Vec<Policy> = self.get(&self.url("policies/")).await?;
        debug!(count = policies.len(), "Fetched policies");
        Ok(policies)
    }

    /// Policies belonging to one client.
    pub async fn fetch_client_policies(&self, client_id: i64) -> Result<Vec<Policy>> {
        let url = format!("{}?client_id={}", self.url("policies/"), client_id);
        self.get(&url).await
    }

    pub async fn fetch_policy(&self, id: i64) -> Result<Policy> {
        self.get(&self.url(&format!("policies/{}/", id))).await
    }

    pub async fn create_policy(&self, draft: &PolicyDraft) -> Result<Policy> {
        draft.validate()?;
        self.post(&self.url("policies/"), draft).await
    }

    pub async fn update_policy(&self, id: i64, draft: &PolicyDraft) -> Result<Policy> {
        draft.validate()?;
        self.put(&self.url(&format!("policies/{}/", id)), draft).await
    }

    // ===== Carriers =====

    pub async fn fetch_carriers(&self) -> Result<Vec<Carrier>> {
        self.get(&self.url("carriers/")).await
    }
}
