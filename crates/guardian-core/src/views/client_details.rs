use anyhow::Result;
use tracing::debug;

use crate::api::ApiClient;
use crate::models::{Client, Policy};
use crate::utils::format_currency;

use super::LoadState;

/// A client together with the policies they hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDetails {
    pub client: Client,
    pub policies: Vec<Policy>,
}

impl ClientDetails {
    /// Fetch the client and their policies concurrently. Fails as a whole if
    /// either request fails.
    pub async fn fetch(api: &ApiClient, client_id: i64) -> Result<Self> {
        let (client, policies) = futures::try_join!(
            api.fetch_client(client_id),
            api.fetch_client_policies(client_id)
        )?;
        debug!(client_id, policies = policies.len(), "Loaded client details");
        Ok(Self { client, policies })
    }

    pub async fn load(api: &ApiClient, client_id: i64) -> LoadState<Self> {
        LoadState::from_result(Self::fetch(api, client_id).await, "client details")
    }

    /// Sum of the premiums that parse as numbers.
    pub fn total_premium(&self) -> String {
        let total: f64 = self
            .policies
            .iter()
            .filter_map(|p| p.premium_amount.as_deref())
            .filter_map(|amount| amount.trim().parse::<f64>().ok())
            .sum();
        format_currency(&format!("{:.2}", total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_premium_skips_garbage() {
        let details = ClientDetails {
            client: serde_json::from_str(r#"{"id": 1, "name": "Priya"}"#).unwrap(),
            policies: serde_json::from_str(
                r#"[
                    {"id": 1, "premium_amount": "1200.50"},
                    {"id": 2, "premium_amount": 800},
                    {"id": 3, "premium_amount": "n/a"},
                    {"id": 4}
                ]"#,
            )
            .unwrap(),
        };
        assert_eq!(details.total_premium(), "$2,000.50");
    }
}
