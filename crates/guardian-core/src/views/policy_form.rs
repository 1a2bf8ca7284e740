use anyhow::Result;

use crate::api::ApiClient;
use crate::models::{Carrier, Client, PolicyDraft, ValidationError};

use super::LoadState;

/// Choices offered by the add/edit policy form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyFormOptions {
    pub clients: Vec<Client>,
    pub carriers: Vec<Carrier>,
}

impl PolicyFormOptions {
    pub async fn fetch(api: &ApiClient) -> Result<Self> {
        let (clients, carriers) = futures::try_join!(api.fetch_clients(), api.fetch_carriers())?;
        Ok(Self { clients, carriers })
    }

    pub async fn load(api: &ApiClient) -> LoadState<Self> {
        LoadState::from_result(Self::fetch(api).await, "policy form")
    }

    pub fn client(&self, id: i64) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn carrier(&self, id: i64) -> Option<&Carrier> {
        self.carriers.iter().find(|c| c.id == id)
    }

    /// Validate a draft, including that it points at a listed client and
    /// carrier.
    pub fn check(&self, draft: &PolicyDraft) -> Result<(), ValidationError> {
        draft.validate()?;
        if self.client(draft.client).is_none() {
            return Err(ValidationError::UnknownSelection("client"));
        }
        if self.carrier(draft.carrier).is_none() {
            return Err(ValidationError::UnknownSelection("carrier"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> PolicyFormOptions {
        PolicyFormOptions {
            clients: serde_json::from_str(r#"[{"id": 3, "name": "Priya"}]"#).unwrap(),
            carriers: serde_json::from_str(r#"[{"id": 2, "name": "MetLife"}]"#).unwrap(),
        }
    }

    fn draft(client: i64, carrier: i64) -> PolicyDraft {
        serde_json::from_value(serde_json::json!({
            "client": client, "carrier": carrier, "policy_number": "POL-9",
            "policy_type": "LIFE", "premium_amount": "100", "sum_insured": "1000",
            "start_date": "2026-01-01", "end_date": "2026-12-31", "renewal_date": "2026-12-01"
        }))
        .unwrap()
    }

    #[test]
    fn test_check_selection() {
        let opts = options();
        assert_eq!(opts.check(&draft(3, 2)), Ok(()));
        assert_eq!(
            opts.check(&draft(4, 2)),
            Err(ValidationError::UnknownSelection("client"))
        );
        assert_eq!(
            opts.check(&draft(3, 9)),
            Err(ValidationError::UnknownSelection("carrier"))
        );
        assert_eq!(opts.carrier(2).map(|c| c.display_name()), Some("MetLife"));
    }
}
