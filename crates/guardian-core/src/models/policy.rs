use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::renewals::{status_tag, StatusTag};
use crate::utils::{format_currency, parse_date};

use super::{string_or_number, Carrier, Client, ValidationError};

/// Lifecycle status of a policy as reported by the server.
///
/// Statuses this client does not know about are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum PolicyStatus {
    Active,
    Pending,
    Lapsed,
    Cancelled,
    Other(String),
}

impl PolicyStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PolicyStatus::Active => "ACTIVE",
            PolicyStatus::Pending => "PENDING",
            PolicyStatus::Lapsed => "LAPSED",
            PolicyStatus::Cancelled => "CANCELLED",
            PolicyStatus::Other(s) => s,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PolicyStatus::Active => "Active",
            PolicyStatus::Pending => "Pending Renewal",
            PolicyStatus::Lapsed => "Lapsed",
            PolicyStatus::Cancelled => "Cancelled",
            PolicyStatus::Other(s) if s.is_empty() => "Unknown",
            PolicyStatus::Other(s) => s,
        }
    }
}

impl Default for PolicyStatus {
    fn default() -> Self {
        PolicyStatus::Other(String::new())
    }
}

impl From<Option<String>> for PolicyStatus {
    fn from(value: Option<String>) -> Self {
        let Some(raw) = value else {
            return PolicyStatus::default();
        };
        match raw.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => PolicyStatus::Active,
            "PENDING" => PolicyStatus::Pending,
            "LAPSED" => PolicyStatus::Lapsed,
            "CANCELLED" => PolicyStatus::Cancelled,
            _ => PolicyStatus::Other(raw),
        }
    }
}

impl From<PolicyStatus> for String {
    fn from(status: PolicyStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyType {
    Life,
    Health,
    Auto,
    Home,
}

impl PolicyType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "LIFE" => Some(PolicyType::Life),
            "HEALTH" => Some(PolicyType::Health),
            "AUTO" => Some(PolicyType::Auto),
            "HOME" => Some(PolicyType::Home),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PolicyType::Life => "Life Insurance",
            PolicyType::Health => "Health Insurance",
            PolicyType::Auto => "Vehicle Insurance",
            PolicyType::Home => "Home Insurance",
        }
    }
}

/// An insurance contract, with the nested client/carrier details the list
/// endpoints include for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Policy {
    pub id: i64,
    #[serde(default)]
    pub policy_number: String,
    #[serde(default)]
    pub client: Option<i64>,
    #[serde(default)]
    pub carrier: Option<i64>,
    #[serde(default)]
    pub client_details: Option<Client>,
    #[serde(default)]
    pub carrier_details: Option<Carrier>,
    #[serde(default)]
    pub policy_type: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub status: PolicyStatus,
    #[serde(default, deserialize_with = "string_or_number")]
    pub premium_amount: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub sum_insured: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub renewal_date: Option<String>,
    #[serde(default)]
    pub policy_file: Option<String>,
}

impl Policy {
    pub fn renewal_date(&self) -> Option<NaiveDate> {
        self.renewal_date.as_deref().and_then(parse_date)
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date.as_deref().and_then(parse_date)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date.as_deref().and_then(parse_date)
    }

    pub fn client_name(&self) -> &str {
        self.client_details
            .as_ref()
            .map(|c| c.display_name())
            .unwrap_or("Unknown Client")
    }

    pub fn carrier_name(&self) -> &str {
        self.carrier_details
            .as_ref()
            .map(|c| c.display_name())
            .unwrap_or("-")
    }

    pub fn premium_display(&self) -> String {
        self.premium_amount
            .as_deref()
            .map(format_currency)
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn sum_insured_display(&self) -> String {
        self.sum_insured
            .as_deref()
            .map(format_currency)
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn policy_type_display(&self) -> &str {
        match self.policy_type.as_deref() {
            Some(code) => PolicyType::from_code(code).map(|t| t.label()).unwrap_or(code),
            None => "-",
        }
    }

    pub fn status_tag(&self) -> StatusTag {
        status_tag(&self.status)
    }
}

fn default_status() -> PolicyStatus {
    PolicyStatus::Active
}

/// Fields an agent fills in to create or edit a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDraft {
    pub client: i64,
    pub carrier: i64,
    pub policy_number: String,
    pub policy_type: PolicyType,
    #[serde(default = "default_status")]
    pub status: PolicyStatus,
    pub premium_amount: String,
    pub sum_insured: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub renewal_date: NaiveDate,
}

impl PolicyDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.policy_number.trim().is_empty() {
            return Err(ValidationError::Required("Policy number"));
        }
        if !is_amount(&self.premium_amount) {
            return Err(ValidationError::InvalidAmount("Premium"));
        }
        if !is_amount(&self.sum_insured) {
            return Err(ValidationError::InvalidAmount("Sum insured"));
        }
        if self.start_date > self.end_date {
            return Err(ValidationError::EndBeforeStart);
        }
        Ok(())
    }
}

fn is_amount(value: &str) -> bool {
    value
        .trim()
        .parse::<f64>()
        .map(|v| v.is_finite() && v >= 0.0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renewals::StatusTag;

    const POLICY_JSON: &str = r#"{
        "id": 5,
        "policy_number": "POL-12345",
        "client": 3,
        "carrier": 2,
        "client_details": {"id": 3, "name": "Priya Sharma", "email": "priya@example.com",
                           "phone": "5551234567", "age": 41, "gender": "F", "address": "",
                           "total_policies": 2, "created_at": "2026-01-10T09:00:00Z"},
        "carrier_details": {"id": 2, "name": "MetLife", "support_email": ""},
        "policy_type": "LIFE",
        "status": "PENDING",
        "premium_amount": "1200.00",
        "sum_insured": "500000.00",
        "start_date": "2025-11-01",
        "end_date": "2026-10-31",
        "renewal_date": "2026-10-01",
        "policy_file": null
    }"#;

    #[test]
    fn test_parse_policy() {
        let policy: Policy = serde_json::from_str(POLICY_JSON).unwrap();
        assert_eq!(policy.policy_number, "POL-12345");
        assert_eq!(policy.status, PolicyStatus::Pending);
        assert_eq!(policy.client_name(), "Priya Sharma");
        assert_eq!(policy.carrier_name(), "MetLife");
        assert_eq!(policy.premium_display(), "$1,200.00");
        assert_eq!(policy.sum_insured_display(), "$500,000.00");
        assert_eq!(policy.policy_type_display(), "Life Insurance");
        assert_eq!(policy.renewal_date(), NaiveDate::from_ymd_opt(2026, 10, 1));
        assert_eq!(policy.status_tag(), StatusTag::Warning);
    }

    #[test]
    fn test_parse_sparse_policy() {
        let policy: Policy =
            serde_json::from_str(r#"{"id": 9, "status": null, "premium_amount": 99.5}"#).unwrap();
        assert_eq!(policy.client_name(), "Unknown Client");
        assert_eq!(policy.carrier_name(), "-");
        assert_eq!(policy.premium_display(), "$99.50");
        assert_eq!(policy.policy_type_display(), "-");
        assert_eq!(policy.status, PolicyStatus::default());
        assert_eq!(policy.status.label(), "Unknown");
        assert!(policy.renewal_date().is_none());
    }

    #[test]
    fn test_unknown_status_is_kept() {
        let status: PolicyStatus = serde_json::from_str(r#""SUSPENDED""#).unwrap();
        assert_eq!(status, PolicyStatus::Other("SUSPENDED".to_string()));
        assert_eq!(serde_json::to_string(&status).unwrap(), r#""SUSPENDED""#);

        let lower: PolicyStatus = serde_json::from_str(r#""lapsed""#).unwrap();
        assert_eq!(lower, PolicyStatus::Lapsed);
        assert_eq!(serde_json::to_string(&lower).unwrap(), r#""LAPSED""#);
    }

    fn draft() -> PolicyDraft {
        serde_json::from_str(
            r#"{
                "client": 3, "carrier": 2, "policy_number": "POL-1", "policy_type": "AUTO",
                "premium_amount": "800.00", "sum_insured": "25000",
                "start_date": "2026-01-01", "end_date": "2026-12-31", "renewal_date": "2026-12-01"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_draft_defaults_to_active() {
        let d = draft();
        assert_eq!(d.status, PolicyStatus::Active);
        assert_eq!(d.policy_type, PolicyType::Auto);
        assert_eq!(d.validate(), Ok(()));

        let body = serde_json::to_value(&d).unwrap();
        assert_eq!(body["status"], "ACTIVE");
        assert_eq!(body["policy_type"], "AUTO");
        assert_eq!(body["start_date"], "2026-01-01");
    }

    #[test]
    fn test_draft_validation() {
        let mut d = draft();
        d.end_date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(d.validate(), Err(ValidationError::EndBeforeStart));

        let mut d = draft();
        d.end_date = d.start_date;
        assert_eq!(d.validate(), Ok(()));

        let mut d = draft();
        d.premium_amount = "-1".to_string();
        assert_eq!(d.validate(), Err(ValidationError::InvalidAmount("Premium")));

        let mut d = draft();
        d.sum_insured = "lots".to_string();
        assert_eq!(d.validate(), Err(ValidationError::InvalidAmount("Sum insured")));

        let mut d = draft();
        d.policy_number = String::new();
        assert_eq!(d.validate(), Err(ValidationError::Required("Policy number")));
    }
}
