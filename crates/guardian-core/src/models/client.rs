use serde::{Deserialize, Serialize};

use crate::utils::{contains_ignore_case, format_phone};

use super::ValidationError;

/// A policy holder managed by the logged-in agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Client {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub total_policies: i64,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Client {
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Unknown Client"
        } else {
            &self.name
        }
    }

    pub fn phone_display(&self) -> String {
        if self.phone.is_empty() {
            "-".to_string()
        } else {
            format_phone(&self.phone)
        }
    }

    pub fn gender_display(&self) -> &'static str {
        match self.gender.as_deref() {
            Some("M") => "Male",
            Some("F") => "Female",
            Some("O") => "Other",
            _ => "-",
        }
    }

    /// Search box match on name or email, ignoring case.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim();
        term.is_empty() || contains_ignore_case(&self.name, term) || contains_ignore_case(&self.email, term)
    }
}

/// Fields an agent fills in to create or edit a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDraft {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: String,
}

impl ClientDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Required("Name"));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::Required("Email"));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err(ValidationError::InvalidEmail),
        }
        if let Some(ref gender) = self.gender {
            if !matches!(gender.as_str(), "M" | "F" | "O") {
                return Err(ValidationError::InvalidGender);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ClientDraft {
        ClientDraft {
            name: "Priya Sharma".to_string(),
            email: "priya@example.com".to_string(),
            phone: "5551234567".to_string(),
            age: Some(41),
            gender: Some("F".to_string()),
            address: "12 Lake Rd".to_string(),
        }
    }

    #[test]
    fn test_parse_tolerates_missing_fields() {
        let client: Client = serde_json::from_str(r#"{"id": 3, "name": "Ravi"}"#).unwrap();
        assert_eq!(client.display_name(), "Ravi");
        assert_eq!(client.phone_display(), "-");
        assert_eq!(client.gender_display(), "-");
        assert_eq!(client.total_policies, 0);

        let nameless: Client = serde_json::from_str(r#"{"id": 4}"#).unwrap();
        assert_eq!(nameless.display_name(), "Unknown Client");
    }

    #[test]
    fn test_matches_search() {
        let client: Client = serde_json::from_str(
            r#"{"id": 1, "name": "Priya Sharma", "email": "PRIYA@example.com"}"#,
        )
        .unwrap();
        assert!(client.matches_search(""));
        assert!(client.matches_search("sharma"));
        assert!(client.matches_search("priya@"));
        assert!(!client.matches_search("ravi"));
    }

    #[test]
    fn test_validate_draft() {
        assert_eq!(draft().validate(), Ok(()));

        let mut d = draft();
        d.name = "  ".to_string();
        assert_eq!(d.validate(), Err(ValidationError::Required("Name")));

        let mut d = draft();
        d.email = "priya.example.com".to_string();
        assert_eq!(d.validate(), Err(ValidationError::InvalidEmail));

        let mut d = draft();
        d.gender = Some("X".to_string());
        assert_eq!(d.validate(), Err(ValidationError::InvalidGender));

        let mut d = draft();
        d.gender = None;
        assert_eq!(d.validate(), Ok(()));
    }
}
