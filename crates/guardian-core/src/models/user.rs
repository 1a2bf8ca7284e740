use serde::{Deserialize, Serialize};

/// The agent account behind the current session (`auth/me/`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub agent_code: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub is_agency_admin: bool,
}
