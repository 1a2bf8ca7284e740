use serde::{Deserialize, Serialize};

/// An insurance company policies are written with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Carrier {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub support_email: Option<String>,
}

impl Carrier {
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "-"
        } else {
            &self.name
        }
    }
}
