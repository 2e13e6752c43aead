use serde::{Deserialize, Serialize};

use super::id::OrganizationId;
use super::null_as_default;

/// Scope an organization needs for this client to manage its broadcasts
pub const LIVESTREAM_SCOPE: &str = "Livestream";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: OrganizationId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scopes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub add_ons: Vec<String>,
    #[serde(default)]
    pub can_fetch_running_broadcasts: bool,
}

impl Organization {
    #[must_use]
    pub fn has_livestream_scope(&self) -> bool {
        self.scopes.iter().any(|s| s == LIVESTREAM_SCOPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_livestream_scope() {
        let org: Organization = serde_json::from_str(
            r#"{"id": "o1", "name": "Aris", "scopes": ["Livestream", "Teams"]}"#,
        )
        .unwrap();
        assert!(org.has_livestream_scope());

        let org: Organization = serde_json::from_str(r#"{"id": "o2", "scopes": null}"#).unwrap();
        assert!(!org.has_livestream_scope());

        let org: Organization = serde_json::from_str(r#"{"id": "o3"}"#).unwrap();
        assert!(org.scopes.is_empty());
    }
}
