use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter};
use utoipa::ToSchema;

/// An operation gated by a resource's access rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, AsRefStr, EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Operation {
    ReadAccessRules,
    Update,
    Delete,
    CreateKeys,
}

impl Operation {
    /// Verb phrase used in denial messages, e.g. "update" or "create AWS keys for".
    pub fn phrase(&self) -> &'static str {
        match self {
            Operation::ReadAccessRules => "read access rules of",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::CreateKeys => "create AWS keys for",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_names() {
        assert_eq!(Operation::ReadAccessRules.to_string(), "readAccessRules");
        assert_eq!(Operation::CreateKeys.as_ref(), "createKeys");
        assert_eq!(
            serde_json::to_value(Operation::CreateKeys).unwrap(),
            serde_json::json!("createKeys")
        );
    }
}
