//! Access rules attached to a resource.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::resource_type::{AccessRuleRole, AccessRuleType};

/// Marker every read-write token starts with. It is what tells a capability
/// token apart from a signed claims token.
pub const READ_WRITE_TOKEN_PREFIX: &str = "read-write-token:";

/// Binds one externally authenticated identity to a resource.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct UserAccessRule {
    pub role: AccessRuleRole,
    pub platform_id: String,
    pub user_id: String,
}

/// Binds every member of a platform context (a class) to a resource.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ContextAccessRule {
    pub role: AccessRuleRole,
    pub platform_id: String,
    pub context_id: String,
}

/// Grants anonymous, resource-scoped access to whoever holds the token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ReadWriteTokenAccessRule {
    pub read_write_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AccessRule {
    User(UserAccessRule),
    Context(ContextAccessRule),
    ReadWriteToken(ReadWriteTokenAccessRule),
}

impl AccessRule {
    pub fn user(
        role: AccessRuleRole,
        platform_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        AccessRule::User(UserAccessRule {
            role,
            platform_id: platform_id.into(),
            user_id: user_id.into(),
        })
    }

    pub fn context(
        role: AccessRuleRole,
        platform_id: impl Into<String>,
        context_id: impl Into<String>,
    ) -> Self {
        AccessRule::Context(ContextAccessRule {
            role,
            platform_id: platform_id.into(),
            context_id: context_id.into(),
        })
    }

    pub fn read_write_token(token: impl Into<String>) -> Self {
        AccessRule::ReadWriteToken(ReadWriteTokenAccessRule {
            read_write_token: token.into(),
        })
    }

    pub fn rule_type(&self) -> AccessRuleType {
        match self {
            AccessRule::User(_) => AccessRuleType::User,
            AccessRule::Context(_) => AccessRuleType::Context,
            AccessRule::ReadWriteToken(_) => AccessRuleType::ReadWriteToken,
        }
    }
}

/// Whether `token` carries the read-write token marker.
pub fn has_read_write_token_prefix(token: &str) -> bool {
    token.starts_with(READ_WRITE_TOKEN_PREFIX)
}
