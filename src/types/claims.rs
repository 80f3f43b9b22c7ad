//! Resolved caller identity.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Verified fields of a signed identity assertion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct JwtClaims {
    pub platform_user_id: String,
    pub platform_id: String,
    pub user_id: String,
    /// Context (class) the user is acting in. Issued as `class_hash` by the
    /// portal, accepted as `context_id` too.
    #[serde(default, alias = "context_id", skip_serializing_if = "Option::is_none")]
    pub class_hash: Option<String>,
    /// User whose data the caller acts on behalf of (e.g. a researcher).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_user_id: Option<String>,
}

impl JwtClaims {
    pub fn new(
        platform_id: impl Into<String>,
        platform_user_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            platform_user_id: platform_user_id.into(),
            platform_id: platform_id.into(),
            user_id: user_id.into(),
            class_hash: None,
            target_user_id: None,
        }
    }

    pub fn with_context(mut self, context_id: impl Into<String>) -> Self {
        self.class_hash = Some(context_id.into());
        self
    }

    pub fn with_target_user(mut self, target_user_id: impl Into<String>) -> Self {
        self.target_user_id = Some(target_user_id.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ReadWriteTokenClaims {
    pub read_write_token: String,
}

/// Exactly one kind of credential is active per request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuthClaims {
    Jwt(JwtClaims),
    ReadWriteToken(ReadWriteTokenClaims),
}

impl AuthClaims {
    pub fn read_write_token(token: impl Into<String>) -> Self {
        AuthClaims::ReadWriteToken(ReadWriteTokenClaims {
            read_write_token: token.into(),
        })
    }

    pub fn as_jwt(&self) -> Option<&JwtClaims> {
        match self {
            AuthClaims::Jwt(claims) => Some(claims),
            AuthClaims::ReadWriteToken(_) => None,
        }
    }
}

impl From<JwtClaims> for AuthClaims {
    fn from(claims: JwtClaims) -> Self {
        AuthClaims::Jwt(claims)
    }
}

impl From<ReadWriteTokenClaims> for AuthClaims {
    fn from(claims: ReadWriteTokenClaims) -> Self {
        AuthClaims::ReadWriteToken(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_id_alias() {
        let claims: JwtClaims = serde_json::from_value(json!({
            "platform_user_id": "1",
            "platform_id": "p",
            "user_id": "u",
            "context_id": "class-1"
        }))
        .unwrap();
        assert_eq!(claims.class_hash.as_deref(), Some("class-1"));
        assert_eq!(claims.target_user_id, None);
    }

    #[test]
    fn test_optional_fields_are_not_serialized_when_absent() {
        let claims = JwtClaims::new("p", "1", "u");
        assert_eq!(
            serde_json::to_value(&claims).unwrap(),
            json!({"platform_user_id": "1", "platform_id": "p", "user_id": "u"})
        );
    }

    #[test]
    fn test_as_jwt() {
        let jwt: AuthClaims = JwtClaims::new("p", "1", "u").into();
        assert!(jwt.as_jwt().is_some());
        assert!(AuthClaims::read_write_token("read-write-token:x").as_jwt().is_none());
    }
}
