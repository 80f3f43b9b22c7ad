//! Access decisions for a resource.
//!
//! Every check is a pure function of the resource's access rules and the
//! caller's claims. Rule matching is exact equality; the only prefix test is
//! the read-write token marker.

use tracing::debug;

use crate::error::{Result, ServiceError};
use crate::types::{
    AccessRule, AccessRuleRole, AuthClaims, JwtClaims, Operation, Resource, ResourceType,
    has_read_write_token_prefix,
};

impl Resource {
    /// Owners and read-write token holders may see the rule list.
    pub fn can_read_access_rules(&self, claims: &AuthClaims) -> bool {
        match claims {
            AuthClaims::ReadWriteToken(c) => self.is_read_write_token_valid(&c.read_write_token),
            AuthClaims::Jwt(c) => self.is_owner(c),
        }
    }

    /// Only owners holding signed claims may update. A read-write token is
    /// never enough: a holder could revoke access for every other holder.
    pub fn can_update(&self, claims: &AuthClaims) -> bool {
        match claims {
            AuthClaims::ReadWriteToken(_) => false,
            AuthClaims::Jwt(c) => self.is_owner(c),
        }
    }

    /// Same rule as [`Resource::can_update`]: a token holder cannot delete a
    /// resource shared with other holders.
    pub fn can_delete(&self, claims: &AuthClaims) -> bool {
        match claims {
            AuthClaims::ReadWriteToken(_) => false,
            AuthClaims::Jwt(c) => self.is_owner(c),
        }
    }

    pub fn can_create_keys(&self, claims: &AuthClaims) -> bool {
        match (self.resource_type(), claims) {
            (ResourceType::S3Folder, AuthClaims::ReadWriteToken(c)) => {
                self.is_read_write_token_valid(&c.read_write_token)
            }
            (ResourceType::S3Folder, AuthClaims::Jwt(c)) => {
                self.is_owner_or_member(c) || self.has_access_to_target_user_data(c)
            }
            // No anonymous credential issuance for workgroups.
            (ResourceType::AthenaWorkgroup, AuthClaims::ReadWriteToken(_)) => false,
            (ResourceType::AthenaWorkgroup, AuthClaims::Jwt(c)) => self.is_owner_or_member(c),
            (ResourceType::IotOrganization, _) => false,
        }
    }

    pub fn is_permitted(&self, claims: &AuthClaims, operation: Operation) -> bool {
        match operation {
            Operation::ReadAccessRules => self.can_read_access_rules(claims),
            Operation::Update => self.can_update(claims),
            Operation::Delete => self.can_delete(claims),
            Operation::CreateKeys => self.can_create_keys(claims),
        }
    }

    /// Like [`Resource::is_permitted`], failing with `PermissionDenied`.
    pub fn authorize(&self, claims: &AuthClaims, operation: Operation) -> Result<()> {
        let allowed = self.is_permitted(claims, operation);
        debug!(
            event = "Authorize",
            resource = self.to_string(),
            operation = operation.as_ref(),
            allowed
        );
        if allowed {
            Ok(())
        } else {
            Err(ServiceError::permission_denied(self.id(), operation))
        }
    }

    pub fn has_user_role(&self, claims: &JwtClaims, role: AccessRuleRole) -> bool {
        self.access_rules().iter().any(|rule| match rule {
            AccessRule::User(r) => {
                r.role == role && r.user_id == claims.user_id && r.platform_id == claims.platform_id
            }
            _ => false,
        })
    }

    pub fn is_owner(&self, claims: &JwtClaims) -> bool {
        self.has_user_role(claims, AccessRuleRole::Owner)
    }

    pub fn is_member(&self, claims: &JwtClaims) -> bool {
        self.has_user_role(claims, AccessRuleRole::Member)
    }

    pub fn is_owner_or_member(&self, claims: &JwtClaims) -> bool {
        self.is_owner(claims) || self.is_member(claims) || self.is_context_member(claims)
    }

    /// Some context rule names the caller's platform and current context.
    pub fn is_context_member(&self, claims: &JwtClaims) -> bool {
        let Some(context_id) = claims.class_hash.as_deref() else {
            return false;
        };
        self.access_rules().iter().any(|rule| match rule {
            AccessRule::Context(r) => {
                r.platform_id == claims.platform_id && r.context_id == context_id
            }
            _ => false,
        })
    }

    /// The caller acts on behalf of (`target_user_id`) a user who owns this
    /// resource on the same platform.
    pub fn has_access_to_target_user_data(&self, claims: &JwtClaims) -> bool {
        let Some(target_user_id) = claims.target_user_id.as_deref() else {
            return false;
        };
        self.access_rules().iter().any(|rule| match rule {
            AccessRule::User(r) => {
                r.role == AccessRuleRole::Owner
                    && r.user_id == target_user_id
                    && r.platform_id == claims.platform_id
            }
            _ => false,
        })
    }

    /// A token without the marker prefix is never valid, whatever the rules say.
    pub fn is_read_write_token_valid(&self, token: &str) -> bool {
        if !has_read_write_token_prefix(token) {
            return false;
        }
        self.access_rules().iter().any(|rule| match rule {
            AccessRule::ReadWriteToken(r) => r.read_write_token == token,
            _ => false,
        })
    }
}
