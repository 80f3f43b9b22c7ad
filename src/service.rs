//! Resource operations as the routing layer calls them.
//!
//! Each method takes already resolved claims, loads what it needs from the
//! repository and settings provider, gates the operation, and returns the
//! shaped result.

use chrono::{DateTime, Utc};
use rand::RngCore;
use tracing::{debug, info};

use crate::error::{Result, ServiceError};
use crate::settings_cache::SettingsCache;
use crate::traits::{ResourceRepository, RoleAssumer, SettingsProvider};
use crate::types::{
    AccessRule, AccessRuleRole, AccessRuleType, AuthClaims, CreateRequest, Credentials,
    FindAllQuery, JwtClaims, Operation, READ_WRITE_TOKEN_PREFIX, ResourceDraft, ResourcePatch,
    ResourceType, ResourceView,
};
use crate::vending::CredentialVendor;

/// Marks tokens generated here, as opposed to imported ones.
pub const GENERATED_TOKEN_MARKER: &str = "token-service-generated:";

const GENERATED_TOKEN_BYTES: usize = 128;

pub struct ResourceService<R, S, A>
where
    R: ResourceRepository,
    S: SettingsProvider,
    A: RoleAssumer,
{
    repository: R,
    settings: S,
    vendor: CredentialVendor<A>,
}

impl<R, S, A> ResourceService<R, S, A>
where
    R: ResourceRepository,
    S: SettingsProvider,
    A: RoleAssumer,
{
    pub fn new(repository: R, settings: S, vendor: CredentialVendor<A>) -> Self {
        Self {
            repository,
            settings,
            vendor,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Matching resources. With `am_owner` only the caller's own resources
    /// are kept, so an anonymous caller gets none.
    pub fn list(&self, claims: Option<&JwtClaims>, query: &FindAllQuery) -> Result<Vec<ResourceView>> {
        let resources = self.repository.find_all(&query.filter)?;
        let auth = claims.cloned().map(AuthClaims::Jwt);
        let mut cache = SettingsCache::new(&self.settings);

        let views = resources
            .iter()
            .filter(|r| !query.am_owner || claims.is_some_and(|c| r.is_owner(c)))
            .map(|r| {
                let settings = cache.get(r.resource_type(), r.tool())?;
                r.api_result(auth.as_ref(), settings)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            event = "ListResources",
            phase = "Done",
            found = resources.len(),
            returned = views.len(),
            settings_lookups = cache.len()
        );
        Ok(views)
    }

    pub fn get(&self, id: &str, claims: Option<&AuthClaims>) -> Result<ResourceView> {
        let resource = self.repository.find(id)?;
        let settings = self
            .settings
            .get_settings(resource.resource_type(), resource.tool())?;
        resource.api_result(claims, &settings)
    }

    /// Validate the request against the settings for its type and tool, then
    /// store it with a single rule of the requested kind.
    ///
    /// A read-write token created anonymously is returned in the view, and
    /// only here.
    pub fn create(&self, claims: Option<&JwtClaims>, request: CreateRequest) -> Result<ResourceView> {
        let (name, description, resource_type, tool, access_rule_type) = match request {
            CreateRequest {
                name: Some(name),
                description: Some(description),
                resource_type: Some(resource_type),
                tool: Some(tool),
                access_rule_type: Some(access_rule_type),
            } if ![&name, &description, &resource_type, &tool, &access_rule_type]
                .iter()
                .any(|v| v.is_empty()) =>
            {
                (name, description, resource_type, tool, access_rule_type)
            }
            _ => {
                return Err(ServiceError::InvalidRequest(
                    "one or more missing resource fields".to_string(),
                ));
            }
        };

        let resource_type = ResourceType::parse(&resource_type)?;
        let access_rule_type = AccessRuleType::parse(&access_rule_type)?;
        let settings = self.settings.get_settings(resource_type, &tool)?;
        settings.ensure_access_rule_type_allowed(access_rule_type)?;

        let access_rule = match access_rule_type {
            AccessRuleType::User => {
                let claims = claims.ok_or(ServiceError::MissingToken)?;
                AccessRule::user(AccessRuleRole::Owner, &claims.platform_id, &claims.user_id)
            }
            AccessRuleType::ReadWriteToken => AccessRule::read_write_token(generate_read_write_token()),
            AccessRuleType::Context => {
                return Err(ServiceError::UnknownAccessRuleType(
                    access_rule_type.to_string(),
                ));
            }
        };

        let resource = self.repository.create(ResourceDraft {
            name,
            description,
            resource_type,
            tool,
            access_rules: vec![access_rule],
        })?;
        info!(
            event = "CreateResource",
            phase = "Created",
            resource = resource.to_string(),
            access_rule_type = access_rule_type.as_ref()
        );

        let auth = match claims {
            Some(c) => Some(AuthClaims::Jwt(c.clone())),
            None => resource.read_write_token().map(AuthClaims::read_write_token),
        };
        resource.api_result(auth.as_ref(), &settings)
    }

    /// Owners only. Type and tool never change.
    pub fn update(&self, claims: &AuthClaims, id: &str, patch: &ResourcePatch) -> Result<ResourceView> {
        let resource = self.repository.find(id)?;
        resource.authorize(claims, Operation::Update)?;
        let updated = self.repository.update(id, patch)?;
        let settings = self
            .settings
            .get_settings(updated.resource_type(), updated.tool())?;
        updated.api_result(Some(claims), &settings)
    }

    /// Owners only. Returns when the resource was removed.
    pub fn delete(&self, claims: &AuthClaims, id: &str) -> Result<DateTime<Utc>> {
        let resource = self.repository.find(id)?;
        resource.authorize(claims, Operation::Delete)?;
        let deleted_at = self.repository.delete(id)?;
        info!(event = "DeleteResource", phase = "Deleted", resource = resource.to_string());
        Ok(deleted_at)
    }

    pub fn create_keys(&self, claims: &AuthClaims, id: &str) -> Result<Credentials> {
        let resource = self.repository.find(id)?;
        self.vendor.check(&resource, claims)?;
        let settings = self
            .settings
            .get_settings(resource.resource_type(), resource.tool())?;
        self.vendor.create_keys(&resource, claims, &settings)
    }
}

/// `read-write-token:token-service-generated:` followed by 128 random bytes
/// in hex.
pub fn generate_read_write_token() -> String {
    let mut bytes = [0u8; GENERATED_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!(
        "{READ_WRITE_TOKEN_PREFIX}{GENERATED_TOKEN_MARKER}{}",
        hex::encode(bytes)
    )
}
