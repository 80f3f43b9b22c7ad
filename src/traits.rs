use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{ResourceDraft, ResourceFilter, ResourcePatch, Resource, ResourceSettings, ResourceType};
use crate::vending::{AssumeRoleOutput, AssumeRoleRequest, RoleAssumptionError};

/// Document store holding resources.
///
/// Lookups of a missing id fail with `ServiceError::ResourceNotFound`.
pub trait ResourceRepository {
    fn find(&self, id: &str) -> Result<Resource>;

    fn find_all(&self, filter: &ResourceFilter) -> Result<Vec<Resource>>;

    /// Store a new resource, assigning it an id.
    fn create(&self, draft: ResourceDraft) -> Result<Resource>;

    fn update(&self, id: &str, patch: &ResourcePatch) -> Result<Resource>;

    /// Remove a resource and return when it was removed.
    fn delete(&self, id: &str) -> Result<DateTime<Utc>>;
}

/// Source of provisioning settings, keyed by resource type and tool.
///
/// A missing record fails with `ServiceError::SettingsNotFound`.
pub trait SettingsProvider {
    fn get_settings(&self, resource_type: ResourceType, tool: &str) -> Result<ResourceSettings>;
}

/// External token service exchanging a policy for temporary credentials.
pub trait RoleAssumer {
    fn assume_role(
        &self,
        request: &AssumeRoleRequest,
    ) -> std::result::Result<AssumeRoleOutput, RoleAssumptionError>;
}

impl<T: ResourceRepository + ?Sized> ResourceRepository for &T {
    fn find(&self, id: &str) -> Result<Resource> {
        (**self).find(id)
    }

    fn find_all(&self, filter: &ResourceFilter) -> Result<Vec<Resource>> {
        (**self).find_all(filter)
    }

    fn create(&self, draft: ResourceDraft) -> Result<Resource> {
        (**self).create(draft)
    }

    fn update(&self, id: &str, patch: &ResourcePatch) -> Result<Resource> {
        (**self).update(id, patch)
    }

    fn delete(&self, id: &str) -> Result<DateTime<Utc>> {
        (**self).delete(id)
    }
}

impl<T: SettingsProvider + ?Sized> SettingsProvider for &T {
    fn get_settings(&self, resource_type: ResourceType, tool: &str) -> Result<ResourceSettings> {
        (**self).get_settings(resource_type, tool)
    }
}

impl<T: RoleAssumer + ?Sized> RoleAssumer for &T {
    fn assume_role(
        &self,
        request: &AssumeRoleRequest,
    ) -> std::result::Result<AssumeRoleOutput, RoleAssumptionError> {
        (**self).assume_role(request)
    }
}
