use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, ServiceError};
use crate::traits::{ResourceRepository, SettingsProvider};
use crate::types::{
    Resource, ResourceDraft, ResourceFilter, ResourcePatch, ResourceSettings, ResourceType,
};

/// Resources held in memory. Cloneable and thread-safe; clones share state.
#[derive(Clone, Default)]
pub struct InMemoryResourceRepository {
    inner: Arc<RwLock<BTreeMap<String, Resource>>>,
}

impl InMemoryResourceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `resource` under its own id, replacing any previous one.
    pub fn insert(&self, resource: Resource) -> Result<()> {
        self.inner
            .write()?
            .insert(resource.id().to_string(), resource);
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.inner.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.inner.read()?.is_empty())
    }
}

impl ResourceRepository for InMemoryResourceRepository {
    fn find(&self, id: &str) -> Result<Resource> {
        self.inner
            .read()?
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::ResourceNotFound(id.to_string()))
    }

    fn find_all(&self, filter: &ResourceFilter) -> Result<Vec<Resource>> {
        Ok(self
            .inner
            .read()?
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    fn create(&self, draft: ResourceDraft) -> Result<Resource> {
        let resource = draft.into_resource(Uuid::new_v4().to_string());
        debug!(event = "Repository", phase = "Create", resource = resource.to_string());
        self.insert(resource.clone())?;
        Ok(resource)
    }

    fn update(&self, id: &str, patch: &ResourcePatch) -> Result<Resource> {
        let mut resources = self.inner.write()?;
        let resource = resources
            .get_mut(id)
            .ok_or_else(|| ServiceError::ResourceNotFound(id.to_string()))?;
        resource.apply_patch(patch);
        Ok(resource.clone())
    }

    fn delete(&self, id: &str) -> Result<DateTime<Utc>> {
        self.inner
            .write()?
            .remove(id)
            .map(|_| Utc::now())
            .ok_or_else(|| ServiceError::ResourceNotFound(id.to_string()))
    }
}

/// Settings held in memory, keyed by resource type and tool.
#[derive(Clone, Default)]
pub struct InMemorySettingsProvider {
    inner: Arc<RwLock<HashMap<(ResourceType, String), ResourceSettings>>>,
}

impl InMemorySettingsProvider {
    pub fn new(settings: impl IntoIterator<Item = ResourceSettings>) -> Self {
        let map = settings
            .into_iter()
            .map(|s| ((s.resource_type, s.tool.clone()), s))
            .collect();
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// Add or replace the settings for the record's own type and tool.
    pub fn upsert(&self, settings: ResourceSettings) -> Result<()> {
        self.inner
            .write()?
            .insert((settings.resource_type, settings.tool.clone()), settings);
        Ok(())
    }
}

impl SettingsProvider for InMemorySettingsProvider {
    fn get_settings(&self, resource_type: ResourceType, tool: &str) -> Result<ResourceSettings> {
        self.inner
            .read()?
            .get(&(resource_type, tool.to_string()))
            .cloned()
            .ok_or_else(|| ServiceError::SettingsNotFound {
                resource_type,
                tool: tool.to_string(),
            })
    }
}
