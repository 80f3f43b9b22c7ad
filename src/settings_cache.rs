use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use crate::error::Result;
use crate::traits::SettingsProvider;
use crate::types::{ResourceSettings, ResourceType};

/// Memoizes settings lookups for the duration of one operation.
///
/// Create one per top-level call and drop it afterwards; it is deliberately
/// not shared between calls so settings changes are picked up on the next
/// one. Failed lookups are not cached.
pub struct SettingsCache<'a, P: SettingsProvider> {
    provider: &'a P,
    entries: HashMap<(ResourceType, String), ResourceSettings>,
}

impl<'a, P: SettingsProvider> SettingsCache<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, resource_type: ResourceType, tool: &str) -> Result<&ResourceSettings> {
        match self.entries.entry((resource_type, tool.to_string())) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                debug!(
                    event = "SettingsLookup",
                    phase = "Miss",
                    resource_type = resource_type.as_ref(),
                    tool = tool
                );
                let settings = self.provider.get_settings(resource_type, tool)?;
                Ok(entry.insert(settings))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
