//! Provisioning settings for a (resource type, tool) pair.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{Result, ServiceError};

use super::resource_type::{AccessRuleType, ResourceType};

/// Settings shared by every resource of one type and tool: where its data
/// lives and which access rule types may be used when creating one.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSettings {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_access_rule_types: Option<Vec<AccessRuleType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Public domain serving the bucket (or the folder, see `domain_includes_folder`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default)]
    pub domain_includes_folder: bool,
    /// AWS account id, needed to build workgroup ARNs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

impl ResourceSettings {
    pub fn new(resource_type: ResourceType, tool: impl Into<String>) -> Self {
        Self {
            resource_type,
            tool: tool.into(),
            allowed_access_rule_types: None,
            bucket: None,
            folder: None,
            region: None,
            domain: None,
            domain_includes_folder: false,
            account: None,
        }
    }

    pub fn with_allowed_access_rule_types(mut self, types: Vec<AccessRuleType>) -> Self {
        self.allowed_access_rule_types = Some(types);
        self
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>, includes_folder: bool) -> Self {
        self.domain = Some(domain.into());
        self.domain_includes_folder = includes_folder;
        self
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn bucket(&self) -> Result<&str> {
        self.require("bucket", self.bucket.as_deref())
    }

    pub fn folder(&self) -> Result<&str> {
        self.require("folder", self.folder.as_deref())
    }

    pub fn region(&self) -> Result<&str> {
        self.require("region", self.region.as_deref())
    }

    pub fn account(&self) -> Result<&str> {
        self.require("account", self.account.as_deref())
    }

    /// Fails when the list is missing entirely or does not contain `rule_type`.
    pub fn ensure_access_rule_type_allowed(&self, rule_type: AccessRuleType) -> Result<()> {
        let allowed = self.allowed_access_rule_types.as_ref().ok_or_else(|| {
            self.incomplete("allowedAccessRuleTypes")
        })?;
        if allowed.contains(&rule_type) {
            Ok(())
        } else {
            Err(ServiceError::DisallowedAccessRuleType {
                rule_type,
                tool: self.tool.clone(),
            })
        }
    }

    fn require<'a>(&self, field: &str, value: Option<&'a str>) -> Result<&'a str> {
        match value {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(self.incomplete(field)),
        }
    }

    fn incomplete(&self, field: &str) -> ServiceError {
        ServiceError::IncompleteSettings {
            resource_type: self.resource_type,
            tool: self.tool.clone(),
            field: field.to_string(),
        }
    }
}
