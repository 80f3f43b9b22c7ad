//! Request shapes for listing, creating and updating resources.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::access_rule::AccessRule;
use super::resource::Resource;
use super::resource_type::ResourceType;

/// Field filter understood by a repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
}

impl ResourceFilter {
    pub fn matches(&self, resource: &Resource) -> bool {
        self.name.as_deref().is_none_or(|n| n == resource.name())
            && self
                .resource_type
                .is_none_or(|t| t == resource.resource_type())
            && self.tool.as_deref().is_none_or(|t| t == resource.tool())
    }
}

/// Query of the "list resources" call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FindAllQuery {
    #[serde(flatten)]
    pub filter: ResourceFilter,
    /// Only return resources the caller owns.
    #[serde(default)]
    pub am_owner: bool,
}

/// Body of the "create resource" call. Everything is optional on the wire and
/// validated by the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub access_rule_type: Option<String>,
}

/// A validated resource, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDraft {
    pub name: String,
    pub description: String,
    pub resource_type: ResourceType,
    pub tool: String,
    pub access_rules: Vec<AccessRule>,
}

impl ResourceDraft {
    pub fn into_resource(self, id: impl Into<String>) -> Resource {
        Resource::new(id, self.resource_type, self.tool)
            .with_name(self.name)
            .with_description(self.description)
            .with_access_rules(self.access_rules)
    }
}

/// Body of the "update resource" call. Type and tool cannot be changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub access_rules: Option<Vec<AccessRule>>,
}
