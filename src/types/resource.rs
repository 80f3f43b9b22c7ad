//! Resource entities.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::Result;

use super::access_rule::AccessRule;
use super::query::ResourcePatch;
use super::resource_type::ResourceType;
use super::settings::ResourceSettings;

/// A named resource and the rules granting access to it.
///
/// The type is fixed at creation; behavior that differs between types is
/// dispatched by matching on [`ResourceType`]. The access rules belong to this
/// resource alone.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    id: String,
    name: String,
    description: String,
    #[serde(rename = "type")]
    resource_type: ResourceType,
    tool: String,
    #[serde(default)]
    access_rules: Vec<AccessRule>,
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}::\"{}\"", self.resource_type, self.tool, self.id)
    }
}

impl Resource {
    /// Create a resource with an empty name, description and rule list.
    pub fn new(id: impl Into<String>, resource_type: ResourceType, tool: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            description: String::new(),
            resource_type,
            tool: tool.into(),
            access_rules: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_access_rule(mut self, rule: AccessRule) -> Self {
        self.access_rules.push(rule);
        self
    }

    pub fn with_access_rules(mut self, rules: Vec<AccessRule>) -> Self {
        self.access_rules = rules;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn access_rules(&self) -> &[AccessRule] {
        &self.access_rules
    }

    /// Apply an update. Type and tool are never touched.
    pub fn apply_patch(&mut self, patch: &ResourcePatch) {
        if let Some(name) = patch.name.as_ref().filter(|n| !n.is_empty()) {
            self.name = name.clone();
        }
        if let Some(description) = patch.description.as_ref().filter(|d| !d.is_empty()) {
            self.description = description.clone();
        }
        if let Some(rules) = &patch.access_rules {
            self.access_rules = rules.clone();
        }
    }

    /// The first read-write token granted on this resource, if any.
    pub fn read_write_token(&self) -> Option<&str> {
        self.access_rules.iter().find_map(|rule| match rule {
            AccessRule::ReadWriteToken(r) => Some(r.read_write_token.as_str()),
            _ => None,
        })
    }

    /// Key prefix of a storage folder: `<folder>/<id>/`.
    pub fn public_path(&self, settings: &ResourceSettings) -> Result<String> {
        Ok(format!("{}/{}/", settings.folder()?, self.id))
    }

    /// Public URL of a storage folder.
    ///
    /// The configured domain may point at the bucket root or already include
    /// the folder; without a domain the S3 website URL of the bucket is used.
    pub fn public_url(&self, settings: &ResourceSettings) -> Result<String> {
        match settings.domain.as_deref().filter(|d| !d.is_empty()) {
            Some(domain) if settings.domain_includes_folder => {
                Ok(format!("{}/{}/", domain, self.id))
            }
            Some(domain) => Ok(format!("{}/{}", domain, self.public_path(settings)?)),
            None => Ok(format!(
                "https://{}.s3.amazonaws.com/{}",
                settings.bucket()?,
                self.public_path(settings)?
            )),
        }
    }

    /// Name of the Athena workgroup backing a workgroup resource: `<name>-<id>`.
    pub fn workgroup_name(&self) -> String {
        format!("{}-{}", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccessRuleRole;
    use serde_json::json;
    use yare::parameterized;

    fn folder_settings() -> ResourceSettings {
        ResourceSettings::new(ResourceType::S3Folder, "glossary")
            .with_bucket("bucket")
            .with_folder("glossary")
            .with_region("us-east-1")
    }

    #[test]
    fn test_deserialize_document() {
        let resource: Resource = serde_json::from_value(json!({
            "id": "r1",
            "name": "My Glossary",
            "description": "a glossary",
            "type": "s3Folder",
            "tool": "glossary",
            "accessRules": [
                {"type": "user", "role": "owner", "platformId": "p", "userId": "u"}
            ]
        }))
        .unwrap();
        assert_eq!(resource.resource_type(), ResourceType::S3Folder);
        assert_eq!(resource.access_rules().len(), 1);
        assert_eq!(resource.to_string(), r#"s3Folder/glossary::"r1""#);
    }

    #[test]
    fn test_public_path() {
        let resource = Resource::new("r1", ResourceType::S3Folder, "glossary");
        assert_eq!(resource.public_path(&folder_settings()).unwrap(), "glossary/r1/");
    }

    #[parameterized(
        bucket_url = { None, false, "https://bucket.s3.amazonaws.com/glossary/r1/" },
        domain_at_root = { Some("https://cdn.example.com"), false, "https://cdn.example.com/glossary/r1/" },
        domain_with_folder = { Some("https://cdn.example.com/glossary"), true, "https://cdn.example.com/glossary/r1/" },
    )]
    fn test_public_url(domain: Option<&str>, includes_folder: bool, expected: &str) {
        let mut settings = folder_settings();
        if let Some(domain) = domain {
            settings = settings.with_domain(domain, includes_folder);
        }
        let resource = Resource::new("r1", ResourceType::S3Folder, "glossary");
        assert_eq!(resource.public_url(&settings).unwrap(), expected);
    }

    #[test]
    fn test_workgroup_name() {
        let resource =
            Resource::new("abc123", ResourceType::AthenaWorkgroup, "researcher").with_name("report");
        assert_eq!(resource.workgroup_name(), "report-abc123");
    }

    #[test]
    fn test_apply_patch_keeps_type_and_tool() {
        let mut resource = Resource::new("r1", ResourceType::S3Folder, "glossary")
            .with_name("old")
            .with_description("old description");
        resource.apply_patch(&ResourcePatch {
            name: Some("new".to_string()),
            description: None,
            access_rules: Some(vec![AccessRule::user(AccessRuleRole::Owner, "p", "u")]),
        });
        assert_eq!(resource.name(), "new");
        assert_eq!(resource.description(), "old description");
        assert_eq!(resource.resource_type(), ResourceType::S3Folder);
        assert_eq!(resource.tool(), "glossary");
        assert_eq!(resource.access_rules().len(), 1);
    }

    #[test]
    fn test_read_write_token_returns_first() {
        let resource = Resource::new("r1", ResourceType::S3Folder, "glossary")
            .with_access_rule(AccessRule::user(AccessRuleRole::Owner, "p", "u"))
            .with_access_rule(AccessRule::read_write_token("read-write-token:first"))
            .with_access_rule(AccessRule::read_write_token("read-write-token:second"));
        assert_eq!(resource.read_write_token(), Some("read-write-token:first"));
        assert_eq!(
            Resource::new("r2", ResourceType::S3Folder, "glossary").read_write_token(),
            None
        );
    }
}
