//! Serialized shape of a resource as returned to callers.

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::Result;

use super::access_rule::AccessRule;
use super::claims::AuthClaims;
use super::resource::Resource;
use super::resource_type::ResourceType;
use super::settings::ResourceSettings;

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct S3FolderDetails {
    pub bucket: String,
    pub folder: String,
    pub region: String,
    pub public_path: String,
    pub public_url: String,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AthenaWorkgroupDetails {
    pub region: String,
    pub workgroup_name: String,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema, PartialEq, Eq)]
pub struct IotOrganizationDetails {}

/// Type specific fields, merged into the top level of the view.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(untagged)]
pub enum ResourceDetails {
    S3Folder(S3FolderDetails),
    AthenaWorkgroup(AthenaWorkgroupDetails),
    IotOrganization(IotOrganizationDetails),
}

/// A resource as a particular caller is allowed to see it.
///
/// `access_rules` is left out of the output entirely, not nulled, when the
/// caller may not read them.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceView {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub tool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_rules: Option<Vec<AccessRule>>,
    #[serde(flatten)]
    pub details: ResourceDetails,
}

impl Resource {
    /// Shape this resource for `claims`.
    pub fn api_result(
        &self,
        claims: Option<&AuthClaims>,
        settings: &ResourceSettings,
    ) -> Result<ResourceView> {
        let access_rules = claims
            .filter(|c| self.can_read_access_rules(c))
            .map(|_| self.access_rules().to_vec());

        let details = match self.resource_type() {
            ResourceType::S3Folder => ResourceDetails::S3Folder(S3FolderDetails {
                bucket: settings.bucket()?.to_string(),
                folder: settings.folder()?.to_string(),
                region: settings.region()?.to_string(),
                public_path: self.public_path(settings)?,
                public_url: self.public_url(settings)?,
            }),
            ResourceType::AthenaWorkgroup => {
                ResourceDetails::AthenaWorkgroup(AthenaWorkgroupDetails {
                    region: settings.region()?.to_string(),
                    workgroup_name: self.workgroup_name(),
                })
            }
            ResourceType::IotOrganization => {
                ResourceDetails::IotOrganization(IotOrganizationDetails::default())
            }
        };

        Ok(ResourceView {
            id: self.id().to_string(),
            name: self.name().to_string(),
            description: self.description().to_string(),
            resource_type: self.resource_type(),
            tool: self.tool().to_string(),
            access_rules,
            details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccessRuleRole, JwtClaims};
    use insta::assert_json_snapshot;

    fn glossary() -> Resource {
        Resource::new("r1", ResourceType::S3Folder, "glossary")
            .with_name("My Glossary")
            .with_description("glossary for unit 1")
            .with_access_rule(AccessRule::user(AccessRuleRole::Owner, "p", "u"))
    }

    fn glossary_settings() -> ResourceSettings {
        ResourceSettings::new(ResourceType::S3Folder, "glossary")
            .with_bucket("models-resources")
            .with_folder("glossary")
            .with_region("us-east-1")
    }

    #[test]
    fn test_owner_sees_access_rules() {
        let owner: AuthClaims = JwtClaims::new("p", "1", "u").into();
        let view = glossary().api_result(Some(&owner), &glossary_settings()).unwrap();
        assert_json_snapshot!(view, @r#"
        {
          "id": "r1",
          "name": "My Glossary",
          "description": "glossary for unit 1",
          "type": "s3Folder",
          "tool": "glossary",
          "accessRules": [
            {
              "type": "user",
              "role": "owner",
              "platformId": "p",
              "userId": "u"
            }
          ],
          "bucket": "models-resources",
          "folder": "glossary",
          "region": "us-east-1",
          "publicPath": "glossary/r1/",
          "publicUrl": "https://models-resources.s3.amazonaws.com/glossary/r1/"
        }
        "#);
    }

    #[test]
    fn test_anonymous_view_omits_access_rules_key() {
        let view = glossary().api_result(None, &glossary_settings()).unwrap();
        let value = serde_json::to_value(&view).unwrap();
        assert!(value.get("accessRules").is_none());
        assert_eq!(value["publicPath"], "glossary/r1/");
    }

    #[test]
    fn test_non_owner_view_omits_access_rules_key() {
        let stranger: AuthClaims = JwtClaims::new("other", "2", "other").into();
        let view = glossary().api_result(Some(&stranger), &glossary_settings()).unwrap();
        let value = serde_json::to_value(&view).unwrap();
        assert!(value.as_object().unwrap().get("accessRules").is_none());
    }

    #[test]
    fn test_workgroup_view() {
        let resource = Resource::new("abc", ResourceType::AthenaWorkgroup, "researcher")
            .with_name("report")
            .with_description("report workgroup");
        let settings =
            ResourceSettings::new(ResourceType::AthenaWorkgroup, "researcher").with_region("us-west-2");
        let view = resource.api_result(None, &settings).unwrap();
        assert_json_snapshot!(view, @r#"
        {
          "id": "abc",
          "name": "report",
          "description": "report workgroup",
          "type": "athenaWorkgroup",
          "tool": "researcher",
          "region": "us-west-2",
          "workgroupName": "report-abc"
        }
        "#);
    }

    #[test]
    fn test_iot_view_has_only_common_fields() {
        let resource = Resource::new("org", ResourceType::IotOrganization, "dataFlow").with_name("org");
        let settings = ResourceSettings::new(ResourceType::IotOrganization, "dataFlow");
        let value = serde_json::to_value(resource.api_result(None, &settings).unwrap()).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys.len(), 5);
        assert!(keys.contains(&"type"));
    }

    #[test]
    fn test_folder_view_requires_complete_settings() {
        let settings = ResourceSettings::new(ResourceType::S3Folder, "glossary").with_bucket("b");
        assert!(glossary().api_result(None, &settings).is_err());
    }
}
