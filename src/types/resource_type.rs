//! Closed sets of resource and access-rule kinds.
//!
//! Wire names are camelCase (`s3Folder`, `readWriteToken`) and are the single
//! source of truth for both serde and string parsing.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::error::ServiceError;

/// The kind of a resource. Fixed at creation time.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
pub enum ResourceType {
    /// A folder inside a shared S3 bucket.
    #[serde(rename = "s3Folder")]
    #[strum(serialize = "s3Folder")]
    S3Folder,
    /// An IoT organization. Credential vending is not implemented for it.
    #[serde(rename = "iotOrganization")]
    #[strum(serialize = "iotOrganization")]
    IotOrganization,
    /// An Athena workgroup with its own results folder.
    #[serde(rename = "athenaWorkgroup")]
    #[strum(serialize = "athenaWorkgroup")]
    AthenaWorkgroup,
}

impl ResourceType {
    /// Parse a request-supplied type name.
    pub fn parse(s: &str) -> Result<Self, ServiceError> {
        ResourceType::from_str(s).map_err(|_| ServiceError::UnknownResourceType(s.to_string()))
    }

    /// Whether temporary credentials can be issued for this kind at all.
    pub fn vends_credentials(self) -> bool {
        match self {
            ResourceType::S3Folder | ResourceType::AthenaWorkgroup => true,
            ResourceType::IotOrganization => false,
        }
    }
}

/// The kind of an access rule.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "camelCase")]
pub enum AccessRuleType {
    #[strum(serialize = "user")]
    User,
    #[strum(serialize = "context")]
    Context,
    #[strum(serialize = "readWriteToken")]
    ReadWriteToken,
}

impl AccessRuleType {
    pub fn parse(s: &str) -> Result<Self, ServiceError> {
        AccessRuleType::from_str(s).map_err(|_| ServiceError::UnknownAccessRuleType(s.to_string()))
    }
}

/// Role granted by a `user` or `context` rule.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, AsRefStr,
)]
#[serde(rename_all = "camelCase")]
pub enum AccessRuleRole {
    #[strum(serialize = "owner")]
    Owner,
    #[strum(serialize = "member")]
    Member,
}
