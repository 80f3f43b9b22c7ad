//! Data model: resources, access rules, claims, settings and credentials.
//!
//! Wire names follow the stored documents (camelCase fields, a `type`
//! discriminant on resources, settings and access rules). Claims keep the
//! snake_case names they carry inside a signed token.

mod access_rule;
mod claims;
mod credentials;
mod operation;
mod query;
mod resource;
mod resource_type;
mod settings;
mod view;

pub use access_rule::{
    AccessRule, ContextAccessRule, READ_WRITE_TOKEN_PREFIX, ReadWriteTokenAccessRule,
    UserAccessRule, has_read_write_token_prefix,
};
pub use claims::{AuthClaims, JwtClaims, ReadWriteTokenClaims};
pub use credentials::Credentials;
pub use operation::Operation;
pub use query::{CreateRequest, FindAllQuery, ResourceDraft, ResourceFilter, ResourcePatch};
pub use resource::Resource;
pub use resource_type::{AccessRuleRole, AccessRuleType, ResourceType};
pub use settings::ResourceSettings;
pub use view::{
    AthenaWorkgroupDetails, IotOrganizationDetails, ResourceDetails, ResourceView,
    S3FolderDetails,
};
