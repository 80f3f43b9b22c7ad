//! Least-privilege IAM policies scoped to a single resource.

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

use crate::error::{Result, ServiceError};
use crate::types::{Operation, Resource, ResourceSettings, ResourceType};

pub const POLICY_VERSION: &str = "2012-10-17";

/// Prefix of every role session name issued by this service.
pub const SESSION_NAME_PREFIX: &str = "token-service";

/// STS rejects role session names longer than this.
pub const MAX_SESSION_NAME_LEN: usize = 64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Display)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub sid: String,
    pub effect: Effect,
    pub action: Vec<String>,
    pub resource: Vec<String>,
}

impl Statement {
    fn allow(sid: &str, actions: &[&str], resources: Vec<String>) -> Self {
        Self {
            sid: sid.to_string(),
            effect: Effect::Allow,
            action: actions.iter().map(|a| a.to_string()).collect(),
            resource: resources,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    pub fn new(statement: Vec<Statement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ServiceError::InvalidRequest(e.to_string()))
    }
}

/// Everything needed to ask for credentials for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedPolicy {
    pub document: PolicyDocument,
    pub region: String,
    pub session_name: String,
    /// Echoed back with the credentials of storage folders.
    pub bucket: Option<String>,
    pub key_prefix: Option<String>,
}

/// Build the policy for `resource`. IoT organizations have no credential
/// scheme and fail with `Unsupported`.
pub fn build_policy(resource: &Resource, settings: &ResourceSettings) -> Result<ScopedPolicy> {
    let session_name = role_session_name(resource.resource_type(), resource.tool(), resource.id());
    match resource.resource_type() {
        ResourceType::S3Folder => {
            let bucket = settings.bucket()?;
            let key_prefix = format!("{}/{}/", settings.folder()?, resource.id());
            Ok(ScopedPolicy {
                document: s3_folder_policy(bucket, &key_prefix),
                region: settings.region()?.to_string(),
                session_name,
                bucket: Some(bucket.to_string()),
                key_prefix: Some(key_prefix),
            })
        }
        ResourceType::AthenaWorkgroup => {
            let region = settings.region()?;
            let workgroup_name = resource.workgroup_name();
            let key_prefix = format!("{}/{}/", settings.folder()?, workgroup_name);
            let workgroup_arn = format!(
                "arn:aws:athena:{}:{}:workgroup/{}",
                region,
                settings.account()?,
                workgroup_name
            );
            Ok(ScopedPolicy {
                document: athena_workgroup_policy(settings.bucket()?, &key_prefix, &workgroup_arn),
                region: region.to_string(),
                session_name,
                bucket: None,
                key_prefix: None,
            })
        }
        ResourceType::IotOrganization => Err(ServiceError::Unsupported {
            operation: Operation::CreateKeys,
            resource_type: ResourceType::IotOrganization,
        }),
    }
}

/// Bucket listing plus full object access under `key_prefix` only.
pub fn s3_folder_policy(bucket: &str, key_prefix: &str) -> PolicyDocument {
    PolicyDocument::new(vec![
        Statement::allow(
            "AllowBucketAccess",
            &["s3:ListBucket", "s3:ListBucketVersions"],
            vec![format!("arn:aws:s3:::{bucket}")],
        ),
        Statement::allow(
            "AllowAllS3ActionsInResourceFolder",
            &[
                "s3:DeleteObject",
                "s3:DeleteObjectVersion",
                "s3:GetObject",
                "s3:GetObjectVersion",
                "s3:PutObject",
            ],
            vec![format!("arn:aws:s3:::{bucket}/{key_prefix}*")],
        ),
    ])
}

/// Bucket listing, read-only access to the workgroup's result folder, and
/// query execution listing on that one workgroup.
pub fn athena_workgroup_policy(bucket: &str, key_prefix: &str, workgroup_arn: &str) -> PolicyDocument {
    PolicyDocument::new(vec![
        Statement::allow(
            "AllowBucketAccess",
            &["s3:ListBucket"],
            vec![format!("arn:aws:s3:::{bucket}")],
        ),
        Statement::allow(
            "AllowReadInWorkgroupFolder",
            &["s3:GetObject"],
            vec![format!("arn:aws:s3:::{bucket}/{key_prefix}*")],
        ),
        Statement::allow(
            "AllowListExecutions",
            &["athena:ListQueryExecutions", "athena:GetQueryExecution"],
            vec![workgroup_arn.to_string()],
        ),
    ])
}

/// `token-service-<type>-<tool>-<id>`, or `token-service-<md5 hex>` of
/// `<type>-<tool>-<id>` when the plain name would exceed the STS limit.
pub fn role_session_name(resource_type: ResourceType, tool: &str, id: &str) -> String {
    let session_name = format!("{resource_type}-{tool}-{id}");
    let plain = format!("{SESSION_NAME_PREFIX}-{session_name}");
    if plain.len() <= MAX_SESSION_NAME_LEN {
        return plain;
    }
    let digest = Md5::digest(session_name.as_bytes());
    format!("{SESSION_NAME_PREFIX}-{}", hex::encode(digest))
}
