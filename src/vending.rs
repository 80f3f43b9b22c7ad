//! Exchanging a scoped policy for temporary credentials.
//!
//! A request moves `Requested -> PolicyBuilt -> RoleAssumed -> Issued`, or
//! stops at `Denied` when the caller may not create keys, or at `Failed` when
//! the policy cannot be built or the token service errors. Nothing here
//! retries; errors from the token service reach the caller unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{Result, ServiceError};
use crate::policy::{ScopedPolicy, build_policy};
use crate::traits::RoleAssumer;
use crate::types::{AuthClaims, Credentials, Operation, Resource, ResourceSettings};

/// Default lifetime of issued credentials, in seconds.
pub const DEFAULT_DURATION_SECONDS: u32 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum VendingState {
    Requested,
    PolicyBuilt,
    RoleAssumed,
    Issued,
    Denied,
    Failed,
}

/// Error reported by the token service. Carried through untouched.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("{message} ({})", .code.as_deref().unwrap_or("no error code"))]
pub struct RoleAssumptionError {
    pub code: Option<String>,
    pub message: String,
}

impl RoleAssumptionError {
    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }
}

/// Arguments of one role assumption call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    /// Serialized policy document.
    pub policy: String,
    pub region: String,
    pub session_name: String,
    pub duration_seconds: u32,
}

#[derive(Clone, PartialEq, Eq)]
pub struct AssumedRoleCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
}

impl std::fmt::Debug for AssumedRoleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssumedRoleCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}

/// A successful response may still lack the credentials payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleOutput {
    pub credentials: Option<AssumedRoleCredentials>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendingConfig {
    pub duration_seconds: u32,
}

impl Default for VendingConfig {
    fn default() -> Self {
        Self {
            duration_seconds: DEFAULT_DURATION_SECONDS,
        }
    }
}

/// Issues credentials scoped to a single resource.
pub struct CredentialVendor<A: RoleAssumer> {
    assumer: A,
    config: VendingConfig,
}

impl<A: RoleAssumer> CredentialVendor<A> {
    pub fn new(assumer: A, config: VendingConfig) -> Self {
        Self { assumer, config }
    }

    pub fn config(&self) -> &VendingConfig {
        &self.config
    }

    /// Fails with `Unsupported` for kinds without credentials, then with
    /// `PermissionDenied` when the caller may not create keys.
    pub fn check(&self, resource: &Resource, claims: &AuthClaims) -> Result<()> {
        let resource_id = resource.to_string();
        if !resource.resource_type().vends_credentials() {
            log_state(&resource_id, VendingState::Failed);
            return Err(ServiceError::Unsupported {
                operation: Operation::CreateKeys,
                resource_type: resource.resource_type(),
            });
        }
        if !resource.can_create_keys(claims) {
            log_state(&resource_id, VendingState::Denied);
            return Err(ServiceError::permission_denied(
                resource.id(),
                Operation::CreateKeys,
            ));
        }
        Ok(())
    }

    /// Check the caller again, build the policy, and assume the role with it.
    pub fn create_keys(
        &self,
        resource: &Resource,
        claims: &AuthClaims,
        settings: &ResourceSettings,
    ) -> Result<Credentials> {
        let resource_id = resource.to_string();
        log_state(&resource_id, VendingState::Requested);
        self.check(resource, claims)?;

        let built = build_policy(resource, settings).and_then(|scoped| {
            let policy = scoped.document.to_json()?;
            Ok((policy, scoped))
        });
        let (policy, scoped) = built.inspect_err(|e| {
            warn!(event = "CreateKeys", phase = "Failed", resource = resource_id, error = %e);
        })?;
        log_state(&resource_id, VendingState::PolicyBuilt);

        let request = AssumeRoleRequest {
            policy,
            region: scoped.region.clone(),
            session_name: scoped.session_name.clone(),
            duration_seconds: self.config.duration_seconds,
        };
        debug!(
            event = "CreateKeys",
            phase = "AssumeRole",
            resource = resource_id,
            region = request.region,
            session_name = request.session_name,
            duration_seconds = request.duration_seconds
        );

        let output = self.assumer.assume_role(&request).inspect_err(|e| {
            warn!(event = "CreateKeys", phase = "Failed", resource = resource_id, error = %e);
        })?;
        log_state(&resource_id, VendingState::RoleAssumed);

        let Some(assumed) = output.credentials else {
            warn!(
                event = "CreateKeys",
                phase = "Failed",
                resource = resource_id,
                error = "response without credentials"
            );
            return Err(ServiceError::MissingCredentials);
        };

        let credentials = issue(assumed, scoped);
        info!(
            event = "CreateKeys",
            phase = VendingState::Issued.as_ref(),
            resource = resource_id,
            access_key_id = credentials.access_key_id,
            expiration = %credentials.expiration
        );
        Ok(credentials)
    }
}

fn issue(assumed: AssumedRoleCredentials, scoped: ScopedPolicy) -> Credentials {
    Credentials {
        access_key_id: assumed.access_key_id,
        secret_access_key: assumed.secret_access_key,
        session_token: assumed.session_token,
        expiration: assumed.expiration,
        bucket: scoped.bucket,
        key_prefix: scoped.key_prefix,
    }
}

fn log_state(resource: &str, state: VendingState) {
    debug!(event = "CreateKeys", phase = state.as_ref(), resource = resource);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::{RecordingRoleAssumer, folder_settings, workgroup_settings};
    use crate::types::{AccessRule, AccessRuleRole, JwtClaims, ResourceType};

    fn owner() -> AuthClaims {
        JwtClaims::new("p", "1", "u").into()
    }

    fn folder() -> Resource {
        Resource::new("r1", ResourceType::S3Folder, "glossary")
            .with_access_rule(AccessRule::user(AccessRuleRole::Owner, "p", "u"))
            .with_access_rule(AccessRule::read_write_token("read-write-token:abc"))
    }

    #[test]
    fn test_folder_credentials_echo_bucket_and_prefix() {
        let assumer = RecordingRoleAssumer::succeeding();
        let vendor = CredentialVendor::new(&assumer, VendingConfig::default());
        let credentials = vendor
            .create_keys(&folder(), &owner(), &folder_settings())
            .unwrap();

        assert_eq!(credentials.access_key_id, "ASIATESTKEY");
        assert_eq!(credentials.bucket.as_deref(), Some("bucket"));
        assert_eq!(credentials.key_prefix.as_deref(), Some("f/r1/"));

        let calls = assumer.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].region, "us-east-1");
        assert_eq!(calls[0].session_name, "token-service-s3Folder-glossary-r1");
        assert_eq!(calls[0].duration_seconds, DEFAULT_DURATION_SECONDS);
        assert!(calls[0].policy.contains("arn:aws:s3:::bucket/f/r1/*"));
    }

    #[test]
    fn test_token_holder_gets_folder_credentials() {
        let assumer = RecordingRoleAssumer::succeeding();
        let vendor = CredentialVendor::new(&assumer, VendingConfig::default());
        let token = AuthClaims::read_write_token("read-write-token:abc");
        assert!(vendor.create_keys(&folder(), &token, &folder_settings()).is_ok());
    }

    #[test]
    fn test_workgroup_credentials_have_no_bucket() {
        let assumer = RecordingRoleAssumer::succeeding();
        let vendor = CredentialVendor::new(&assumer, VendingConfig { duration_seconds: 900 });
        let resource = Resource::new("abc", ResourceType::AthenaWorkgroup, "researcher")
            .with_name("report")
            .with_access_rule(AccessRule::user(AccessRuleRole::Member, "p", "u"));
        let credentials = vendor
            .create_keys(&resource, &owner(), &workgroup_settings())
            .unwrap();
        assert_eq!(credentials.bucket, None);
        assert_eq!(credentials.key_prefix, None);
        assert_eq!(assumer.calls()[0].duration_seconds, 900);
    }

    #[test]
    fn test_denied_caller_never_reaches_token_service() {
        let assumer = RecordingRoleAssumer::succeeding();
        let vendor = CredentialVendor::new(&assumer, VendingConfig::default());
        let stranger: AuthClaims = JwtClaims::new("other", "2", "other").into();
        assert_eq!(
            vendor.create_keys(&folder(), &stranger, &folder_settings()),
            Err(ServiceError::permission_denied("r1", Operation::CreateKeys))
        );
        assert!(assumer.calls().is_empty());
    }

    #[test]
    fn test_iot_is_unsupported() {
        let assumer = RecordingRoleAssumer::succeeding();
        let vendor = CredentialVendor::new(&assumer, VendingConfig::default());
        let resource = Resource::new("org", ResourceType::IotOrganization, "dataFlow")
            .with_access_rule(AccessRule::user(AccessRuleRole::Owner, "p", "u"));
        let settings = ResourceSettings::new(ResourceType::IotOrganization, "dataFlow");
        assert_eq!(
            vendor.create_keys(&resource, &owner(), &settings),
            Err(ServiceError::Unsupported {
                operation: Operation::CreateKeys,
                resource_type: ResourceType::IotOrganization,
            })
        );
        assert!(assumer.calls().is_empty());
    }

    #[test]
    fn test_token_service_error_is_propagated_unchanged() {
        let upstream = RoleAssumptionError::new(Some("AccessDenied"), "not authorized to assume role");
        let assumer = RecordingRoleAssumer::failing(upstream.clone());
        let vendor = CredentialVendor::new(&assumer, VendingConfig::default());
        assert_eq!(
            vendor.create_keys(&folder(), &owner(), &folder_settings()),
            Err(ServiceError::CredentialVending(upstream))
        );
        assert_eq!(assumer.calls().len(), 1);
    }

    #[test]
    fn test_empty_response_is_missing_credentials() {
        let assumer = RecordingRoleAssumer::empty();
        let vendor = CredentialVendor::new(&assumer, VendingConfig::default());
        assert_eq!(
            vendor.create_keys(&folder(), &owner(), &folder_settings()),
            Err(ServiceError::MissingCredentials)
        );
    }

    #[test]
    fn test_incomplete_settings_fail_before_assuming() {
        let assumer = RecordingRoleAssumer::succeeding();
        let vendor = CredentialVendor::new(&assumer, VendingConfig::default());
        let settings = ResourceSettings::new(ResourceType::S3Folder, "glossary").with_bucket("bucket");
        assert!(matches!(
            vendor.create_keys(&folder(), &owner(), &settings),
            Err(ServiceError::IncompleteSettings { .. })
        ));
        assert!(assumer.calls().is_empty());
    }

    #[test]
    fn test_role_assumption_error_display() {
        assert_eq!(
            RoleAssumptionError::new(Some("ExpiredToken"), "token expired").to_string(),
            "token expired (ExpiredToken)"
        );
        assert_eq!(
            RoleAssumptionError::new(None, "timeout").to_string(),
            "timeout (no error code)"
        );
    }
}
