//! Fixtures shared by the unit and scenario tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{TimeZone, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::Serialize;

use crate::auth::TokenResolver;
use crate::error::Result;
use crate::memory::InMemorySettingsProvider;
use crate::traits::{RoleAssumer, SettingsProvider};
use crate::types::{AccessRuleType, ResourceSettings, ResourceType};
use crate::vending::{AssumeRoleOutput, AssumeRoleRequest, AssumedRoleCredentials, RoleAssumptionError};

pub const SIGNING_KEY: &str = include_str!("fixtures/signing_key.pem");
pub const SIGNING_PUBLIC_KEY: &str = include_str!("fixtures/signing_key.pub.pem");
pub const FOREIGN_KEY: &str = include_str!("fixtures/foreign_key.pem");

pub fn resolver() -> TokenResolver {
    TokenResolver::new(SIGNING_PUBLIC_KEY, Algorithm::RS256).unwrap()
}

pub fn sign<T: Serialize>(payload: &T) -> String {
    sign_with(SIGNING_KEY, payload)
}

pub fn sign_with<T: Serialize>(private_key: &str, payload: &T) -> String {
    let key = EncodingKey::from_rsa_pem(private_key.as_bytes()).unwrap();
    encode(&Header::new(Algorithm::RS256), payload, &key).unwrap()
}

pub fn folder_settings() -> ResourceSettings {
    ResourceSettings::new(ResourceType::S3Folder, "glossary")
        .with_allowed_access_rule_types(vec![AccessRuleType::User, AccessRuleType::ReadWriteToken])
        .with_bucket("bucket")
        .with_folder("f")
        .with_region("us-east-1")
}

pub fn workgroup_settings() -> ResourceSettings {
    ResourceSettings::new(ResourceType::AthenaWorkgroup, "researcher")
        .with_allowed_access_rule_types(vec![AccessRuleType::User])
        .with_bucket("athena-results")
        .with_folder("workgroups")
        .with_region("us-east-1")
        .with_account("123456789012")
}

pub fn iot_settings() -> ResourceSettings {
    ResourceSettings::new(ResourceType::IotOrganization, "dataFlow")
        .with_allowed_access_rule_types(vec![AccessRuleType::User])
}

/// Records every request and answers with a fixed outcome.
pub struct RecordingRoleAssumer {
    outcome: std::result::Result<AssumeRoleOutput, RoleAssumptionError>,
    calls: Mutex<Vec<AssumeRoleRequest>>,
}

impl RecordingRoleAssumer {
    fn with_outcome(outcome: std::result::Result<AssumeRoleOutput, RoleAssumptionError>) -> Self {
        Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::with_outcome(Ok(AssumeRoleOutput {
            credentials: Some(AssumedRoleCredentials {
                access_key_id: "ASIATESTKEY".to_string(),
                secret_access_key: "test-secret".to_string(),
                session_token: "test-session-token".to_string(),
                expiration: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            }),
        }))
    }

    pub fn empty() -> Self {
        Self::with_outcome(Ok(AssumeRoleOutput { credentials: None }))
    }

    pub fn failing(error: RoleAssumptionError) -> Self {
        Self::with_outcome(Err(error))
    }

    pub fn calls(&self) -> Vec<AssumeRoleRequest> {
        self.calls.lock().unwrap().clone()
    }
}

impl RoleAssumer for RecordingRoleAssumer {
    fn assume_role(
        &self,
        request: &AssumeRoleRequest,
    ) -> std::result::Result<AssumeRoleOutput, RoleAssumptionError> {
        self.calls.lock().unwrap().push(request.clone());
        self.outcome.clone()
    }
}

/// Counts lookups that reach the underlying provider.
pub struct CountingSettingsProvider {
    inner: InMemorySettingsProvider,
    lookups: AtomicUsize,
}

impl CountingSettingsProvider {
    pub fn new(settings: Vec<ResourceSettings>) -> Self {
        Self {
            inner: InMemorySettingsProvider::new(settings),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl SettingsProvider for CountingSettingsProvider {
    fn get_settings(&self, resource_type: ResourceType, tool: &str) -> Result<ResourceSettings> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get_settings(resource_type, tool)
    }
}
