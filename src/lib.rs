// src/lib.rs
pub use auth::{BearerSource, TEST_IDENTITY_TOKEN, TokenResolver, test_identity};
pub use config::{AdminConfig, AwsConfig, ConfigError, DurationSetting, RoleCredentialsConfig, ServiceConfig};
pub use error::{Result, ServiceError};
pub use memory::{InMemoryResourceRepository, InMemorySettingsProvider};
pub use policy::{
    Effect, MAX_SESSION_NAME_LEN, PolicyDocument, SESSION_NAME_PREFIX, ScopedPolicy, Statement,
    build_policy, role_session_name,
};
pub use service::{ResourceService, generate_read_write_token};
pub use settings_cache::SettingsCache;
pub use traits::{ResourceRepository, RoleAssumer, SettingsProvider};
pub use vending::{
    AssumeRoleOutput, AssumeRoleRequest, AssumedRoleCredentials, CredentialVendor,
    RoleAssumptionError, VendingConfig, VendingState,
};

#[cfg(feature = "sts")]
pub use sts::StsRoleAssumer;

pub mod types;

mod access;
mod auth;
mod config;
mod error;
mod memory;
mod policy;
mod service;
mod settings_cache;
#[cfg(feature = "sts")]
mod sts;
mod traits;
mod vending;

#[cfg(test)]
mod tests;
