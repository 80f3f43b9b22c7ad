//! Service configuration, read from TOML.
//!
//! ```toml
//! [admin]
//! public_key = "-----BEGIN PUBLIC KEY-----\n..."
//! algorithm = "RS256"
//!
//! [aws]
//! key = "AKIA..."
//! secret = "..."
//!
//! [aws.credentials]
//! role_arn = "arn:aws:iam::123456789012:role/token-service"
//! duration = "3600"
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::fs;
use std::path::Path;

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::TokenResolver;
use crate::error::ServiceError;
use crate::vending::VendingConfig;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(String),

    #[error("config parse error: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub aws: AwsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// PEM public key verifying signed tokens. Escaped `\n` is accepted.
    #[serde(default)]
    pub public_key: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: Algorithm,
    /// Accept the literal `"test"` bearer string as a fixed identity.
    #[serde(default)]
    pub allow_test_identity: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            public_key: String::new(),
            algorithm: default_algorithm(),
            allow_test_identity: false,
        }
    }
}

fn default_algorithm() -> Algorithm {
    Algorithm::RS256
}

#[derive(Clone, Default, Deserialize)]
pub struct AwsConfig {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub credentials: RoleCredentialsConfig,
}

impl Debug for AwsConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AwsConfig")
            .field("key", &self.key)
            .field("secret", &"[redacted]")
            .field("credentials", &self.credentials)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleCredentialsConfig {
    #[serde(default)]
    pub role_arn: String,
    #[serde(default)]
    pub duration: Option<DurationSetting>,
}

/// Credential lifetime in seconds. Older deployments store it as a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DurationSetting {
    Seconds(i64),
    Text(String),
}

impl DurationSetting {
    fn seconds(&self) -> Result<u32, ConfigError> {
        let invalid = || {
            ConfigError::Invalid(
                "aws.credentials.duration must be a positive number of seconds".to_string(),
            )
        };
        let seconds = match self {
            DurationSetting::Seconds(seconds) => *seconds,
            DurationSetting::Text(text) => text.trim().parse::<i64>().map_err(|_| invalid())?,
        };
        match u32::try_from(seconds) {
            Ok(seconds) if seconds > 0 => Ok(seconds),
            _ => Err(invalid()),
        }
    }
}

impl ServiceConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require("admin.public_key", &self.admin.public_key)?;
        require("aws.key", &self.aws.key)?;
        require("aws.secret", &self.aws.secret)?;
        require("aws.credentials.role_arn", &self.aws.credentials.role_arn)?;
        self.duration_seconds()?;
        Ok(())
    }

    pub fn duration_seconds(&self) -> Result<u32, ConfigError> {
        self.aws
            .credentials
            .duration
            .as_ref()
            .ok_or_else(|| ConfigError::Invalid("aws.credentials.duration must be set".to_string()))?
            .seconds()
    }

    pub fn token_resolver(&self) -> Result<TokenResolver, ServiceError> {
        Ok(TokenResolver::new(&self.admin.public_key, self.admin.algorithm)?
            .with_test_identity(self.admin.allow_test_identity))
    }

    pub fn vending_config(&self) -> Result<VendingConfig, ConfigError> {
        Ok(VendingConfig {
            duration_seconds: self.duration_seconds()?,
        })
    }
}

fn require(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be set")));
    }
    Ok(())
}
