//! [`RoleAssumer`] backed by AWS STS.
//!
//! Calls block on a runtime owned by the assumer, so they must not be made
//! from inside another Tokio runtime.

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_sts::Client;
use aws_sdk_sts::config::Credentials as StaticCredentials;
use aws_sdk_sts::error::{DisplayErrorContext, ProvideErrorMetadata};
use chrono::DateTime;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::config::AwsConfig;
use crate::traits::RoleAssumer;
use crate::vending::{AssumeRoleOutput, AssumeRoleRequest, AssumedRoleCredentials, RoleAssumptionError};

const PROVIDER_NAME: &str = "token-vault";

pub struct StsRoleAssumer {
    access_key_id: String,
    secret_access_key: String,
    role_arn: String,
    runtime: Option<Arc<Runtime>>,
}

impl Drop for StsRoleAssumer {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            let _ = std::thread::spawn(move || drop(runtime));
        }
    }
}

impl StsRoleAssumer {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        role_arn: impl Into<String>,
    ) -> Result<Self, RoleAssumptionError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|err| RoleAssumptionError::new(None, err.to_string()))?;
        Ok(Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            role_arn: role_arn.into(),
            runtime: Some(Arc::new(runtime)),
        })
    }

    pub fn from_config(config: &AwsConfig) -> Result<Self, RoleAssumptionError> {
        Self::new(&config.key, &config.secret, &config.credentials.role_arn)
    }

    fn runtime(&self) -> Result<&Runtime, RoleAssumptionError> {
        self.runtime
            .as_deref()
            .ok_or_else(|| RoleAssumptionError::new(None, "runtime already shut down"))
    }

    /// A client pinned to the regional endpoint of `region`.
    async fn client(&self, region: &str) -> Client {
        let shared_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .endpoint_url(format!("https://sts.{region}.amazonaws.com"))
            .credentials_provider(StaticCredentials::new(
                self.access_key_id.clone(),
                self.secret_access_key.clone(),
                None,
                None,
                PROVIDER_NAME,
            ))
            .load()
            .await;
        Client::new(&shared_config)
    }
}

impl RoleAssumer for StsRoleAssumer {
    fn assume_role(
        &self,
        request: &AssumeRoleRequest,
    ) -> Result<AssumeRoleOutput, RoleAssumptionError> {
        let duration = i32::try_from(request.duration_seconds).map_err(|_| {
            RoleAssumptionError::new(Some("ValidationError"), "duration out of range")
        })?;

        debug!(
            event = "AssumeRole",
            phase = "Send",
            region = request.region,
            session_name = request.session_name
        );
        let output = self
            .runtime()?
            .block_on(async {
                self.client(&request.region)
                    .await
                    .assume_role()
                    .role_arn(&self.role_arn)
                    .role_session_name(&request.session_name)
                    .policy(&request.policy)
                    .duration_seconds(duration)
                    .send()
                    .await
            })
            .map_err(|err| {
                RoleAssumptionError::new(
                    err.code(),
                    err.message()
                        .map(str::to_string)
                        .unwrap_or_else(|| DisplayErrorContext(&err).to_string()),
                )
            })?;

        let credentials = match output.credentials() {
            Some(c) => Some(AssumedRoleCredentials {
                access_key_id: c.access_key_id().to_string(),
                secret_access_key: c.secret_access_key().to_string(),
                session_token: c.session_token().to_string(),
                expiration: DateTime::from_timestamp(
                    c.expiration().secs(),
                    c.expiration().subsec_nanos(),
                )
                .ok_or_else(|| {
                    RoleAssumptionError::new(None, "credential expiration out of range")
                })?,
            }),
            None => None,
        };
        Ok(AssumeRoleOutput { credentials })
    }
}
