use std::sync::PoisonError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::types::{AccessRuleType, Operation, ResourceType};
use crate::vending::RoleAssumptionError;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ServiceError {
    #[error("missing token in headers, query or cookie")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("missing {0} in JWT claims")]
    MissingClaim(String),

    #[error("you do not have permission to {} resource {resource_id}", .operation.phrase())]
    PermissionDenied {
        resource_id: String,
        operation: Operation,
    },

    #[error("resource {0} not found")]
    ResourceNotFound(String),

    #[error("no resource settings for {resource_type} type with {tool} tool")]
    SettingsNotFound {
        resource_type: ResourceType,
        tool: String,
    },

    #[error("{resource_type}/{tool} settings are missing {field}")]
    IncompleteSettings {
        resource_type: ResourceType,
        tool: String,
        field: String,
    },

    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("unknown access rule type: {0}")]
    UnknownAccessRuleType(String),

    #[error("\"{rule_type}\" access rule type is not allowed by {tool} settings")]
    DisallowedAccessRuleType {
        rule_type: AccessRuleType,
        tool: String,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{operation} is not supported for {resource_type} resources")]
    Unsupported {
        operation: Operation,
        resource_type: ResourceType,
    },

    #[error("role assumption failed: {0}")]
    CredentialVending(#[from] RoleAssumptionError),

    #[error("missing credentials in role assumption response")]
    MissingCredentials,

    #[error("Poisoned lock error: {0}")]
    PoisonedLock(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ServiceError {
    pub fn permission_denied(resource_id: impl Into<String>, operation: Operation) -> Self {
        ServiceError::PermissionDenied {
            resource_id: resource_id.into(),
            operation,
        }
    }

    /// Status code the routing layer answers with for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::MissingToken
            | ServiceError::InvalidToken(_)
            | ServiceError::MissingClaim(_)
            | ServiceError::PermissionDenied { .. } => 403,
            ServiceError::ResourceNotFound(_) | ServiceError::SettingsNotFound { .. } => 404,
            ServiceError::IncompleteSettings { .. }
            | ServiceError::UnknownResourceType(_)
            | ServiceError::UnknownAccessRuleType(_)
            | ServiceError::DisallowedAccessRuleType { .. }
            | ServiceError::InvalidRequest(_)
            | ServiceError::Unsupported { .. }
            | ServiceError::CredentialVending(_)
            | ServiceError::MissingCredentials => 400,
            ServiceError::PoisonedLock(_) | ServiceError::Config(_) => 500,
        }
    }
}

impl<T> From<PoisonError<T>> for ServiceError {
    fn from(err: PoisonError<T>) -> Self {
        ServiceError::PoisonedLock(err.to_string())
    }
}
