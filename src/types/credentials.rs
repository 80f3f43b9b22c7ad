//! Temporary credentials handed back to the caller.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Short-lived AWS credentials scoped to one resource. Never persisted.
#[derive(Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
    /// Storage folders echo their bucket and key prefix so callers need not
    /// know the folder layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_prefix: Option<String>,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[redacted]")
            .field("session_token", &"[redacted]")
            .field("expiration", &self.expiration)
            .field("bucket", &self.bucket)
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn credentials() -> Credentials {
        Credentials {
            access_key_id: "ASIAEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
            session_token: "session".to_string(),
            expiration: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            bucket: None,
            key_prefix: None,
        }
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", credentials());
        assert!(debug.contains("ASIAEXAMPLE"));
        assert!(!debug.contains("secret\""));
        assert!(!debug.contains("\"session\""));
    }

    #[test]
    fn test_wire_format_without_bucket() {
        assert_eq!(
            serde_json::to_value(credentials()).unwrap(),
            json!({
                "accessKeyId": "ASIAEXAMPLE",
                "secretAccessKey": "secret",
                "sessionToken": "session",
                "expiration": "2024-01-01T12:00:00Z"
            })
        );
    }
}
