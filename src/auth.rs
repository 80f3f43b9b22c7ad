//! Turning a bearer string into caller claims.
//!
//! A string starting with the read-write token marker is a capability and is
//! taken as is. Anything else must verify as a signed token whose payload
//! carries the identity under `claims`. A token that fails to verify is an
//! error, never an anonymous caller.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, ServiceError};
use crate::types::{AuthClaims, JwtClaims, has_read_write_token_prefix};

/// Literal accepted in place of a signed token when the test identity is on.
pub const TEST_IDENTITY_TOKEN: &str = "test";

/// Where a request may carry its bearer string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BearerSource {
    /// Raw `Authorization` header value.
    pub authorization: Option<String>,
    /// `token` query parameter.
    pub query_token: Option<String>,
    /// `token` cookie.
    pub cookie_token: Option<String>,
}

impl BearerSource {
    pub fn from_header(authorization: impl Into<String>) -> Self {
        Self {
            authorization: Some(authorization.into()),
            ..Default::default()
        }
    }

    /// The header wins over the query parameter, which wins over the cookie.
    /// Only a `Bearer` authorization counts.
    pub fn token(&self) -> Option<&str> {
        let from_header = self.authorization.as_deref().and_then(|value| {
            let mut parts = value.split(' ');
            match (parts.next(), parts.next()) {
                (Some("Bearer"), Some(token)) => Some(token),
                _ => None,
            }
        });
        [
            from_header,
            self.query_token.as_deref(),
            self.cookie_token.as_deref(),
        ]
        .into_iter()
        .flatten()
        .find(|token| !token.is_empty())
    }
}

#[derive(Deserialize)]
struct Payload {
    claims: Option<RawClaims>,
}

#[derive(Deserialize)]
struct RawClaims {
    user_id: Option<String>,
    platform_user_id: Option<String>,
    platform_id: Option<String>,
    #[serde(alias = "context_id")]
    class_hash: Option<String>,
    target_user_id: Option<String>,
}

impl RawClaims {
    fn into_claims(self) -> Result<JwtClaims> {
        Ok(JwtClaims {
            user_id: required("user_id", self.user_id)?,
            platform_user_id: required("platform_user_id", self.platform_user_id)?,
            platform_id: required("platform_id", self.platform_id)?,
            class_hash: self.class_hash,
            target_user_id: self.target_user_id,
        })
    }
}

fn required(name: &str, value: Option<String>) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServiceError::MissingClaim(name.to_string()))
}

/// Verifies bearer strings against one public key and algorithm.
#[derive(Clone)]
pub struct TokenResolver {
    key: DecodingKey,
    validation: Validation,
    allow_test_identity: bool,
}

impl TokenResolver {
    /// `public_key` is PEM for asymmetric algorithms and the shared secret for
    /// HMAC ones. Escaped `\n` sequences are turned into newlines first.
    pub fn new(public_key: &str, algorithm: Algorithm) -> Result<Self> {
        let public_key = public_key.replace("\\n", "\n");
        let key = match algorithm {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => DecodingKey::from_rsa_pem(public_key.as_bytes()),
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(public_key.as_bytes()),
            Algorithm::EdDSA => DecodingKey::from_ed_pem(public_key.as_bytes()),
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                Ok(DecodingKey::from_secret(public_key.as_bytes()))
            }
        }
        .map_err(|e| ServiceError::InvalidToken(format!("unusable public key: {e}")))?;

        let mut validation = Validation::new(algorithm);
        // `exp` is checked when present but not required.
        validation.required_spec_claims.clear();
        validation.validate_aud = false;

        Ok(Self {
            key,
            validation,
            allow_test_identity: false,
        })
    }

    /// Accept the literal `"test"` as a fixed identity. Off by default.
    pub fn with_test_identity(mut self, allow: bool) -> Self {
        self.allow_test_identity = allow;
        self
    }

    pub fn allows_test_identity(&self) -> bool {
        self.allow_test_identity
    }

    /// Required authentication: a missing bearer string is an error.
    pub fn authenticate(&self, token: Option<&str>) -> Result<AuthClaims> {
        let token = token.filter(|t| !t.is_empty()).ok_or(ServiceError::MissingToken)?;
        if has_read_write_token_prefix(token) {
            debug!(event = "Authenticate", phase = "Resolved", kind = "readWriteToken");
            return Ok(AuthClaims::read_write_token(token));
        }
        self.verify(token).map(AuthClaims::Jwt)
    }

    /// Anonymous when no bearer string is present, otherwise the same as
    /// [`TokenResolver::authenticate`].
    pub fn optionally_authenticate(&self, token: Option<&str>) -> Result<Option<AuthClaims>> {
        match token.filter(|t| !t.is_empty()) {
            Some(token) => self.authenticate(Some(token)).map(Some),
            None => Ok(None),
        }
    }

    /// Anonymous when no bearer string is present, otherwise it must be a
    /// signed token. Read-write tokens are rejected.
    pub fn optionally_authenticate_jwt(&self, token: Option<&str>) -> Result<Option<JwtClaims>> {
        match token.filter(|t| !t.is_empty()) {
            Some(token) => self.verify(token).map(Some),
            None => Ok(None),
        }
    }

    /// Verify a signed token and pull the identity out of its payload.
    pub fn verify(&self, token: &str) -> Result<JwtClaims> {
        if self.allow_test_identity && token == TEST_IDENTITY_TOKEN {
            debug!(event = "Authenticate", phase = "Resolved", kind = "testIdentity");
            return Ok(test_identity());
        }

        let data = decode::<Payload>(token, &self.key, &self.validation).map_err(|e| {
            debug!(event = "Authenticate", phase = "Rejected", error = %e);
            ServiceError::InvalidToken(e.to_string())
        })?;
        let claims = data
            .claims
            .claims
            .ok_or_else(|| ServiceError::InvalidToken("payload has no claims".to_string()))?
            .into_claims()?;

        debug!(
            event = "Authenticate",
            phase = "Resolved",
            kind = "jwt",
            platform_id = claims.platform_id,
            user_id = claims.user_id
        );
        Ok(claims)
    }
}

/// Identity returned for [`TEST_IDENTITY_TOKEN`].
pub fn test_identity() -> JwtClaims {
    JwtClaims::new("http://example.com", "test", "http://example.com/users/test")
        .with_context("testContextId")
}
