use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;

/// Lifetime of an issued access token.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Claim names managed by the signer; callers cannot set them.
const RESERVED_CLAIMS: &[&str] = &["email", "iat", "exp"];

/// Identity asserted by a caller when requesting an access token.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub email: String,
    pub extra: Map<String, Value>,
}

impl Identity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            extra: Map::new(),
        }
    }

    /// Attach additional claims. Reserved claim names are dropped.
    pub fn with_claims(mut self, mut extra: Map<String, Value>) -> Self {
        for reserved in RESERVED_CLAIMS {
            extra.remove(*reserved);
        }
        self.extra = extra;
        self
    }
}

/// Decoded payload of a verified access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Issues and verifies HS256 access tokens.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Result<Self, AppError> {
        if secret.is_empty() {
            return Err(AppError::ConfigError(
                "Token signing secret must not be empty".into(),
            ));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(TOKEN_TTL_HOURS),
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `identity`, valid for [`TOKEN_TTL_HOURS`] from now.
    pub fn issue(&self, identity: Identity) -> Result<String, AppError> {
        self.issue_at(identity, Utc::now())
    }

    /// Sign a token as if issued at `issued_at`.
    pub fn issue_at(&self, identity: Identity, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims {
            email: identity.email,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
            extra: identity.extra,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::TokenError(e.to_string()))
    }

    /// Check signature and expiry, returning the decoded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Access token rejected");
                AppError::Unauthorized(format!("Invalid access token: {e}"))
            })
    }
}
