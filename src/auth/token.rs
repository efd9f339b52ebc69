use crate::error::AppError;
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Why a presented token was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// The token could not be parsed into a signed claim set.
    #[error("token is malformed")]
    Malformed,
    /// The signature does not match the configured key.
    #[error("token signature is invalid")]
    InvalidSignature,
    /// The token is past its expiry instant.
    #[error("token has expired")]
    Expired,
}

/// The claims embedded in a session token. The signature covers every field;
/// validity is determined entirely by signature plus expiry, no lookup.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject: the account's unique identifier.
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Mints and verifies self-contained signed session tokens (HS256).
///
/// The signing key is injected once at construction and never changes for the
/// lifetime of the process. There is deliberately no revocation mechanism: a
/// token stays valid until its stated expiry, trading early invalidation for
/// statelessness and availability.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: i64,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds,
        }
    }

    /// Issues a token for the given account with the configured lifetime.
    pub fn issue(
        &self,
        id: Uuid,
        username: &str,
        email: &str,
        role: &str,
    ) -> Result<String, AppError> {
        self.issue_with_ttl(id, username, email, role, self.ttl_seconds)
    }

    /// Issues a token with an explicit lifetime in seconds. Negative values
    /// produce an already-expired token, which the test suites rely on.
    pub fn issue_with_ttl(
        &self,
        id: Uuid,
        username: &str,
        email: &str,
        role: &str,
        ttl_seconds: i64,
    ) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: id,
            username: username.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            iat: now,
            exp: now + ttl_seconds,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("failed to sign token: {}", e)))
    }

    /// Verifies signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("unit-test-secret", 3600)
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let codec = codec();
        let id = Uuid::new_v4();

        let token = codec.issue(id, "alice", "a@x.com", "ROLE_USER").unwrap();
        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims.sub, id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, "ROLE_USER");
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let codec = codec();
        // Past the default validation leeway.
        let token = codec
            .issue_with_ttl(Uuid::new_v4(), "bob", "b@x.com", "ROLE_USER", -120)
            .unwrap();

        assert_eq!(codec.verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn test_cross_key_rejection() {
        let signer = TokenCodec::new("key-one", 3600);
        let verifier = TokenCodec::new("key-two", 3600);

        let token = signer
            .issue(Uuid::new_v4(), "carol", "c@x.com", "ROLE_USER")
            .unwrap();

        assert_eq!(verifier.verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        let codec = codec();
        assert_eq!(codec.verify("not-a-token"), Err(AuthError::Malformed));
        assert_eq!(codec.verify(""), Err(AuthError::Malformed));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let codec = codec();
        let token = codec
            .issue(Uuid::new_v4(), "dave", "d@x.com", "ROLE_USER")
            .unwrap();

        // Swap the payload segment for a different (validly encoded) one; the
        // signature no longer covers the claim set.
        let parts: Vec<&str> = token.split('.').collect();
        let other = codec
            .issue(Uuid::new_v4(), "mallory", "m@x.com", "ROLE_ADMIN")
            .unwrap();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(codec.verify(&forged).is_err());
    }
}
