//! Provider-claim extraction for federated logins.
//!
//! Each provider returns its user-info payload in a different shape: Google
//! is flat, Kakao nests the email under `kakao_account` and uses a numeric
//! root id, Naver wraps everything in a `response` object. The differences
//! are confined to this module; the rest of the crate only ever sees a
//! `ProviderClaims`.

use crate::error::AppError;
use crate::models::Provider;
use serde_json::Value;
use uuid::Uuid;

/// The uniform contract extracted from a provider's user-info payload.
#[derive(Debug, Clone)]
pub struct ProviderClaims {
    pub provider: Provider,
    /// The provider-issued stable subject identifier.
    pub subject_id: String,
    pub email: String,
    /// Seed for a generated local username, e.g. `google_3f2a91bc`.
    pub username_seed: String,
}

impl ProviderClaims {
    /// Maps a raw user-info payload into the uniform claim contract.
    ///
    /// Fails with a validation error when the payload lacks the fields the
    /// provider is documented to return; the caller turns that into a
    /// failure redirect.
    pub fn from_attributes(provider: Provider, attrs: &Value) -> Result<Self, AppError> {
        let subject_id = extract_subject_id(provider, attrs)?;
        let email = extract_email(provider, attrs)?;
        Ok(Self {
            provider,
            subject_id,
            email,
            username_seed: generate_username_seed(provider),
        })
    }
}

/// Generated usernames: provider name plus a short random suffix, retried by
/// the reconciler on the (unlikely) collision.
pub fn generate_username_seed(provider: Provider) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}", provider, &suffix[..8])
}

fn extract_subject_id(provider: Provider, attrs: &Value) -> Result<String, AppError> {
    let subject = match provider {
        Provider::Google => attrs.get("sub").map(value_to_string),
        // Kakao's root id is numeric.
        Provider::Kakao => attrs.get("id").map(value_to_string),
        Provider::Naver => attrs.pointer("/response/id").map(value_to_string),
    };
    subject.ok_or_else(|| missing(provider, "subject id"))
}

fn extract_email(provider: Provider, attrs: &Value) -> Result<String, AppError> {
    let email = match provider {
        Provider::Google => attrs.get("email"),
        Provider::Kakao => attrs.pointer("/kakao_account/email"),
        Provider::Naver => attrs.pointer("/response/email"),
    };
    email
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| missing(provider, "email"))
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn missing(provider: Provider, field: &str) -> AppError {
    AppError::Validation(format!("{} payload is missing the {}", provider, field))
}
