use crate::error::AppError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The closed set of federated login providers.
/// Corresponds to the `auth_provider` SQL enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "auth_provider", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Kakao,
    Naver,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Kakao => "kakao",
            Provider::Naver => "naver",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(Provider::Google),
            "kakao" => Ok(Provider::Kakao),
            "naver" => Ok(Provider::Naver),
            other => Err(AppError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Link between a provider-issued subject and a local account.
///
/// The `(provider, provider_subject_id)` pair is globally unique and a row is
/// written exactly once, at the first successful federated login for that
/// pair. Rows are removed only by the cascade when the owning account is
/// deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExternalIdentity {
    pub id: Uuid,
    pub provider: Provider,
    pub provider_subject_id: String,
    pub account_id: Uuid,
}

impl ExternalIdentity {
    pub fn new(provider: Provider, provider_subject_id: String, account_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider,
            provider_subject_id,
            account_id,
        }
    }
}
