//! Outbound side of the federated login flow: turning the authorization code
//! handed to our callback into the provider's raw user-info payload. The
//! shape of that payload is provider-specific and interpreted elsewhere
//! (`auth::provider`); this module only moves bytes.

use crate::config::Config;
use crate::error::AppError;
use crate::models::Provider;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Exchanges an authorization code and fetches the user-info payload.
    async fn fetch_user_info(&self, provider: Provider, code: &str) -> Result<Value, AppError>;
}

#[derive(Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
}

/// Talks to the real provider endpoints over HTTPS.
pub struct HttpProviderGateway {
    http: reqwest::Client,
    config: Config,
}

impl HttpProviderGateway {
    pub fn new(config: Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ProviderGateway for HttpProviderGateway {
    async fn fetch_user_info(&self, provider: Provider, code: &str) -> Result<Value, AppError> {
        let client = self.config.oauth.client(provider);
        let redirect_uri = self.config.redirect_uri(provider);

        let exchange: TokenExchangeResponse = self
            .http
            .post(&client.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", client.client_id.as_str()),
                ("client_secret", client.client_secret.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("{} token exchange failed: {}", provider, e)))?
            .error_for_status()
            .map_err(|e| AppError::Internal(format!("{} token exchange rejected: {}", provider, e)))?
            .json()
            .await
            .map_err(|e| {
                AppError::Internal(format!("{} token response unreadable: {}", provider, e))
            })?;

        self.http
            .get(&client.userinfo_url)
            .bearer_auth(&exchange.access_token)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("{} user-info fetch failed: {}", provider, e)))?
            .error_for_status()
            .map_err(|e| {
                AppError::Internal(format!("{} user-info fetch rejected: {}", provider, e))
            })?
            .json()
            .await
            .map_err(|e| {
                AppError::Internal(format!("{} user-info payload unreadable: {}", provider, e))
            })
    }
}
