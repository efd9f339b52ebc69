//! Federated login endpoints: the authorization redirect that sends the
//! browser to a provider, and the callback that exchanges the returned code,
//! reconciles the identity and hands the session token back to the frontend
//! via redirect. The callback never renders errors itself; every failure
//! becomes a redirect to the frontend's generic failure target.

use crate::{
    auth::{
        gateway::ProviderGateway, provider::ProviderClaims, IdentityReconciler, TokenCodec,
    },
    config::Config,
    error::AppError,
    models::Provider,
};
use actix_web::{get, http::header, web, HttpResponse, Responder};
use serde::Deserialize;

fn provider_scope(provider: Provider) -> &'static str {
    match provider {
        Provider::Google => "openid email profile",
        Provider::Kakao => "account_email",
        Provider::Naver => "",
    }
}

fn redirect(target: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header((header::LOCATION, target))
        .finish()
}

/// Entry point of the federated flow: 302 to the provider's authorization
/// endpoint.
#[get("/authorize/{provider}")]
pub async fn authorize(
    config: web::Data<Config>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let provider: Provider = path.into_inner().parse()?;
    let client = config.oauth.client(provider);
    let redirect_uri = config.redirect_uri(provider);

    let url = reqwest::Url::parse_with_params(
        &client.auth_url,
        &[
            ("response_type", "code"),
            ("client_id", client.client_id.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("scope", provider_scope(provider)),
        ],
    )
    .map_err(|e| AppError::Internal(format!("invalid authorize url: {}", e)))?;

    Ok(redirect(url.as_str()))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    /// Set by the provider when the user denied the request.
    pub error: Option<String>,
}

/// Provider callback: finish the login and bounce the browser back to the
/// frontend with a token (or to the failure target without one).
#[get("/code/{provider}")]
pub async fn callback(
    config: web::Data<Config>,
    gateway: web::Data<dyn ProviderGateway>,
    reconciler: web::Data<IdentityReconciler>,
    codec: web::Data<TokenCodec>,
    path: web::Path<String>,
    query: web::Query<CallbackQuery>,
) -> impl Responder {
    let provider_name = path.into_inner();
    match complete_login(
        &config,
        gateway.get_ref(),
        &reconciler,
        &codec,
        &provider_name,
        &query,
    )
    .await
    {
        Ok(target) => redirect(&target),
        Err(err) => {
            log::warn!("federated login via {} failed: {}", provider_name, err);
            redirect(&format!("{}/login?error=true", config.frontend_url))
        }
    }
}

async fn complete_login(
    config: &Config,
    gateway: &dyn ProviderGateway,
    reconciler: &IdentityReconciler,
    codec: &TokenCodec,
    provider_name: &str,
    query: &CallbackQuery,
) -> Result<String, AppError> {
    let provider: Provider = provider_name.parse()?;

    if let Some(error) = &query.error {
        return Err(AppError::Validation(format!(
            "provider reported an error: {}",
            error
        )));
    }
    let code = query
        .code
        .as_deref()
        .ok_or_else(|| AppError::Validation("missing authorization code".into()))?;

    let attributes = gateway.fetch_user_info(provider, code).await?;
    let claims = ProviderClaims::from_attributes(provider, &attributes)?;
    let account = reconciler.resolve(&claims).await?;

    let token = codec.issue(
        account.id,
        &account.username,
        &account.email,
        account.primary_role(),
    )?;

    Ok(format!(
        "{}/login/oauth2/code/{}?token={}",
        config.frontend_url, provider, token
    ))
}
