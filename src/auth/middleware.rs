use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::sync::Arc;

use crate::auth::token::{AuthError, TokenCodec};
use crate::auth::Principal;

const BEARER_PREFIX: &str = "Bearer ";

/// Path prefixes that are served without authentication: registration and
/// login, the OAuth2 authorization/callback families (those requests carry
/// provider query parameters, not bearer tokens), and API documentation.
const PUBLIC_PATH_PREFIXES: &[&str] = &[
    "/health",
    "/users/signup",
    "/users/login",
    "/oauth2",
    "/login/oauth2",
    "/api-docs",
    "/swagger-ui",
];

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATH_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Recorded in request extensions when no `Principal` could be established,
/// so the downstream authorization layer can answer with a precise code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No bearer credential was presented (or the header scheme was not
    /// `Bearer`, which gets the same treatment as an anonymous request).
    Missing,
    /// A credential was presented but its structure or signature is invalid.
    Invalid,
    /// A well-formed credential past its expiry.
    Expired,
}

impl From<AuthError> for AuthRejection {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Expired => AuthRejection::Expired,
            AuthError::Malformed | AuthError::InvalidSignature => AuthRejection::Invalid,
        }
    }
}

/// Per-request authentication gate.
///
/// Validates the bearer credential when one is present and attaches the
/// resulting `Principal` to request extensions. It never aborts the
/// pipeline: whether an unauthenticated request is acceptable is decided
/// downstream (see `CurrentUser`), keeping token validation separate from
/// the authorization decision.
pub struct AuthMiddleware {
    codec: Arc<TokenCodec>,
}

impl AuthMiddleware {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            codec: self.codec.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    codec: Arc<TokenCodec>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // The allow-list is checked before any token work so public paths
        // never pay for parsing.
        if is_public_path(req.path()) {
            return Box::pin(self.service.call(req));
        }

        let bearer = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix(BEARER_PREFIX));

        match bearer {
            None => {
                req.extensions_mut().insert(AuthRejection::Missing);
            }
            Some(token) => match self.codec.verify(token) {
                Ok(claims) => {
                    req.extensions_mut().insert(Principal::from_claims(&claims));
                }
                Err(err) => {
                    log::debug!("rejected bearer token on {}: {}", req.path(), err);
                    req.extensions_mut().insert(AuthRejection::from(err));
                }
            },
        }

        Box::pin(self.service.call(req))
    }
}
