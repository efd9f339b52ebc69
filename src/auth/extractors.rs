use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::middleware::AuthRejection;
use crate::auth::Principal;
use crate::error::AppError;

/// Extracts the authenticated `Principal` from request extensions.
///
/// `AuthMiddleware` validates tokens but never rejects requests; this
/// extractor is the authorization layer that turns "no principal" into a
/// 401, with the code depending on why the middleware could not establish
/// one (`MISSING_TOKEN`, `INVALID_TOKEN`, `TOKEN_EXPIRED`).
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        if let Some(principal) = req.extensions().get::<Principal>().cloned() {
            return ready(Ok(CurrentUser(principal)));
        }

        let err = match req.extensions().get::<AuthRejection>() {
            Some(AuthRejection::Expired) => AppError::TokenExpired,
            Some(AuthRejection::Invalid) => AppError::InvalidToken,
            // No rejection recorded means the middleware never ran for this
            // route; treat it the same as an anonymous request.
            Some(AuthRejection::Missing) | None => AppError::MissingToken,
        };
        ready(Err(err.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::TokenCodec;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use uuid::Uuid;

    fn principal() -> Principal {
        let codec = TokenCodec::new("extractor-secret", 3600);
        let token = codec
            .issue(Uuid::new_v4(), "alice", "a@x.com", "ROLE_USER")
            .unwrap();
        Principal::from_claims(&codec.verify(&token).unwrap())
    }

    #[actix_rt::test]
    async fn test_extracts_attached_principal() {
        let req = test::TestRequest::default().to_http_request();
        let expected = principal();
        req.extensions_mut().insert(expected.clone());

        let mut payload = Payload::None;
        let user = CurrentUser::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(user.0.id, expected.id);
        assert_eq!(user.0.username, "alice");
    }

    #[actix_rt::test]
    async fn test_missing_principal_is_unauthorized() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let err = CurrentUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_expired_rejection_maps_to_token_expired() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthRejection::Expired);

        let mut payload = Payload::None;
        let err = CurrentUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();

        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "TOKEN_EXPIRED");
    }
}
