//!
//! # Error Handling
//!
//! Defines the application-wide error type `AppError` and its mapping to HTTP
//! responses. Every error carries a stable machine-readable code alongside a
//! human-readable message, so clients can branch on `code` without parsing
//! prose. Token-level failures (`MissingToken`, `InvalidToken`, `TokenExpired`)
//! are produced by the request extractors, never by the auth middleware itself.
//!
//! `From` implementations are provided for `validator::ValidationErrors`,
//! `bcrypt::BcryptError`, the token-verification error `AuthError`, and the
//! persistence error `StoreError`, so handlers can use the `?` operator
//! throughout.

use crate::auth::token::AuthError;
use crate::store::{ConflictKind, StoreError};
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// All error conditions the API can surface to a caller.
#[derive(Debug)]
pub enum AppError {
    /// Request body failed validation (HTTP 400).
    Validation(String),
    /// No bearer credential was presented on a protected route (HTTP 401).
    MissingToken,
    /// A bearer credential was presented but its signature or structure is
    /// invalid (HTTP 401).
    InvalidToken,
    /// The presented token is past its expiry instant (HTTP 401).
    TokenExpired,
    /// Direct login failed. Unknown email and wrong password both map here so
    /// callers cannot probe for account existence (HTTP 401).
    LoginFailed,
    /// The caller is authenticated but not allowed to touch the resource
    /// (HTTP 403).
    AccessDenied,
    /// No account matches the requested id (HTTP 404).
    UserNotFound,
    /// No todo matches the requested id (HTTP 404).
    TodoNotFound,
    /// The federated-login provider is not one we support (HTTP 404).
    UnsupportedProvider(String),
    /// The requested username is already taken (HTTP 409).
    DuplicateUsername,
    /// The requested email is already registered (HTTP 409).
    DuplicateEmail,
    /// A uniqueness constraint was violated and could not be resolved by
    /// retrying the lookup path (HTTP 409).
    Conflict(String),
    /// Unexpected server-side failure (HTTP 500). The detail is logged but a
    /// generic message is returned to the caller.
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code for the error, suitable for client-side
    /// branching.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_FAILED",
            AppError::MissingToken => "MISSING_TOKEN",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::LoginFailed => "LOGIN_FAILED",
            AppError::AccessDenied => "ACCESS_DENIED",
            AppError::UserNotFound => "USER_NOT_FOUND",
            AppError::TodoNotFound => "TODO_NOT_FOUND",
            AppError::UnsupportedProvider(_) => "UNSUPPORTED_PROVIDER",
            AppError::DuplicateUsername => "DUPLICATE_USERNAME",
            AppError::DuplicateEmail => "DUPLICATE_EMAIL",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::MissingToken => "Missing or invalid bearer token".into(),
            AppError::InvalidToken => "Authentication required".into(),
            AppError::TokenExpired => "Session expired, please log in again".into(),
            AppError::LoginFailed => "Invalid email or password".into(),
            AppError::AccessDenied => "Access denied".into(),
            AppError::UserNotFound => "Account not found".into(),
            AppError::TodoNotFound => "Todo not found".into(),
            AppError::UnsupportedProvider(p) => format!("Unsupported login provider: {}", p),
            AppError::DuplicateUsername => "Username is already taken".into(),
            AppError::DuplicateEmail => "Email is already registered".into(),
            AppError::Conflict(msg) => msg.clone(),
            // Internal details stay in the server log.
            AppError::Internal(_) => "An internal error occurred".into(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::MissingToken
            | AppError::InvalidToken
            | AppError::TokenExpired
            | AppError::LoginFailed => StatusCode::UNAUTHORIZED,
            AppError::AccessDenied => StatusCode::FORBIDDEN,
            AppError::UserNotFound | AppError::TodoNotFound | AppError::UnsupportedProvider(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::DuplicateUsername | AppError::DuplicateEmail | AppError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = self {
            log::error!("internal error: {}", detail);
        }
        HttpResponse::build(self.status_code()).json(json!({
            "code": self.code(),
            "message": self.message(),
        }))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("password hashing failed: {}", error))
    }
}

/// Token verification failures map onto the 401 family. The middleware never
/// converts these into responses directly; the extractor does.
impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        match error {
            AuthError::Expired => AppError::TokenExpired,
            AuthError::InvalidSignature | AuthError::Malformed => AppError::InvalidToken,
        }
    }
}

/// Persistence failures: uniqueness violations become the matching 409, all
/// other backend errors are internal.
impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::Conflict(ConflictKind::Username) => AppError::DuplicateUsername,
            StoreError::Conflict(ConflictKind::Email) => AppError::DuplicateEmail,
            StoreError::Conflict(ConflictKind::ProviderSubject) => {
                AppError::Conflict("External identity is already linked".into())
            }
            StoreError::Backend(msg) => AppError::Internal(msg),
        }
    }
}
