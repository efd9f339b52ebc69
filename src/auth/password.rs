use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};
use uuid::Uuid;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::Internal(format!("failed to verify password: {}", e)))
}

/// Random credential hash stored for accounts created through federated
/// login. The plaintext is discarded immediately, so such accounts cannot be
/// entered through the direct-login path until the owner sets a password.
pub fn generate_placeholder_hash() -> Result<String, AppError> {
    hash_password(&Uuid::new_v4().to_string())
}
