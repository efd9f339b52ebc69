use crate::{
    auth::{
        hash_password, verify_password, CurrentUser, LoginRequest, SignUpRequest, TokenCodec,
        TokenResponse, UpdateProfileRequest,
    },
    error::AppError,
    models::{Account, UserResponse},
    store::AccountStore,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new account.
///
/// Username and email are checked for duplicates before the insert; the
/// database constraints back those checks up under concurrency.
#[post("/signup")]
pub async fn signup(
    store: web::Data<dyn AccountStore>,
    body: web::Json<SignUpRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    if store.exists_by_username(&body.username).await? {
        return Err(AppError::DuplicateUsername);
    }
    if store.exists_by_email(&body.email).await? {
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = hash_password(&body.password)?;
    let account = Account::new(body.username.clone(), body.email.clone(), Some(password_hash));
    store.insert(&account).await?;

    log::info!("registered account {}", account.id);
    Ok(HttpResponse::Created().json(UserResponse::from(&account)))
}

/// Exchange email + password for a session token.
///
/// An unknown email and a wrong password produce the identical response, so
/// the endpoint cannot be used to enumerate accounts.
#[post("/login")]
pub async fn login(
    store: web::Data<dyn AccountStore>,
    codec: web::Data<TokenCodec>,
    body: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let account = store
        .find_by_email(&body.email)
        .await?
        .ok_or(AppError::LoginFailed)?;

    // Accounts created through federated login carry a placeholder hash the
    // caller cannot know; a missing hash is treated as a plain mismatch.
    let stored_hash = account.password_hash.as_deref().ok_or(AppError::LoginFailed)?;
    if !verify_password(&body.password, stored_hash)? {
        return Err(AppError::LoginFailed);
    }

    let token = codec.issue(
        account.id,
        &account.username,
        &account.email,
        account.primary_role(),
    )?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// Fetch the caller's own profile.
#[get("/me")]
pub async fn me(
    store: web::Data<dyn AccountStore>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let account = store
        .find_by_id(user.0.id)
        .await?
        .ok_or(AppError::UserNotFound)?;
    Ok(HttpResponse::Ok().json(UserResponse::from(&account)))
}

/// Update the caller's username, email and/or password.
#[put("/me")]
pub async fn update_me(
    store: web::Data<dyn AccountStore>,
    user: CurrentUser,
    body: web::Json<UpdateProfileRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let mut account = store
        .find_by_id(user.0.id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    if let Some(username) = &body.username {
        if *username != account.username {
            if store.exists_by_username(username).await? {
                return Err(AppError::DuplicateUsername);
            }
            account.username = username.clone();
        }
    }

    if let Some(email) = &body.email {
        if *email != account.email {
            if store.exists_by_email(email).await? {
                return Err(AppError::DuplicateEmail);
            }
            account.email = email.clone();
        }
    }

    if let Some(password) = &body.password {
        account.password_hash = Some(hash_password(password)?);
    }

    account.touch();
    store.update(&account).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(&account)))
}

/// Close the caller's account. External identities and todos are removed by
/// the cascade.
#[delete("/me")]
pub async fn delete_me(
    store: web::Data<dyn AccountStore>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    if !store.delete(user.0.id).await? {
        return Err(AppError::UserNotFound);
    }
    log::info!("deleted account {}", user.0.id);
    Ok(HttpResponse::NoContent().finish())
}
