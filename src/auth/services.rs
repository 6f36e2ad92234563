use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password_blocking, verify_password_blocking},
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    error::AppError,
};

/// Absent, `null` and `""` all count as missing.
fn required<'a>(field: &'a Option<String>, msg: &str) -> Result<&'a str, AppError> {
    match field.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(msg.into())),
    }
}

/// Validates the request in order, then creates the user. The first failing
/// check wins.
pub async fn register(store: &dyn UserStore, req: RegisterRequest) -> Result<User, AppError> {
    let name = required(&req.name, "The name field is required!")?;
    let email = required(&req.email, "The email field is required!")?;
    let password = required(&req.password, "The password field is required!")?;

    if req.confirmpassword.as_deref() != Some(password) {
        return Err(AppError::Validation("Both passwords must be the same!".into()));
    }

    if store.find_by_email(email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("Email already registered!".into()));
    }

    let hash = hash_password_blocking(password.to_string()).await?;

    // The pre-check above is not atomic; the store's unique constraint
    // catches a concurrent insert and reports it as the same conflict.
    let user = store
        .create(NewUser {
            name,
            email,
            password_hash: &hash,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Checks credentials and issues a token bound to the user's id.
pub async fn login(
    store: &dyn UserStore,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<String, AppError> {
    let email = required(&req.email, "The email field is required!")?;
    let password = required(&req.password, "The password field is required!")?;

    let Some(user) = store.find_by_email(email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::NotFound("User not found!".into()));
    };

    let ok = verify_password_blocking(password.to_string(), user.password_hash.clone()).await?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Validation("Invalid password!".into()));
    }

    let token = keys.issue(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(token)
}

/// Looks up the user named by `raw_id`. An id that does not parse is
/// reported the same way as an unknown one.
pub async fn profile(store: &dyn UserStore, raw_id: &str) -> Result<PublicUser, AppError> {
    let not_found = || AppError::NotFound("User not found".into());
    let id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;
    let user = store.find_by_id(id).await?.ok_or_else(not_found)?;
    Ok(user.into())
}
