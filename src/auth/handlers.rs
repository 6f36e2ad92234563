use axum::{
    extract::{rejection::JsonRejection, FromRef, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, RegisterRequest, UserResponse},
        extractors::AuthUser,
        jwt::JwtKeys,
        services,
    },
    error::{AppError, MessageResponse},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/user/:id", get(get_user))
}

/// A request without a JSON content type is read as an empty body, so its
/// fields fail the usual "required" checks. A body that is not valid JSON
/// for `T` is a validation error.
fn payload_or_default<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match body {
        Ok(Json(payload)) => Ok(payload),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(e) => {
            warn!(error = %e, "rejected request body");
            Err(AppError::Validation("Invalid request body!".into()))
        }
    }
}

#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let payload = payload_or_default(body)?;
    services::register(state.users.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created with success!")),
    ))
}

#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let payload = payload_or_default(body)?;
    let keys = JwtKeys::from_ref(&state);
    let token = services::login(state.users.as_ref(), &keys, payload).await?;
    Ok(Json(LoginResponse {
        msg: "Authenticated sucessfully!".into(),
        token,
    }))
}

#[instrument(skip(state, subject))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    tracing::debug!(%subject, "profile lookup");
    let user = services::profile(state.users.as_ref(), &id).await?;
    Ok(Json(UserResponse { user }))
}
