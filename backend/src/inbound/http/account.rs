//! Account API handlers.
//!
//! ```text
//! POST   /api/v1/auth/register   {"name":"Ada","email":"ada@example.com","password":"secret"}
//! POST   /api/v1/auth/login      {"email":"ada@example.com","password":"secret"}
//! PATCH  /api/v1/auth/updateUser {"name":"Ada","email":"ada@example.com","theme":"light"}
//! DELETE /api/v1/auth/deleteUser
//! ```

use actix_web::{HttpResponse, delete, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::AuthSession;
use crate::domain::{
    AuthenticatedUser, CredentialValidationError, Error, LoginCredentials, ProfileUpdate,
    Registration,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::MessageResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::field_error;

/// Registration request body for `POST /api/v1/auth/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub is_demo: bool,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = CredentialValidationError;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.name, &value.email, &value.password, value.is_demo)
    }
}

/// Login request body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = CredentialValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

/// Profile update body for `PATCH /api/v1/auth/updateUser`. Every field is
/// required.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    #[schema(example = "light")]
    pub theme: String,
}

impl TryFrom<UpdateUserRequest> for ProfileUpdate {
    type Error = CredentialValidationError;

    fn try_from(value: UpdateUserRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.name, &value.email, &value.theme)
    }
}

/// Create an account and return its first token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthSession),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(payload.into_inner()).map_err(field_error)?;
    let session = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(session))
}

/// Exchange credentials for a token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthSession),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AuthSession>> {
    let credentials = LoginCredentials::try_from(payload.into_inner()).map_err(field_error)?;
    let session = state.accounts.login(credentials).await?;
    Ok(web::Json(session))
}

/// Replace the caller's name, email and theme. Returns a fresh token.
#[utoipa::path(
    patch,
    path = "/api/v1/auth/updateUser",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = AuthSession),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Account no longer exists", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["auth"],
    operation_id = "updateUser"
)]
#[patch("/auth/updateUser")]
pub async fn update_user(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<AuthSession>> {
    let update = ProfileUpdate::try_from(payload.into_inner()).map_err(field_error)?;
    let session = state.accounts.update_profile(user.user_id(), update).await?;
    Ok(web::Json(session))
}

/// Delete the caller's account together with every anime entry and playlist
/// they own.
#[utoipa::path(
    delete,
    path = "/api/v1/auth/deleteUser",
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["auth"],
    operation_id = "deleteUser"
)]
#[delete("/auth/deleteUser")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<MessageResponse>> {
    state.accounts.delete_account(user.user_id()).await?;
    Ok(web::Json(MessageResponse::new("User deleted")))
}
