//! User account HTTP handlers.
//!
//! ```text
//! POST /api/users/register {"email":"a@x.com","password":"secret"}
//! POST /api/users/login    {"email":"a@x.com","password":"secret"}
//! GET /api/users/profile
//! PUT /api/users/profile
//! DELETE /api/users/profile
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{
    AuthenticatedAccount, Credentials, DisplayName, EmailAddress, ProfileChanges,
    Registration, User,
};

use super::auth::BearerUser;
use super::error::{ApiResult, ErrorBody};
use super::state::HttpState;
use super::validation::validation_error;

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Unique login email.
    pub email: String,
    /// Raw password, hashed before storage.
    pub password: String,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Optional avatar reference.
    pub avatar: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Raw password.
    pub password: String,
}

/// Partial profile update body; absent fields are left unchanged.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// Replacement email, re-checked for uniqueness.
    pub email: Option<String>,
    /// Replacement password, re-hashed before storage.
    pub password: Option<String>,
    /// Replacement display name.
    pub display_name: Option<String>,
    /// Replacement avatar reference.
    pub avatar: Option<String>,
}

/// Public user record; the password hash is never serialised.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Stable identifier.
    pub id: i32,
    /// Login email.
    pub email: String,
    /// Display name, when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Avatar reference, when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Record creation timestamp, RFC 3339.
    pub created_at: String,
    /// Last modification timestamp, RFC 3339.
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id().get(),
            email: value.email().as_ref().to_owned(),
            display_name: value.display_name().map(|name| name.as_ref().to_owned()),
            avatar: value.avatar().map(str::to_owned),
            created_at: value.created_at().to_rfc3339(),
            updated_at: value.updated_at().to_rfc3339(),
        }
    }
}

/// Registration/login response: the user plus a bearer token.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// The account's public record.
    pub user: UserResponse,
    /// Signed bearer token with a fixed expiry.
    pub token: String,
}

impl From<AuthenticatedAccount> for AuthResponse {
    fn from(value: AuthenticatedAccount) -> Self {
        Self {
            user: UserResponse::from(value.user),
            token: value.token.into(),
        }
    }
}

fn parse_registration(payload: RegisterRequest) -> Result<Registration, crate::domain::Error> {
    let credentials = Credentials::try_from_parts(&payload.email, &payload.password)
        .map_err(validation_error)?;
    let display_name = payload
        .display_name
        .map(DisplayName::new)
        .transpose()
        .map_err(validation_error)?;
    Ok(Registration {
        credentials,
        display_name,
        avatar: payload.avatar,
    })
}

fn parse_profile_changes(
    payload: UpdateProfileRequest,
) -> Result<ProfileChanges, crate::domain::Error> {
    let email = payload
        .email
        .map(EmailAddress::new)
        .transpose()
        .map_err(validation_error)?;
    let password = match payload.password {
        Some(raw) if raw.is_empty() => {
            return Err(validation_error("password must not be empty"));
        }
        Some(raw) => Some(Zeroizing::new(raw)),
        None => None,
    };
    let display_name = payload
        .display_name
        .map(DisplayName::new)
        .transpose()
        .map_err(validation_error)?;
    Ok(ProfileChanges {
        email,
        password,
        display_name,
        avatar: payload.avatar,
    })
}

/// Create an account and issue its first token.
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/users/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = parse_registration(payload.into_inner())?;
    let account = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(AuthResponse::from(account)))
}

/// Authenticate credentials and issue a token.
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = Credentials::try_from_parts(&payload.email, &payload.password)
        .map_err(validation_error)?;
    let account = state.accounts.login(credentials).await?;
    Ok(HttpResponse::Ok().json(AuthResponse::from(account)))
}

/// Fetch the authenticated user's profile.
#[utoipa::path(
    get,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "Own profile", body = UserResponse),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 404, description = "Account no longer exists", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "getProfile"
)]
#[get("/users/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    user: BearerUser,
) -> ApiResult<web::Json<UserResponse>> {
    let profile = state.accounts.profile(user.0.user_id).await?;
    Ok(web::Json(UserResponse::from(profile)))
}

/// Apply a partial update to the authenticated user's profile.
#[utoipa::path(
    put,
    path = "/api/users/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 404, description = "Account no longer exists", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[put("/users/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    user: BearerUser,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let changes = parse_profile_changes(payload.into_inner())?;
    let updated = state.accounts.update_profile(user.0.user_id, changes).await?;
    Ok(web::Json(UserResponse::from(updated)))
}

/// Permanently delete the authenticated user's account.
///
/// Authored posts and votes are removed with it.
#[utoipa::path(
    delete,
    path = "/api/users/profile",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 404, description = "Account no longer exists", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "deleteAccount"
)]
#[delete("/users/profile")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    user: BearerUser,
) -> ApiResult<HttpResponse> {
    state.accounts.delete_account(user.0.user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
