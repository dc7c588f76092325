//! Account endpoints.
//!
//! ```text
//! POST  /user/create {"email":"chef@example.com","password":"password1234","name":"Chef"}
//! POST  /user/token  {"email":"chef@example.com","password":"password1234"}
//! GET   /user/me     Authorization: Token <key>
//! PATCH /user/me     {"name":"Head chef"}
//! ```

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::ports::{AccountProfile, ProfileUpdate, RegistrationRequest};
use crate::domain::{Error, LoginCredentials, LoginValidationError};

use super::ApiResult;
use super::auth::AuthenticatedAccount;
use super::error::method_not_allowed;
use super::state::HttpState;

/// Registration body. Missing fields are treated as empty.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct CreateUserRequest {
    #[schema(example = "chef@example.com")]
    pub email: String,
    #[schema(example = "password1234", min_length = 1)]
    pub password: String,
    #[schema(example = "Chef")]
    pub name: String,
}

/// Public account view. The password is never included.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "chef@example.com")]
    pub email: String,
    #[schema(example = "Chef")]
    pub name: String,
}

impl From<AccountProfile> for UserResponse {
    fn from(profile: AccountProfile) -> Self {
        Self {
            email: profile.email.into(),
            name: profile.name.into(),
        }
    }
}

/// Token request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct TokenRequest {
    #[schema(example = "chef@example.com")]
    pub email: String,
    #[schema(example = "password1234")]
    pub password: String,
}

impl TryFrom<TokenRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: TokenRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

/// Issued API token.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TokenResponse {
    #[schema(example = "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b")]
    pub token: String,
}

/// Partial profile update. Unknown fields, including `email`, are ignored.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyEmail => Error::invalid_request("email must not be empty")
            .with_details(json!({ "field": "email", "code": "empty_email" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/user/create",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid input or email already registered", body = Error),
        (status = 503, description = "Account store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser",
    security([])
)]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let CreateUserRequest {
        email,
        password,
        name,
    } = payload.into_inner();
    let profile = state
        .registration
        .register(RegistrationRequest {
            email,
            password: Zeroizing::new(password),
            name,
        })
        .await?;
    Ok(HttpResponse::Created().json(UserResponse::from(profile)))
}

/// Exchange email and password for an API token.
#[utoipa::path(
    post,
    path = "/user/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing fields or invalid credentials", body = Error),
        (status = 503, description = "Account store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "createToken",
    security([])
)]
pub async fn create_token(
    state: web::Data<HttpState>,
    payload: web::Json<TokenRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let token = state.login.issue_token(&credentials).await?;
    Ok(web::Json(TokenResponse {
        token: token.expose().to_owned(),
    }))
}

/// The caller's profile.
#[utoipa::path(
    get,
    path = "/user/me",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 405, description = "Method not allowed", body = Error)
    ),
    tags = ["users"],
    operation_id = "getCurrentUser",
    security(("token" = []))
)]
pub async fn current_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedAccount,
) -> ApiResult<web::Json<UserResponse>> {
    let profile = state.profile.fetch_profile(&caller.id()).await?;
    Ok(web::Json(profile.into()))
}

/// Update the caller's name and/or password.
#[utoipa::path(
    patch,
    path = "/user/me",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Invalid name or password", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser",
    security(("token" = []))
)]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedAccount,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let UpdateUserRequest { name, password } = payload.into_inner();
    let profile = state
        .profile_command
        .update_profile(
            &caller.id(),
            ProfileUpdate {
                name,
                password: password.map(Zeroizing::new),
            },
        )
        .await?;
    Ok(web::Json(profile.into()))
}

/// Register `/user/*` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .service(
                web::resource("/create")
                    .route(web::post().to(create_user))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/token")
                    .route(web::post().to(create_token))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/me")
                    .route(web::get().to(current_user))
                    .route(web::patch().to(update_current_user))
                    .default_service(web::to(method_not_allowed)),
            ),
    );
}
