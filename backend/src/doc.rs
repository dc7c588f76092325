//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer together
//! with its request and response schemas, and the `token` security scheme
//! (`Authorization: Token <key>`).
//!
//! The generated specification is served by Swagger UI in debug builds and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::health::ProbeStatus;
use crate::inbound::http::recipes::{
    RecipeDetailResponse, RecipeRequest, RecipeResponse, RecipeUpdateRequest,
};
use crate::inbound::http::records::{NamedRecordRequest, NamedRecordResponse};
use crate::inbound::http::users::{
    CreateUserRequest, TokenRequest, TokenResponse, UpdateUserRequest, UserResponse,
};

/// Enrich the generated document with the token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "token",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "`Token <key>` as issued by POST /user/token.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Recipe backend API",
        description = "Token-authenticated accounts with owner-scoped tags, ingredients and recipes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("token" = [])),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::create_token,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::records::list_tags,
        crate::inbound::http::records::create_tag,
        crate::inbound::http::records::get_tag,
        crate::inbound::http::records::update_tag,
        crate::inbound::http::records::list_ingredients,
        crate::inbound::http::records::create_ingredient,
        crate::inbound::http::records::get_ingredient,
        crate::inbound::http::records::update_ingredient,
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::get_recipe,
        crate::inbound::http::recipes::update_recipe,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        CreateUserRequest,
        UserResponse,
        TokenRequest,
        TokenResponse,
        UpdateUserRequest,
        NamedRecordRequest,
        NamedRecordResponse,
        RecipeRequest,
        RecipeUpdateRequest,
        RecipeResponse,
        RecipeDetailResponse,
        ProbeStatus,
    )),
    tags(
        (name = "users", description = "Registration, tokens and the caller's profile"),
        (name = "tags", description = "Owner-scoped recipe tags"),
        (name = "ingredients", description = "Owner-scoped ingredients"),
        (name = "recipes", description = "Owner-scoped recipes"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
