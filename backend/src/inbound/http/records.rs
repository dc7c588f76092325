//! Tag and ingredient endpoints.
//!
//! ```text
//! GET   /recipe/tags
//! POST  /recipe/tags       {"name":"Vegan"}
//! GET   /recipe/tags/{id}
//! PATCH /recipe/tags/{id}  {"name":"Dessert"}
//! ```
//!
//! Ingredients mirror tags under `/recipe/ingredients`.

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    Error, Ingredient, NamedRecord, NamedRecordDraft, NamedRecordPatch, RecordId, Tag,
};

use super::ApiResult;
use super::auth::AuthenticatedAccount;
use super::error::method_not_allowed;
use super::state::{HttpState, RecordPortsFor};
use super::validation::{FieldName, parse_name, require};

const NAME: FieldName = FieldName::new("name");

/// Creation body for tags and ingredients.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct NamedRecordRequest {
    #[schema(example = "Vegan")]
    pub name: Option<String>,
}

/// Tag or ingredient as returned to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct NamedRecordResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: Uuid,
    #[schema(example = "Vegan")]
    pub name: String,
}

impl NamedRecordResponse {
    pub(crate) fn from_record<R: NamedRecord>(record: &R) -> Self {
        Self {
            id: *record.id().as_uuid(),
            name: record.name().as_ref().to_owned(),
        }
    }
}

async fn list_records<R: NamedRecord>(
    state: &HttpState,
    caller: &AuthenticatedAccount,
) -> ApiResult<Vec<NamedRecordResponse>>
where
    HttpState: RecordPortsFor<R>,
{
    let records = RecordPortsFor::<R>::query(state).list(&caller.id()).await?;
    Ok(records.iter().map(NamedRecordResponse::from_record).collect())
}

async fn create_record<R: NamedRecord>(
    state: &HttpState,
    caller: &AuthenticatedAccount,
    payload: NamedRecordRequest,
) -> ApiResult<NamedRecordResponse>
where
    HttpState: RecordPortsFor<R>,
{
    let name = parse_name(require(payload.name, NAME)?, NAME)?;
    let record = RecordPortsFor::<R>::command(state)
        .create(&caller.id(), NamedRecordDraft { name })
        .await?;
    Ok(NamedRecordResponse::from_record(&record))
}

async fn fetch_record<R: NamedRecord>(
    state: &HttpState,
    caller: &AuthenticatedAccount,
    id: Uuid,
) -> ApiResult<NamedRecordResponse>
where
    HttpState: RecordPortsFor<R>,
{
    let record = RecordPortsFor::<R>::query(state)
        .fetch(&caller.id(), &RecordId::from_uuid(id))
        .await?;
    Ok(NamedRecordResponse::from_record(&record))
}

async fn update_record<R: NamedRecord>(
    state: &HttpState,
    caller: &AuthenticatedAccount,
    id: Uuid,
    payload: NamedRecordRequest,
) -> ApiResult<NamedRecordResponse>
where
    HttpState: RecordPortsFor<R>,
{
    let name = payload
        .name
        .map(|raw| parse_name(raw, NAME))
        .transpose()?;
    let record = RecordPortsFor::<R>::command(state)
        .update(
            &caller.id(),
            &RecordId::from_uuid(id),
            NamedRecordPatch { name },
        )
        .await?;
    Ok(NamedRecordResponse::from_record(&record))
}

/// The caller's tags, by name descending.
#[utoipa::path(
    get,
    path = "/recipe/tags",
    responses(
        (status = 200, description = "Tags", body = [NamedRecordResponse]),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["tags"],
    operation_id = "listTags",
    security(("token" = []))
)]
pub async fn list_tags(
    state: web::Data<HttpState>,
    caller: AuthenticatedAccount,
) -> ApiResult<web::Json<Vec<NamedRecordResponse>>> {
    list_records::<Tag>(&state, &caller).await.map(web::Json)
}

/// Create a tag owned by the caller.
#[utoipa::path(
    post,
    path = "/recipe/tags",
    request_body = NamedRecordRequest,
    responses(
        (status = 201, description = "Tag created", body = NamedRecordResponse),
        (status = 400, description = "Invalid name", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["tags"],
    operation_id = "createTag",
    security(("token" = []))
)]
pub async fn create_tag(
    state: web::Data<HttpState>,
    caller: AuthenticatedAccount,
    payload: web::Json<NamedRecordRequest>,
) -> ApiResult<HttpResponse> {
    let tag = create_record::<Tag>(&state, &caller, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(tag))
}

/// One of the caller's tags.
#[utoipa::path(
    get,
    path = "/recipe/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag id")),
    responses(
        (status = 200, description = "Tag", body = NamedRecordResponse),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "No such tag for this caller", body = Error)
    ),
    tags = ["tags"],
    operation_id = "getTag",
    security(("token" = []))
)]
pub async fn get_tag(
    state: web::Data<HttpState>,
    caller: AuthenticatedAccount,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<NamedRecordResponse>> {
    fetch_record::<Tag>(&state, &caller, path.into_inner())
        .await
        .map(web::Json)
}

/// Rename one of the caller's tags.
#[utoipa::path(
    patch,
    path = "/recipe/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag id")),
    request_body = NamedRecordRequest,
    responses(
        (status = 200, description = "Updated tag", body = NamedRecordResponse),
        (status = 400, description = "Invalid name", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "No such tag for this caller", body = Error)
    ),
    tags = ["tags"],
    operation_id = "updateTag",
    security(("token" = []))
)]
pub async fn update_tag(
    state: web::Data<HttpState>,
    caller: AuthenticatedAccount,
    path: web::Path<Uuid>,
    payload: web::Json<NamedRecordRequest>,
) -> ApiResult<web::Json<NamedRecordResponse>> {
    update_record::<Tag>(&state, &caller, path.into_inner(), payload.into_inner())
        .await
        .map(web::Json)
}

/// The caller's ingredients, by name descending.
#[utoipa::path(
    get,
    path = "/recipe/ingredients",
    responses(
        (status = 200, description = "Ingredients", body = [NamedRecordResponse]),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["ingredients"],
    operation_id = "listIngredients",
    security(("token" = []))
)]
pub async fn list_ingredients(
    state: web::Data<HttpState>,
    caller: AuthenticatedAccount,
) -> ApiResult<web::Json<Vec<NamedRecordResponse>>> {
    list_records::<Ingredient>(&state, &caller)
        .await
        .map(web::Json)
}

/// Create an ingredient owned by the caller.
#[utoipa::path(
    post,
    path = "/recipe/ingredients",
    request_body = NamedRecordRequest,
    responses(
        (status = 201, description = "Ingredient created", body = NamedRecordResponse),
        (status = 400, description = "Invalid name", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["ingredients"],
    operation_id = "createIngredient",
    security(("token" = []))
)]
pub async fn create_ingredient(
    state: web::Data<HttpState>,
    caller: AuthenticatedAccount,
    payload: web::Json<NamedRecordRequest>,
) -> ApiResult<HttpResponse> {
    let ingredient = create_record::<Ingredient>(&state, &caller, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(ingredient))
}

/// One of the caller's ingredients.
#[utoipa::path(
    get,
    path = "/recipe/ingredients/{id}",
    params(("id" = Uuid, Path, description = "Ingredient id")),
    responses(
        (status = 200, description = "Ingredient", body = NamedRecordResponse),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "No such ingredient for this caller", body = Error)
    ),
    tags = ["ingredients"],
    operation_id = "getIngredient",
    security(("token" = []))
)]
pub async fn get_ingredient(
    state: web::Data<HttpState>,
    caller: AuthenticatedAccount,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<NamedRecordResponse>> {
    fetch_record::<Ingredient>(&state, &caller, path.into_inner())
        .await
        .map(web::Json)
}

/// Rename one of the caller's ingredients.
#[utoipa::path(
    patch,
    path = "/recipe/ingredients/{id}",
    params(("id" = Uuid, Path, description = "Ingredient id")),
    request_body = NamedRecordRequest,
    responses(
        (status = 200, description = "Updated ingredient", body = NamedRecordResponse),
        (status = 400, description = "Invalid name", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "No such ingredient for this caller", body = Error)
    ),
    tags = ["ingredients"],
    operation_id = "updateIngredient",
    security(("token" = []))
)]
pub async fn update_ingredient(
    state: web::Data<HttpState>,
    caller: AuthenticatedAccount,
    path: web::Path<Uuid>,
    payload: web::Json<NamedRecordRequest>,
) -> ApiResult<web::Json<NamedRecordResponse>> {
    update_record::<Ingredient>(&state, &caller, path.into_inner(), payload.into_inner())
        .await
        .map(web::Json)
}

/// Register tag and ingredient resources inside the `/recipe` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/tags")
            .route(web::get().to(list_tags))
            .route(web::post().to(create_tag))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/tags/{id}")
            .route(web::get().to(get_tag))
            .route(web::patch().to(update_tag))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/ingredients")
            .route(web::get().to(list_ingredients))
            .route(web::post().to(create_ingredient))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/ingredients/{id}")
            .route(web::get().to(get_ingredient))
            .route(web::patch().to(update_ingredient))
            .default_service(web::to(method_not_allowed)),
    );
}

#[cfg(test)]
mod tests;
