//! Recipe endpoints.
//!
//! ```text
//! GET   /recipe/recipes?tags=<id>,<id>&ingredients=<id>
//! POST  /recipe/recipes       {"title":"Soup","time_minutes":30,"price":"5.00"}
//! GET   /recipe/recipes/{id}  tags and ingredients nested
//! PATCH /recipe/recipes/{id}  {"link":null}
//! ```
//!
//! Prices travel as decimal strings so no precision is lost in transit.

use actix_web::{HttpResponse, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{Error, Recipe, RecipeDetail, RecipeDraft, RecipeFilter, RecipePatch, RecordId};

use super::ApiResult;
use super::auth::AuthenticatedAccount;
use super::error::method_not_allowed;
use super::records::NamedRecordResponse;
use super::state::HttpState;
use super::validation::{
    FieldName, parse_id_csv, parse_link, parse_name, parse_price, parse_time_minutes, record_ids,
    require,
};

const TITLE: FieldName = FieldName::new("title");

/// Recipe creation body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RecipeRequest {
    #[schema(example = "Tomato soup")]
    pub title: Option<String>,
    #[schema(example = 30)]
    pub time_minutes: Option<u32>,
    #[schema(value_type = Option<String>, example = "5.00")]
    pub price: Option<Decimal>,
    #[schema(example = "https://example.com/tomato-soup")]
    pub link: Option<String>,
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub tags: Vec<Uuid>,
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub ingredients: Vec<Uuid>,
}

impl TryFrom<RecipeRequest> for RecipeDraft {
    type Error = Error;

    fn try_from(value: RecipeRequest) -> Result<Self, Self::Error> {
        let RecipeRequest {
            title,
            time_minutes,
            price,
            link,
            tags,
            ingredients,
        } = value;
        Ok(Self {
            title: parse_name(require(title, TITLE)?, TITLE)?,
            time_minutes: parse_time_minutes(require(
                time_minutes,
                FieldName::new("time_minutes"),
            )?)?,
            price: parse_price(require(price, FieldName::new("price"))?)?,
            link: parse_link(link)?,
            ingredients: record_ids(ingredients),
            tags: record_ids(tags),
        })
    }
}

/// Keep "field present with null" apart from "field absent".
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial recipe update. `"link": null` clears the link.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RecipeUpdateRequest {
    pub title: Option<String>,
    pub time_minutes: Option<u32>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, nullable)]
    pub link: Option<Option<String>>,
    #[schema(value_type = Option<Vec<String>>)]
    pub tags: Option<Vec<Uuid>>,
    #[schema(value_type = Option<Vec<String>>)]
    pub ingredients: Option<Vec<Uuid>>,
}

impl TryFrom<RecipeUpdateRequest> for RecipePatch {
    type Error = Error;

    fn try_from(value: RecipeUpdateRequest) -> Result<Self, Self::Error> {
        let RecipeUpdateRequest {
            title,
            time_minutes,
            price,
            link,
            tags,
            ingredients,
        } = value;
        Ok(Self {
            title: title.map(|raw| parse_name(raw, TITLE)).transpose()?,
            time_minutes: time_minutes.map(parse_time_minutes).transpose()?,
            price: price.map(parse_price).transpose()?,
            link: link.map(parse_link).transpose()?,
            ingredients: ingredients.map(record_ids),
            tags: tags.map(record_ids),
        })
    }
}

/// Recipe summary as listed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct RecipeResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: Uuid,
    pub title: String,
    pub time_minutes: u32,
    #[schema(example = "5.00")]
    pub price: String,
    pub link: Option<String>,
    #[schema(value_type = Vec<String>)]
    pub tags: Vec<Uuid>,
    #[schema(value_type = Vec<String>)]
    pub ingredients: Vec<Uuid>,
}

fn uuids(ids: &[RecordId]) -> Vec<Uuid> {
    ids.iter().map(|id| *id.as_uuid()).collect()
}

impl From<&Recipe> for RecipeResponse {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: *recipe.id.as_uuid(),
            title: recipe.title.as_ref().to_owned(),
            time_minutes: recipe.time_minutes.get(),
            price: recipe.price.to_string(),
            link: recipe.link.as_ref().map(|link| link.as_ref().to_owned()),
            tags: uuids(&recipe.tags),
            ingredients: uuids(&recipe.ingredients),
        }
    }
}

/// Recipe with tags and ingredients expanded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct RecipeDetailResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: Uuid,
    pub title: String,
    pub time_minutes: u32,
    #[schema(example = "5.00")]
    pub price: String,
    pub link: Option<String>,
    pub tags: Vec<NamedRecordResponse>,
    pub ingredients: Vec<NamedRecordResponse>,
}

impl From<RecipeDetail> for RecipeDetailResponse {
    fn from(detail: RecipeDetail) -> Self {
        let RecipeResponse {
            id,
            title,
            time_minutes,
            price,
            link,
            ..
        } = RecipeResponse::from(&detail.recipe);
        Self {
            id,
            title,
            time_minutes,
            price,
            link,
            tags: detail
                .tags
                .iter()
                .map(NamedRecordResponse::from_record)
                .collect(),
            ingredients: detail
                .ingredients
                .iter()
                .map(NamedRecordResponse::from_record)
                .collect(),
        }
    }
}

/// Association filters, each a comma-separated id list.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeListQuery {
    /// Recipes having any of these tags.
    pub tags: Option<String>,
    /// Recipes having any of these ingredients.
    pub ingredients: Option<String>,
}

impl TryFrom<&RecipeListQuery> for RecipeFilter {
    type Error = Error;

    fn try_from(query: &RecipeListQuery) -> Result<Self, Self::Error> {
        let parse = |raw: &Option<String>, field| {
            raw.as_deref()
                .map(|value| parse_id_csv(value, FieldName::new(field)))
                .transpose()
        };
        Ok(Self {
            tags: parse(&query.tags, "tags")?,
            ingredients: parse(&query.ingredients, "ingredients")?,
        })
    }
}

/// The caller's recipes, by title descending.
#[utoipa::path(
    get,
    path = "/recipe/recipes",
    params(RecipeListQuery),
    responses(
        (status = 200, description = "Recipes", body = [RecipeResponse]),
        (status = 400, description = "Malformed filter ids", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "listRecipes",
    security(("token" = []))
)]
pub async fn list_recipes(
    state: web::Data<HttpState>,
    caller: AuthenticatedAccount,
    query: web::Query<RecipeListQuery>,
) -> ApiResult<web::Json<Vec<RecipeResponse>>> {
    let filter = RecipeFilter::try_from(&*query)?;
    let recipes = state.recipes.list_filtered(&caller.id(), &filter).await?;
    Ok(web::Json(recipes.iter().map(RecipeResponse::from).collect()))
}

/// Create a recipe owned by the caller.
#[utoipa::path(
    post,
    path = "/recipe/recipes",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid fields or foreign associations", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe",
    security(("token" = []))
)]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    caller: AuthenticatedAccount,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<HttpResponse> {
    let draft = RecipeDraft::try_from(payload.into_inner())?;
    let recipe = state.recipes_command.create(&caller.id(), draft).await?;
    Ok(HttpResponse::Created().json(RecipeResponse::from(&recipe)))
}

/// One of the caller's recipes with associations expanded.
#[utoipa::path(
    get,
    path = "/recipe/recipes/{id}",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe", body = RecipeDetailResponse),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "No such recipe for this caller", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "getRecipe",
    security(("token" = []))
)]
pub async fn get_recipe(
    state: web::Data<HttpState>,
    caller: AuthenticatedAccount,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<RecipeDetailResponse>> {
    let detail = state
        .recipes
        .fetch_detail(&caller.id(), &RecordId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(detail.into()))
}

/// Partially update one of the caller's recipes.
#[utoipa::path(
    patch,
    path = "/recipe/recipes/{id}",
    params(("id" = Uuid, Path, description = "Recipe id")),
    request_body = RecipeUpdateRequest,
    responses(
        (status = 200, description = "Updated recipe", body = RecipeResponse),
        (status = 400, description = "Invalid fields or foreign associations", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "No such recipe for this caller", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "updateRecipe",
    security(("token" = []))
)]
pub async fn update_recipe(
    state: web::Data<HttpState>,
    caller: AuthenticatedAccount,
    path: web::Path<Uuid>,
    payload: web::Json<RecipeUpdateRequest>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let patch = RecipePatch::try_from(payload.into_inner())?;
    let recipe = state
        .recipes_command
        .update(&caller.id(), &RecordId::from_uuid(path.into_inner()), patch)
        .await?;
    Ok(web::Json(RecipeResponse::from(&recipe)))
}

/// Register recipe resources inside the `/recipe` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/recipes")
            .route(web::get().to(list_recipes))
            .route(web::post().to(create_recipe))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/recipes/{id}")
            .route(web::get().to(get_recipe))
            .route(web::patch().to(update_recipe))
            .default_service(web::to(method_not_allowed)),
    );
}
