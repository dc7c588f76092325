//! Diesel row structs.
//!
//! Internal to the persistence layer; repositories convert them to domain
//! types before anything leaves the adapter.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::schema::{accounts, auth_tokens, recipe_ingredients, recipe_tags, recipes};

/// Row read from `accounts`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable account.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub name: &'a str,
    pub password: &'a str,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

/// Mutable account columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = accounts)]
pub(crate) struct AccountChangeset<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub password: &'a str,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Insertable token digest.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = auth_tokens)]
pub(crate) struct NewAuthTokenRow<'a> {
    pub digest: &'a str,
    pub account_id: Uuid,
}

/// Tag or ingredient row, selected as `(id, owner_id, name)`.
#[derive(Debug, Clone, Queryable)]
pub(crate) struct NamedRecordRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
}

/// Row read from `recipes`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecipeRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
}

/// Insertable recipe.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = recipes)]
pub(crate) struct NewRecipeRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: &'a str,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<&'a str>,
}

/// Mutable recipe columns. `link` is written even when `None`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = recipes)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct RecipeChangeset<'a> {
    pub title: &'a str,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<&'a str>,
}

/// Recipe to tag link.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = recipe_tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecipeTagRow {
    pub recipe_id: Uuid,
    pub tag_id: Uuid,
    pub position: i32,
}

/// Recipe to ingredient link.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = recipe_ingredients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecipeIngredientRow {
    pub recipe_id: Uuid,
    pub ingredient_id: Uuid,
    pub position: i32,
}
