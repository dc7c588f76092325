//! PostgreSQL-backed recipe repository.
//!
//! Recipes live in `recipes`; their tag and ingredient ids live in ordered
//! join tables. Writes replace the join rows inside the same transaction as
//! the recipe row so a reader never sees half an update.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use uuid::Uuid;

use crate::domain::ports::{RecordRepository, RecordRepositoryError};
use crate::domain::{
    AccountId, Price, Recipe, RecipeLink, RecordId, RecordName, TimeMinutes, sort_for_listing,
};

use super::diesel_helpers::{minutes_for_db, minutes_from_db, position_for_db};
use super::diesel_named_record_repository::{map_diesel_error, map_pool_error};
use super::models::{
    NewRecipeRow, RecipeChangeset, RecipeIngredientRow, RecipeRow, RecipeTagRow,
};
use super::pool::DbPool;
use super::schema::{recipe_ingredients, recipe_tags, recipes};

/// Diesel implementation of the recipe repository.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Association ids per recipe, in stored order.
#[derive(Debug, Default)]
struct Associations {
    tags: HashMap<Uuid, Vec<RecordId>>,
    ingredients: HashMap<Uuid, Vec<RecordId>>,
}

impl Associations {
    fn from_rows(tag_rows: Vec<RecipeTagRow>, ingredient_rows: Vec<RecipeIngredientRow>) -> Self {
        let mut associations = Self::default();
        for row in tag_rows {
            associations
                .tags
                .entry(row.recipe_id)
                .or_default()
                .push(RecordId::from_uuid(row.tag_id));
        }
        for row in ingredient_rows {
            associations
                .ingredients
                .entry(row.recipe_id)
                .or_default()
                .push(RecordId::from_uuid(row.ingredient_id));
        }
        associations
    }

    fn take(&mut self, recipe_id: &Uuid) -> (Vec<RecordId>, Vec<RecordId>) {
        (
            self.tags.remove(recipe_id).unwrap_or_default(),
            self.ingredients.remove(recipe_id).unwrap_or_default(),
        )
    }
}

fn corrupted(field: &str, err: impl std::fmt::Display) -> RecordRepositoryError {
    RecordRepositoryError::query(format!("invalid stored recipe {field}: {err}"))
}

fn row_to_recipe(
    row: RecipeRow,
    associations: &mut Associations,
) -> Result<Recipe, RecordRepositoryError> {
    let (tags, ingredients) = associations.take(&row.id);
    let minutes = minutes_from_db(row.time_minutes).map_err(|err| corrupted("time", err))?;
    Ok(Recipe {
        id: RecordId::from_uuid(row.id),
        owner: AccountId::from_uuid(row.owner_id),
        title: RecordName::new(&row.title).map_err(|err| corrupted("title", err))?,
        time_minutes: TimeMinutes::new(minutes).map_err(|err| corrupted("time", err))?,
        price: Price::new(row.price).map_err(|err| corrupted("price", err))?,
        link: row
            .link
            .map(RecipeLink::new)
            .transpose()
            .map_err(|err| corrupted("link", err))?,
        ingredients,
        tags,
    })
}

fn tag_rows(recipe: &Recipe) -> Result<Vec<RecipeTagRow>, RecordRepositoryError> {
    recipe
        .tags
        .iter()
        .enumerate()
        .map(|(index, tag)| {
            Ok(RecipeTagRow {
                recipe_id: *recipe.id.as_uuid(),
                tag_id: *tag.as_uuid(),
                position: position_for_db(index).map_err(RecordRepositoryError::query)?,
            })
        })
        .collect()
}

fn ingredient_rows(recipe: &Recipe) -> Result<Vec<RecipeIngredientRow>, RecordRepositoryError> {
    recipe
        .ingredients
        .iter()
        .enumerate()
        .map(|(index, ingredient)| {
            Ok(RecipeIngredientRow {
                recipe_id: *recipe.id.as_uuid(),
                ingredient_id: *ingredient.as_uuid(),
                position: position_for_db(index).map_err(RecordRepositoryError::query)?,
            })
        })
        .collect()
}

/// Insert join rows, skipping empty batches.
async fn insert_links(
    conn: &mut diesel_async::AsyncPgConnection,
    tags: &[RecipeTagRow],
    ingredients: &[RecipeIngredientRow],
) -> Result<(), diesel::result::Error> {
    if !tags.is_empty() {
        diesel::insert_into(recipe_tags::table)
            .values(tags)
            .execute(conn)
            .await?;
    }
    if !ingredients.is_empty() {
        diesel::insert_into(recipe_ingredients::table)
            .values(ingredients)
            .execute(conn)
            .await?;
    }
    Ok(())
}

impl DieselRecipeRepository {
    /// Load recipes matching `owner` (and `id` when given) with their links.
    async fn load(
        &self,
        owner: &AccountId,
        id: Option<&RecordId>,
    ) -> Result<Vec<Recipe>, RecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner_id = *owner.as_uuid();
        let recipe_id = id.map(|id| *id.as_uuid());

        let (rows, tag_links, ingredient_links) = conn
            .transaction(|conn| {
                async move {
                    let mut query = recipes::table
                        .filter(recipes::owner_id.eq(owner_id))
                        .select(RecipeRow::as_select())
                        .into_boxed();
                    if let Some(recipe_id) = recipe_id {
                        query = query.filter(recipes::id.eq(recipe_id));
                    }
                    let rows: Vec<RecipeRow> = query.load(conn).await?;

                    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
                    let tag_links: Vec<RecipeTagRow> = recipe_tags::table
                        .filter(recipe_tags::recipe_id.eq_any(&ids))
                        .select(RecipeTagRow::as_select())
                        .order_by((recipe_tags::recipe_id, recipe_tags::position))
                        .load(conn)
                        .await?;
                    let ingredient_links: Vec<RecipeIngredientRow> = recipe_ingredients::table
                        .filter(recipe_ingredients::recipe_id.eq_any(&ids))
                        .select(RecipeIngredientRow::as_select())
                        .order_by((
                            recipe_ingredients::recipe_id,
                            recipe_ingredients::position,
                        ))
                        .load(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>((rows, tag_links, ingredient_links))
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_diesel_error(err, "load recipes"))?;

        let mut associations = Associations::from_rows(tag_links, ingredient_links);
        let mut recipes = rows
            .into_iter()
            .map(|row| row_to_recipe(row, &mut associations))
            .collect::<Result<Vec<_>, _>>()?;
        sort_for_listing(&mut recipes);
        Ok(recipes)
    }
}

#[async_trait]
impl RecordRepository<Recipe> for DieselRecipeRepository {
    async fn list_by_owner(&self, owner: &AccountId) -> Result<Vec<Recipe>, RecordRepositoryError> {
        self.load(owner, None).await
    }

    async fn find_owned(
        &self,
        owner: &AccountId,
        id: &RecordId,
    ) -> Result<Option<Recipe>, RecordRepositoryError> {
        Ok(self.load(owner, Some(id)).await?.into_iter().next())
    }

    async fn insert(&self, recipe: &Recipe) -> Result<(), RecordRepositoryError> {
        let time_minutes =
            minutes_for_db(recipe.time_minutes.get()).map_err(RecordRepositoryError::query)?;
        let row = NewRecipeRow {
            id: *recipe.id.as_uuid(),
            owner_id: *recipe.owner.as_uuid(),
            title: recipe.title.as_ref(),
            time_minutes,
            price: recipe.price.amount(),
            link: recipe.link.as_ref().map(AsRef::as_ref),
        };
        let tags = tag_rows(recipe)?;
        let ingredients = ingredient_rows(recipe)?;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(recipes::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                insert_links(conn, &tags, &ingredients).await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_diesel_error(err, "insert recipe"))
    }

    async fn update(&self, recipe: &Recipe) -> Result<(), RecordRepositoryError> {
        let time_minutes =
            minutes_for_db(recipe.time_minutes.get()).map_err(RecordRepositoryError::query)?;
        let changeset = RecipeChangeset {
            title: recipe.title.as_ref(),
            time_minutes,
            price: recipe.price.amount(),
            link: recipe.link.as_ref().map(AsRef::as_ref),
        };
        let recipe_id = *recipe.id.as_uuid();
        let owner_id = *recipe.owner.as_uuid();
        let tags = tag_rows(recipe)?;
        let ingredients = ingredient_rows(recipe)?;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let found = conn
            .transaction(|conn| {
                async move {
                    let updated = diesel::update(
                        recipes::table
                            .filter(recipes::id.eq(recipe_id))
                            .filter(recipes::owner_id.eq(owner_id)),
                    )
                    .set(&changeset)
                    .execute(conn)
                    .await?;
                    if updated == 0 {
                        return Ok(false);
                    }

                    diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)))
                        .execute(conn)
                        .await?;
                    diesel::delete(
                        recipe_ingredients::table
                            .filter(recipe_ingredients::recipe_id.eq(recipe_id)),
                    )
                    .execute(conn)
                    .await?;
                    insert_links(conn, &tags, &ingredients).await?;
                    Ok::<_, diesel::result::Error>(true)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_diesel_error(err, "update recipe"))?;

        if !found {
            return Err(RecordRepositoryError::missing(recipe.id.to_string()));
        }
        Ok(())
    }
}
