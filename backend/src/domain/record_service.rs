//! Owner-scoped record use-cases.
//!
//! Tags and ingredients share [`NamedRecordService`]. Recipes additionally
//! check that every referenced tag and ingredient belongs to the caller.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use super::ports::{RecipeQuery, RecordCommand, RecordQuery, RecordRepository, RecordRepositoryError};
use super::{
    AccountId, Error, Ingredient, NamedRecord, NamedRecordDraft, NamedRecordPatch, OwnedRecord,
    Recipe, RecipeDetail, RecipeDraft, RecipeFilter, RecipePatch, RecordId, Tag, dedup_ids,
};

fn map_record_repository_error(kind: &str, err: RecordRepositoryError) -> Error {
    debug!(error = %err, kind, "record repository failure");
    match err {
        RecordRepositoryError::Connection { .. } => {
            Error::service_unavailable(format!("{kind} store unavailable"))
        }
        RecordRepositoryError::Missing { .. } => Error::not_found(format!("{kind} not found")),
        RecordRepositoryError::Query { .. } => Error::internal(err.to_string()),
    }
}

fn not_found<R: OwnedRecord>() -> Error {
    Error::not_found(format!("{} not found", R::KIND))
}

/// Service for records that carry only a name.
pub struct NamedRecordService<R: NamedRecord> {
    records: Arc<dyn RecordRepository<R>>,
    _kind: PhantomData<fn() -> R>,
}

impl<R: NamedRecord> Clone for NamedRecordService<R> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            _kind: PhantomData,
        }
    }
}

impl<R: NamedRecord> NamedRecordService<R> {
    /// Bind the service to a repository.
    pub fn new(records: Arc<dyn RecordRepository<R>>) -> Self {
        Self {
            records,
            _kind: PhantomData,
        }
    }

    fn map_err(err: RecordRepositoryError) -> Error {
        map_record_repository_error(R::KIND.label(), err)
    }
}

#[async_trait]
impl<R: NamedRecord> RecordQuery<R> for NamedRecordService<R> {
    async fn list(&self, owner: &AccountId) -> Result<Vec<R>, Error> {
        self.records.list_by_owner(owner).await.map_err(Self::map_err)
    }

    async fn fetch(&self, owner: &AccountId, id: &RecordId) -> Result<R, Error> {
        self.records
            .find_owned(owner, id)
            .await
            .map_err(Self::map_err)?
            .ok_or_else(not_found::<R>)
    }
}

#[async_trait]
impl<R: NamedRecord> RecordCommand<R> for NamedRecordService<R> {
    async fn create(&self, owner: &AccountId, draft: NamedRecordDraft) -> Result<R, Error> {
        let record = R::create(RecordId::random(), *owner, draft.name);
        self.records.insert(&record).await.map_err(Self::map_err)?;
        info!(kind = %R::KIND, record_id = %record.id(), "record created");
        Ok(record)
    }

    async fn update(
        &self,
        owner: &AccountId,
        id: &RecordId,
        patch: NamedRecordPatch,
    ) -> Result<R, Error> {
        let mut record = self.fetch(owner, id).await?;
        if let Some(name) = patch.name {
            record.rename(name);
        }
        self.records.update(&record).await.map_err(Self::map_err)?;
        Ok(record)
    }
}

/// Service for recipes and their associations.
#[derive(Clone)]
pub struct RecipeService {
    recipes: Arc<dyn RecordRepository<Recipe>>,
    tags: Arc<dyn RecordRepository<Tag>>,
    ingredients: Arc<dyn RecordRepository<Ingredient>>,
}

impl RecipeService {
    /// Bind the service to its repositories.
    pub fn new(
        recipes: Arc<dyn RecordRepository<Recipe>>,
        tags: Arc<dyn RecordRepository<Tag>>,
        ingredients: Arc<dyn RecordRepository<Ingredient>>,
    ) -> Self {
        Self {
            recipes,
            tags,
            ingredients,
        }
    }

    async fn find_recipe(&self, owner: &AccountId, id: &RecordId) -> Result<Recipe, Error> {
        self.recipes
            .find_owned(owner, id)
            .await
            .map_err(|err| map_record_repository_error("recipe", err))?
            .ok_or_else(not_found::<Recipe>)
    }

    /// Resolve `ids` against the owner's records, failing on any stranger.
    async fn resolve<R: OwnedRecord>(
        repository: &dyn RecordRepository<R>,
        owner: &AccountId,
        ids: &[RecordId],
        field: &str,
    ) -> Result<Vec<R>, Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let owned = repository
            .list_by_owner(owner)
            .await
            .map_err(|err| map_record_repository_error(R::KIND.label(), err))?;
        ids.iter()
            .map(|id| {
                owned
                    .iter()
                    .find(|record| record.id() == *id)
                    .cloned()
                    .ok_or_else(|| {
                        Error::invalid_request(format!("unknown {} {id}", R::KIND)).with_details(
                            json!({ "field": field, "code": "unknown_reference", "id": id }),
                        )
                    })
            })
            .collect()
    }

    async fn check_references(
        &self,
        owner: &AccountId,
        tags: Option<&[RecordId]>,
        ingredients: Option<&[RecordId]>,
    ) -> Result<(), Error> {
        if let Some(ids) = tags {
            Self::resolve(self.tags.as_ref(), owner, ids, "tags").await?;
        }
        if let Some(ids) = ingredients {
            Self::resolve(self.ingredients.as_ref(), owner, ids, "ingredients").await?;
        }
        Ok(())
    }
}

#[async_trait]
impl RecordCommand<Recipe> for RecipeService {
    async fn create(&self, owner: &AccountId, draft: RecipeDraft) -> Result<Recipe, Error> {
        let RecipeDraft {
            title,
            time_minutes,
            price,
            link,
            ingredients,
            tags,
        } = draft;
        let ingredients = dedup_ids(ingredients);
        let tags = dedup_ids(tags);
        self.check_references(owner, Some(tags.as_slice()), Some(ingredients.as_slice()))
            .await?;

        let recipe = Recipe {
            id: RecordId::random(),
            owner: *owner,
            title,
            time_minutes,
            price,
            link,
            ingredients,
            tags,
        };
        self.recipes
            .insert(&recipe)
            .await
            .map_err(|err| map_record_repository_error("recipe", err))?;
        info!(kind = %Recipe::KIND, record_id = %recipe.id, "record created");
        Ok(recipe)
    }

    async fn update(
        &self,
        owner: &AccountId,
        id: &RecordId,
        patch: RecipePatch,
    ) -> Result<Recipe, Error> {
        let mut recipe = self.find_recipe(owner, id).await?;
        self.check_references(owner, patch.tags.as_deref(), patch.ingredients.as_deref())
            .await?;
        recipe.apply(patch);
        self.recipes
            .update(&recipe)
            .await
            .map_err(|err| map_record_repository_error("recipe", err))?;
        Ok(recipe)
    }
}

#[async_trait]
impl RecipeQuery for RecipeService {
    async fn list_filtered(
        &self,
        owner: &AccountId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, Error> {
        let recipes = self
            .recipes
            .list_by_owner(owner)
            .await
            .map_err(|err| map_record_repository_error("recipe", err))?;
        Ok(recipes
            .into_iter()
            .filter(|recipe| filter.matches(recipe))
            .collect())
    }

    async fn fetch_detail(&self, owner: &AccountId, id: &RecordId) -> Result<RecipeDetail, Error> {
        let recipe = self.find_recipe(owner, id).await?;
        let tags = Self::resolve(self.tags.as_ref(), owner, &recipe.tags, "tags").await?;
        let ingredients = Self::resolve(
            self.ingredients.as_ref(),
            owner,
            &recipe.ingredients,
            "ingredients",
        )
        .await?;
        Ok(RecipeDetail {
            recipe,
            ingredients,
            tags,
        })
    }
}
