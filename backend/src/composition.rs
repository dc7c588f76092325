//! Wiring of repositories, services and HTTP state.
//!
//! The binary and the HTTP tests share this so both exercise the same
//! service graph; only the repository set differs.

use std::sync::Arc;

use crate::domain::ports::{AccountRepository, RecordRepository, TokenRepository};
use crate::domain::{
    AccountManager, AccountService, Ingredient, NamedRecordService, PasswordHashing,
    PasswordPolicy, Recipe, RecipeService, Tag,
};
use crate::inbound::http::state::{AccountPorts, HttpState, RecordPorts};
use crate::outbound::memory::{
    InMemoryAccountRepository, InMemoryRecordRepository, InMemoryTokenRepository,
};
use crate::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselIngredientRepository, DieselRecipeRepository,
    DieselTagRepository, DieselTokenRepository,
};

/// Every driven port the services need.
#[derive(Clone)]
pub struct Repositories {
    pub accounts: Arc<dyn AccountRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub tags: Arc<dyn RecordRepository<Tag>>,
    pub ingredients: Arc<dyn RecordRepository<Ingredient>>,
    pub recipes: Arc<dyn RecordRepository<Recipe>>,
}

impl Repositories {
    /// Process-local storage, lost on restart.
    pub fn in_memory() -> Self {
        Self {
            accounts: Arc::new(InMemoryAccountRepository::new()),
            tokens: Arc::new(InMemoryTokenRepository::new()),
            tags: Arc::new(InMemoryRecordRepository::<Tag>::new()),
            ingredients: Arc::new(InMemoryRecordRepository::<Ingredient>::new()),
            recipes: Arc::new(InMemoryRecordRepository::<Recipe>::new()),
        }
    }

    /// PostgreSQL storage over a shared pool.
    pub fn diesel(pool: &DbPool) -> Self {
        Self {
            accounts: Arc::new(DieselAccountRepository::new(pool.clone())),
            tokens: Arc::new(DieselTokenRepository::new(pool.clone())),
            tags: Arc::new(DieselTagRepository::new(pool.clone())),
            ingredients: Arc::new(DieselIngredientRepository::new(pool.clone())),
            recipes: Arc::new(DieselRecipeRepository::new(pool.clone())),
        }
    }
}

/// Services built from one repository set.
#[derive(Clone)]
pub struct Services {
    /// Shared account factory, also used for the startup superuser.
    pub manager: Arc<AccountManager>,
    pub state: HttpState,
}

/// Build services and HTTP state.
pub fn build_services(
    repositories: Repositories,
    policy: PasswordPolicy,
    hashing: PasswordHashing,
) -> Services {
    let Repositories {
        accounts,
        tokens,
        tags,
        ingredients,
        recipes,
    } = repositories;

    let manager = Arc::new(AccountManager::new(Arc::clone(&accounts), hashing));
    let account_service = Arc::new(AccountService::new(
        Arc::clone(&manager),
        accounts,
        tokens,
        policy,
    ));
    let tag_service = Arc::new(NamedRecordService::new(Arc::clone(&tags)));
    let ingredient_service = Arc::new(NamedRecordService::new(Arc::clone(&ingredients)));
    let recipe_service = Arc::new(RecipeService::new(recipes, tags, ingredients));

    let state = HttpState::new(
        AccountPorts {
            registration: account_service.clone(),
            login: account_service.clone(),
            authenticator: account_service.clone(),
            profile: account_service.clone(),
            profile_command: account_service,
        },
        RecordPorts {
            tags: tag_service.clone(),
            tags_command: tag_service,
            ingredients: ingredient_service.clone(),
            ingredients_command: ingredient_service,
            recipes: recipe_service.clone(),
            recipes_command: recipe_service,
        },
    );

    Services { manager, state }
}
