//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see domain ports, so
//! they can be exercised against in-memory adapters or mocks.

use std::sync::Arc;

use crate::domain::ports::{
    AccountProfileCommand, AccountProfileQuery, AccountRegistration, LoginService, RecipeQuery,
    RecordCommand, RecordQuery, TokenAuthenticator,
};
use crate::domain::{Ingredient, OwnedRecord, Recipe, Tag};

/// Account-facing ports.
#[derive(Clone)]
pub struct AccountPorts {
    pub registration: Arc<dyn AccountRegistration>,
    pub login: Arc<dyn LoginService>,
    pub authenticator: Arc<dyn TokenAuthenticator>,
    pub profile: Arc<dyn AccountProfileQuery>,
    pub profile_command: Arc<dyn AccountProfileCommand>,
}

/// Record-facing ports.
#[derive(Clone)]
pub struct RecordPorts {
    pub tags: Arc<dyn RecordQuery<Tag>>,
    pub tags_command: Arc<dyn RecordCommand<Tag>>,
    pub ingredients: Arc<dyn RecordQuery<Ingredient>>,
    pub ingredients_command: Arc<dyn RecordCommand<Ingredient>>,
    pub recipes: Arc<dyn RecipeQuery>,
    pub recipes_command: Arc<dyn RecordCommand<Recipe>>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub registration: Arc<dyn AccountRegistration>,
    pub login: Arc<dyn LoginService>,
    pub authenticator: Arc<dyn TokenAuthenticator>,
    pub profile: Arc<dyn AccountProfileQuery>,
    pub profile_command: Arc<dyn AccountProfileCommand>,
    pub tags: Arc<dyn RecordQuery<Tag>>,
    pub tags_command: Arc<dyn RecordCommand<Tag>>,
    pub ingredients: Arc<dyn RecordQuery<Ingredient>>,
    pub ingredients_command: Arc<dyn RecordCommand<Ingredient>>,
    pub recipes: Arc<dyn RecipeQuery>,
    pub recipes_command: Arc<dyn RecordCommand<Recipe>>,
}

impl HttpState {
    /// Combine both port bundles.
    pub fn new(accounts: AccountPorts, records: RecordPorts) -> Self {
        let AccountPorts {
            registration,
            login,
            authenticator,
            profile,
            profile_command,
        } = accounts;
        let RecordPorts {
            tags,
            tags_command,
            ingredients,
            ingredients_command,
            recipes,
            recipes_command,
        } = records;
        Self {
            registration,
            login,
            authenticator,
            profile,
            profile_command,
            tags,
            tags_command,
            ingredients,
            ingredients_command,
            recipes,
            recipes_command,
        }
    }
}

/// Access to the query and command ports for one record kind.
///
/// Lets the tag and ingredient handlers share one implementation.
pub trait RecordPortsFor<R: OwnedRecord> {
    /// Read port.
    fn query(&self) -> &Arc<dyn RecordQuery<R>>;
    /// Write port.
    fn command(&self) -> &Arc<dyn RecordCommand<R>>;
}

impl RecordPortsFor<Tag> for HttpState {
    fn query(&self) -> &Arc<dyn RecordQuery<Tag>> {
        &self.tags
    }

    fn command(&self) -> &Arc<dyn RecordCommand<Tag>> {
        &self.tags_command
    }
}

impl RecordPortsFor<Ingredient> for HttpState {
    fn query(&self) -> &Arc<dyn RecordQuery<Ingredient>> {
        &self.ingredients
    }

    fn command(&self) -> &Arc<dyn RecordCommand<Ingredient>> {
        &self.ingredients_command
    }
}
