//! Integration tests for the Diesel repositories against embedded PostgreSQL.
//!
//! Ignored by default; run with `cargo test -- --ignored`. Set
//! `SKIP_TEST_CLUSTER=1` where the cluster cannot start.

use pg_embedded_setup_unpriv::TemporaryDatabase;
use recipe_backend::domain::ports::{
    AccountRepository, AccountRepositoryError, RecordRepository, RecordRepositoryError,
    TokenRepository,
};
use recipe_backend::domain::{
    Account, AccountId, AccountName, ApiToken, Email, Ingredient, NamedRecord, PasswordHashing,
    Price, Recipe, RecipeLink, RecordId, RecordName, Tag, TimeMinutes,
};
use recipe_backend::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselIngredientRepository, DieselRecipeRepository,
    DieselTagRepository, DieselTokenRepository, PoolConfig,
};
use rstest::{fixture, rstest};
use rust_decimal::Decimal;
use tokio::runtime::Runtime;

mod support;

use support::{handle_cluster_setup_failure, migrated_database};

struct TestContext {
    /// Tokio runtime reused for all async operations in this test.
    runtime: Runtime,
    pool: DbPool,
    _database: TemporaryDatabase,
}

fn setup_test_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let database = migrated_database()?;
    let config = PoolConfig::new(database.url())
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;
    Ok(TestContext {
        runtime,
        pool,
        _database: database,
    })
}

#[fixture]
fn context() -> Option<TestContext> {
    match setup_test_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn account(email: &str) -> Account {
    let digest = PasswordHashing::new(8, 1, 1)
        .expect("cheap argon2 params are valid")
        .hash("password1234")
        .expect("hashing succeeds");
    Account::new(
        Email::normalize(email).expect("valid email"),
        AccountName::new("Cook").expect("valid name"),
        digest,
    )
}

async fn stored_account(pool: &DbPool, email: &str) -> Account {
    let account = account(email);
    DieselAccountRepository::new(pool.clone())
        .insert(&account)
        .await
        .expect("account insert succeeds");
    account
}

fn name(raw: &str) -> RecordName {
    RecordName::new(raw).expect("valid name")
}

#[rstest]
#[ignore = "requires embedded PostgreSQL"]
fn accounts_round_trip_and_reject_duplicate_emails(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    let repository = DieselAccountRepository::new(ctx.pool.clone());

    ctx.runtime.block_on(async {
        let mut created = account("chef@Example.com");
        repository.insert(&created).await.expect("insert succeeds");

        let found = repository
            .find_by_email(&created.email)
            .await
            .expect("lookup succeeds")
            .expect("account present");
        assert_eq!(found.id, created.id);
        assert!(found.check_password("password1234"));

        let duplicate = account("chef@example.COM");
        let err = repository
            .insert(&duplicate)
            .await
            .expect_err("duplicate rejected");
        assert!(matches!(err, AccountRepositoryError::DuplicateEmail { .. }));

        created.is_staff = true;
        repository.update(&created).await.expect("update succeeds");
        let reloaded = repository
            .find_by_id(&created.id)
            .await
            .expect("lookup succeeds")
            .expect("account present");
        assert!(reloaded.is_staff);

        let stranger = account("ghost@example.com");
        let err = repository
            .update(&stranger)
            .await
            .expect_err("missing row");
        assert!(matches!(err, AccountRepositoryError::Missing { .. }));
    });
}

#[rstest]
#[ignore = "requires embedded PostgreSQL"]
fn tokens_resolve_to_their_account(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    let tokens = DieselTokenRepository::new(ctx.pool.clone());

    ctx.runtime.block_on(async {
        let owner = stored_account(&ctx.pool, "owner@example.com").await;
        let token = ApiToken::generate();
        tokens
            .store(&token.digest(), &owner.id)
            .await
            .expect("store succeeds");

        let resolved = tokens
            .find_account(&token.digest())
            .await
            .expect("lookup succeeds");
        let unknown = tokens
            .find_account(&ApiToken::generate().digest())
            .await
            .expect("lookup succeeds");

        assert_eq!(resolved, Some(owner.id));
        assert_eq!(unknown, None);
    });
}

#[rstest]
#[ignore = "requires embedded PostgreSQL"]
fn named_records_are_owner_scoped_and_reverse_ordered(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    let tags = DieselTagRepository::new(ctx.pool.clone());

    ctx.runtime.block_on(async {
        let mine = stored_account(&ctx.pool, "mine@example.com").await;
        let theirs = stored_account(&ctx.pool, "theirs@example.com").await;
        for (owner, label) in [(&mine, "Brunch"), (&mine, "Vegan"), (&theirs, "Vegan")] {
            tags.insert(&Tag::create(RecordId::random(), owner.id, name(label)))
                .await
                .expect("insert succeeds");
        }

        let listed = tags.list_by_owner(&mine.id).await.expect("list succeeds");
        let labels: Vec<&str> = listed.iter().map(|tag| tag.name.as_ref()).collect();
        assert_eq!(labels, vec!["Vegan", "Brunch"]);

        let foreign = tags
            .find_owned(&theirs.id, &listed[0].id)
            .await
            .expect("lookup succeeds");
        assert!(foreign.is_none());

        let mut renamed = listed[1].clone();
        renamed.rename(name("Breakfast"));
        tags.update(&renamed).await.expect("update succeeds");
        let err = tags
            .update(&Tag::create(RecordId::random(), mine.id, name("Ghost")))
            .await
            .expect_err("missing row");
        assert!(matches!(err, RecordRepositoryError::Missing { .. }));
    });
}

#[rstest]
#[ignore = "requires embedded PostgreSQL"]
fn recipes_persist_their_associations(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    let tags = DieselTagRepository::new(ctx.pool.clone());
    let ingredients = DieselIngredientRepository::new(ctx.pool.clone());
    let recipes = DieselRecipeRepository::new(ctx.pool.clone());

    ctx.runtime.block_on(async {
        let owner = stored_account(&ctx.pool, "cook@example.com").await;
        let dinner = Tag::create(RecordId::random(), owner.id, name("Dinner"));
        let quick = Tag::create(RecordId::random(), owner.id, name("Quick"));
        let tomato = Ingredient::create(RecordId::random(), owner.id, name("Tomato"));
        for tag in [&dinner, &quick] {
            tags.insert(tag).await.expect("tag insert succeeds");
        }
        ingredients
            .insert(&tomato)
            .await
            .expect("ingredient insert succeeds");

        let mut recipe = Recipe {
            id: RecordId::random(),
            owner: owner.id,
            title: name("Tomato soup"),
            time_minutes: TimeMinutes::new(30).expect("valid time"),
            price: Price::new(Decimal::new(550, 2)).expect("valid price"),
            link: Some(RecipeLink::new("https://example.com/soup").expect("valid link")),
            ingredients: vec![tomato.id],
            tags: vec![quick.id, dinner.id],
        };
        recipes.insert(&recipe).await.expect("recipe insert succeeds");

        let loaded = recipes
            .find_owned(&owner.id, &recipe.id)
            .await
            .expect("lookup succeeds")
            .expect("recipe present");
        assert_eq!(loaded, recipe);

        recipe.link = None;
        recipe.tags = vec![dinner.id];
        recipes.update(&recipe).await.expect("update succeeds");
        let listed = recipes.list_by_owner(&owner.id).await.expect("list succeeds");
        assert_eq!(listed, vec![recipe.clone()]);

        let stranger = AccountId::random();
        assert!(
            recipes
                .list_by_owner(&stranger)
                .await
                .expect("list succeeds")
                .is_empty()
        );
    });
}
