//! Diesel table definitions.
//!
//! These must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Authenticatable accounts. `email` is unique after normalization.
    accounts (id) {
        id -> Uuid,
        email -> Varchar,
        name -> Varchar,
        /// Argon2 PHC string, or `!` for an unusable password.
        password -> Varchar,
        is_active -> Bool,
        is_staff -> Bool,
        is_superuser -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// SHA-256 digests of issued API tokens.
    auth_tokens (digest) {
        digest -> Varchar,
        account_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    tags (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Varchar,
    }
}

diesel::table! {
    ingredients (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Varchar,
    }
}

diesel::table! {
    recipes (id) {
        id -> Uuid,
        owner_id -> Uuid,
        title -> Varchar,
        time_minutes -> Int4,
        price -> Numeric,
        link -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Recipe to tag links. `position` keeps the caller's order.
    recipe_tags (recipe_id, tag_id) {
        recipe_id -> Uuid,
        tag_id -> Uuid,
        position -> Int4,
    }
}

diesel::table! {
    /// Recipe to ingredient links. `position` keeps the caller's order.
    recipe_ingredients (recipe_id, ingredient_id) {
        recipe_id -> Uuid,
        ingredient_id -> Uuid,
        position -> Int4,
    }
}

diesel::joinable!(auth_tokens -> accounts (account_id));
diesel::joinable!(recipe_tags -> recipes (recipe_id));
diesel::joinable!(recipe_tags -> tags (tag_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));

diesel::allow_tables_to_appear_in_same_query!(
    accounts,
    auth_tokens,
    tags,
    ingredients,
    recipes,
    recipe_tags,
    recipe_ingredients,
);
