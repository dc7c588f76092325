//! Owner-scoped records: tags, ingredients and recipes.
//!
//! Each record belongs to exactly one account. Nothing here enforces access;
//! scoping happens in the repositories, which only ever query by owner.

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::AccountId;

/// Maximum length of record names, recipe titles and links.
pub const RECORD_TEXT_MAX: usize = 255;
/// Largest storable price (`NUMERIC(5,2)`).
pub const PRICE_MAX: Decimal = Decimal::from_parts(99_999, 0, 0, false, 2);
/// Largest storable preparation time.
pub const TIME_MINUTES_MAX: u32 = i32::MAX as u32;

/// Validation errors for record fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    EmptyName,
    NameTooLong { max: usize },
    NegativePrice,
    PriceTooPrecise,
    PriceTooLarge,
    TimeTooLarge { max: u32 },
    LinkTooLong { max: usize },
    InvalidLink,
}

impl fmt::Display for RecordValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::NegativePrice => write!(f, "price must not be negative"),
            Self::PriceTooPrecise => write!(f, "price must have at most 2 decimal places"),
            Self::PriceTooLarge => write!(f, "price must be at most {PRICE_MAX}"),
            Self::TimeTooLarge { max } => write!(f, "time must be at most {max} minutes"),
            Self::LinkTooLong { max } => write!(f, "link must be at most {max} characters"),
            Self::InvalidLink => write!(f, "link must be an absolute http or https URL"),
        }
    }
}

impl std::error::Error for RecordValidationError {}

/// Identifier shared by all record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trimmed, non-empty name or title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordName(String);

impl RecordName {
    /// Trim and validate.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, RecordValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RecordValidationError::EmptyName);
        }
        if trimmed.chars().count() > RECORD_TEXT_MAX {
            return Err(RecordValidationError::NameTooLong {
                max: RECORD_TEXT_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for RecordName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<RecordName> for String {
    fn from(value: RecordName) -> Self {
        value.0
    }
}

impl TryFrom<String> for RecordName {
    type Error = RecordValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Non-negative price with two decimal places, below 1000.
///
/// # Examples
/// ```
/// use recipe_backend::domain::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(5, 0)).expect("valid price");
/// assert_eq!(price.to_string(), "5.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price(Decimal);

impl Price {
    /// Validate and rescale to two decimal places.
    pub fn new(value: Decimal) -> Result<Self, RecordValidationError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(RecordValidationError::NegativePrice);
        }
        if value.normalize().scale() > 2 {
            return Err(RecordValidationError::PriceTooPrecise);
        }
        if value > PRICE_MAX {
            return Err(RecordValidationError::PriceTooLarge);
        }
        let mut scaled = value.abs();
        scaled.rescale(2);
        Ok(Self(scaled))
    }

    /// Underlying decimal, always at scale 2.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Preparation time in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeMinutes(u32);

impl TimeMinutes {
    /// Validate against the storage range.
    pub fn new(minutes: u32) -> Result<Self, RecordValidationError> {
        if minutes > TIME_MINUTES_MAX {
            return Err(RecordValidationError::TimeTooLarge {
                max: TIME_MINUTES_MAX,
            });
        }
        Ok(Self(minutes))
    }

    /// Minutes as an unsigned integer.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Absolute `http`/`https` link to a recipe source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeLink(String);

impl RecipeLink {
    /// Validate a link, keeping the caller's spelling.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, RecordValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.chars().count() > RECORD_TEXT_MAX {
            return Err(RecordValidationError::LinkTooLong {
                max: RECORD_TEXT_MAX,
            });
        }
        let parsed = Url::parse(trimmed).map_err(|_| RecordValidationError::InvalidLink)?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(RecordValidationError::InvalidLink);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for RecipeLink {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Record kinds, used for messages and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Tag,
    Ingredient,
    Recipe,
}

impl RecordKind {
    /// Lowercase label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Ingredient => "ingredient",
            Self::Recipe => "recipe",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shared shape of every owner-scoped record.
pub trait OwnedRecord: Clone + fmt::Debug + Send + Sync + 'static {
    /// Payload accepted on creation.
    type Draft: Send + 'static;
    /// Partial update payload.
    type Patch: Send + 'static;

    /// Which kind of record this is.
    const KIND: RecordKind;

    /// Record identifier.
    fn id(&self) -> RecordId;

    /// Owning account.
    fn owner(&self) -> AccountId;

    /// Name (or title) shown to users and used for ordering.
    fn display_name(&self) -> &str;
}

/// Listing order: display name descending, ties by ascending id.
pub fn listing_order<R: OwnedRecord>(a: &R, b: &R) -> Ordering {
    b.display_name()
        .cmp(a.display_name())
        .then_with(|| a.id().cmp(&b.id()))
}

/// Sort records into listing order in place.
pub fn sort_for_listing<R: OwnedRecord>(records: &mut [R]) {
    records.sort_by(listing_order);
}

/// Tag and ingredient creation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRecordDraft {
    pub name: RecordName,
}

/// Tag and ingredient partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedRecordPatch {
    pub name: Option<RecordName>,
}

/// Records that consist of nothing but a name.
pub trait NamedRecord: OwnedRecord<Draft = NamedRecordDraft, Patch = NamedRecordPatch> {
    /// Build a new record.
    fn create(id: RecordId, owner: AccountId, name: RecordName) -> Self;

    /// Current name.
    fn name(&self) -> &RecordName;

    /// Replace the name.
    fn rename(&mut self, name: RecordName);
}

macro_rules! named_record {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub id: RecordId,
            pub owner: AccountId,
            pub name: RecordName,
        }

        impl OwnedRecord for $name {
            type Draft = NamedRecordDraft;
            type Patch = NamedRecordPatch;

            const KIND: RecordKind = $kind;

            fn id(&self) -> RecordId {
                self.id
            }

            fn owner(&self) -> AccountId {
                self.owner
            }

            fn display_name(&self) -> &str {
                self.name.as_ref()
            }
        }

        impl NamedRecord for $name {
            fn create(id: RecordId, owner: AccountId, name: RecordName) -> Self {
                Self { id, owner, name }
            }

            fn name(&self) -> &RecordName {
                &self.name
            }

            fn rename(&mut self, name: RecordName) {
                self.name = name;
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name.as_ref())
            }
        }
    };
}

named_record!(
    /// Label attached to recipes.
    Tag,
    RecordKind::Tag
);

named_record!(
    /// Ingredient referenced by recipes.
    Ingredient,
    RecordKind::Ingredient
);

/// Recipe record. Associations are stored as ids owned by the same account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: RecordId,
    pub owner: AccountId,
    pub title: RecordName,
    pub time_minutes: TimeMinutes,
    pub price: Price,
    pub link: Option<RecipeLink>,
    pub ingredients: Vec<RecordId>,
    pub tags: Vec<RecordId>,
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title.as_ref())
    }
}

impl OwnedRecord for Recipe {
    type Draft = RecipeDraft;
    type Patch = RecipePatch;

    const KIND: RecordKind = RecordKind::Recipe;

    fn id(&self) -> RecordId {
        self.id
    }

    fn owner(&self) -> AccountId {
        self.owner
    }

    fn display_name(&self) -> &str {
        self.title.as_ref()
    }
}

/// Recipe creation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub title: RecordName,
    pub time_minutes: TimeMinutes,
    pub price: Price,
    pub link: Option<RecipeLink>,
    pub ingredients: Vec<RecordId>,
    pub tags: Vec<RecordId>,
}

/// Recipe partial update. `link: Some(None)` clears the link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipePatch {
    pub title: Option<RecordName>,
    pub time_minutes: Option<TimeMinutes>,
    pub price: Option<Price>,
    pub link: Option<Option<RecipeLink>>,
    pub ingredients: Option<Vec<RecordId>>,
    pub tags: Option<Vec<RecordId>>,
}

impl Recipe {
    /// Apply a patch whose associations have already been checked.
    pub fn apply(&mut self, patch: RecipePatch) {
        let RecipePatch {
            title,
            time_minutes,
            price,
            link,
            ingredients,
            tags,
        } = patch;
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(time_minutes) = time_minutes {
            self.time_minutes = time_minutes;
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(link) = link {
            self.link = link;
        }
        if let Some(ingredients) = ingredients {
            self.ingredients = dedup_ids(ingredients);
        }
        if let Some(tags) = tags {
            self.tags = dedup_ids(tags);
        }
    }
}

/// Drop repeated ids, keeping first occurrences in order.
#[must_use]
pub fn dedup_ids(ids: Vec<RecordId>) -> Vec<RecordId> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Recipe with its associations resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub ingredients: Vec<Ingredient>,
    pub tags: Vec<Tag>,
}

/// Optional association filters for recipe listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub tags: Option<Vec<RecordId>>,
    pub ingredients: Option<Vec<RecordId>>,
}

impl RecipeFilter {
    /// A recipe matches when it has any listed id for every present axis.
    pub fn matches(&self, recipe: &Recipe) -> bool {
        let any_of = |wanted: &Option<Vec<RecordId>>, present: &[RecordId]| {
            wanted
                .as_ref()
                .is_none_or(|ids| ids.iter().any(|id| present.contains(id)))
        };
        any_of(&self.tags, &recipe.tags) && any_of(&self.ingredients, &recipe.ingredients)
    }
}
