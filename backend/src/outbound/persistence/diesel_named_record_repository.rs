//! PostgreSQL-backed repositories for tags and ingredients.
//!
//! Both tables share the `(id, owner_id, name)` shape, so one macro stamps out
//! a repository per table.

use crate::domain::ports::RecordRepositoryError;
use crate::domain::{AccountId, NamedRecord, RecordId, RecordName};

use super::diesel_helpers::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::NamedRecordRow;
use super::pool::PoolError;

pub(crate) fn map_pool_error(error: PoolError) -> RecordRepositoryError {
    RecordRepositoryError::connection(pool_error_message(error))
}

pub(crate) fn map_diesel_error(
    error: diesel::result::Error,
    operation: &str,
) -> RecordRepositoryError {
    match classify_diesel_error(error, operation) {
        DieselFailure::Connection(message) => RecordRepositoryError::connection(message),
        DieselFailure::UniqueViolation { .. } => RecordRepositoryError::query("duplicate record id"),
        DieselFailure::Query(message) => RecordRepositoryError::query(message),
    }
}

fn row_to_record<R: NamedRecord>(row: NamedRecordRow) -> Result<R, RecordRepositoryError> {
    let name = RecordName::new(&row.name)
        .map_err(|err| RecordRepositoryError::query(format!("invalid stored name: {err}")))?;
    Ok(R::create(
        RecordId::from_uuid(row.id),
        AccountId::from_uuid(row.owner_id),
        name,
    ))
}

macro_rules! diesel_named_record_repository {
    ($(#[$meta:meta])* $repo:ident, $record:ty, $table:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $repo {
            pool: $crate::outbound::persistence::DbPool,
        }

        impl $repo {
            /// Create a repository over `pool`.
            pub fn new(pool: $crate::outbound::persistence::DbPool) -> Self {
                Self { pool }
            }
        }

        #[async_trait::async_trait]
        impl $crate::domain::ports::RecordRepository<$record> for $repo {
            async fn list_by_owner(
                &self,
                owner: &$crate::domain::AccountId,
            ) -> Result<Vec<$record>, $crate::domain::ports::RecordRepositoryError> {
                use diesel::prelude::*;
                use diesel_async::RunQueryDsl;
                use $crate::outbound::persistence::schema::$table;

                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let rows: Vec<NamedRecordRow> = $table::table
                    .filter($table::owner_id.eq(owner.as_uuid()))
                    .select(($table::id, $table::owner_id, $table::name))
                    .load(&mut conn)
                    .await
                    .map_err(|err| map_diesel_error(err, concat!("list ", stringify!($table))))?;

                let mut records = rows
                    .into_iter()
                    .map(row_to_record::<$record>)
                    .collect::<Result<Vec<_>, _>>()?;
                $crate::domain::sort_for_listing(&mut records);
                Ok(records)
            }

            async fn find_owned(
                &self,
                owner: &$crate::domain::AccountId,
                id: &$crate::domain::RecordId,
            ) -> Result<Option<$record>, $crate::domain::ports::RecordRepositoryError> {
                use diesel::prelude::*;
                use diesel_async::RunQueryDsl;
                use $crate::outbound::persistence::schema::$table;

                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let row: Option<NamedRecordRow> = $table::table
                    .filter($table::id.eq(id.as_uuid()))
                    .filter($table::owner_id.eq(owner.as_uuid()))
                    .select(($table::id, $table::owner_id, $table::name))
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(|err| map_diesel_error(err, concat!("find ", stringify!($table))))?;
                row.map(row_to_record::<$record>).transpose()
            }

            async fn insert(
                &self,
                record: &$record,
            ) -> Result<(), $crate::domain::ports::RecordRepositoryError> {
                use diesel::prelude::*;
                use diesel_async::RunQueryDsl;
                use $crate::outbound::persistence::schema::$table;

                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                diesel::insert_into($table::table)
                    .values((
                        $table::id.eq(record.id.as_uuid()),
                        $table::owner_id.eq(record.owner.as_uuid()),
                        $table::name.eq(record.name.as_ref()),
                    ))
                    .execute(&mut conn)
                    .await
                    .map(|_| ())
                    .map_err(|err| map_diesel_error(err, concat!("insert ", stringify!($table))))
            }

            async fn update(
                &self,
                record: &$record,
            ) -> Result<(), $crate::domain::ports::RecordRepositoryError> {
                use diesel::prelude::*;
                use diesel_async::RunQueryDsl;
                use $crate::outbound::persistence::schema::$table;

                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let updated = diesel::update(
                    $table::table
                        .filter($table::id.eq(record.id.as_uuid()))
                        .filter($table::owner_id.eq(record.owner.as_uuid())),
                )
                .set($table::name.eq(record.name.as_ref()))
                .execute(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, concat!("update ", stringify!($table))))?;

                if updated == 0 {
                    return Err($crate::domain::ports::RecordRepositoryError::missing(
                        record.id.to_string(),
                    ));
                }
                Ok(())
            }
        }
    };
}

diesel_named_record_repository!(
    /// Diesel implementation of the tag repository.
    DieselTagRepository,
    crate::domain::Tag,
    tags
);

diesel_named_record_repository!(
    /// Diesel implementation of the ingredient repository.
    DieselIngredientRepository,
    crate::domain::Ingredient,
    ingredients
);
