//! PostgreSQL-backed `EntryStore`.
//!
//! `insert` writes `entries` and `entries_by_user` inside one transaction, so
//! a failure of either statement rolls back both. Photos use the native
//! `text[]` column type.

use std::time::Duration;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{EntryStore, EntryStoreError};
use crate::domain::{Entry, EntryId, EntryListLimit, EntrySummary, PhotoList, UserId};

use super::diesel_basic_error_mapping::{DieselFailure, classify_diesel_error, pool_failure};
use super::diesel_helpers::with_call_timeout;
use super::models::{EntryByUserRow, EntryRow, NewEntryByUserRow, NewEntryRow};
use super::pool::DbPool;
use super::schema::{entries, entries_by_user};

fn map_failure(failure: DieselFailure, owner: Option<&UserId>) -> EntryStoreError {
    match failure {
        DieselFailure::ForeignKeyViolation { .. } => match owner {
            Some(owner) => EntryStoreError::unknown_owner(owner.as_ref()),
            None => EntryStoreError::query("unexpected foreign key violation"),
        },
        DieselFailure::UniqueViolation { .. } => EntryStoreError::query("duplicate entry id"),
        DieselFailure::Connection { message } => EntryStoreError::connection(message),
        DieselFailure::Query { message } => EntryStoreError::query(message),
    }
}

impl From<EntryRow> for Entry {
    fn from(row: EntryRow) -> Self {
        Entry::from_stored(
            EntryId::from_uuid(row.id),
            UserId::from_uuid(row.user_id),
            row.title,
            row.content,
            row.location,
            PhotoList::from_stored(row.photos),
            row.created_at,
        )
    }
}

impl From<EntryByUserRow> for Entry {
    fn from(row: EntryByUserRow) -> Self {
        Entry::from_stored(
            EntryId::from_uuid(row.id),
            UserId::from_uuid(row.user_id),
            row.title,
            row.content,
            row.location,
            PhotoList::from_stored(row.photos),
            row.created_at,
        )
    }
}

/// Diesel adapter over the two entry views.
#[derive(Clone)]
pub struct DieselEntryStore {
    pool: DbPool,
    call_timeout: Duration,
}

impl DieselEntryStore {
    pub fn new(pool: DbPool, call_timeout: Duration) -> Self {
        Self { pool, call_timeout }
    }
}

#[async_trait]
impl EntryStore for DieselEntryStore {
    async fn insert(&self, entry: &Entry) -> Result<(), EntryStoreError> {
        let id = *entry.id.as_uuid();
        let user_id = *entry.user_id.as_uuid();
        let location = entry.location.as_ref().map(|location| location.as_str());
        let by_id = NewEntryRow {
            id,
            user_id,
            title: entry.title.as_str(),
            content: entry.content.as_str(),
            location,
            photos: entry.photos.as_slice(),
            created_at: entry.created_at,
        };
        let by_owner = NewEntryByUserRow {
            user_id,
            created_at: entry.created_at,
            id,
            title: entry.title.as_str(),
            content: entry.content.as_str(),
            location,
            photos: entry.photos.as_slice(),
        };

        with_call_timeout(
            self.call_timeout,
            "insert entry",
            async {
                let mut conn = self
                    .pool
                    .get()
                    .await
                    .map_err(|err| map_failure(pool_failure(err), None))?;
                conn.transaction::<_, diesel::result::Error, _>(|conn| {
                    async move {
                        diesel::insert_into(entries::table)
                            .values(&by_id)
                            .execute(conn)
                            .await?;
                        diesel::insert_into(entries_by_user::table)
                            .values(&by_owner)
                            .execute(conn)
                            .await?;
                        Ok(())
                    }
                    .scope_boxed()
                })
                .await
                .map_err(|err| map_failure(classify_diesel_error(err), Some(&entry.user_id)))
            },
            EntryStoreError::timeout,
        )
        .await
    }

    async fn list_by_owner(
        &self,
        user_id: &UserId,
        limit: EntryListLimit,
    ) -> Result<Vec<EntrySummary>, EntryStoreError> {
        let rows = with_call_timeout(
            self.call_timeout,
            "list entries by owner",
            async {
                let mut conn = self
                    .pool
                    .get()
                    .await
                    .map_err(|err| map_failure(pool_failure(err), None))?;
                entries_by_user::table
                    .filter(entries_by_user::user_id.eq(user_id.as_uuid()))
                    .order((
                        entries_by_user::created_at.desc(),
                        entries_by_user::id.desc(),
                    ))
                    .limit(i64::from(limit.get()))
                    .select(EntryByUserRow::as_select())
                    .load(&mut conn)
                    .await
                    .map_err(|err| map_failure(classify_diesel_error(err), None))
            },
            EntryStoreError::timeout,
        )
        .await?;

        Ok(rows.into_iter().map(Entry::from).collect())
    }

    async fn find_by_id(&self, id: &EntryId) -> Result<Option<Entry>, EntryStoreError> {
        let row = with_call_timeout(
            self.call_timeout,
            "find entry by id",
            async {
                let mut conn = self
                    .pool
                    .get()
                    .await
                    .map_err(|err| map_failure(pool_failure(err), None))?;
                entries::table
                    .find(id.as_uuid())
                    .select(EntryRow::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(|err| map_failure(classify_diesel_error(err), None))
            },
            EntryStoreError::timeout,
        )
        .await?;

        Ok(row.map(Entry::from))
    }
}
