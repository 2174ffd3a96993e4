//! Journal entry use-cases over an [`EntryStore`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{EntryStore, EntryStoreError, IdentifierSource, JournalService};
use crate::domain::{
    CreatedEntry, Entry, EntryId, EntryListLimit, EntrySummary, Error, NewEntry, UserId,
    creation_instant,
};

fn map_store_error(error: EntryStoreError) -> Error {
    match error {
        EntryStoreError::UnknownOwner { user_id } => {
            Error::invalid_request(format!("user {user_id} does not exist"))
                .with_details(json!({ "field": "user_id" }))
        }
        EntryStoreError::Connection { message } | EntryStoreError::Timeout { message } => {
            Error::service_unavailable(format!("entry store unavailable: {message}"))
        }
        EntryStoreError::Query { message } => {
            Error::internal(format!("entry store error: {message}"))
        }
    }
}

/// Journal service assigning ids and timestamps before writing entries.
#[derive(Clone)]
pub struct JournalEntriesService<S: ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdentifierSource>,
    default_limit: EntryListLimit,
}

impl<S: ?Sized> JournalEntriesService<S> {
    pub fn new(
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdentifierSource>,
        default_limit: EntryListLimit,
    ) -> Self {
        Self {
            store,
            clock,
            ids,
            default_limit,
        }
    }
}

#[async_trait]
impl<S> JournalService for JournalEntriesService<S>
where
    S: EntryStore + ?Sized,
{
    async fn create_entry(&self, entry: NewEntry) -> Result<CreatedEntry, Error> {
        let created_at = creation_instant(self.clock.utc());
        let entry_id = self.ids.entry_id(created_at);
        let entry = Entry::from_new(entry_id, entry, created_at);

        self.store.insert(&entry).await.map_err(map_store_error)?;

        info!(entry_id = %entry_id, user_id = %entry.user_id, "created journal entry");
        Ok(CreatedEntry {
            entry_id,
            created_at,
        })
    }

    async fn entries_for_owner(
        &self,
        user_id: &UserId,
        limit: Option<EntryListLimit>,
    ) -> Result<Vec<EntrySummary>, Error> {
        self.store
            .list_by_owner(user_id, limit.unwrap_or(self.default_limit))
            .await
            .map_err(map_store_error)
    }

    async fn entry(&self, id: &EntryId) -> Result<Entry, Error> {
        self.store
            .find_by_id(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("entry {id} not found")))
    }
}
