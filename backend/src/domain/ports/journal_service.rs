//! Driving port for journal entry use-cases.

use async_trait::async_trait;

use crate::domain::{
    CreatedEntry, Entry, EntryId, EntryListLimit, EntrySummary, Error, NewEntry, UserId,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JournalService: Send + Sync {
    /// Persist a new entry in both views and return its id and timestamp.
    async fn create_entry(&self, entry: NewEntry) -> Result<CreatedEntry, Error>;

    /// Newest-first entries for `user_id`. `None` applies the configured
    /// default page size.
    async fn entries_for_owner(
        &self,
        user_id: &UserId,
        limit: Option<EntryListLimit>,
    ) -> Result<Vec<EntrySummary>, Error>;

    /// One entry by id; `NotFound` when absent.
    async fn entry(&self, id: &EntryId) -> Result<Entry, Error>;
}
