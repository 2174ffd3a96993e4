//! Driven port for journal entry storage.
//!
//! Every entry lives in two views: one keyed by entry id and one keyed by
//! `(owner, created_at)`. [`EntryStore::insert`] must write both through the
//! backend's atomic primitive. Either both views change or neither does.

use async_trait::async_trait;

use crate::domain::{Entry, EntryId, EntryListLimit, EntrySummary, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by entry store adapters.
    pub enum EntryStoreError {
        /// The owning user does not exist.
        UnknownOwner { user_id: String } => "entry owner {user_id} does not exist",
        /// The backing store could not be reached.
        Connection { message: String } => "entry store connection failed: {message}",
        /// A query or the dual-write transaction failed.
        Query { message: String } => "entry store query failed: {message}",
        /// A call exceeded its time budget.
        Timeout { message: String } => "entry store call timed out: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Write the entry to both views as one atomic unit.
    async fn insert(&self, entry: &Entry) -> Result<(), EntryStoreError>;

    /// Entries owned by `user_id`, newest first, ties broken by descending
    /// entry id. Returns an empty list when the user has none.
    async fn list_by_owner(
        &self,
        user_id: &UserId,
        limit: EntryListLimit,
    ) -> Result<Vec<EntrySummary>, EntryStoreError>;

    /// Look up one entry by id.
    async fn find_by_id(&self, id: &EntryId) -> Result<Option<Entry>, EntryStoreError>;
}
