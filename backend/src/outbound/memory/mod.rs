//! In-process store implementing both `UserDirectory` and `EntryStore`.
//!
//! Laid out like a wide-column keyspace: each table is a map of rows made of
//! scalar text cells, and the by-owner view is partitioned by user id with
//! rows clustered newest first. List-valued fields are stored through the
//! strict [`PhotoList`] text codec because cells hold scalars only.
//!
//! One mutex guards every table, so the two entry views are always written in
//! the same critical section. Suited to development and tests; nothing
//! survives a restart.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, warn};
use uuid::Uuid;

use crate::domain::ports::{
    DuplicateField, EntryStore, EntryStoreError, UserDirectory, UserDirectoryError, UserRecord,
};
use crate::domain::{
    Email, Entry, EntryId, EntryListLimit, EntrySummary, PasswordHash, PhotoList, User, UserId,
    Username,
};

#[derive(Debug, Clone)]
struct UserCells {
    username: String,
    email: String,
    password_hash: String,
}

#[derive(Debug, Clone)]
struct EntryCells {
    id: Uuid,
    user_id: Uuid,
    title: String,
    content: String,
    location: Option<String>,
    photos: String,
    created_at: DateTime<Utc>,
}

type ClusteringKey = (Reverse<DateTime<Utc>>, Reverse<Uuid>);

#[derive(Debug, Default)]
struct Keyspace {
    users: HashMap<Uuid, UserCells>,
    users_by_username: HashMap<String, Uuid>,
    users_by_email: HashMap<String, Uuid>,
    entries: HashMap<Uuid, EntryCells>,
    entries_by_user: HashMap<Uuid, BTreeMap<ClusteringKey, EntryCells>>,
}

/// Shared in-memory keyspace. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    keyspace: Arc<Mutex<Keyspace>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Keyspace>, String> {
        self.keyspace.lock().map_err(|_| {
            error!("memory store mutex poisoned");
            "memory store lock poisoned".to_owned()
        })
    }
}

fn cells_to_entry(cells: &EntryCells) -> Result<Entry, EntryStoreError> {
    let photos = PhotoList::decode_text(&cells.photos).map_err(|err| {
        warn!(entry_id = %cells.id, error = %err, "stored photo list cell is corrupt");
        EntryStoreError::query("stored photo list is corrupt")
    })?;
    Ok(Entry::from_stored(
        EntryId::from_uuid(cells.id),
        UserId::from_uuid(cells.user_id),
        cells.title.clone(),
        cells.content.clone(),
        cells.location.clone(),
        photos,
        cells.created_at,
    ))
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn insert(&self, record: &UserRecord) -> Result<(), UserDirectoryError> {
        let mut keyspace = self.lock().map_err(UserDirectoryError::query)?;
        let id = *record.user.id().as_uuid();
        let username = record.user.username().as_ref();
        let email = record.user.email().as_ref();

        if keyspace.users_by_username.contains_key(username) {
            return Err(UserDirectoryError::conflict(DuplicateField::Username));
        }
        if keyspace.users_by_email.contains_key(email) {
            return Err(UserDirectoryError::conflict(DuplicateField::Email));
        }
        if keyspace.users.contains_key(&id) {
            return Err(UserDirectoryError::conflict(DuplicateField::Unknown));
        }

        keyspace.users_by_username.insert(username.to_owned(), id);
        keyspace.users_by_email.insert(email.to_owned(), id);
        keyspace.users.insert(
            id,
            UserCells {
                username: username.to_owned(),
                email: email.to_owned(),
                password_hash: record.password_hash.as_str().to_owned(),
            },
        );
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, UserDirectoryError> {
        let keyspace = self.lock().map_err(UserDirectoryError::query)?;
        let Some((id, cells)) = keyspace
            .users_by_email
            .get(email.as_ref())
            .and_then(|id| keyspace.users.get(id).map(|cells| (*id, cells)))
        else {
            return Ok(None);
        };

        let username = Username::new(&cells.username)
            .map_err(|err| UserDirectoryError::query(err.to_string()))?;
        Ok(Some(UserRecord {
            user: User::new(UserId::from_uuid(id), username, email.clone()),
            password_hash: PasswordHash::new(cells.password_hash.clone()),
        }))
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn insert(&self, entry: &Entry) -> Result<(), EntryStoreError> {
        let mut keyspace = self.lock().map_err(EntryStoreError::query)?;
        let id = *entry.id.as_uuid();
        let user_id = *entry.user_id.as_uuid();

        if !keyspace.users.contains_key(&user_id) {
            return Err(EntryStoreError::unknown_owner(entry.user_id.as_ref()));
        }
        if keyspace.entries.contains_key(&id) {
            return Err(EntryStoreError::query("duplicate entry id"));
        }

        let cells = EntryCells {
            id,
            user_id,
            title: entry.title.as_str().to_owned(),
            content: entry.content.as_str().to_owned(),
            location: entry.location.as_ref().map(|l| l.as_str().to_owned()),
            photos: entry.photos.encode_text(),
            created_at: entry.created_at,
        };

        // Both views change under the same guard.
        keyspace
            .entries_by_user
            .entry(user_id)
            .or_default()
            .insert((Reverse(entry.created_at), Reverse(id)), cells.clone());
        keyspace.entries.insert(id, cells);
        Ok(())
    }

    async fn list_by_owner(
        &self,
        user_id: &UserId,
        limit: EntryListLimit,
    ) -> Result<Vec<EntrySummary>, EntryStoreError> {
        let keyspace = self.lock().map_err(EntryStoreError::query)?;
        let Some(partition) = keyspace.entries_by_user.get(user_id.as_uuid()) else {
            return Ok(Vec::new());
        };
        let take = usize::try_from(limit.get()).unwrap_or(usize::MAX);
        partition.values().take(take).map(cells_to_entry).collect()
    }

    async fn find_by_id(&self, id: &EntryId) -> Result<Option<Entry>, EntryStoreError> {
        let keyspace = self.lock().map_err(EntryStoreError::query)?;
        keyspace
            .entries
            .get(id.as_uuid())
            .map(cells_to_entry)
            .transpose()
    }
}
