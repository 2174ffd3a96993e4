//! PostgreSQL adapter tests.
//!
//! Runs against the database named by `JOURNAL_TEST_DATABASE_URL`; each test
//! prints a skip marker and returns when the variable is unset. Usernames and
//! emails carry a random suffix so runs can share one database. Tests that
//! alter the schema work in a throwaway PostgreSQL schema of their own.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use diesel::{Connection, PgConnection, RunQueryDsl};
use rstest::rstest;
use uuid::Uuid;

use journal::domain::ports::{
    DuplicateField, EntryStore, EntryStoreError, UserDirectory, UserDirectoryError, UserRecord,
};
use journal::domain::{
    Email, Entry, EntryId, EntryListLimit, NewEntry, PasswordHash, PhotoUploadPolicy,
    Registration, User, UserId,
};
use journal::outbound::persistence::{
    DbPool, DieselEntryStore, DieselUserDirectory, PoolConfig, run_pending_migrations,
};

#[allow(dead_code)]
mod support;

const CALL_TIMEOUT: Duration = Duration::from_secs(5);

struct Adapters {
    users: DieselUserDirectory,
    entries: DieselEntryStore,
}

async fn adapters(test: &str) -> Option<Adapters> {
    let url = support::database_url_or_skip(test)?;
    run_pending_migrations(&url).await.expect("migrations apply");
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(2))
        .await
        .expect("pool builds");
    Some(Adapters {
        users: DieselUserDirectory::new(pool.clone(), CALL_TIMEOUT),
        entries: DieselEntryStore::new(pool, CALL_TIMEOUT),
    })
}

fn unique(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &suffix[..12])
}

fn record(username: &str, email: &str) -> UserRecord {
    UserRecord {
        user: User::try_from_strings(Uuid::new_v4().to_string(), username, email)
            .expect("valid user"),
        password_hash: PasswordHash::new("$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA"),
    }
}

async fn seeded_user(users: &DieselUserDirectory) -> UserRecord {
    let name = unique("u");
    let record = record(&name, &format!("{name}@x.com"));
    users.insert(&record).await.expect("user inserts");
    record
}

fn at(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_714_554_000 + seconds, 0)
        .single()
        .expect("valid timestamp")
}

fn entry(owner: &UserId, title: &str, photos: Vec<String>, created_at: DateTime<Utc>) -> Entry {
    entry_with_id(Uuid::now_v7(), owner, title, photos, created_at)
}

fn entry_with_id(
    id: Uuid,
    owner: &UserId,
    title: &str,
    photos: Vec<String>,
    created_at: DateTime<Utc>,
) -> Entry {
    let new_entry =
        NewEntry::try_from_parts(owner.as_ref(), title, "content", Some("Paris"), photos)
            .expect("valid entry");
    Entry::from_new(EntryId::from_uuid(id), new_entry, created_at)
}

/// A PostgreSQL schema created for one test and dropped with it.
struct ScratchSchema {
    base_url: String,
    name: String,
}

impl ScratchSchema {
    fn create(base_url: &str) -> Self {
        let name = format!("journal_scratch_{}", Uuid::new_v4().simple());
        let mut conn = PgConnection::establish(base_url).expect("connect for schema setup");
        diesel::sql_query(format!("CREATE SCHEMA {name}"))
            .execute(&mut conn)
            .expect("create scratch schema");
        Self {
            base_url: base_url.to_owned(),
            name,
        }
    }

    /// Connection URL whose sessions resolve unqualified tables in this schema.
    fn url(&self) -> String {
        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{separator}options=-csearch_path%3D{}",
            self.base_url, self.name
        )
    }

    fn execute(&self, sql: &str) {
        let mut conn = PgConnection::establish(&self.url()).expect("connect to scratch schema");
        diesel::sql_query(sql)
            .execute(&mut conn)
            .expect("scratch schema statement");
    }
}

impl Drop for ScratchSchema {
    fn drop(&mut self) {
        if let Ok(mut conn) = PgConnection::establish(&self.base_url) {
            let drop_schema = format!("DROP SCHEMA IF EXISTS {} CASCADE", self.name);
            if let Err(err) = diesel::sql_query(drop_schema).execute(&mut conn) {
                eprintln!("failed to drop scratch schema {}: {err}", self.name);
            }
        }
    }
}

#[rstest]
#[tokio::test]
async fn duplicate_username_and_email_conflict() {
    let Some(Adapters { users, .. }) = adapters("duplicate_username_and_email_conflict").await
    else {
        return;
    };
    let alice = seeded_user(&users).await;
    let username = alice.user.username().as_ref().to_owned();
    let email = alice.user.email().as_ref().to_owned();

    let same_email = record(&unique("u"), &email);
    let err = users.insert(&same_email).await.expect_err("email taken");
    assert_eq!(err, UserDirectoryError::conflict(DuplicateField::Email));

    let same_name = record(&username, &format!("{}@x.com", unique("e")));
    let err = users.insert(&same_name).await.expect_err("username taken");
    assert_eq!(err, UserDirectoryError::conflict(DuplicateField::Username));
}

#[rstest]
#[tokio::test]
async fn find_by_email_returns_the_stored_record() {
    let Some(Adapters { users, .. }) = adapters("find_by_email_returns_the_stored_record").await
    else {
        return;
    };
    let alice = seeded_user(&users).await;

    let found = users
        .find_by_email(alice.user.email())
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(found, alice);

    let missing = Email::new(format!("{}@x.com", unique("nobody"))).expect("valid email");
    assert!(users.find_by_email(&missing).await.expect("lookup").is_none());
}

#[rstest]
#[tokio::test]
async fn entry_is_readable_from_both_views() {
    let Some(Adapters { users, entries }) = adapters("entry_is_readable_from_both_views").await
    else {
        return;
    };
    let alice = seeded_user(&users).await;
    let photos = vec!["p1.jpg".to_owned(), "a,b".to_owned(), "\"q\"".to_owned()];
    let written = entry(alice.user.id(), "Paris trip", photos, at(0));
    entries.insert(&written).await.expect("entry inserts");

    let by_id = entries
        .find_by_id(&written.id)
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(by_id, written);

    let listed = entries
        .list_by_owner(alice.user.id(), EntryListLimit::DEFAULT)
        .await
        .expect("listing");
    assert_eq!(listed, vec![written]);
}

#[rstest]
#[tokio::test]
async fn unknown_owner_writes_neither_view() {
    let Some(Adapters { entries, .. }) = adapters("unknown_owner_writes_neither_view").await
    else {
        return;
    };
    let ghost = UserId::from_uuid(Uuid::new_v4());
    let orphan = entry(&ghost, "Lost", Vec::new(), at(0));

    let err = entries.insert(&orphan).await.expect_err("owner missing");
    assert!(matches!(err, EntryStoreError::UnknownOwner { .. }));

    assert!(entries.find_by_id(&orphan.id).await.expect("lookup").is_none());
    let listed = entries
        .list_by_owner(&ghost, EntryListLimit::DEFAULT)
        .await
        .expect("listing");
    assert!(listed.is_empty());
}

#[rstest]
#[tokio::test]
async fn listing_is_newest_first_and_limited() {
    let Some(Adapters { users, entries }) = adapters("listing_is_newest_first_and_limited").await
    else {
        return;
    };
    let alice = seeded_user(&users).await;
    let owner = alice.user.id();
    for (title, offset) in [("middle", 10), ("newest", 20), ("oldest", 0)] {
        entries
            .insert(&entry(owner, title, Vec::new(), at(offset)))
            .await
            .expect("entry inserts");
    }

    let all = entries
        .list_by_owner(owner, EntryListLimit::DEFAULT)
        .await
        .expect("listing");
    let titles: Vec<_> = all.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["newest", "middle", "oldest"]);

    let one = entries
        .list_by_owner(owner, EntryListLimit::new(1).expect("in range"))
        .await
        .expect("listing");
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].title.as_str(), "newest");
}

#[rstest]
#[tokio::test]
async fn equal_timestamps_list_by_descending_id() {
    let Some(Adapters { users, entries }) = adapters("equal_timestamps_list_by_descending_id").await
    else {
        return;
    };
    let alice = seeded_user(&users).await;
    let owner = alice.user.id();
    let first = Uuid::now_v7();
    let second = Uuid::now_v7();
    let (low, high) = if first < second {
        (first, second)
    } else {
        (second, first)
    };
    for (id, title) in [(low, "low"), (high, "high")] {
        entries
            .insert(&entry_with_id(id, owner, title, Vec::new(), at(0)))
            .await
            .expect("entry inserts");
    }

    let listed = entries
        .list_by_owner(owner, EntryListLimit::DEFAULT)
        .await
        .expect("listing");
    let titles: Vec<_> = listed.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["high", "low"]);
}

#[rstest]
#[tokio::test]
async fn failed_by_owner_write_rolls_back_the_by_id_row() {
    let Some(base_url) =
        support::database_url_or_skip("failed_by_owner_write_rolls_back_the_by_id_row")
    else {
        return;
    };
    let schema = ScratchSchema::create(&base_url);
    run_pending_migrations(&schema.url())
        .await
        .expect("migrations apply in scratch schema");
    schema.execute(
        "CREATE FUNCTION reject_by_owner_row() RETURNS trigger LANGUAGE plpgsql AS $$ \
         BEGIN RAISE EXCEPTION 'by-owner view unavailable'; END $$",
    );
    schema.execute(
        "CREATE TRIGGER reject_by_owner_row BEFORE INSERT ON entries_by_user \
         FOR EACH ROW EXECUTE FUNCTION reject_by_owner_row()",
    );

    let pool = DbPool::new(PoolConfig::new(schema.url()).with_max_size(2))
        .await
        .expect("pool builds");
    let users = DieselUserDirectory::new(pool.clone(), CALL_TIMEOUT);
    let entries = DieselEntryStore::new(pool, CALL_TIMEOUT);
    let alice = seeded_user(&users).await;
    let written = entry(alice.user.id(), "Paris trip", vec!["p1.jpg".to_owned()], at(0));

    let err = entries
        .insert(&written)
        .await
        .expect_err("second view write fails");
    assert!(matches!(err, EntryStoreError::Query { .. }));

    assert!(entries.find_by_id(&written.id).await.expect("lookup").is_none());
    let listed = entries
        .list_by_owner(alice.user.id(), EntryListLimit::DEFAULT)
        .await
        .expect("listing");
    assert!(listed.is_empty());
}

#[rstest]
#[tokio::test]
async fn services_run_end_to_end_over_postgres() {
    let Some(url) = support::database_url_or_skip("services_run_end_to_end_over_postgres") else {
        return;
    };
    run_pending_migrations(&url).await.expect("migrations apply");
    let pool = DbPool::new(PoolConfig::new(url)).await.expect("pool builds");
    let store = Arc::new(PostgresJournal {
        users: DieselUserDirectory::new(pool.clone(), CALL_TIMEOUT),
        entries: DieselEntryStore::new(pool, CALL_TIMEOUT),
    });
    let journal = support::wire(store, PhotoUploadPolicy::default());

    let name = unique("u");
    let registration =
        Registration::try_from_parts(&name, &format!("{name}@x.com"), "password123")
            .expect("valid registration");
    let user_id = journal
        .state
        .accounts
        .register(&registration)
        .await
        .expect("registers");

    let draft = NewEntry::try_from_parts(user_id.as_ref(), "Day one", "...", None, Vec::new())
        .expect("valid entry");
    let created = journal
        .state
        .journal
        .create_entry(draft)
        .await
        .expect("creates");
    let fetched = journal
        .state
        .journal
        .entry(&created.entry_id)
        .await
        .expect("reads");
    assert_eq!(fetched.title.as_str(), "Day one");
}

/// Both Diesel adapters behind one value, as `support::wire` expects.
struct PostgresJournal {
    users: DieselUserDirectory,
    entries: DieselEntryStore,
}

#[async_trait::async_trait]
impl UserDirectory for PostgresJournal {
    async fn insert(&self, record: &UserRecord) -> Result<(), UserDirectoryError> {
        self.users.insert(record).await
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, UserDirectoryError> {
        self.users.find_by_email(email).await
    }
}

#[async_trait::async_trait]
impl EntryStore for PostgresJournal {
    async fn insert(&self, entry: &Entry) -> Result<(), EntryStoreError> {
        self.entries.insert(entry).await
    }

    async fn list_by_owner(
        &self,
        user_id: &UserId,
        limit: EntryListLimit,
    ) -> Result<Vec<Entry>, EntryStoreError> {
        self.entries.list_by_owner(user_id, limit).await
    }

    async fn find_by_id(&self, id: &EntryId) -> Result<Option<Entry>, EntryStoreError> {
        self.entries.find_by_id(id).await
    }
}
