//! Shared helpers for the journal integration suites.

use std::sync::{Arc, Mutex, PoisonError};

use actix_web::web;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use tempfile::TempDir;

use journal::domain::ports::{EntryStore, IdentifierSource, RandomIdentifierSource, UserDirectory};
use journal::domain::{
    AccountsService, EntryListLimit, JournalEntriesService, PhotoUploadPolicy, PhotoUploads,
};
use journal::inbound::http::state::HttpState;
use journal::outbound::credentials::{Argon2CredentialHasher, Argon2Settings};
use journal::outbound::uploads::CapStdPhotoStorage;

/// Environment variable naming the PostgreSQL database for adapter suites.
pub const DATABASE_URL_VAR: &str = "JOURNAL_TEST_DATABASE_URL";

/// Clock that advances one second on every read, so successive entries get
/// distinct, increasing timestamps.
pub struct SteppingClock(Mutex<DateTime<Utc>>);

impl SteppingClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self(Mutex::new(start))
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self::starting_at(start)
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut now = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        let current = *now;
        *now += TimeDelta::seconds(1);
        current
    }
}

/// Cheapest Argon2id parameters the algorithm accepts.
pub fn fast_hasher() -> Arc<Argon2CredentialHasher> {
    Arc::new(
        Argon2CredentialHasher::new(Argon2Settings {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .expect("valid Argon2 parameters"),
    )
}

/// Fully wired handler state plus the temporary upload directory backing it.
pub struct TestJournal {
    pub state: web::Data<HttpState>,
    pub uploads: TempDir,
}

/// Wire the real services over the given stores.
pub fn wire<S>(store: Arc<S>, policy: PhotoUploadPolicy) -> TestJournal
where
    S: UserDirectory + EntryStore + 'static,
{
    let uploads = tempfile::tempdir().expect("upload dir");
    let storage = CapStdPhotoStorage::open(uploads.path()).expect("open upload dir");
    let ids: Arc<dyn IdentifierSource> = Arc::new(RandomIdentifierSource);

    let accounts = AccountsService::new(Arc::clone(&store), fast_hasher(), Arc::clone(&ids));
    let journal = JournalEntriesService::new(
        store,
        Arc::new(SteppingClock::default()),
        ids,
        EntryListLimit::DEFAULT,
    );
    let photos = PhotoUploads::new(Arc::new(storage), policy);

    TestJournal {
        state: web::Data::new(HttpState::new(
            Arc::new(accounts),
            Arc::new(journal),
            Arc::new(photos),
        )),
        uploads,
    }
}

/// Database URL for the PostgreSQL suite, or `None` (with a skip marker on
/// stderr) when it is not configured.
pub fn database_url_or_skip(test: &str) -> Option<String> {
    match std::env::var(DATABASE_URL_VAR) {
        Ok(url) if !url.trim().is_empty() => Some(url),
        _ => {
            eprintln!("SKIP-POSTGRES: {test}: set {DATABASE_URL_VAR} to run");
            None
        }
    }
}
