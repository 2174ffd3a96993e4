//! Builders wiring adapters into the domain services behind `HttpState`.

use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};
use mockable::DefaultClock;
use tracing::{info, warn};

use journal::domain::ports::{EntryStore, IdentifierSource, RandomIdentifierSource, UserDirectory};
use journal::domain::{AccountsService, JournalEntriesService, PhotoUploads};
use journal::inbound::http::state::HttpState;
use journal::outbound::credentials::Argon2CredentialHasher;
use journal::outbound::memory::MemoryStore;
use journal::outbound::persistence::{
    DbPool, DieselEntryStore, DieselUserDirectory, run_pending_migrations,
};
use journal::outbound::uploads::CapStdPhotoStorage;
use journal::settings::{JournalSettings, StoreBackend};

/// The two store capabilities, backed by whichever backend was selected.
pub(crate) struct Stores {
    pub(crate) directory: Arc<dyn UserDirectory>,
    pub(crate) entries: Arc<dyn EntryStore>,
}

/// Open the configured backend. PostgreSQL migrations are applied first.
pub(crate) async fn build_stores(settings: &JournalSettings) -> Result<Stores> {
    let backend = settings.store_backend()?;
    match backend {
        StoreBackend::Memory => {
            warn!("using the in-memory store; data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            Ok(Stores {
                directory: store.clone(),
                entries: store,
            })
        }
        StoreBackend::Postgres => {
            let url = settings.database_url()?;
            run_pending_migrations(url)
                .await
                .wrap_err("failed to migrate the database")?;
            let pool = DbPool::new(settings.pool_config(url))
                .await
                .wrap_err("failed to create the connection pool")?;
            let timeout = settings.store_timeout();
            info!(?timeout, "connected to PostgreSQL");
            Ok(Stores {
                directory: Arc::new(DieselUserDirectory::new(pool.clone(), timeout)),
                entries: Arc::new(DieselEntryStore::new(pool, timeout)),
            })
        }
    }
}

/// Build the use-case services for the HTTP layer.
pub(crate) fn build_http_state(settings: &JournalSettings, stores: Stores) -> Result<HttpState> {
    let hasher = Arc::new(
        Argon2CredentialHasher::new(settings.argon2_settings())
            .wrap_err("invalid Argon2 settings")?,
    );
    let ids: Arc<dyn IdentifierSource> = Arc::new(RandomIdentifierSource);

    let upload_dir = settings.upload_dir();
    let storage = CapStdPhotoStorage::open(&upload_dir)
        .wrap_err_with(|| format!("failed to open upload directory {}", upload_dir.display()))?;
    info!(upload_dir = %upload_dir.display(), "photo uploads enabled");

    let accounts = AccountsService::new(stores.directory, hasher, Arc::clone(&ids));
    let journal = JournalEntriesService::new(
        stores.entries,
        Arc::new(DefaultClock),
        ids,
        settings.default_entry_limit()?,
    );
    let photos = PhotoUploads::new(Arc::new(storage), settings.photo_upload_policy());

    Ok(HttpState::new(
        Arc::new(accounts),
        Arc::new(journal),
        Arc::new(photos),
    ))
}
