//! Ports at the hexagonal boundary.
//!
//! Driven ports (`UserDirectory`, `EntryStore`, `CredentialHasher`,
//! `IdentifierSource`, `PhotoStorage`) are implemented by outbound adapters.
//! Driving ports (`AccountService`, `JournalService`, `PhotoUploadService`)
//! are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod account_service;
mod credential_hasher;
mod entry_store;
mod identifier_source;
mod journal_service;
mod photo_storage;
mod photo_upload_service;
mod user_directory;

pub use account_service::AccountService;
#[cfg(test)]
pub use account_service::MockAccountService;
pub use credential_hasher::{CredentialHasher, FixtureCredentialHasher, HashingError};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use entry_store::{EntryStore, EntryStoreError};
#[cfg(test)]
pub use entry_store::MockEntryStore;
pub use identifier_source::{IdentifierSource, RandomIdentifierSource, SequentialIdentifierSource};
pub use journal_service::JournalService;
#[cfg(test)]
pub use journal_service::MockJournalService;
pub use photo_storage::{PhotoStorage, PhotoStorageError};
#[cfg(test)]
pub use photo_storage::MockPhotoStorage;
pub use photo_upload_service::{PhotoContent, PhotoUploadService, UploadedPhoto};
#[cfg(test)]
pub use photo_upload_service::MockPhotoUploadService;
pub use user_directory::{DuplicateField, UserDirectory, UserDirectoryError, UserRecord};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
