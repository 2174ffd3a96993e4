//! Domain primitives, services and ports.
//!
//! Types here validate on construction and stay immutable afterwards, so
//! services and adapters can rely on their invariants without re-checking.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Registration, LoginCredentials: account model.
//! - Entry, NewEntry, PhotoList: journal entry model.
//! - AccountsService, JournalEntriesService, PhotoUploads: use-case
//!   implementations behind the driving ports in [`ports`].

pub mod accounts_service;
pub mod auth;
pub mod entry;
pub mod error;
pub mod journal_service;
pub mod photo;
pub mod photo_list;
pub mod photo_upload_service;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::accounts_service::AccountsService;
pub use self::auth::{
    AuthenticatedUser, CredentialsValidationError, LoginCredentials, PASSWORD_MAX, PASSWORD_MIN,
    Password, PasswordHash, Registration,
};
pub use self::entry::{
    CreatedEntry, Entry, EntryContent, EntryId, EntryListLimit, EntryLocation, EntrySummary,
    EntryTitle, EntryValidationError, NewEntry, creation_instant,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::journal_service::JournalEntriesService;
pub use self::photo::{PhotoExtension, PhotoUploadValidationError, StoredPhotoName};
pub use self::photo_list::{
    PHOTOS_MAX, PhotoList, PhotoListDecodeError, PhotoListValidationError,
};
pub use self::photo_upload_service::{PhotoUploadPolicy, PhotoUploads};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Email, User, UserId, UserValidationError, Username};
