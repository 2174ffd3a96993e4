//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they can be exercised against mocks without any store behind them.

use std::sync::Arc;

use crate::domain::ports::{AccountService, JournalService, PhotoUploadService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountService>,
    pub journal: Arc<dyn JournalService>,
    pub photos: Arc<dyn PhotoUploadService>,
}

impl HttpState {
    /// Bundle the use-case ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    /// use journal::domain::ports::{AccountService, JournalService, PhotoUploadService};
    /// use journal::inbound::http::state::HttpState;
    ///
    /// fn build(
    ///     accounts: Arc<dyn AccountService>,
    ///     journal: Arc<dyn JournalService>,
    ///     photos: Arc<dyn PhotoUploadService>,
    /// ) -> HttpState {
    ///     HttpState::new(accounts, journal, photos)
    /// }
    /// ```
    pub fn new(
        accounts: Arc<dyn AccountService>,
        journal: Arc<dyn JournalService>,
        photos: Arc<dyn PhotoUploadService>,
    ) -> Self {
        Self {
            accounts,
            journal,
            photos,
        }
    }
}
