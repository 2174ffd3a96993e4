//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{MockAccountService, MockJournalService, MockPhotoUploadService};
use crate::inbound::http::error::{json_config, query_config};
use crate::inbound::http::state::HttpState;

/// Mocks for each driving port; tests set expectations on the ones they use.
#[derive(Default)]
pub struct MockPorts {
    pub accounts: MockAccountService,
    pub journal: MockJournalService,
    pub photos: MockPhotoUploadService,
}

impl MockPorts {
    /// App data for a test `App`: handler state plus extractor configs.
    pub fn into_app_data(self) -> (web::Data<HttpState>, web::JsonConfig, web::QueryConfig) {
        let state = HttpState::new(
            Arc::new(self.accounts),
            Arc::new(self.journal),
            Arc::new(self.photos),
        );
        (web::Data::new(state), json_config(), query_config())
    }
}
