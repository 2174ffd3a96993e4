//! HTTP server configuration object.

use std::net::SocketAddr;

use journal::inbound::http::uploads::UploadLimit;

/// Listener and edge settings for [`super::create_server`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) cors_allow_origin: String,
    pub(crate) upload_limit: UploadLimit,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            cors_allow_origin: "*".to_owned(),
            upload_limit: UploadLimit::default(),
        }
    }

    #[must_use]
    pub fn with_cors_allow_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_allow_origin = origin.into();
        self
    }

    #[must_use]
    pub fn with_upload_limit(mut self, limit: UploadLimit) -> Self {
        self.upload_limit = limit;
        self
    }
}
