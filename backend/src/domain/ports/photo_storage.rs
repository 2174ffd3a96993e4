//! Driven port for uploaded photo bytes.

use async_trait::async_trait;

use crate::domain::StoredPhotoName;

use super::define_port_error;

define_port_error! {
    pub enum PhotoStorageError {
        Io { message: String } => "photo storage failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Store `bytes` under `name`. Storing the same name twice is a no-op
    /// success because names are content addressed.
    async fn put(&self, name: &StoredPhotoName, bytes: &[u8]) -> Result<(), PhotoStorageError>;

    /// Read a stored photo, or `None` when nothing is stored under `name`.
    async fn get(&self, name: &StoredPhotoName) -> Result<Option<Vec<u8>>, PhotoStorageError>;
}
