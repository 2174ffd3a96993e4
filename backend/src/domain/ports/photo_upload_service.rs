//! Driving port for photo uploads and downloads.

use async_trait::async_trait;

use crate::domain::{Error, PhotoExtension, StoredPhotoName};

/// A stored upload and the URL it is served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPhoto {
    pub name: StoredPhotoName,
    pub url: String,
}

/// Bytes of a stored photo with their media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoContent {
    pub bytes: Vec<u8>,
    pub extension: PhotoExtension,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoUploadService: Send + Sync {
    /// Accept an upload named `filename` by the client.
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<UploadedPhoto, Error>;

    /// Read back a stored photo by its public name; `NotFound` for names the
    /// upload step never produced.
    async fn fetch(&self, name: &str) -> Result<PhotoContent, Error>;
}
