//! Photo upload use-cases over a [`PhotoStorage`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    PhotoContent, PhotoStorage, PhotoStorageError, PhotoUploadService, UploadedPhoto,
};
use crate::domain::{Error, PhotoExtension, PhotoUploadValidationError, StoredPhotoName};

/// Limits applied to incoming uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoUploadPolicy {
    pub max_bytes: usize,
}

impl Default for PhotoUploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

fn invalid_upload(err: PhotoUploadValidationError) -> Error {
    let field = match err {
        PhotoUploadValidationError::MissingFilename
        | PhotoUploadValidationError::UnsupportedExtension => "filename",
        PhotoUploadValidationError::Empty | PhotoUploadValidationError::TooLarge { .. } => "body",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

fn map_storage_error(error: PhotoStorageError) -> Error {
    Error::internal(error.to_string())
}

/// Content-addressed photo uploads.
#[derive(Clone)]
pub struct PhotoUploads<S: ?Sized> {
    storage: Arc<S>,
    policy: PhotoUploadPolicy,
}

impl<S: ?Sized> PhotoUploads<S> {
    pub fn new(storage: Arc<S>, policy: PhotoUploadPolicy) -> Self {
        Self { storage, policy }
    }
}

#[async_trait]
impl<S> PhotoUploadService for PhotoUploads<S>
where
    S: PhotoStorage + ?Sized,
{
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<UploadedPhoto, Error> {
        let extension = PhotoExtension::from_filename(filename).map_err(invalid_upload)?;
        if bytes.is_empty() {
            return Err(invalid_upload(PhotoUploadValidationError::Empty));
        }
        if bytes.len() > self.policy.max_bytes {
            return Err(invalid_upload(PhotoUploadValidationError::TooLarge {
                max_bytes: self.policy.max_bytes,
            }));
        }

        let name = StoredPhotoName::for_content(&bytes, extension);
        self.storage
            .put(&name, &bytes)
            .await
            .map_err(map_storage_error)?;

        info!(photo = %name, bytes = bytes.len(), "stored photo upload");
        let url = name.url();
        Ok(UploadedPhoto { name, url })
    }

    async fn fetch(&self, name: &str) -> Result<PhotoContent, Error> {
        let not_found = || Error::not_found(format!("photo {name} not found"));
        let stored = StoredPhotoName::parse(name).ok_or_else(not_found)?;
        let bytes = self
            .storage
            .get(&stored)
            .await
            .map_err(map_storage_error)?
            .ok_or_else(not_found)?;
        Ok(PhotoContent {
            bytes,
            extension: stored.extension(),
        })
    }
}
