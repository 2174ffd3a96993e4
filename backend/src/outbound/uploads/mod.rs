//! Filesystem storage for uploaded photos.

mod cap_std_photo_storage;

pub use cap_std_photo_storage::CapStdPhotoStorage;
