//! Uploaded photo naming.
//!
//! Uploads are content addressed: the stored name is the SHA-256 of the bytes
//! plus the normalised extension of the client's filename. Names are the only
//! thing callers can use to read a photo back, so parsing one also proves it
//! cannot escape the upload directory.

use std::fmt;

use sha2::{Digest, Sha256};

const DIGEST_HEX_LEN: usize = 64;

/// Errors raised while accepting an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoUploadValidationError {
    MissingFilename,
    UnsupportedExtension,
    Empty,
    TooLarge { max_bytes: usize },
}

impl fmt::Display for PhotoUploadValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFilename => write!(f, "filename is required"),
            Self::UnsupportedExtension => {
                write!(f, "only .jpg, .jpeg, .png and .gif files are accepted")
            }
            Self::Empty => write!(f, "upload body must not be empty"),
            Self::TooLarge { max_bytes } => write!(f, "upload exceeds {max_bytes} bytes"),
        }
    }
}

impl std::error::Error for PhotoUploadValidationError {}

/// Accepted image types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoExtension {
    Jpg,
    Jpeg,
    Png,
    Gif,
}

impl PhotoExtension {
    /// Extension of a client-supplied filename, compared case-insensitively.
    pub fn from_filename(filename: &str) -> Result<Self, PhotoUploadValidationError> {
        let trimmed = filename.trim();
        if trimmed.is_empty() {
            return Err(PhotoUploadValidationError::MissingFilename);
        }
        let (_, ext) = trimmed
            .rsplit_once('.')
            .ok_or(PhotoUploadValidationError::UnsupportedExtension)?;
        Self::parse(&ext.to_ascii_lowercase())
            .ok_or(PhotoUploadValidationError::UnsupportedExtension)
    }

    fn parse(ext: &str) -> Option<Self> {
        match ext {
            "jpg" => Some(Self::Jpg),
            "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Jpg | Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }
}

/// Name of a stored photo: `<sha256-hex>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhotoName {
    name: String,
    extension: PhotoExtension,
}

impl StoredPhotoName {
    /// Derive the stored name for `bytes`.
    pub fn for_content(bytes: &[u8], extension: PhotoExtension) -> Self {
        let digest = hex::encode(Sha256::digest(bytes));
        Self {
            name: format!("{digest}.{}", extension.as_str()),
            extension,
        }
    }

    /// Accept a name previously produced by [`StoredPhotoName::for_content`].
    pub fn parse(raw: &str) -> Option<Self> {
        let (digest, ext) = raw.split_once('.')?;
        let extension = PhotoExtension::parse(ext)?;
        let is_digest = digest.len() == DIGEST_HEX_LEN
            && digest
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        is_digest.then(|| Self {
            name: raw.to_owned(),
            extension,
        })
    }

    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }

    pub fn extension(&self) -> PhotoExtension {
        self.extension
    }

    /// Public URL path the static file route serves this photo from.
    pub fn url(&self) -> String {
        format!("/uploads/{}", self.name)
    }
}

impl fmt::Display for StoredPhotoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("holiday.jpg", PhotoExtension::Jpg)]
    #[case("HOLIDAY.JPEG", PhotoExtension::Jpeg)]
    #[case("a.b.png", PhotoExtension::Png)]
    #[case("cat.Gif", PhotoExtension::Gif)]
    fn accepts_image_extensions(#[case] filename: &str, #[case] expected: PhotoExtension) {
        assert_eq!(PhotoExtension::from_filename(filename), Ok(expected));
    }

    #[rstest]
    #[case("", PhotoUploadValidationError::MissingFilename)]
    #[case("notes.txt", PhotoUploadValidationError::UnsupportedExtension)]
    #[case("jpg", PhotoUploadValidationError::UnsupportedExtension)]
    #[case("script.jpg.exe", PhotoUploadValidationError::UnsupportedExtension)]
    fn rejects_other_files(#[case] filename: &str, #[case] expected: PhotoUploadValidationError) {
        assert_eq!(PhotoExtension::from_filename(filename), Err(expected));
    }

    #[rstest]
    fn name_is_content_addressed() {
        let a = StoredPhotoName::for_content(b"pixels", PhotoExtension::Png);
        let b = StoredPhotoName::for_content(b"pixels", PhotoExtension::Png);
        let c = StoredPhotoName::for_content(b"other", PhotoExtension::Png);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.as_str().ends_with(".png"));
        assert_eq!(a.url(), format!("/uploads/{}", a.as_str()));
    }

    #[rstest]
    fn parse_accepts_only_generated_names() {
        let generated = StoredPhotoName::for_content(b"pixels", PhotoExtension::Jpg);
        assert_eq!(StoredPhotoName::parse(generated.as_str()), Some(generated));

        assert!(StoredPhotoName::parse("../etc/passwd").is_none());
        assert!(StoredPhotoName::parse("abc.jpg").is_none());
        let digest = "a".repeat(64);
        assert!(StoredPhotoName::parse(&format!("{digest}.txt")).is_none());
        assert!(StoredPhotoName::parse(&format!("{digest}.JPG")).is_none());
        assert!(StoredPhotoName::parse(&format!("{}/x.jpg", &digest[..62])).is_none());
    }
}
