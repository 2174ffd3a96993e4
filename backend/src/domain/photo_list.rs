//! Ordered photo references attached to a journal entry.
//!
//! Stores with a native list column persist the elements directly. Stores
//! limited to scalar text cells use [`PhotoList::encode_text`] and
//! [`PhotoList::decode_text`], a strict array-literal encoding:
//!
//! - the empty list is `{}`;
//! - otherwise `{"e1","e2",...}`, every element double-quoted, with `"` and
//!   `\` escaped by a preceding backslash.
//!
//! Decoding accepts exactly what encoding produces, so
//! `decode_text(encode_text(list)) == list` for every list.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of photos on a single entry.
pub const PHOTOS_MAX: usize = 32;

/// Errors raised when building a photo list from request input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoListValidationError {
    TooMany { max: usize },
    ContainsNul { index: usize },
}

impl fmt::Display for PhotoListValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooMany { max } => write!(f, "an entry may carry at most {max} photos"),
            Self::ContainsNul { index } => {
                write!(f, "photo {index} must not contain NUL characters")
            }
        }
    }
}

impl std::error::Error for PhotoListValidationError {}

/// Errors raised by [`PhotoList::decode_text`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhotoListDecodeError {
    #[error("photo list must be wrapped in braces")]
    MissingBraces,
    #[error("expected '\"' at byte {position}")]
    ExpectedQuote { position: usize },
    #[error("expected ',' or '}}' at byte {position}")]
    ExpectedSeparator { position: usize },
    #[error("invalid escape sequence at byte {position}")]
    InvalidEscape { position: usize },
    #[error("unterminated element starting at byte {position}")]
    Unterminated { position: usize },
}

/// Ordered, duplicate-preserving list of opaque photo references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoList(Vec<String>);

impl PhotoList {
    /// Validate a list supplied by a caller.
    pub fn new(photos: Vec<String>) -> Result<Self, PhotoListValidationError> {
        if photos.len() > PHOTOS_MAX {
            return Err(PhotoListValidationError::TooMany { max: PHOTOS_MAX });
        }
        if let Some(index) = photos.iter().position(|photo| photo.contains('\0')) {
            return Err(PhotoListValidationError::ContainsNul { index });
        }
        Ok(Self(photos))
    }

    /// Wrap a list read back from a store, which only ever holds lists that
    /// passed [`PhotoList::new`].
    pub fn from_stored(photos: Vec<String>) -> Self {
        Self(photos)
    }

    pub fn as_slice(&self) -> &[String] {
        self.0.as_slice()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }

    /// Encode the list as a single text value.
    ///
    /// # Examples
    /// ```
    /// use journal::domain::PhotoList;
    ///
    /// let photos = PhotoList::new(vec!["a,b".into(), "\"q\"".into()]).unwrap();
    /// assert_eq!(photos.encode_text(), r#"{"a,b","\"q\""}"#);
    /// assert_eq!(PhotoList::default().encode_text(), "{}");
    /// ```
    pub fn encode_text(&self) -> String {
        let capacity = 2 + self.0.iter().map(|p| p.len() + 3).sum::<usize>();
        let mut out = String::with_capacity(capacity);
        out.push('{');
        for (index, photo) in self.0.iter().enumerate() {
            if index > 0 {
                out.push(',');
            }
            out.push('"');
            for ch in photo.chars() {
                if matches!(ch, '"' | '\\') {
                    out.push('\\');
                }
                out.push(ch);
            }
            out.push('"');
        }
        out.push('}');
        out
    }

    /// Decode a value produced by [`PhotoList::encode_text`].
    pub fn decode_text(encoded: &str) -> Result<Self, PhotoListDecodeError> {
        let body = encoded
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or(PhotoListDecodeError::MissingBraces)?;
        if body.is_empty() {
            return Ok(Self::default());
        }

        // Positions are reported relative to the full input.
        let offset = 1;
        let mut photos = Vec::new();
        let mut chars = body.char_indices().peekable();

        loop {
            let start = match chars.next() {
                Some((position, '"')) => position,
                Some((position, _)) => {
                    return Err(PhotoListDecodeError::ExpectedQuote {
                        position: position + offset,
                    });
                }
                None => {
                    return Err(PhotoListDecodeError::ExpectedQuote {
                        position: body.len() + offset,
                    });
                }
            };

            let mut element = String::new();
            let mut closed = false;
            while let Some((position, ch)) = chars.next() {
                match ch {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' => match chars.next() {
                        Some((_, escaped @ ('"' | '\\'))) => element.push(escaped),
                        _ => {
                            return Err(PhotoListDecodeError::InvalidEscape {
                                position: position + offset,
                            });
                        }
                    },
                    other => element.push(other),
                }
            }
            if !closed {
                return Err(PhotoListDecodeError::Unterminated {
                    position: start + offset,
                });
            }
            photos.push(element);

            match chars.next() {
                None => break,
                Some((_, ',')) => {}
                Some((position, _)) => {
                    return Err(PhotoListDecodeError::ExpectedSeparator {
                        position: position + offset,
                    });
                }
            }
        }

        Ok(Self(photos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn list(items: &[&str]) -> PhotoList {
        PhotoList::new(items.iter().map(|s| (*s).to_owned()).collect()).expect("within limit")
    }

    #[rstest]
    #[case(&[])]
    #[case(&["a,b", "\"q\"", ""])]
    #[case(&["p1.jpg", "p1.jpg", "p2.jpg"])]
    #[case(&["back\\slash", "{braces}", "ünïcödé 📷"])]
    #[case(&["", ""])]
    fn decode_inverts_encode(#[case] items: &[&str]) {
        let photos = list(items);
        let decoded = PhotoList::decode_text(&photos.encode_text()).expect("encoded text decodes");
        assert_eq!(decoded, photos);
    }

    #[rstest]
    #[case(vec!["ok.jpg".to_owned(), "bad\0.jpg".to_owned()], 1)]
    #[case(vec!["\0".to_owned()], 0)]
    fn rejects_nul_elements(#[case] photos: Vec<String>, #[case] index: usize) {
        assert_eq!(
            PhotoList::new(photos),
            Err(PhotoListValidationError::ContainsNul { index })
        );
    }

    #[rstest]
    fn encodes_known_shapes() {
        assert_eq!(list(&[]).encode_text(), "{}");
        assert_eq!(list(&[""]).encode_text(), r#"{""}"#);
        assert_eq!(list(&["a\\b"]).encode_text(), r#"{"a\\b"}"#);
    }

    #[rstest]
    #[case("", PhotoListDecodeError::MissingBraces)]
    #[case("[\"a\"]", PhotoListDecodeError::MissingBraces)]
    #[case("{a}", PhotoListDecodeError::ExpectedQuote { position: 1 })]
    #[case("{\"a\",}", PhotoListDecodeError::ExpectedQuote { position: 5 })]
    #[case("{\"a\"\"b\"}", PhotoListDecodeError::ExpectedSeparator { position: 4 })]
    #[case("{\"a\\n\"}", PhotoListDecodeError::InvalidEscape { position: 3 })]
    #[case("{\"abc}", PhotoListDecodeError::Unterminated { position: 1 })]
    #[case("{\"a\" }", PhotoListDecodeError::ExpectedSeparator { position: 4 })]
    fn decode_is_strict(#[case] encoded: &str, #[case] expected: PhotoListDecodeError) {
        assert_eq!(PhotoList::decode_text(encoded), Err(expected));
    }

    #[rstest]
    fn rejects_more_than_the_maximum() {
        let photos = vec!["p.jpg".to_owned(); PHOTOS_MAX + 1];
        assert_eq!(
            PhotoList::new(photos),
            Err(PhotoListValidationError::TooMany { max: PHOTOS_MAX })
        );
    }
}
