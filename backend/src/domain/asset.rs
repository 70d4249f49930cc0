//! Stored asset references and validated image uploads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum accepted size for a single uploaded image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// File extensions accepted for image uploads, lower-cased.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Prefix under which managed assets are addressed.
///
/// References outside this prefix (for example an external placeholder URL)
/// are never deleted by cascade logic.
pub const MANAGED_PREFIX: &str = "/uploads/";

/// Validation errors raised while accepting an upload or reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetValidationError {
    /// The reference string was empty.
    EmptyReference,
    /// The uploaded file name carries no usable extension.
    MissingExtension {
        /// Offending file name as supplied by the client.
        file_name: String,
    },
    /// The extension is not one of [`ALLOWED_IMAGE_EXTENSIONS`].
    UnsupportedExtension {
        /// Offending file name as supplied by the client.
        file_name: String,
        /// Extension that was rejected.
        extension: String,
    },
    /// The file exceeds [`MAX_IMAGE_BYTES`].
    TooLarge {
        /// Offending file name as supplied by the client.
        file_name: String,
        /// Size of the rejected file in bytes.
        size: usize,
    },
}

impl fmt::Display for AssetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyReference => write!(f, "asset reference must not be empty"),
            Self::MissingExtension { file_name } => {
                write!(f, "file {file_name} has no extension")
            }
            Self::UnsupportedExtension {
                file_name,
                extension,
            } => write!(
                f,
                "file {file_name} has unsupported extension {extension}; accepted: {}",
                ALLOWED_IMAGE_EXTENSIONS.join(", ")
            ),
            Self::TooLarge { file_name, size } => write!(
                f,
                "file {file_name} is {size} bytes; the limit is {MAX_IMAGE_BYTES} bytes"
            ),
        }
    }
}

impl std::error::Error for AssetValidationError {}

/// Opaque reference to a stored binary asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetRef(String);

impl AssetRef {
    /// Validate and construct a reference from raw input.
    pub fn new(raw: impl Into<String>) -> Result<Self, AssetValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(AssetValidationError::EmptyReference);
        }
        Ok(Self(raw))
    }

    /// Build the reference for a freshly stored file name.
    pub fn managed(file_name: &str) -> Self {
        Self(format!("{MANAGED_PREFIX}{file_name}"))
    }

    /// Whether this reference points at a file the asset store owns.
    pub fn is_managed(&self) -> bool {
        self.0.starts_with(MANAGED_PREFIX)
    }

    /// File name inside the store, when managed.
    pub fn file_name(&self) -> Option<&str> {
        self.0.strip_prefix(MANAGED_PREFIX)
    }
}

impl AsRef<str> for AssetRef {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<AssetRef> for String {
    fn from(value: AssetRef) -> Self {
        value.0
    }
}

impl TryFrom<String> for AssetRef {
    type Error = AssetValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// An uploaded image that passed type and size validation.
///
/// Construction is the validation boundary: a request either yields a full
/// set of `ImageUpload`s or fails before any file is persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: String,
    extension: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Validate an uploaded file's extension and size.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, AssetValidationError> {
        let file_name = file_name.into();
        let extension = file_name
            .rsplit_once('.')
            .map(|(stem, ext)| (stem, ext.to_ascii_lowercase()))
            .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
            .map(|(_, ext)| ext)
            .ok_or_else(|| AssetValidationError::MissingExtension {
                file_name: file_name.clone(),
            })?;

        if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AssetValidationError::UnsupportedExtension {
                file_name,
                extension,
            });
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(AssetValidationError::TooLarge {
                file_name,
                size: bytes.len(),
            });
        }

        Ok(Self {
            file_name,
            extension,
            bytes,
        })
    }

    /// File name as supplied by the client.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Lower-cased, validated extension.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Raw file contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl From<AssetValidationError> for super::Error {
    fn from(error: AssetValidationError) -> Self {
        let details = match &error {
            AssetValidationError::MissingExtension { file_name }
            | AssetValidationError::UnsupportedExtension { file_name, .. }
            | AssetValidationError::TooLarge { file_name, .. } => {
                serde_json::json!({ "field": "images", "file": file_name })
            }
            AssetValidationError::EmptyReference => serde_json::json!({ "field": "images" }),
        };
        Self::invalid_request(error.to_string()).with_details(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("car.png")]
    #[case("car.JPG")]
    #[case("front.jpeg")]
    #[case("spin.gif")]
    fn accepts_supported_extensions(#[case] name: &str) {
        let upload = ImageUpload::new(name, vec![0u8; 16]).expect("valid upload");
        assert!(ALLOWED_IMAGE_EXTENSIONS.contains(&upload.extension()));
    }

    #[rstest]
    #[case("car.bmp")]
    #[case("car.webp")]
    #[case("archive.tar.xz")]
    fn rejects_unsupported_extensions(#[case] name: &str) {
        let error = ImageUpload::new(name, vec![0u8; 16]).expect_err("rejected");
        assert!(matches!(
            error,
            AssetValidationError::UnsupportedExtension { .. }
        ));
    }

    #[rstest]
    #[case("noextension")]
    #[case(".png")]
    #[case("trailing.")]
    fn rejects_missing_extension(#[case] name: &str) {
        let error = ImageUpload::new(name, vec![0u8; 16]).expect_err("rejected");
        assert!(matches!(error, AssetValidationError::MissingExtension { .. }));
    }

    #[test]
    fn rejects_files_over_the_size_limit() {
        let error = ImageUpload::new("big.png", vec![0u8; MAX_IMAGE_BYTES + 1]).expect_err("rejected");
        assert!(matches!(error, AssetValidationError::TooLarge { .. }));
    }

    #[test]
    fn accepts_files_at_the_size_limit() {
        assert!(ImageUpload::new("edge.png", vec![0u8; MAX_IMAGE_BYTES]).is_ok());
    }

    #[test]
    fn managed_references_expose_their_file_name() {
        let reference = AssetRef::managed("abc123.png");
        assert!(reference.is_managed());
        assert_eq!(reference.file_name(), Some("abc123.png"));
    }

    #[test]
    fn external_references_are_not_managed() {
        let reference = AssetRef::new("https://example.test/placeholder.png").expect("valid");
        assert!(!reference.is_managed());
        assert_eq!(reference.file_name(), None);
    }
}
