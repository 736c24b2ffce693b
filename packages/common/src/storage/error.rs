use std::fmt;

/// Errors that can occur during blob storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// The upload is not an accepted image type.
    UnsupportedType(String),
    /// The blob exceeds the configured size limit.
    SizeLimitExceeded { actual: u64, limit: u64 },
    /// An image reference could not be mapped to a stored blob.
    InvalidReference(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The remote image host rejected or failed the request.
    Provider(String),
}

impl StorageError {
    /// Whether the error is caused by the upload itself rather than by the
    /// storage backend.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedType(_) | Self::SizeLimitExceeded { .. }
        )
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedType(msg) => write!(f, "unsupported image: {msg}"),
            Self::SizeLimitExceeded { actual, limit } => {
                write!(f, "image exceeds size limit ({actual} > {limit} bytes)")
            }
            Self::InvalidReference(r) => write!(f, "invalid image reference: {r}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::Provider(msg) => write!(f, "image host error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
