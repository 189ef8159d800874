//! Error type for building file handles and other shared helpers.

/// Common error type for heicdrop.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input file does not exist.
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input exists but cannot be used (a directory, an unnamed path).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::not_found("photo.heic").to_string(),
            "File not found: photo.heic"
        );
        assert_eq!(
            Error::invalid_input("/tmp is a directory").to_string(),
            "Invalid input: /tmp is a directory"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(Error::from(io_err), Error::Io(_)));
    }
}
