use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PackError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PackError {
    #[error("Source folder '{path}' does not exist or is not a directory")]
    InvalidRoot { path: PathBuf },

    #[error("Destination folder '{path}' does not exist or is not a directory")]
    InvalidDestination { path: PathBuf },

    #[error("Selected file '{path}' does not exist or is not a regular file")]
    MissingFile { path: PathBuf },

    #[error("Selected file '{path}' is outside of source folder '{root}'")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("No files selected in '{root}'")]
    EmptySelection { root: PathBuf },

    #[error("Failed to write output '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write settings '{path}': {source}")]
    SettingsWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode settings: {0}")]
    SettingsEncode(#[from] serde_json::Error),
}

impl PackError {
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// True for errors raised while checking inputs, before any work began.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRoot { .. }
                | Self::InvalidDestination { .. }
                | Self::MissingFile { .. }
                | Self::OutsideRoot { .. }
                | Self::EmptySelection { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_name_the_path() {
        let err = PackError::InvalidDestination {
            path: PathBuf::from("/nowhere/out"),
        };
        assert!(err.is_validation());
        assert!(err.to_string().contains("/nowhere/out"));
        assert!(err.to_string().starts_with("Destination"));
    }

    #[test]
    fn test_write_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = PackError::write("/tmp/out.md", io);
        assert!(!err.is_validation());
        assert!(err.to_string().contains("/tmp/out.md"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
