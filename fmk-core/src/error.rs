// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for File Manager Kit

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Result type alias
pub type FmkResult<T> = Result<T, FmkError>;

/// Main error type
#[derive(Error, Debug)]
pub enum FmkError {
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("File too large: {path} is {size} bytes (limit {limit})")]
    TooLarge { path: String, size: u64, limit: u64 },

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("No free name for {name} after {attempts} attempts")]
    ExhaustedNameSpace { name: String, attempts: u32 },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(io::Error),
}

/// Fieldless discriminant of [`FmkError`], carried in response envelopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    NotADirectory,
    NotAFile,
    AlreadyExists,
    PermissionDenied,
    TooLarge,
    UnsupportedType,
    UnsupportedEncoding,
    Unsupported,
    ExhaustedNameSpace,
    InvalidPath,
    Config,
    Io,
}

impl FmkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FmkError::NotFound(_) => ErrorKind::NotFound,
            FmkError::NotADirectory(_) => ErrorKind::NotADirectory,
            FmkError::NotAFile(_) => ErrorKind::NotAFile,
            FmkError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            FmkError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            FmkError::TooLarge { .. } => ErrorKind::TooLarge,
            FmkError::UnsupportedType(_) => ErrorKind::UnsupportedType,
            FmkError::UnsupportedEncoding(_) => ErrorKind::UnsupportedEncoding,
            FmkError::Unsupported(_) => ErrorKind::Unsupported,
            FmkError::ExhaustedNameSpace { .. } => ErrorKind::ExhaustedNameSpace,
            FmkError::InvalidPath(_) => ErrorKind::InvalidPath,
            FmkError::Config(_) => ErrorKind::Config,
            FmkError::Io(_) => ErrorKind::Io,
        }
    }

    /// Convert an io error, attaching the path it happened on
    pub fn from_io(err: io::Error, path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref().display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => FmkError::NotFound(path),
            io::ErrorKind::PermissionDenied => FmkError::PermissionDenied(path),
            io::ErrorKind::AlreadyExists => FmkError::AlreadyExists(path),
            _ => FmkError::Io(err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FmkError::NotFound(_))
    }
}

impl From<io::Error> for FmkError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FmkError::NotFound(err.to_string()),
            io::ErrorKind::PermissionDenied => FmkError::PermissionDenied(err.to_string()),
            io::ErrorKind::AlreadyExists => FmkError::AlreadyExists(err.to_string()),
            _ => FmkError::Io(err),
        }
    }
}

/// Extension for attaching a path to io results
pub trait IoResultExt<T> {
    fn at(self, path: impl AsRef<std::path::Path>) -> FmkResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn at(self, path: impl AsRef<std::path::Path>) -> FmkResult<T> {
        self.map_err(|e| FmkError::from_io(e, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(FmkError::NotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(
            FmkError::TooLarge { path: "x".into(), size: 10, limit: 5 }.kind(),
            ErrorKind::TooLarge
        );
        assert_eq!(
            FmkError::ExhaustedNameSpace { name: "a.txt".into(), attempts: 3 }.kind(),
            ErrorKind::ExhaustedNameSpace
        );
    }

    #[test]
    fn test_error_display() {
        let err = FmkError::NotFound("/path/to/file".into());
        assert_eq!(format!("{}", err), "Path not found: /path/to/file");

        let err = FmkError::TooLarge { path: "/big".into(), size: 6, limit: 5 };
        assert!(format!("{}", err).contains("limit 5"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: FmkError = io_err.into();
        assert!(err.is_not_found());

        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(FmkError::from(io_err), FmkError::PermissionDenied(_)));

        let io_err = io::Error::new(io::ErrorKind::Other, "boom");
        assert!(matches!(FmkError::from(io_err), FmkError::Io(_)));
    }

    #[test]
    fn test_from_io_with_path() {
        let io_err = io::Error::new(io::ErrorKind::AlreadyExists, "exists");
        let err = FmkError::from_io(io_err, "/tmp/a.txt");
        assert!(matches!(err, FmkError::AlreadyExists(ref p) if p == "/tmp/a.txt"));
    }

    #[test]
    fn test_kind_serializes_as_name() {
        let json = serde_json::to_string(&ErrorKind::UnsupportedEncoding).unwrap();
        assert_eq!(json, "\"UnsupportedEncoding\"");
    }
}
