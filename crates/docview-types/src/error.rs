use std::fmt;
use std::path::PathBuf;

/// Result type for docview-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading the document tree
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// The configured document root does not exist
    RootNotFound(PathBuf),

    /// The configured document root exists but is not a directory
    NotADirectory(PathBuf),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::RootNotFound(path) => {
                write!(f, "folder does not exist: {}", path.display())
            }
            Error::NotADirectory(path) => {
                write!(f, "folder must be a directory: {}", path.display())
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::RootNotFound(_) | Error::NotADirectory(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
