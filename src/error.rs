use std::path::PathBuf;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the application
#[derive(Debug)]
pub enum Error {
    IoError { path: PathBuf, source: std::io::Error },
    ParseError { file: PathBuf, message: String },
    UnresolvedType { type_name: String, file: PathBuf, message: String },
    InvalidArgument(String),
    CatalogueError { file: PathBuf, message: String },
    GlobError(String),
}

impl Error {
    /// Wraps an I/O error together with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::IoError {
            path: path.into(),
            source,
        }
    }

    pub fn unresolved(
        type_name: impl Into<String>,
        file: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Error::UnresolvedType {
            type_name: type_name.into(),
            file: file.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError { path, source } => {
                write!(f, "IO error on {}: {}", path.display(), source)
            }
            Error::ParseError { file, message } => {
                write!(f, "Parse error in {}: {}", file.display(), message)
            }
            Error::UnresolvedType {
                type_name,
                file,
                message,
            } => write!(
                f,
                "Could not resolve type '{}' referenced in {}: {}",
                type_name,
                file.display(),
                message
            ),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::CatalogueError { file, message } => {
                write!(f, "Invalid description catalogue {}: {}", file.display(), message)
            }
            Error::GlobError(msg) => write!(f, "Invalid glob pattern: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<globset::Error> for Error {
    fn from(err: globset::Error) -> Self {
        Error::GlobError(err.to_string())
    }
}
