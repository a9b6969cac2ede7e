// DevGate - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// None of these errors is fatal to the host program: the public logging API
// swallows them and degrades to a silent no-op. They exist so that the
// `try_*` entry points and the diagnostics can say what went wrong.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error returned by the process-wide `try_*` and `init` entry points.
///
/// Storage and config failures never reach the caller: they are logged and
/// the gate falls back, so they have no variant here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevGateError {
    /// An identity value was rejected.
    Identity(IdentityError),

    /// `init` was called after the process-wide gate was already installed.
    AlreadyInitialised,
}

impl fmt::Display for DevGateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity(e) => write!(f, "Identity error: {e}"),
            Self::AlreadyInitialised => {
                write!(f, "The process-wide gate has already been initialised")
            }
        }
    }
}

impl std::error::Error for DevGateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Identity(e) => Some(e),
            Self::AlreadyInitialised => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Identity errors
// ---------------------------------------------------------------------------

/// Reasons an identity value is rejected by the setter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The value is empty or only whitespace.
    Empty,

    /// Production mode is active; the identity cannot be changed.
    ProductionMode,
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Dev ID must be a non-empty string"),
            Self::ProductionMode => {
                write!(f, "Dev ID cannot be changed while production mode is active")
            }
        }
    }
}

impl std::error::Error for IdentityError {}

impl From<IdentityError> for DevGateError {
    fn from(e: IdentityError) -> Self {
        Self::Identity(e)
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

/// Errors from the persisted key-value store.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error reading or writing the store file.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },

    /// The store file is not a JSON object of strings.
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The store file exceeds the maximum accepted size.
    FileTooLarge { path: PathBuf, size: u64, max_size: u64 },

    /// An in-process store lock was poisoned by a panicking writer.
    Poisoned,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
            Self::Malformed { path, source } => {
                write!(f, "Storage file '{}' is malformed: {source}", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Storage file '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::Poisoned => write!(f, "In-memory store lock poisoned"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Malformed { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is not one of the accepted values.
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::InvalidValue {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is not valid. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for DevGate results.
pub type Result<T> = std::result::Result<T, DevGateError>;
