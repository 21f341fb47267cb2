//! Error types for platform operations.

use std::path::PathBuf;

use kforge_toolchain::ToolchainError;

/// Errors that can occur during platform operations.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// Lookup of a name that was never registered.
    #[error("unknown platform '{name}' (registered: {})", available.join(", "))]
    UnknownPlatform {
        name: String,
        available: Vec<String>,
    },

    /// Registration with an empty name.
    #[error("platform name must not be empty")]
    EmptyName,

    /// Filesystem error on a specific path.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external tool failed or could not be started.
    #[error(transparent)]
    Tool(#[from] ToolchainError),

    /// A build marker could not be encoded.
    #[error("build marker {}: {source}", path.display())]
    Marker {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PlatformError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlatformError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
