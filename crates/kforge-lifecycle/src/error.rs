//! Lifecycle errors.

use std::path::PathBuf;

use kforge_platform::PlatformError;
use thiserror::Error;

/// Errors that abort a lifecycle operation.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The requested platform is not registered. No stage was entered.
    #[error("unknown platform '{name}' (registered: {})", available.join(", "))]
    UnknownPlatform { name: String, available: Vec<String> },

    #[error("pre-build failed for {platform}: {source}")]
    PreBuildFailure {
        platform: String,
        #[source]
        source: PlatformError,
    },

    /// The compiler reported failure; post-processing and run were skipped.
    #[error("build failed for {platform}: {source}")]
    BuildFailure {
        platform: String,
        #[source]
        source: PlatformError,
    },

    /// The load-bearing image extraction failed.
    #[error("post-processing failed for {platform}: {source}")]
    PostProcessing {
        platform: String,
        #[source]
        source: PlatformError,
    },

    /// Run was requested but the kernel image was never produced.
    #[error("kernel image {} for {platform} is missing, not starting it", path.display())]
    ArtifactMissing {
        platform: String,
        path: PathBuf,
        #[source]
        cause: Option<Box<LifecycleError>>,
    },

    #[error("run failed for {platform}: {source}")]
    RunFailure {
        platform: String,
        #[source]
        source: PlatformError,
    },

    #[error("clean failed for {platform}: {source}")]
    CleanFailure {
        platform: String,
        #[source]
        source: PlatformError,
    },

    /// Marker bookkeeping failed.
    #[error("build marker state: {0}")]
    State(#[from] PlatformError),
}

impl LifecycleError {
    pub fn is_unknown_platform(&self) -> bool {
        matches!(self, LifecycleError::UnknownPlatform { .. })
    }

    /// A run or debug request refused because there is nothing to boot.
    pub fn is_refused_run(&self) -> bool {
        matches!(self, LifecycleError::ArtifactMissing { .. })
    }
}

/// Result type for lifecycle operations.
pub type Result<T> = std::result::Result<T, LifecycleError>;
