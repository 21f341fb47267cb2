//! Error types for toolchain invocation.

use std::path::PathBuf;

/// Errors that can occur while invoking an external tool.
#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    /// The program could not be started (usually: not installed).
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and reported failure.
    #[error("`{command}` exited with {}", describe_status(code))]
    Failed { command: String, code: Option<i32> },

    /// The file receiving the program's stdout could not be opened.
    #[error("cannot open {} for output: {source}", path.display())]
    Redirect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configured tool has no program name.
    #[error("tool `{tool}` has an empty command line")]
    EmptyTool { tool: String },
}

fn describe_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Result type for toolchain operations.
pub type Result<T> = std::result::Result<T, ToolchainError>;
