//! External toolchain invocation for kforge.
//!
//! Every lifecycle stage eventually shells out to a fixed external tool:
//! cargo, the binutils wrappers, `dd`, QEMU or the K210 flasher. This crate
//! models those invocations as structured argument vectors and runs them
//! through the [`ProcessRunner`] seam so the rest of the workspace can be
//! tested against [`RecordingRunner`] instead of a real toolchain.

pub mod command;
pub mod error;
pub mod recording;
pub mod runner;
pub mod tools;

pub use command::{Redirect, ToolCommand};
pub use error::{Result, ToolchainError};
pub use recording::RecordingRunner;
pub use runner::{ProcessRunner, SystemRunner, ToolStatus};
pub use tools::{Tool, Toolset};
