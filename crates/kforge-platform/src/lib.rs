//! Platform model for kforge.
//!
//! A platform is a named target environment (the QEMU `virt` machine, the
//! Kendryte K210 board) with its own pre-build, build, post-build, clean and
//! run procedures. This crate provides:
//! - **Layout:** build mode and the derived kernel artifact paths
//! - **Platforms:** the [`Platform`] capability trait and the builtin backends
//! - **Registry:** name-to-platform lookup in registration order
//! - **State:** build markers (`last-<platform>`) and the switch tracker

pub mod error;
pub mod k210;
pub mod layout;
pub mod marker;
pub mod mode;
pub mod platform;
pub mod qemu;
pub mod registry;
pub mod tracker;

pub use error::{PlatformError, Result};
pub use k210::{K210Settings, K210};
pub use layout::KernelLayout;
pub use marker::{FsMarkerStore, MarkerRecord, MarkerStore, MemoryMarkerStore};
pub use mode::BuildMode;
pub use platform::{DiagnosticFailure, Platform, PostBuildReport, StageContext};
pub use qemu::{Qemu, QemuSettings};
pub use registry::{PlatformRegistry, PlatformSettings};
pub use tracker::{StateTracker, SwitchOutcome};
