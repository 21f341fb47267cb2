//! Lifecycle engine for kforge.
//!
//! Sequences the stages of one invocation against one platform:
//!
//! ```text
//! Idle -> PreBuilding -> Building -> PostProcessing -> Running -> Done
//!              |             |              |             |
//!              +-------------+--------------+-------------+--> Aborted
//!
//! any state -> Cleaning -> Idle
//! ```
//!
//! Every stage is gated on the success of the previous one. Pre-build
//! consults the state tracker first, so switching platforms cleans the
//! previous platform's build before anything is staged.

pub mod engine;
pub mod error;
pub mod state;

pub use engine::Engine;
pub use error::{LifecycleError, Result};
pub use state::LifecycleState;
