//! CLI command implementations.

pub mod build;
pub mod clean;
pub mod env;
pub mod platforms;
pub mod run;
pub mod state;
pub mod version;
