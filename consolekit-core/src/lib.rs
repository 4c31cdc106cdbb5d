//! Consolekit Core - shared infrastructure for the admin console state layer
//!
//! Error types with context, logging bootstrap and TOML configuration used by
//! every other consolekit crate.

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
pub use logging::*;

// Re-export commonly used external types
pub use tracing;
