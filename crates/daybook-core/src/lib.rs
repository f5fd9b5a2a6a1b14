//! Shared foundation for the Daybook workspace.
//!
//! Value types, the top-level error enum, and the TOML configuration layer
//! used by the store and extraction crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::DaybookConfig;
pub use error::{DaybookError, Result};
pub use types::{ItemKind, Priority, Timestamp};

/// Install a plain fmt tracing subscriber for binaries and integration tests.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_target(false).try_init();
}
