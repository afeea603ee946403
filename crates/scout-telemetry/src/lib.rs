//! Logging setup shared by the Sentinel Scout binaries.
//!
//! Output goes to stderr through `tracing-subscriber`, either human-readable
//! or as JSON lines, filtered by `RUST_LOG` or a configured default level.

pub mod logging;

pub use logging::{init, LogFormat};
