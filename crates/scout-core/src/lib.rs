//! Shared data model and configuration for Sentinel Scout.
//!
//! - [`types`]: runs, findings, trend points, chat messages and derived
//!   dashboard statistics.
//! - [`settings`]: the persisted data-source [`Configuration`](settings::Configuration)
//!   and its file-backed [`ConfigStore`](settings::ConfigStore).
//! - [`config`]: runtime settings (`scout.toml`) for logging, the HTTP
//!   client and the chat assistant.

pub mod config;
pub mod settings;
pub mod types;
