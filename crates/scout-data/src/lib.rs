//! Data access for Sentinel Scout.
//!
//! A [`DataClient`] picks one [`DataSource`] from the current
//! [`Configuration`](scout_core::settings::Configuration): the built-in
//! [`MockSource`] or a [`RemoteSource`] talking to the REST backend. Callers
//! never branch on the mode themselves.

pub mod client;
pub mod error;
pub mod mock;
pub mod remote;
pub mod source;

pub use client::{ClientOptions, ConnectionStatus, DashboardSnapshot, DataClient};
pub use error::{DataError, Operation};
pub use mock::{Latency, MockDataset, MockSource};
pub use remote::RemoteSource;
pub use source::{DataSource, SourceKind};
