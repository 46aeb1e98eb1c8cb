// tracker-api: Async Rust client for the Data Tracker REST API

pub mod auth;
pub mod client;
pub mod entries;
pub mod error;
pub mod kind;
pub mod models;
pub mod transport;

pub use client::DataClient;
pub use error::Error;
pub use kind::Kind;
pub use models::{Entry, LogRecord};
pub use transport::{TlsMode, TransportConfig};
