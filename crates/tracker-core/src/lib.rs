//! State layer between `tracker-api` and UI consumers.
//!
//! This crate owns the client-side business logic of the Data Tracker
//! front end:
//!
//! - **[`Session`]** — facade wiring the HTTP action layer to the store.
//!   The only component that both performs I/O and commits results; every
//!   operation maps to exactly one REST call, with failures surfaced once
//!   and optionally mirrored into a [`Notification`].
//!
//! - **[`Store`]** — single source of truth for loaded server data. One
//!   slot per entity kind for the entry under edit, the browse list, and
//!   the audit log, plus the cached current-user record and the
//!   notification slot. Commits are copy-on-write `Arc` snapshots
//!   broadcast over `watch` channels; a generation counter per slot drops
//!   late responses for abandoned loads.
//!
//! - **Entry editing** — field patches, tag and property upserts, and the
//!   reset operations, all as named store mutations that never perform
//!   I/O ([`Store::set_entry_fields`] and friends).
//!
//! - **[`RouteTable`]** — the client route table with login/permission
//!   metadata and a pure navigation guard.
//!
//! - **[`validate`]** — client-side input checks (tag keys, ORCID,
//!   email) that block a mutation before any network call is made.

pub mod error;
pub mod model;
pub mod notify;
pub mod routes;
pub mod session;
pub mod store;
pub mod stream;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use model::{Permission, UserInfo};
pub use notify::{Notification, NotificationLevel, NotificationSink};
pub use routes::{NavDecision, Route, RouteAccess, RouteTable};
pub use session::{ApiKeyCredentials, Session, SessionConfig};
pub use store::{LoadState, SlotValue, Store};
pub use stream::SlotStream;

// Re-export the wire-level types consumers handle directly.
pub use tracker_api::{Entry, Kind, LogRecord, TlsMode};
