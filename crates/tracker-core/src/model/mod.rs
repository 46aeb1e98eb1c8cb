// ── Domain model ──
//
// The generic Entry shape lives in `tracker-api` (it is the wire format);
// this module adds the types that only exist client-side.

mod user;

pub use user::{Permission, UserInfo};

pub use tracker_api::models::{Entry, LogRecord, UNSAVED_ID};
