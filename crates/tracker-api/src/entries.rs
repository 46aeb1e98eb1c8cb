// Entry CRUD endpoints
//
// One method per typed intent: fetch one, fetch a list, fetch the empty
// template, save, delete, and the per-entity audit feeds. Each issues
// exactly one REST call; failures reject once to the caller and are never
// retried here.

use serde_json::Value;
use tracing::debug;

use crate::client::DataClient;
use crate::error::Error;
use crate::kind::Kind;
use crate::models::{Entry, LogRecord, UNSAVED_ID};

impl DataClient {
    /// Fetch a single entry: `GET /api/v1/{kind}/{id}/`.
    pub async fn fetch_one(&self, kind: Kind, id: &str) -> Result<Entry, Error> {
        self.get_keyed(&format!("{}/{id}", kind.segment()), kind.singular_key())
            .await
    }

    /// Fetch all entries of a kind: `GET /api/v1/{kind}/`.
    ///
    /// The backend nests the array under the pluralized kind key.
    pub async fn fetch_list(&self, kind: Kind) -> Result<Vec<Entry>, Error> {
        self.get_keyed(kind.segment(), kind.plural_key()).await
    }

    /// Fetch the entries of a kind owned by the current user:
    /// `GET /api/v1/{kind}/user/`.
    pub async fn fetch_user_list(&self, kind: Kind) -> Result<Vec<Entry>, Error> {
        self.get_keyed(&format!("{}/user", kind.segment()), kind.plural_key())
            .await
    }

    /// Fetch the empty template for a kind: `GET /api/v1/{kind}/structure/`.
    ///
    /// The backend stamps a fresh id into the template; it is cleared to
    /// the unsaved sentinel here so that a subsequent [`save`](Self::save)
    /// dispatches a create.
    pub async fn fetch_structure(&self, kind: Kind) -> Result<Entry, Error> {
        let mut entry: Entry = self
            .get_keyed(&format!("{}/structure", kind.segment()), kind.singular_key())
            .await?;
        entry.id = UNSAVED_ID.to_owned();
        Ok(entry)
    }

    /// Save an entry.
    ///
    /// Dispatches on the id sentinel: an unsaved entry is created with
    /// `POST /api/v1/{kind}/`, an existing one updated with
    /// `PATCH /api/v1/{kind}/{id}/`. The id is used for routing only and
    /// is stripped from the transmitted body in both cases. The server
    /// response is returned unmodified.
    pub async fn save(&self, kind: Kind, entry: &Entry) -> Result<Value, Error> {
        let payload = entry.save_payload();
        if entry.is_new() {
            debug!(kind = %kind, "creating entry");
            self.post(kind.segment(), &payload).await
        } else {
            debug!(kind = %kind, id = %entry.id, "updating entry");
            self.patch(&format!("{}/{}", kind.segment(), entry.id), &payload)
                .await
        }
    }

    /// Delete an entry: `DELETE /api/v1/{kind}/{id}/`.
    pub async fn delete(&self, kind: Kind, id: &str) -> Result<(), Error> {
        debug!(kind = %kind, id = %id, "deleting entry");
        self.delete_path(&format!("{}/{id}", kind.segment())).await?;
        Ok(())
    }

    /// Fetch the change log for an entry: `GET /api/v1/{kind}/{id}/log/`.
    ///
    /// For the current user's own log, pass `"me"` as the id.
    pub async fn entry_log(&self, kind: Kind, id: &str) -> Result<Vec<LogRecord>, Error> {
        self.get_keyed(&format!("{}/{id}/log", kind.segment()), "logs")
            .await
    }

    /// Fetch the actions performed by a user:
    /// `GET /api/v1/user/{id}/actions/` (or `/me/` for the current user).
    pub async fn user_actions(&self, id: &str) -> Result<Vec<LogRecord>, Error> {
        self.get_keyed(&format!("user/{id}/actions"), "logs").await
    }
}
