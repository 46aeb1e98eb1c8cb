// ── Session facade ──
//
// Wires the HTTP action layer to the store. This is the only component
// that both performs I/O and commits results; the store itself never
// touches the network, and the client never touches the store. Failures
// are surfaced exactly once to the caller and mirrored into the injected
// notification sink where the original UI showed a banner.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde_json::Value;
use tracing::debug;
use url::Url;

use tracker_api::{DataClient, Entry, Kind, TlsMode, TransportConfig};

use crate::error::CoreError;
use crate::model::UserInfo;
use crate::notify::{Notification, NotificationSink};
use crate::routes::{NavDecision, RouteTable};
use crate::store::{LoadState, Store};

/// API-key credentials for the scripted login flow.
#[derive(Debug, Clone)]
pub struct ApiKeyCredentials {
    pub username: String,
    pub key: SecretString,
}

/// Configuration for one session against a Data Tracker service.
///
/// Built by the embedding application (or `tracker-config`); the core
/// never reads config files.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Service root URL, e.g. `https://tracker.example.org`.
    pub url: Url,
    /// Credentials for [`Session::login`]. `None` allows anonymous
    /// browsing of the public routes.
    pub auth: Option<ApiKeyCredentials>,
    /// TLS verification strategy.
    pub tls: TlsMode,
    /// Request timeout.
    pub timeout: Duration,
}

/// The main entry point for consumers.
///
/// Cheaply cloneable; all state lives behind `Arc`s. Each operation maps
/// to exactly one REST call. There are no automatic retries and no
/// request cancellation: once issued, a request runs to completion, and
/// the store's generation counters drop any response that resolves after
/// its slot was reset or superseded.
///
/// Concurrency: independent operations may be in flight simultaneously
/// (each writes a distinct slot). Two concurrent saves to the *same*
/// slot race, and the last response to resolve wins regardless of
/// initiation order — a documented limitation, not hidden sequencing.
#[derive(Clone)]
pub struct Session {
    client: Arc<DataClient>,
    store: Arc<Store>,
    sink: Arc<dyn NotificationSink>,
    routes: Arc<RouteTable>,
    config: SessionConfig,
}

impl Session {
    /// Create a session with a fresh store and the store-backed
    /// notification sink.
    pub fn new(config: SessionConfig) -> Result<Self, CoreError> {
        Self::with_store(config, Arc::new(Store::new()))
    }

    /// Create a session over an existing store.
    pub fn with_store(config: SessionConfig, store: Arc<Store>) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: config.tls.clone(),
            timeout: config.timeout,
            cookie_jar: None,
        }
        .with_cookie_jar();

        let client = DataClient::new(config.url.clone(), &transport)?;
        let sink: Arc<dyn NotificationSink> = store.clone();

        Ok(Self {
            client: Arc::new(client),
            store,
            sink,
            routes: Arc::new(RouteTable::new()),
            config,
        })
    }

    /// Replace the notification sink (dependency injection point).
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The session's store.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// The underlying API client.
    pub fn client(&self) -> &DataClient {
        &self.client
    }

    // ── Entry loading ────────────────────────────────────────────────

    /// Fetch one entry and commit it into the kind's entry slot.
    ///
    /// On failure the slot is cleared (never left with stale data), a
    /// warning notification is published, and the error propagates.
    pub async fn load_entry(&self, kind: Kind, id: &str) -> Result<(), CoreError> {
        let generation = self.store.begin_entry_load(kind);
        match self.client.fetch_one(kind, id).await {
            Ok(entry) => {
                if !self.store.commit_entry(kind, generation, entry) {
                    debug!(kind = %kind, id, "entry load superseded; result dropped");
                }
                Ok(())
            }
            Err(err) => {
                self.store.fail_entry_load(kind, generation);
                self.sink.notify(Notification::warning(format!(
                    "Unable to retrieve {}",
                    kind.segment()
                )));
                Err(err.into())
            }
        }
    }

    /// Fetch the browse list for a kind and commit it wholesale.
    pub async fn load_list(&self, kind: Kind) -> Result<(), CoreError> {
        let generation = self.store.begin_list_load(kind);
        match self.client.fetch_list(kind).await {
            Ok(entries) => {
                if !self.store.commit_list(kind, generation, entries) {
                    debug!(kind = %kind, "list load superseded; result dropped");
                }
                Ok(())
            }
            Err(err) => {
                self.store.fail_list_load(kind, generation);
                self.sink.notify(Notification::warning(format!(
                    "Unable to retrieve {} list",
                    kind.segment()
                )));
                Err(err.into())
            }
        }
    }

    /// Fetch the current user's own entries of a kind.
    pub async fn load_user_list(&self, kind: Kind) -> Result<(), CoreError> {
        let generation = self.store.begin_list_load(kind);
        match self.client.fetch_user_list(kind).await {
            Ok(entries) => {
                self.store.commit_list(kind, generation, entries);
                Ok(())
            }
            Err(err) => {
                self.store.fail_list_load(kind, generation);
                self.sink.notify(Notification::warning(format!(
                    "Unable to retrieve your {} list",
                    kind.segment()
                )));
                Err(err.into())
            }
        }
    }

    /// Fetch the empty template for a kind into the entry slot, seeding
    /// an "add new" flow. The committed entry carries the unsaved id
    /// sentinel.
    pub async fn load_structure(&self, kind: Kind) -> Result<(), CoreError> {
        let generation = self.store.begin_entry_load(kind);
        match self.client.fetch_structure(kind).await {
            Ok(entry) => {
                self.store.commit_entry(kind, generation, entry);
                Ok(())
            }
            Err(err) => {
                self.store.fail_entry_load(kind, generation);
                self.sink.notify(Notification::warning(format!(
                    "Unable to prepare a new {}",
                    kind.segment()
                )));
                Err(err.into())
            }
        }
    }

    /// Fetch the change log for an entry.
    pub async fn load_entry_log(&self, kind: Kind, id: &str) -> Result<(), CoreError> {
        let generation = self.store.begin_log_load(kind);
        match self.client.entry_log(kind, id).await {
            Ok(logs) => {
                self.store.commit_log(kind, generation, logs);
                Ok(())
            }
            Err(err) => {
                self.store.fail_log_load(kind, generation);
                Err(err.into())
            }
        }
    }

    /// Fetch the action feed for a user (`"me"` for the current one).
    pub async fn load_user_actions(&self, id: &str) -> Result<(), CoreError> {
        let generation = self.store.begin_actions_load();
        match self.client.user_actions(id).await {
            Ok(logs) => {
                self.store.commit_actions(generation, logs);
                Ok(())
            }
            Err(err) => {
                self.store.fail_actions_load(generation);
                Err(err.into())
            }
        }
    }

    // ── Saving and deleting ──────────────────────────────────────────

    /// Save an entry (create or update, dispatched on the id sentinel).
    ///
    /// On success, if the server echoes the saved record under the
    /// kind's singular key it is committed into the entry slot; the raw
    /// response is returned either way. On failure the in-memory entry
    /// is left untouched (nothing was optimistically mutated) and the
    /// user may retry manually.
    pub async fn save_entry(&self, kind: Kind, entry: &Entry) -> Result<Value, CoreError> {
        self.store.begin_entry_save(kind);
        match self.client.save(kind, entry).await {
            Ok(response) => {
                let echoed = response
                    .get(kind.singular_key())
                    .map(|v| serde_json::from_value::<Entry>(v.clone()));
                match echoed {
                    Some(Ok(saved)) => self.store.commit_saved_entry(kind, saved),
                    _ => self.store.finish_entry_save(kind),
                }
                self.sink
                    .notify(Notification::success(format!("Saved {}", kind.segment())));
                Ok(response)
            }
            Err(err) => {
                self.store.fail_entry_save(kind);
                self.sink.notify(Notification::error(format!(
                    "Failed to save {}",
                    kind.segment()
                )));
                Err(err.into())
            }
        }
    }

    /// Delete an entry, then clear the kind's entry slot.
    pub async fn delete_entry(&self, kind: Kind, id: &str) -> Result<(), CoreError> {
        match self.client.delete(kind, id).await {
            Ok(()) => {
                self.store.reset_entry(kind);
                self.sink
                    .notify(Notification::success(format!("Deleted {}", kind.segment())));
                Ok(())
            }
            Err(err) => {
                self.sink.notify(Notification::error(format!(
                    "Failed to delete {}",
                    kind.segment()
                )));
                Err(err.into())
            }
        }
    }

    // ── Current user ─────────────────────────────────────────────────

    /// The cached principal, fetching it on first use.
    ///
    /// Loaded once per session; invalidated only by [`logout`](Self::logout)
    /// or a failed [`reload_current_user`](Self::reload_current_user).
    pub async fn load_current_user(&self) -> Result<Arc<UserInfo>, CoreError> {
        let snapshot = self.store.current_user();
        if snapshot.state == LoadState::Loaded {
            return Ok(snapshot.value);
        }
        self.reload_current_user().await
    }

    /// Force a fresh `user/me` fetch. A failed reload clears the cached
    /// principal, so the client falls back to "not logged in".
    pub async fn reload_current_user(&self) -> Result<Arc<UserInfo>, CoreError> {
        let generation = self.store.begin_current_user_load();
        match self.client.current_user().await {
            Ok(entry) => {
                let info = UserInfo::from(entry);
                self.store.commit_current_user(generation, info.clone());
                Ok(Arc::new(info))
            }
            Err(err) => {
                self.store.fail_current_user_load(generation);
                Err(err.into())
            }
        }
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Log in with the configured credentials.
    pub async fn login(&self) -> Result<Arc<UserInfo>, CoreError> {
        let Some(ref auth) = self.config.auth else {
            return Err(CoreError::Config {
                message: "no credentials configured".into(),
            });
        };
        let auth = auth.clone();
        self.login_with_key(&auth.username, &auth.key).await
    }

    /// Log in with an explicit API key, then load the principal.
    pub async fn login_with_key(
        &self,
        username: &str,
        key: &SecretString,
    ) -> Result<Arc<UserInfo>, CoreError> {
        if let Err(err) = self.client.login_api_key(username, key).await {
            self.sink.notify(Notification::error("Login failed"));
            return Err(err.into());
        }
        let info = self.reload_current_user().await?;
        self.sink
            .notify(Notification::success(format!("Logged in as {}", info.name)));
        Ok(info)
    }

    /// End the session. The cached principal is dropped even when the
    /// logout request itself fails.
    pub async fn logout(&self) -> Result<(), CoreError> {
        let result = self.client.logout().await;
        self.store.reset_current_user();
        result.map_err(Into::into)
    }

    /// Generate a fresh API key for a user (`None` = the current user).
    /// Returns the plaintext key -- the single chance to capture it.
    pub async fn generate_api_key(&self, user_id: Option<&str>) -> Result<String, CoreError> {
        Ok(self.client.generate_api_key(user_id).await?)
    }

    /// List the permission type names known to the backend (used by the
    /// admin user editor to render permission checkboxes).
    pub async fn permission_types(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.client.permission_types().await?)
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Guard a navigation attempt against the cached principal.
    pub fn decide_route(&self, path: &str) -> NavDecision {
        let snapshot = self.store.current_user();
        let user = (snapshot.state == LoadState::Loaded).then_some(snapshot.value);
        self.routes.decide(path, user.as_deref())
    }

    /// The session's route table.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }
}
