// Authentication endpoints
//
// Cookie-based session login/logout and API key management. The login
// endpoint sets a session cookie (and the CSRF cookie) in the client's
// jar; subsequent requests use both automatically.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::DataClient;
use crate::error::Error;
use crate::models::Entry;

impl DataClient {
    /// Authenticate with an API key: `POST /api/v1/login/apikey/`.
    ///
    /// On success the session cookie is stored in the client's cookie
    /// jar and used for all subsequent requests.
    pub async fn login_api_key(&self, username: &str, key: &SecretString) -> Result<(), Error> {
        debug!(user = %username, "logging in with API key");

        let body = json!({
            "api-user": username,
            "api-key": key.expose_secret(),
        });
        self.post("login/apikey", &body).await.map_err(|err| {
            // The backend answers a bad key with 401; report it as a
            // login failure rather than an expired session.
            if err.is_auth_expired() {
                Error::Authentication {
                    message: "API key login rejected".into(),
                }
            } else {
                err
            }
        })?;

        debug!("login successful");
        Ok(())
    }

    /// End the current session: `GET /api/v1/logout/`.
    ///
    /// The backend invalidates the session cookie; the jar picks up the
    /// replacement automatically.
    pub async fn logout(&self) -> Result<(), Error> {
        debug!("logging out");
        self.get_raw("logout").await?;
        Ok(())
    }

    /// Fetch the authenticated principal: `GET /api/v1/user/me/`.
    ///
    /// An anonymous session yields a record with every field empty; an
    /// empty id means "not logged in".
    pub async fn current_user(&self) -> Result<Entry, Error> {
        self.get_keyed("user/me", "user").await
    }

    /// Generate a new API key: `POST /api/v1/user/{id}/apikey/`, or the
    /// `/me/` variant when `user_id` is `None`.
    ///
    /// Returns the plaintext key; the backend stores only a salted hash,
    /// so this is the single chance to capture it.
    pub async fn generate_api_key(&self, user_id: Option<&str>) -> Result<String, Error> {
        let path = match user_id {
            Some(id) => format!("user/{id}/apikey"),
            None => "user/me/apikey".to_owned(),
        };
        let body = self.post(&path, &json!({})).await?;
        let raw = body.to_string();
        body.get("key")
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or(Error::Deserialization {
                message: "response missing key \"key\"".into(),
                body: raw,
            })
    }

    /// List all permission type names: `GET /api/v1/user/permissions/`.
    pub async fn permission_types(&self) -> Result<Vec<String>, Error> {
        self.get_keyed("user/permissions", "permissions").await
    }
}
