// Data Tracker HTTP client
//
// Wraps `reqwest::Client` with tracker-specific URL construction, keyed
// envelope unwrapping, and the CSRF cookie/header contract. Endpoint
// groups (entries, auth) are implemented as inherent methods via separate
// files to keep this module focused on transport mechanics.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Cookie set by the backend at session creation.
pub const CSRF_COOKIE: &str = "_csrf_token";

/// Header the backend expects the cookie value echoed into on every
/// mutating request. The pairing with [`CSRF_COOKIE`] is a bit-for-bit
/// contract with the backend.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Raw HTTP client for the Data Tracker REST API.
///
/// Handles the `/api/v1/` URL shape, the keyed response envelopes
/// (`{"dataset": {...}}`, `{"datasets": [...]}`), and CSRF header
/// attachment on POST/PATCH/DELETE. All methods return unwrapped
/// payloads -- the envelope is stripped before the caller sees it.
pub struct DataClient {
    http: reqwest::Client,
    base_url: Url,
    /// Cookie jar reference for sourcing the CSRF token. `None` when the
    /// client was built externally; mutating requests then go out without
    /// the header (the backend rejects them once a session exists).
    cookie_jar: Option<Arc<Jar>>,
}

impl DataClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (session auth requires cookies). The `base_url` is
    /// the service root, e.g. `https://tracker.example.org`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config.cookie_jar.clone();
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            cookie_jar,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Use this when you already have a client with a session cookie in
    /// its jar, or in tests.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            cookie_jar: None,
        }
    }

    /// Create a client with a pre-built `reqwest::Client` and a shared jar.
    pub fn with_client_and_jar(http: reqwest::Client, base_url: Url, jar: Arc<Jar>) -> Self {
        Self {
            http,
            base_url,
            cookie_jar: Some(jar),
        }
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── CSRF token sourcing ──────────────────────────────────────────

    /// Read the current CSRF token from the session cookie jar.
    ///
    /// Returns `None` when no jar is attached or the cookie has not been
    /// set yet (no session). A missing token means the header is silently
    /// omitted -- that is the observed contract, not an error.
    pub fn csrf_token(&self) -> Option<String> {
        let jar = self.cookie_jar.as_ref()?;
        let cookies = jar.cookies(&self.base_url)?;
        let header = cookies.to_str().ok()?;
        header.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == CSRF_COOKIE).then(|| value.to_owned())
        })
    }

    /// Apply the CSRF header to a mutating request builder.
    fn apply_csrf(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.csrf_token() {
            Some(token) => builder.header(CSRF_HEADER, token),
            None => {
                trace!("no CSRF cookie in jar; sending without header");
                builder
            }
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/v1/{path}/`.
    ///
    /// The trailing slash is part of the backend's route shape and must
    /// be preserved.
    pub(crate) fn api_url(&self, path: &str) -> Url {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}/api/v1/{}/", path.trim_matches('/'));
        Url::parse(&full).expect("invalid API URL")
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET a path and unwrap the named envelope key.
    pub(crate) async fn get_keyed<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
    ) -> Result<T, Error> {
        let url = self.api_url(path);
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let body = self.parse_body(resp).await?;
        extract_key(body, key)
    }

    /// GET a path, returning the parsed body unmodified.
    pub(crate) async fn get_raw(&self, path: &str) -> Result<Value, Error> {
        let url = self.api_url(path);
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        self.parse_body(resp).await
    }

    /// POST a JSON body, returning the parsed response unmodified.
    pub(crate) async fn post(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<Value, Error> {
        let url = self.api_url(path);
        debug!("POST {}", url);

        let builder = self.apply_csrf(self.http.post(url).json(body));
        let resp = builder.send().await.map_err(Error::Transport)?;
        self.parse_body(resp).await
    }

    /// PATCH a JSON body, returning the parsed response unmodified.
    pub(crate) async fn patch(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<Value, Error> {
        let url = self.api_url(path);
        debug!("PATCH {}", url);

        let builder = self.apply_csrf(self.http.patch(url).json(body));
        let resp = builder.send().await.map_err(Error::Transport)?;
        self.parse_body(resp).await
    }

    /// DELETE a path, returning the parsed response unmodified.
    pub(crate) async fn delete_path(&self, path: &str) -> Result<Value, Error> {
        let url = self.api_url(path);
        debug!("DELETE {}", url);

        let builder = self.apply_csrf(self.http.delete(url));
        let resp = builder.send().await.map_err(Error::Transport)?;
        self.parse_body(resp).await
    }

    /// Map error statuses and parse the response body as JSON.
    ///
    /// An empty body (e.g. from a 200 on save or logout) parses as `Null`.
    async fn parse_body(&self, resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();
        let path = resp.url().path().to_owned();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session expired or invalid credentials".into(),
            });
        }

        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::PermissionDenied {
                message: format!("insufficient permissions for {path}"),
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound { path });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: preview(&body),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }
}

/// Pull a named key out of a response envelope and deserialize it.
fn extract_key<T: DeserializeOwned>(body: Value, key: &str) -> Result<T, Error> {
    let raw = body.to_string();
    let Some(inner) = body.get(key) else {
        return Err(Error::Deserialization {
            message: format!("response missing key {key:?}"),
            body: raw,
        });
    };
    serde_json::from_value(inner.clone()).map_err(|e| Error::Deserialization {
        message: format!("invalid payload under key {key:?}: {e}"),
        body: raw,
    })
}

/// First 200 characters of a body, for error messages.
fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
