//! Shared configuration for Data Tracker clients.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `tracker_core::SessionConfig`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tracker_core::{ApiKeyCredentials, SessionConfig, TlsMode};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named service profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// A named service profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Service base URL (e.g., "https://tracker.example.org").
    pub service: String,

    /// Username for API key login. Absent means anonymous browsing.
    pub username: Option<String>,

    /// API key (plaintext — prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "datatracker", "datatracker").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("datatracker");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// The provider stack: defaults, then the TOML file, then `TRACKER_*`
/// environment overrides.
fn config_figment(path: &std::path::Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TRACKER_").split("_"))
}

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let config: Config = config_figment(&config_path()).extract()?;
    Ok(config)
}

/// Load config from an explicit path (tests, alternate locations).
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let config: Config = config_figment(path).extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve an API key from the credential chain:
/// profile env var, then system keyring, then plaintext config.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's api_key_env → env var lookup
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new("datatracker", &format!("{profile_name}/api-key")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Build a `SessionConfig` from a profile.
///
/// A profile without a username yields an anonymous session (public
/// browsing only); with a username, the API key must resolve.
pub fn profile_to_session_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<SessionConfig, ConfigError> {
    let url: url::Url = profile
        .service
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "service".into(),
            reason: format!("invalid URL: {}", profile.service),
        })?;

    let auth = match profile.username {
        Some(ref username) => Some(ApiKeyCredentials {
            username: username.clone(),
            key: resolve_api_key(profile, profile_name)?,
        }),
        None => None,
    };

    let tls = if profile.insecure.unwrap_or(false) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(30));

    Ok(SessionConfig {
        url,
        auth,
        tls,
        timeout,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_profiles_from_toml() {
        let file = write_config(
            r#"
            default_profile = "prod"

            [defaults]
            timeout = 10

            [profiles.prod]
            service = "https://tracker.example.org"
            username = "robot"
            api_key = "plain-key"
            "#,
        );

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("prod"));
        assert_eq!(config.defaults.timeout, 10);

        let profile = config.profiles.get("prod").unwrap();
        assert_eq!(profile.service, "https://tracker.example.org");
        assert_eq!(profile.username.as_deref(), Some("robot"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config_from(std::path::Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert!(config.profiles.is_empty());
        assert_eq!(config.defaults.timeout, 30);
    }

    #[test]
    fn plaintext_key_is_the_last_resort() {
        let profile = Profile {
            service: "https://tracker.example.org".into(),
            username: Some("robot".into()),
            api_key: Some("plain-key".into()),
            ..Profile::default()
        };

        let key = resolve_api_key(&profile, "test-profile").unwrap();
        use secrecy::ExposeSecret;
        assert_eq!(key.expose_secret(), "plain-key");
    }

    #[test]
    fn no_credentials_is_an_error() {
        let profile = Profile {
            service: "https://tracker.example.org".into(),
            username: Some("robot".into()),
            ..Profile::default()
        };

        let result = resolve_api_key(&profile, "test-profile");
        assert!(matches!(result, Err(ConfigError::NoCredentials { .. })));
    }

    #[test]
    fn profile_without_username_is_anonymous() {
        let profile = Profile {
            service: "https://tracker.example.org".into(),
            ..Profile::default()
        };

        let session = profile_to_session_config(&profile, "anon").unwrap();
        assert!(session.auth.is_none());
        assert_eq!(session.url.as_str(), "https://tracker.example.org/");
    }

    #[test]
    fn insecure_profile_selects_permissive_tls() {
        let profile = Profile {
            service: "https://localhost:5000".into(),
            insecure: Some(true),
            ..Profile::default()
        };

        let session = profile_to_session_config(&profile, "dev").unwrap();
        assert!(matches!(session.tls, TlsMode::DangerAcceptInvalid));
    }

    #[test]
    fn bad_url_is_a_validation_error() {
        let profile = Profile {
            service: "not a url".into(),
            ..Profile::default()
        };

        let result = profile_to_session_config(&profile, "broken");
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }
}
