//! Persistent configuration for the VoucherFlow CLI.
//!
//! TOML profiles, bearer-token resolution (env + keyring + plaintext),
//! and translation to `voucherflow_core::ApiConfig`. The CLI layers its
//! flag overrides on top of what this crate produces.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use voucherflow_core::{ApiConfig, DEFAULT_PAGE_SIZE, RetryPolicy, TlsVerification};

/// Keyring service every stored token lives under.
pub const KEYRING_SERVICE: &str = "voucherflow";

/// Environment prefix for config overrides (`VOUCHERFLOW_DEFAULTS__PAGE_SIZE=50`).
pub const ENV_PREFIX: &str = "VOUCHERFLOW_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' is not configured")]
    UnknownProfile { name: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

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
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named API profiles.
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

impl Config {
    /// Name of the default profile, falling back to `"default"`.
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }

    /// Sorted profile names, for stable listings.
    pub fn profile_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// A named API deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Base URL including the gateway stage (e.g. "https://api.example.com/prod").
    pub api_url: String,

    /// Bearer token (plaintext; prefer keyring or `token_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable holding the bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Extra attempts for transient read failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
}

impl Profile {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Set one field from its `config set` key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "api_url" | "api-url" => {
                parse_url(value)?;
                self.api_url = value.to_owned();
            }
            "token" => self.token = Some(value.to_owned()),
            "token_env" | "token-env" => self.token_env = Some(value.to_owned()),
            "page_size" | "page-size" => {
                let size: u32 = parse_field("page_size", value, "must be a positive number")?;
                if size == 0 {
                    return Err(invalid("page_size", "must be a positive number"));
                }
                self.page_size = Some(size);
            }
            "timeout" => {
                self.timeout = Some(parse_field("timeout", value, "must be a number (seconds)")?);
            }
            "insecure" => {
                self.insecure = Some(parse_field("insecure", value, "must be 'true' or 'false'")?);
            }
            "ca_cert" | "ca-cert" => self.ca_cert = Some(value.into()),
            "retries" => self.retries = Some(parse_field("retries", value, "must be a number")?),
            other => {
                return Err(invalid(
                    other,
                    &format!(
                        "unknown config key '{other}'. Valid keys: api_url, token, token_env, \
                         page_size, timeout, insecure, ca_cert, retries"
                    ),
                ));
            }
        }
        Ok(())
    }
}

fn parse_field<T: std::str::FromStr>(
    field: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(field, reason))
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

fn parse_url(raw: &str) -> Result<url::Url, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| invalid("api_url", &format!("invalid URL: {raw}")))
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "voucherflow", "voucherflow").map_or_else(
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
    p.push("voucherflow");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, still layering `VOUCHERFLOW_` env vars on top.
///
/// A missing file is not an error; defaults apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    debug!(path = %path.display(), "config written");
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/token")
}

/// Resolve the bearer token for a profile.
///
/// Chain: `token_env` variable, then the system keyring, then the
/// plaintext `token` field. `None` means the API is called anonymously.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            if !val.is_empty() {
                return Some(SecretString::from(val));
            }
        }
    }

    // 2. System keyring
    if let Some(secret) = keyring_token(profile_name) {
        return Some(secret);
    }

    // 3. Plaintext in config
    profile
        .token
        .as_ref()
        .filter(|t| !t.is_empty())
        .map(|t| SecretString::from(t.clone()))
}

fn keyring_token(profile_name: &str) -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name)).ok()?;
    match entry.get_password() {
        Ok(secret) => Some(SecretString::from(secret)),
        Err(e) => {
            debug!(profile = profile_name, error = %e, "no keyring token");
            None
        }
    }
}

/// Store a bearer token for `profile_name` in the system keyring.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    if token.trim().is_empty() {
        return Err(invalid("token", "value cannot be empty"));
    }
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))?;
    entry.set_password(token)?;
    Ok(())
}

// ── Translation to runtime config ───────────────────────────────────

/// Build an `ApiConfig` from a profile, with `defaults` filling the gaps.
///
/// No CLI flag overrides are applied here.
pub fn profile_to_api_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ApiConfig, ConfigError> {
    if profile.api_url.trim().is_empty() {
        return Err(invalid(
            "api_url",
            &format!("profile '{profile_name}' has no api_url"),
        ));
    }
    let mut config = ApiConfig::new(parse_url(&profile.api_url)?);

    config.token = resolve_token(profile, profile_name);
    config.tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.default_page_size = profile.page_size.unwrap_or(defaults.page_size).max(1);
    if let Some(retries) = profile.retries {
        config.retry = RetryPolicy {
            max_retries: retries,
            ..RetryPolicy::default()
        };
    }

    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn set_validates_values() {
        let mut profile = Profile::new("https://api.example.com/prod");
        profile.set("page-size", "50").unwrap();
        profile.set("retries", "0").unwrap();
        assert_eq!(profile.page_size, Some(50));
        assert_eq!(profile.retries, Some(0));

        assert!(profile.set("page_size", "0").is_err());
        assert!(profile.set("timeout", "soon").is_err());
        assert!(profile.set("api_url", "not a url").is_err());
        assert!(matches!(
            profile.set("colour", "red"),
            Err(ConfigError::Validation { ref field, .. }) if field == "colour"
        ));
    }

    #[test]
    fn profile_fields_override_defaults() {
        let profile = Profile {
            page_size: Some(50),
            timeout: Some(5),
            retries: Some(4),
            ca_cert: Some("/etc/ssl/gw.pem".into()),
            ..Profile::new("https://api.example.com/prod")
        };
        let config =
            profile_to_api_config(&profile, "cfg-test-override", &Defaults::default()).unwrap();

        assert_eq!(config.default_page_size, 50);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retry.max_retries, 4);
        assert_eq!(config.tls, TlsVerification::CustomCa("/etc/ssl/gw.pem".into()));
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let defaults = Defaults {
            insecure: true,
            page_size: 10,
            ..Defaults::default()
        };
        let profile = Profile::new("https://api.example.com/prod");
        let config = profile_to_api_config(&profile, "cfg-test-defaults", &defaults).unwrap();

        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn missing_url_is_rejected() {
        let err = profile_to_api_config(&Profile::default(), "empty", &Defaults::default())
            .unwrap_err();
        assert!(err.to_string().contains("no api_url"), "{err}");
    }

    #[test]
    fn plaintext_token_is_last_resort() {
        let profile = Profile {
            token: Some("plain-token".into()),
            token_env: Some("VOUCHERFLOW_TEST_TOKEN_THAT_IS_NEVER_SET".into()),
            ..Profile::new("https://api.example.com")
        };
        let token = resolve_token(&profile, "cfg-test-plaintext-fallback").unwrap();
        assert_eq!(secrecy::ExposeSecret::expose_secret(&token), "plain-token");

        let anonymous = Profile::new("https://api.example.com");
        assert!(resolve_token(&anonymous, "cfg-test-anonymous").is_none());
    }
}
