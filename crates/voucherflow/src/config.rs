//! CLI configuration — thin wrapper around `voucherflow_config`.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--api-url, --token, etc.).

use std::time::Duration;

use secrecy::SecretString;

use voucherflow_core::{ApiConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use voucherflow_config::{
    Config, Profile, config_path, load_config_or_default, save_config, store_token,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// Comma-separated profile names for error help text.
pub fn available_profiles(config: &Config) -> String {
    let names = config.profile_names();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

/// Build the `ApiConfig` for this invocation.
///
/// Flag values win over the active profile, which wins over `[defaults]`.
/// With no profile on disk, `--api-url` alone is enough.
pub fn resolve_api_config(global: &GlobalOpts) -> Result<ApiConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() && global.api_url.is_none() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => Profile::default(),
    };

    // 1. API URL (flag > env > profile)
    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if profile.api_url.trim().is_empty() {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    }

    let mut api =
        voucherflow_config::profile_to_api_config(&profile, &profile_name, &cfg.defaults)?;

    // 2. Token flag beats the profile's credential chain
    if let Some(ref token) = global.token {
        api.token = Some(SecretString::from(token.clone()));
    }

    // 3. TLS + timeout
    if global.insecure {
        api.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        api.timeout = Duration::from_secs(secs);
    }

    tracing::debug!(profile = %profile_name, url = %api.url, "resolved API config");
    Ok(api)
}
