//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use voucherflow_config::ConfigError;
use voucherflow_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(unused_assignments)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the notifications API at {url}")]
    #[diagnostic(
        code(voucherflow::connection_failed),
        help(
            "Check the URL, including the stage prefix (e.g. /prod).\n\
             URL: {url}\n\
             Use --insecure (-k) for gateways with self-signed certificates."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(voucherflow::auth_failed),
        help(
            "Check the bearer token for this profile.\n\
             Run: voucherflow config set-token\n\
             Or set VOUCHERFLOW_TOKEN."
        )
    )]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("Notification '{identifier}' not found")]
    #[diagnostic(
        code(voucherflow::not_found),
        help("Run: voucherflow list --code <CODE> to look it up by voucher code")
    )]
    NotFound { identifier: String },

    #[error("Notification '{id}' is {actual}, expected {expected}")]
    #[diagnostic(
        code(voucherflow::conflict),
        help("Someone else changed it first. Re-check with: voucherflow get {id}")
    )]
    Conflict {
        id: String,
        expected: String,
        actual: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error: {message}")]
    #[diagnostic(code(voucherflow::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(voucherflow::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(voucherflow::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: voucherflow config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No API configured")]
    #[diagnostic(
        code(voucherflow::no_config),
        help(
            "Create a profile with: voucherflow config init\n\
             Or pass --api-url / set VOUCHERFLOW_API_URL.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(voucherflow::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(voucherflow::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("'{command}' needs an interactive terminal")]
    #[diagnostic(
        code(voucherflow::not_a_terminal),
        help("Use `voucherflow list` with --page / --last-key for scripted paging.")
    )]
    NotInteractive { command: String },

    #[error("Interrupted")]
    #[diagnostic(code(voucherflow::interrupted))]
    Interrupted,

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out")]
    #[diagnostic(
        code(voucherflow::timeout),
        help("Increase the timeout with --timeout or check the API's responsiveness.")
    )]
    Timeout,

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::NotInteractive { .. } => exit_code::USAGE,
            Self::ApiError { status: Some(401 | 403), .. } => exit_code::AUTH,
            Self::ApiError { status: Some(404), .. } => exit_code::NOT_FOUND,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Timeout { .. } => CliError::Timeout,

            CoreError::NotFound { identifier } => CliError::NotFound { identifier },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Conflict {
                id,
                expected,
                actual,
            } => CliError::Conflict {
                id,
                expected,
                actual,
            },

            CoreError::Cancelled => CliError::Interrupted,

            CoreError::Api { message, status } => CliError::ApiError { message, status },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::ApiError {
                message,
                status: None,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(see: voucherflow config profiles)".into(),
            },
            other => CliError::Config(Box::new(other)),
        }
    }
}
