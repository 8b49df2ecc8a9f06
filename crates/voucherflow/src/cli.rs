//! Clap derive structures for the `voucherflow` CLI.
//!
//! Defines the command tree, global flags, and shared argument groups.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// voucherflow -- review and validate voucher notifications
#[derive(Debug, Parser)]
#[command(
    name = "voucherflow",
    version,
    about = "Review and validate voucher payment notifications",
    long_about = "Browse, filter, and validate the voucher notifications reported by\n\
        payment devices, against the VoucherFlow notifications API.\n\n\
        Filters combine into a single backend query: a code or amount/date\n\
        range uses the search endpoint, otherwise status or device\n\
        listings are used.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "VOUCHERFLOW_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Notifications API base URL, including the stage (overrides profile)
    #[arg(long, short = 'u', env = "VOUCHERFLOW_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token for the API
    #[arg(long, env = "VOUCHERFLOW_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "VOUCHERFLOW_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "VOUCHERFLOW_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "VOUCHERFLOW_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Status values ────────────────────────────────────────────────────

/// Status tab used as a listing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusFilter {
    All,
    Pending,
    Validated,
    Rejected,
}

impl StatusFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Validated => "validated",
            Self::Rejected => "rejected",
        }
    }
}

/// A status a notification can be moved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusValue {
    Pending,
    Validated,
    Rejected,
}

impl StatusValue {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Validated => "validated",
            Self::Rejected => "rejected",
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List notifications, one page at a time
    #[command(alias = "ls")]
    List(ListArgs),

    /// Page through notifications interactively
    Browse(BrowseArgs),

    /// Show a single notification
    Get {
        /// Notification id
        id: String,
    },

    /// Move a notification to a new status
    SetStatus(SetStatusArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared filter arguments ──────────────────────────────────────────

/// Dashboard filters. Malformed amounts or dates are ignored with a warning.
#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// Start from a dashboard view query (e.g. "status=pending&page=2&lastKey=...")
    #[arg(long, value_name = "QUERY")]
    pub view: Option<String>,

    /// Status tab
    #[arg(long, short = 's')]
    pub status: Option<StatusFilter>,

    /// Voucher code (switches to search)
    #[arg(long)]
    pub code: Option<String>,

    /// Reporting device id
    #[arg(long, short = 'd')]
    pub device: Option<String>,

    /// Minimum amount (switches to search)
    #[arg(long, value_name = "AMOUNT")]
    pub amount_min: Option<String>,

    /// Maximum amount (switches to search)
    #[arg(long, value_name = "AMOUNT")]
    pub amount_max: Option<String>,

    /// First day, YYYY-MM-DD in local time (switches to search)
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,

    /// Last day, YYYY-MM-DD in local time (switches to search)
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,

    /// Client-side quick search over code, name, device and amount
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Page number (1-based)
    #[arg(long)]
    pub page: Option<u32>,

    /// Records per page (defaults to the profile's page size)
    #[arg(long, short = 'l')]
    pub page_size: Option<u32>,

    /// Continuation cursor returned by the previous page
    #[arg(long)]
    pub last_key: Option<String>,

    /// Follow cursors and fetch every page
    #[arg(long, short = 'a', conflicts_with_all = ["page", "last_key"])]
    pub all: bool,

    /// Page cap for --all
    #[arg(long, default_value = "50", requires = "all")]
    pub max_pages: u32,
}

#[derive(Debug, Args)]
pub struct BrowseArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Records per page (defaults to the profile's page size)
    #[arg(long, short = 'l')]
    pub page_size: Option<u32>,
}

#[derive(Debug, Args)]
pub struct SetStatusArgs {
    /// Notification id
    pub id: String,

    /// New status
    pub status: StatusValue,

    /// Only update if the notification is currently in this status
    #[arg(long, value_name = "STATUS")]
    pub expect: Option<StatusValue>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (tokens masked)
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (api_url, token_env, page_size, timeout, insecure, ca_cert, retries)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a bearer token in the system keyring
    SetToken {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
