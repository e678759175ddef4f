//! Clap derive structures for the `dsmon` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. Only
//! depends on clap so `build.rs` can include it for man page generation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// dsmon -- terminal client for the dataStore monitoring backend
#[derive(Debug, Parser)]
#[command(
    name = "dsmon",
    version,
    about = "Watch dataStore metrics from the command line",
    long_about = "A terminal client for the dataStore monitoring backend.\n\n\
        Fetches metrics, keeps a live dashboard refreshed, and manages the\n\
        bearer token used for authenticated requests.",
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
    #[arg(long, short = 'p', env = "DSMON_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 's', env = "DSMON_SERVER", global = true)]
    pub server: Option<String>,

    /// Bearer token for this invocation (not persisted)
    #[arg(long, env = "DSMON_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format [default: config `defaults.output`, else table]
    #[arg(long, short = 'o', env = "DSMON_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: config `defaults.color`, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "DSMON_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (default: none)
    #[arg(long, env = "DSMON_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Keep tokens in memory only; never read or write the token store
    #[arg(long, global = true)]
    pub no_persist: bool,
}

impl GlobalOpts {
    pub fn output(&self) -> OutputFormat {
        self.output.unwrap_or(OutputFormat::Table)
    }

    pub fn color(&self) -> ColorMode {
        self.color.unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the current metrics once
    #[command(alias = "m")]
    Metrics,

    /// Live dashboard: clock plus metrics, refreshed until Ctrl-C
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Store and retrieve JSON documents
    #[command(alias = "d")]
    Data(DataArgs),

    /// Obtain a bearer token with username and password
    Login(LoginArgs),

    /// Manage the persisted bearer token
    Token(TokenArgs),

    /// Check backend health
    Health,

    /// Show backend version information
    #[command(name = "version", alias = "info")]
    ServerVersion,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Clock refresh period (e.g. "1s", "500ms")
    #[arg(long, value_name = "DURATION")]
    pub clock_interval: Option<String>,

    /// Metrics poll period (e.g. "5s", "1m")
    #[arg(long, value_name = "DURATION")]
    pub metrics_interval: Option<String>,

    /// How overlapping metrics responses are resolved
    #[arg(long, value_enum)]
    pub ordering: Option<OrderingArg>,

    /// Exit after this many metrics updates
    #[arg(long, short = 'n', value_name = "N")]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderingArg {
    /// Last response to arrive wins
    CompletionOrder,
    /// Responses older than the newest applied one are dropped
    LatestIssued,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DATA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DataArgs {
    #[command(subcommand)]
    pub command: DataCommand,
}

#[derive(Debug, Subcommand)]
pub enum DataCommand {
    /// List stored document keys
    #[command(alias = "ls")]
    List,

    /// Show one stored document
    Get {
        /// Document key (UUID)
        id: String,
    },

    /// Store a JSON document and print its key
    Post {
        /// Inline JSON document
        #[arg(long, short = 'd', conflicts_with = "file")]
        data: Option<String>,

        /// Read the JSON document from a file ("-" for stdin)
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username for HTTP Basic authentication
    #[arg(long, short = 'u', env = "DSMON_USERNAME")]
    pub username: String,

    /// Password (prompted when omitted)
    #[arg(long, env = "DSMON_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub command: TokenCommand,
}

#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Persist a bearer token for the active profile
    Set {
        /// Token value (prompted when omitted)
        token: Option<String>,
    },

    /// Remove the persisted token
    Unset,

    /// Show whether a token is available
    Status,
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
    /// Create or update a profile in the config file
    Init {
        /// Backend URL for the profile
        #[arg(long)]
        server: String,

        /// Where the profile's token is persisted
        #[arg(long, value_enum)]
        token_backend: Option<BackendArg>,

        /// Replace an existing profile of the same name
        #[arg(long)]
        force: bool,
    },

    /// Display the resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Memory,
    File,
    Keyring,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
