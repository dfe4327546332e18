//! Clap derive structures for the `unidash` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// unidash -- operations dashboard for a UniFi controller
#[derive(Debug, Parser)]
#[command(
    name = "unidash",
    version,
    about = "UniFi operations dashboard: board revisions, MAC search and VLAN provisioning",
    long_about = "Serves a small dashboard in front of a UniFi network controller.\n\n\
        Looks up device board revisions per site, searches every site for a MAC\n\
        address with live progress, and provisions VLANs (network + SSID) along\n\
        with a matching RouterOS script.",
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
    /// Config file (default: ./unidash.toml, then the platform config dir)
    #[arg(long, short = 'c', env = "UNIDASH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the dashboard HTTP server
    Serve(ServeArgs),

    /// Copy every site's device roster into the local snapshot
    Sync(SyncArgs),

    /// List the controller's sites
    Sites(SitesArgs),

    /// Test addresses against the configured allowlist
    CheckAccess(CheckAccessArgs),

    /// Print the effective configuration
    Config,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen port (overrides server.port)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Listen address (overrides server.bind)
    #[arg(long)]
    pub bind: Option<String>,

    /// Directory with the dashboard page (overrides server.static_dir)
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Snapshot database (overrides snapshot.path)
    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SitesArgs {
    /// Output format
    #[arg(long, short = 'o', default_value = "table")]
    pub output: OutputFormat,

    /// Read sites from the local snapshot instead of the controller
    #[arg(long)]
    pub snapshot: bool,
}

#[derive(Debug, Args)]
pub struct CheckAccessArgs {
    /// Source addresses to test
    #[arg(required = true)]
    pub addresses: Vec<String>,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
