//! Clap derive structures for the `switchboard` CLI.
//!
//! Defines the command tree, global flags, and shared value types. Kept free
//! of workspace crates so `build.rs` can include it for man page generation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// switchboard -- control a relay board over its HTTP interface
#[derive(Debug, Parser)]
#[command(
    name = "switchboard",
    version,
    about = "Control a switchboard relay board from the command line",
    long_about = "Probe, read, and switch the lights and pump of a relay board.\n\n\
        The board answers plain HTTP GETs: `/` for liveness, `/status` for the\n\
        state line, and `/<actuator>/on|off` for commands.",
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
    /// Device profile to use
    #[arg(long, short = 'p', env = "SWITCHBOARD_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Device host or IP, optionally with :port (overrides profile)
    #[arg(long, short = 'H', env = "SWITCHBOARD_HOST", global = true)]
    pub host: Option<String>,

    /// Device HTTP port (overrides profile)
    #[arg(long, env = "SWITCHBOARD_PORT", global = true)]
    pub port: Option<u16>,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "SWITCHBOARD_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Config file to use instead of the platform default
    #[arg(long, env = "SWITCHBOARD_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "SWITCHBOARD_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Proceed without asking when the device looks unreachable
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
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

/// Actuators as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActuatorArg {
    /// Light in room 1
    #[value(name = "lightroom1", alias = "light1")]
    LightRoom1,
    /// Light in room 2
    #[value(name = "lightroom2", alias = "light2")]
    LightRoom2,
    /// Water pump
    Pump,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check whether the device is reachable
    #[command(alias = "ping")]
    Probe,

    /// Read the device status line and show actuator states
    #[command(alias = "st")]
    Status,

    /// Flip an actuator
    #[command(alias = "t")]
    Toggle {
        /// Actuator to flip
        actuator: ActuatorArg,
    },

    /// Switch an actuator on
    On {
        /// Actuator to switch
        actuator: ActuatorArg,
    },

    /// Switch an actuator off
    Off {
        /// Actuator to switch
        actuator: ActuatorArg,
    },

    /// Follow connection and actuator changes until interrupted
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Status poll interval in seconds (overrides profile; 0 disables)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long, value_name = "SECONDS")]
    pub duration: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file, prompting for the device address
    Init {
        /// Device host or IP (prompted for when omitted)
        #[arg(long)]
        host: Option<String>,

        /// Device HTTP port
        #[arg(long)]
        port: Option<u16>,

        /// Overwrite an existing config file without asking
        #[arg(long)]
        force: bool,
    },

    /// Display the current configuration
    Show,

    /// Set the device address of the active profile
    SetHost {
        /// Device host or IP, optionally with :port
        host: String,

        /// Device HTTP port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the config file location
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
