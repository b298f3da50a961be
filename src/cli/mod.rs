//! CLI module for Multiscout
//!
//! Provides command-line interface parsing for the multiscout-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Multiscout - multi-agent web research server
#[derive(Parser, Debug)]
#[command(
    name = "multiscout-server",
    version,
    about = "Multiscout - multi-agent web research server",
    long_about = "Splits research questions into focused sub-queries, searches each with its own\n\
                  subagent, and synthesizes the sources into one report.\n\n\
                  Run without arguments to start the server.",
    after_help = "EXAMPLES:\n    \
                  multiscout-server                                # Start the server\n    \
                  multiscout-server --config my.toml               # Use a custom config file\n    \
                  multiscout-server research \"edge AI chips\"       # One-shot research run\n    \
                  multiscout-server config --validate              # Check configuration"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "multiscout.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Run one research query and print the activity and report
    Research {
        /// Research question
        query: String,

        /// Number of subagents (2-6); planned from the query when omitted
        #[arg(short, long)]
        fanout: Option<usize>,

        /// Search results per subagent (1-5)
        #[arg(short, long)]
        results: Option<usize>,

        /// Model id from the configured list
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Show configuration information
    Config {
        /// Also require the provider API keys to be set
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
