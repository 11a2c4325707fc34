//! CLI argument definitions for motcode.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Accepted spellings for menu flags.
pub const MENU_VALUES: [&str; 5] = ["library", "learning", "opinion", "news", "qna"];

/// Motcode - taxonomy administration for the MOT Club platform.
///
/// Start with `mot tree` to see the current classification tree.
#[derive(Parser, Debug)]
#[command(name = "mot")]
#[command(author, version, about = "A CLI tool for administering MOT Club common-code taxonomies", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Backend server base URL (e.g. https://club.example.org).
    /// Can also be set via the MOT_SERVER environment variable or
    /// `mot config set server-url <url>`.
    #[arg(short = 's', long = "server", global = true)]
    pub server: Option<String>,

    /// Override the configuration directory.
    /// Can also be set via the MOT_CONFIG_DIR environment variable.
    #[arg(long = "config-dir", global = true, env = "MOT_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch and display the classification tree
    Tree {
        /// Only show subtrees belonging to this menu
        #[arg(long, value_parser = MENU_VALUES)]
        menu: Option<String>,

        /// Show level-1 codes only instead of the fully expanded tree
        #[arg(long)]
        collapsed: bool,
    },

    /// Show one code with its detected level and ancestry
    Show {
        /// Code id
        id: i64,
    },

    /// Create a code (level inferred from the parent context)
    Add {
        /// Human-readable label; the machine token is derived from it
        name: String,

        /// Menu for a new level-1 code (deeper codes inherit it)
        #[arg(short, long, value_parser = MENU_VALUES)]
        menu: Option<String>,

        /// Parent code id; omit to create a level-1 code
        #[arg(short, long)]
        parent: Option<i64>,

        /// Free-text annotation
        #[arg(short, long)]
        description: Option<String>,

        /// Display order (level-3 codes only; default: after the last
        /// sibling)
        #[arg(long)]
        sort_order: Option<i64>,
    },

    /// Update a code (untouched fields keep their current values)
    Edit {
        /// Code id
        id: i64,

        /// New label; the machine token is re-derived from it
        #[arg(long)]
        name: Option<String>,

        /// New menu (level-1 codes only; deeper codes inherit)
        #[arg(long, value_parser = MENU_VALUES)]
        menu: Option<String>,

        /// New free-text annotation (empty clears it)
        #[arg(long)]
        description: Option<String>,

        /// New display order (level-3 codes only)
        #[arg(long)]
        sort_order: Option<i64>,
    },

    /// Delete a code (descendant handling is the backend's concern)
    Delete {
        /// Code id
        id: i64,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show version and build information
    Version,

    /// Start the interactive tree editor (requires 'tui' feature)
    #[cfg(feature = "tui")]
    Tui,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved settings and where each value came from
    Show,

    /// Set a config value (server-url, output-format, default-menu)
    Set {
        /// Config key
        key: String,

        /// New value
        value: String,
    },

    /// Print the config file location
    Path,
}
