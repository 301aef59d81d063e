//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::SchemeKind;

/// Structural labels for ordered trees: path-vector, prime-product and region
#[derive(Parser, Debug)]
#[command(name = "xlabel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output on stderr (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding a local .xlabel.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Label a document and write it with labels
    Label {
        /// Element document (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Label scheme (default from config)
        #[arg(short, long)]
        scheme: Option<SchemeKind>,
        /// Output file (default: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Show the labeled document as a tree
    Tree {
        /// Element document (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Label scheme (default from config)
        #[arg(short, long)]
        scheme: Option<SchemeKind>,
    },

    /// List nodes matching a tag path (`a/*/c`)
    Query {
        /// Element document (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Slash-separated tag path, `*` matches any tag
        pattern: String,
        /// Label scheme (default from config)
        #[arg(short, long)]
        scheme: Option<SchemeKind>,
    },

    /// Append a subtree under the first node matching a tag path
    Insert {
        /// Element document (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Tag path of the parent node
        #[arg(long)]
        at: String,
        /// Element document holding the subtree to insert
        #[arg(long, value_hint = ValueHint::FilePath)]
        subtree: PathBuf,
        /// Label scheme (default from config)
        #[arg(short, long)]
        scheme: Option<SchemeKind>,
        /// Output file (default: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Relate the first matches of two tag paths using their labels only
    Relate {
        /// Element document (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Tag path of the first node
        first: String,
        /// Tag path of the second node
        second: String,
        /// Label scheme (default from config)
        #[arg(short, long)]
        scheme: Option<SchemeKind>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
