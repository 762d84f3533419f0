//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::LayerName;

/// Build and publish AWS Lambda layers from a Python requirements manifest
#[derive(Parser, Debug)]
#[command(name = "pylayer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Working directory holding manifest and build output (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub work_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check, build and publish a layer
    Publish {
        /// Layer name (prompted if omitted)
        #[arg(short, long, value_parser = parse_layer_name)]
        name: Option<LayerName>,

        /// Requirements manifest, relative to the current directory (default from config)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        manifest: Option<PathBuf>,

        /// Skip the final confirmation
        #[arg(short, long)]
        yes: bool,

        /// Keep the archive after publishing
        #[arg(long)]
        keep: bool,
    },

    /// Build the layer archive without publishing
    Build {
        /// Layer name (prompted if omitted)
        #[arg(short, long, value_parser = parse_layer_name)]
        name: Option<LayerName>,

        /// Requirements manifest, relative to the current directory (default from config)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        manifest: Option<PathBuf>,
    },

    /// Verify tools, manifest and cloud credentials
    Check {
        /// Requirements manifest, relative to the current directory (default from config)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        manifest: Option<PathBuf>,
    },

    /// Remove build environment, staging directory and archive
    Clean {
        /// Layer name (prompted if omitted)
        #[arg(short, long, value_parser = parse_layer_name)]
        name: Option<LayerName>,
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

fn parse_layer_name(raw: &str) -> Result<LayerName, String> {
    LayerName::parse(raw).map_err(|e| e.to_string())
}
