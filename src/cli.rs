//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Weft template builder CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Definition file (default: weft.toml)
    #[arg(short = 'C', long, default_value = "weft.toml")]
    pub definitions: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Resolve the definition graph and print the build chain
    Check,

    /// Build all concrete templates and write their compiled documents
    Build {
        /// Output directory for compiled templates
        #[arg(short, long, default_value = "out")]
        output: PathBuf,
    },
}
