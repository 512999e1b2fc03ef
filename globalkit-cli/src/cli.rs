//! CLI definition for the globalkit command-line interface.
//!
//! Only depends on `clap` and `std`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for declarations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Yaml => write!(f, "yaml"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// globalkit - inspect global content schemas and validate documents against them
#[derive(Parser, Debug)]
#[command(name = "globalkit")]
#[command(version)]
#[command(about = "Inspect global content schemas and validate documents against them")]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Registry root (overrides `globals_dir` from configuration)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Directory searched for globalkit.{toml,yaml,yml,json}
    #[arg(long, global = true, default_value = ".")]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered globals
    List,
    /// Print a global's declaration
    Show {
        /// Slug of the global
        slug: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
    /// Print the data path and kind of every field in a global
    Paths {
        /// Slug of the global
        slug: String,
    },
    /// Check declarations for structural problems
    Check {
        /// Only check this global
        slug: Option<String>,
    },
    /// Validate a JSON or YAML document against a global
    Validate {
        /// Slug of the global
        slug: String,
        /// Document file (.yaml/.yml parsed as YAML, anything else as JSON)
        file: PathBuf,
    },
}
