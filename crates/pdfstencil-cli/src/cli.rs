use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Run extraction templates against pre-parsed PDF documents.
#[derive(Debug, Parser)]
#[command(name = "pdfstencil", about, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a template + configuration against a document
    Run {
        /// Template JSON file
        #[arg(long, value_name = "FILE")]
        template: PathBuf,

        /// Configuration JSON file
        #[arg(long, value_name = "FILE")]
        config: PathBuf,

        /// Document JSON file (pre-parsed page structures)
        #[arg(long, value_name = "FILE")]
        document: PathBuf,

        /// Post-process function definitions (JSON list)
        #[arg(long, value_name = "FILE")]
        functions: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Write results to a file instead of stdout
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Validate a post-process function source without executing it
    CheckFunction {
        /// Source file to check
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Result output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}
