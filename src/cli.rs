use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "heicdrop")]
#[command(author, version, about = "Convert HEIC photos to JPEG")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert the given HEIC files and wait for them to finish
    Convert {
        /// Files to convert (non-HEIC files are skipped)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory to save JPEG files into (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the final queue as JSON
        #[arg(long)]
        json: bool,
    },

    /// Watch a drop folder and convert HEIC files dropped into it
    Watch {
        /// Folder to watch
        #[arg(required = true)]
        dir: PathBuf,

        /// Directory to save JPEG files into (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that the HEIC decoder is available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
