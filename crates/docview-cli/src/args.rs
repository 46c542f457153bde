use crate::types::{LogLevel, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docview")]
#[command(about = "Browse a directory of markdown documents in the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: $DOCVIEW_CONFIG, then <config dir>/docview/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[arg(long, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the document browser to remote terminals over SSH
    Serve {
        #[arg(long)]
        root: Option<PathBuf>,

        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },

    /// Browse documents in this terminal
    Browse {
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Print the document tree
    Tree {
        #[arg(long)]
        root: Option<PathBuf>,

        #[arg(long, default_value = "plain")]
        format: OutputFormat,
    },
}
