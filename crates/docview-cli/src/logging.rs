//! tracing-subscriber setup.
//!
//! `RUST_LOG`, when set, wins over `--log-level`.

use crate::types::LogLevel;
use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Where logs go when no `--log-file` is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Console {
    Stderr,
    /// The command owns the terminal; log only to a file.
    Off,
}

pub fn init(level: LogLevel, log_file: Option<&Path>, console: Console) -> Result<()> {
    let (writer, ansi) = match (log_file, console) {
        (Some(path), _) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        (None, Console::Stderr) => (
            BoxMakeWriter::new(std::io::stderr),
            std::io::stderr().is_terminal(),
        ),
        (None, Console::Off) => return Ok(()),
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(ansi)
                .with_target(false)
                .with_writer(writer),
        )
        .with(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!(error))?;

    Ok(())
}
