use super::args::{Cli, Commands};
use super::handlers;
use crate::logging::{self, Console};
use anyhow::Result;
use docview_runtime::AppConfig;
use std::path::PathBuf;

pub fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    let log_file = cli.log_file.as_deref();

    match cli.command {
        Commands::Serve { root, host, port } => {
            apply_root(&mut config, root);
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;
            logging::init(cli.log_level, log_file, Console::Stderr)?;
            handlers::serve::handle(&config)
        }

        Commands::Browse { root } => {
            apply_root(&mut config, root);
            config.validate()?;
            logging::init(cli.log_level, log_file, Console::Off)?;
            handlers::browse::handle(&config)
        }

        Commands::Tree { root, format } => {
            apply_root(&mut config, root);
            config.validate()?;
            logging::init(cli.log_level, log_file, Console::Stderr)?;
            handlers::tree::handle(&config, format)
        }
    }
}

fn apply_root(config: &mut AppConfig, root: Option<PathBuf>) {
    if let Some(root) = root {
        config.root = Some(root);
    }
}
