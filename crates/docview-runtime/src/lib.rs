//! Runtime layer for docview: configuration, the SSH session host and the
//! ANSI frame encoder it writes to clients.

pub mod config;
pub mod error;
pub mod frame;
pub mod host_key;
pub mod input;
pub mod read;
pub mod server;

pub use config::{AppConfig, expand_tilde, resolve_config_path};
pub use error::{Error, Result};
pub use frame::Frame;
pub use host_key::load_or_create_host_key;
pub use input::InputDecoder;
pub use read::{read_bounded, read_bounded_blocking};
pub use server::{DocServer, HostSettings, shutdown_signal};
