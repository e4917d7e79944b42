//! Parsing and validation of `logictree.toml` settings files.
//!
//! Every section and field is optional; a missing file and an empty file
//! both produce [`LogictreeConfig::default`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{find_config, load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
