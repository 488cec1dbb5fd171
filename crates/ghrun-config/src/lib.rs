//! KDL configuration parsing for ghrun.
//!
//! This crate handles:
//! - Locating the user configuration file
//! - Parsing defaults for the API endpoint, token, repository and output

pub mod error;
pub mod settings;

pub use error::{ConfigError, ConfigResult};
pub use settings::{Settings, default_config_path, load_settings, parse_settings};
