//! User settings parsing.
//!
//! Settings live in a KDL file such as:
//!
//! ```kdl
//! api-url "https://api.github.com"
//! token "ghp_example"
//! repo "octo/hello"
//! limit 20
//! plain #false
//! ```

use crate::{ConfigError, ConfigResult};
use ghrun_core::RepoRef;
use kdl::{KdlDocument, KdlNode, KdlValue};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Defaults read from the configuration file. Unset fields fall back to
/// command-line flags or built-in defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    /// Base URL of the REST API.
    pub api_url: Option<String>,
    /// Access token sent as a bearer token.
    pub token: Option<String>,
    /// Repository to list runs for.
    pub repo: Option<RepoRef>,
    /// Default number of runs to request.
    pub limit: Option<u32>,
    /// Always use plain output.
    pub plain: Option<bool>,
}

/// Parse settings from KDL text.
pub fn parse_settings(kdl: &str) -> ConfigResult<Settings> {
    let doc: KdlDocument = kdl.parse()?;
    let mut settings = Settings::default();

    for node in doc.nodes() {
        match node.name().value() {
            "api-url" => settings.api_url = Some(require_string(node)?),
            "token" => settings.token = Some(require_string(node)?),
            "repo" => {
                let full_name = require_string(node)?;
                let repo =
                    RepoRef::from_full_name(&full_name).map_err(|e| ConfigError::InvalidValue {
                        field: "repo".to_string(),
                        message: e.to_string(),
                    })?;
                settings.repo = Some(repo);
            }
            "limit" => settings.limit = Some(parse_limit(node)?),
            "plain" => {
                let plain = first_arg(node).and_then(|v| v.as_bool()).ok_or_else(|| {
                    ConfigError::InvalidValue {
                        field: "plain".to_string(),
                        message: "expected #true or #false".to_string(),
                    }
                })?;
                settings.plain = Some(plain);
            }
            other => debug!(node = other, "ignoring unknown config node"),
        }
    }

    Ok(settings)
}

/// Load settings from `explicit`, or from the default location if no path is
/// given. A missing file at the default location yields empty settings.
pub fn load_settings(explicit: Option<&Path>) -> ConfigResult<Settings> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(Settings::default()),
        },
    };

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file found");
            return Ok(Settings::default());
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    debug!(path = %path.display(), "loading config file");
    parse_settings(&content)
}

/// `$XDG_CONFIG_HOME/ghrun/config.kdl`, falling back to
/// `$HOME/.config/ghrun/config.kdl`.
pub fn default_config_path() -> Option<PathBuf> {
    config_path_from(
        std::env::var_os("XDG_CONFIG_HOME"),
        std::env::var_os("HOME"),
    )
}

fn config_path_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    let base = match xdg_config_home.filter(|v| !v.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(home.filter(|v| !v.is_empty())?).join(".config"),
    };
    Some(base.join("ghrun").join("config.kdl"))
}

fn first_arg(node: &KdlNode) -> Option<&KdlValue> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .map(|e| e.value())
}

fn require_string(node: &KdlNode) -> ConfigResult<String> {
    first_arg(node)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
        .ok_or_else(|| ConfigError::InvalidValue {
            field: node.name().value().to_string(),
            message: "expected a string argument".to_string(),
        })
}

fn parse_limit(node: &KdlNode) -> ConfigResult<u32> {
    let invalid = |message: &str| ConfigError::InvalidValue {
        field: "limit".to_string(),
        message: message.to_string(),
    };

    let value = first_arg(node)
        .and_then(|v| v.as_integer())
        .ok_or_else(|| invalid("expected an integer argument"))?;

    if value < 1 {
        return Err(invalid("must be greater than 0"));
    }
    u32::try_from(value).map_err(|_| invalid("too large"))
}
