//! Token loading from the per-application config directory.
//!
//! The token lives in `$XDG_CONFIG_HOME/fastmask/config.json` (falling
//! back to `~/.config/fastmask`), a JSON object with a single `token`
//! field:
//!
//! ```json
//! { "token": "fmu1-..." }
//! ```
//!
//! Permissions are verified before any content is read: directory first,
//! then file, then the read itself.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ClientError;
use crate::perms;
use crate::token::SecureToken;

const APP_DIR: &str = "fastmask";
const CONFIG_FILE: &str = "config.json";

#[derive(Deserialize)]
struct ConfigFile {
    token: String,
}

/// Returns the XDG config base directory.
///
/// Uses `XDG_CONFIG_HOME` if set, otherwise `~/.config`.
fn config_base_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
}

/// Loads the API token from the default config location.
///
/// # Errors
///
/// Returns [`ClientError::Config`] if the config directory cannot be
/// determined, the file is missing or malformed, or the token is empty,
/// and [`ClientError::InsecurePermissions`] if the directory or file
/// modes are too permissive.
pub fn load_token() -> Result<SecureToken, ClientError> {
    let base = config_base_dir()
        .ok_or_else(|| ClientError::Config("cannot determine config directory".to_string()))?;
    load_token_from(&base.join(APP_DIR))
}

/// Loads the API token from `dir/config.json`.
///
/// Same checks as [`load_token`]; the directory is caller-supplied so
/// tests can point it at a scratch location.
///
/// # Errors
///
/// See [`load_token`].
pub fn load_token_from(dir: &Path) -> Result<SecureToken, ClientError> {
    perms::check_directory(dir)?;

    let path = dir.join(CONFIG_FILE);
    perms::check_file(&path)?;

    let contents = fs::read_to_string(&path)
        .map_err(|e| ClientError::Config(format!("cannot read {}: {e}", path.display())))?;
    let config: ConfigFile = serde_json::from_str(&contents)
        .map_err(|e| ClientError::Config(format!("malformed config {}: {e}", path.display())))?;

    if config.token.is_empty() {
        return Err(ClientError::Config(format!(
            "token is empty in {}",
            path.display()
        )));
    }

    Ok(SecureToken::new(config.token))
}
