//! Path resolution for ddictl
//!
//! # Environment Variables
//!
//! - `DDICTL_CONFIG_DIR` - Override config directory (e.g., `~/dotfiles/ddictl`)
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `DDICTL_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/ddictl` (if set)
//! 3. Platform default:
//!    - Windows: `%APPDATA%\ddictl`
//!    - macOS/Linux: `~/.config/ddictl`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "DDICTL_CONFIG_DIR";

/// Name of the settings file inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Get the ddictl config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("ddictl");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            let path = app_data.join("ddictl");
            log::debug!("Using Windows config dir: {}", path.display());
            return Ok(path);
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join("ddictl");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Get the settings file path
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Expand ~ and environment variables in a path string.
///
/// Unknown variables are left as they are.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}
