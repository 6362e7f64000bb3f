//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the Zelo root folder
pub const ROOT_ENV_VAR: &str = "ZELO_ROOT";

/// Environment variable overriding the periodic sweep interval (seconds)
pub const SWEEP_INTERVAL_ENV_VAR: &str = "ZELO_SWEEP_INTERVAL_SECS";

/// Default interval between scheduled company sweeps (6 hours)
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `ZELO_ROOT` environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_ENV_VAR) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Ensure the root folder exists, creating it when missing
pub fn ensure_root_folder(root: &PathBuf) -> Result<()> {
    std::fs::create_dir_all(root)?;
    Ok(())
}

/// Path of the shared SQLite database inside the root folder
pub fn database_path(root: &std::path::Path) -> PathBuf {
    root.join("zelo.db")
}

/// Interval between scheduled company sweeps
///
/// `ZELO_SWEEP_INTERVAL_SECS` overrides the 6-hour default.
pub fn sweep_interval() -> Duration {
    std::env::var(SWEEP_INTERVAL_ENV_VAR)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_SWEEP_INTERVAL)
}

/// Locate the platform configuration file
fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/zelo/config.toml first, then /etc/zelo/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("zelo").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/zelo/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("zelo").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("zelo"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\zelo"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("zelo"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/zelo"))
    } else if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("zelo"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/zelo"))
    } else {
        PathBuf::from("./zelo_data")
    }
}
