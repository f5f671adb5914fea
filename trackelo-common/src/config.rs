//! Configuration loading and root folder resolution

use std::path::{Path, PathBuf};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "TRACKELO_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "trackelo.db";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `TRACKELO_ROOT_FOLDER` environment variable
/// 3. `root_folder` key in the platform config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(config_path) = find_config_file() {
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

/// Database file path inside a resolved root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Locate the platform config file, if one exists
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("trackelo").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/trackelo/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/trackelo (or /var/lib/trackelo for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("trackelo"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/trackelo"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/trackelo
        dirs::data_dir()
            .map(|d| d.join("trackelo"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/trackelo"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\trackelo
        dirs::data_local_dir()
            .map(|d| d.join("trackelo"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\trackelo"))
    } else {
        PathBuf::from("./trackelo_data")
    }
}
