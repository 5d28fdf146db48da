//! Platform-specific paths

use std::path::PathBuf;

/// Get the platform-specific config directory
///
/// Returns:
/// - Windows: %APPDATA%\Lockbox
/// - macOS: ~/Library/Application Support/Lockbox
/// - Linux/Other: ~/.config/Lockbox
pub fn get_config_dir() -> PathBuf {
    let base = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join("Lockbox")
}

/// Get the default config file path
pub fn get_default_config_path() -> PathBuf {
    get_config_dir().join("lockbox.toml")
}
