//! Configuration management: TOML file with sensible defaults.
//!
//! Config file location: `%APPDATA%\ShadowDesk\config.toml`
//! Falls back to compiled-in defaults if the file is missing or malformed.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::{Path, PathBuf};

use crate::monitor::PowerMode;

/// Path to the per-user config directory.
pub fn config_dir() -> PathBuf {
    let app_data = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(app_data).join("ShadowDesk")
}

/// Full path to the config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Full path to the log file written in tray mode.
pub fn log_path() -> PathBuf {
    config_dir().join("shadowdesk.log")
}

/// Upper bound for `hotkey_count` (one slot per digit key 1–9).
pub const MAX_HOTKEYS: u32 = 9;

/// Application configuration with defaults for every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Register the numbered standby/wake hotkeys at startup.
    pub hotkeys_enabled: bool,

    /// Modifier combination for the numbered hotkeys, e.g. `"Alt"` or `"Ctrl+Alt"`.
    pub hotkey_modifiers: String,

    /// Number of numbered hotkeys to register (1–9).
    pub hotkey_count: u32,

    /// VCP 0xD6 value written to put a monitor into standby.
    pub standby_mode: u32,

    /// VCP 0xD6 value written to wake a monitor.
    pub wake_mode: u32,

    /// Wake every monitor still in standby when the tray app exits.
    pub wake_on_exit: bool,

    /// Tooltip shown on the tray icon.
    pub tray_tooltip: String,

    /// Debug-level logging.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hotkeys_enabled: true,
            hotkey_modifiers: "Alt".to_string(),
            hotkey_count: 5,
            standby_mode: PowerMode::Off.vcp_value(),
            wake_mode: PowerMode::On.vcp_value(),
            wake_on_exit: true,
            tray_tooltip: "ShadowDesk".to_string(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load config from the TOML file, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(cfg) => {
                    info!("Config loaded from {}", path.display());
                    cfg
                }
                Err(e) => {
                    warn!(
                        "Config parse error in {}: {} — using defaults",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(_) => {
                info!("No config file at {} — using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write the default config to disk (creates directory if needed).
    pub fn write_default() -> Result<(), Box<dyn Error>> {
        Self::default().write_to(&config_path())
    }

    /// Write this config to `path` with the commented template.
    pub fn write_to(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }
        std::fs::write(path, Self::to_toml_commented(self))?;
        info!("Config written to {}", path.display());
        Ok(())
    }

    /// Number of hotkey slots actually used, clamped to `1..=MAX_HOTKEYS`.
    pub fn effective_hotkey_count(&self) -> u32 {
        self.hotkey_count.clamp(1, MAX_HOTKEYS)
    }

    /// Serialize config to a TOML string with helpful comments.
    pub(crate) fn to_toml_commented(cfg: &Config) -> String {
        format!(
            r##"# ShadowDesk — Configuration
# Location: %APPDATA%\ShadowDesk\config.toml
# Changes take effect the next time ShadowDesk starts.

# ─── Hotkeys ─────────────────────────────────────────────────────────
# <modifiers>+1 … <modifiers>+N toggle standby/wake of the N-th monitor
# (primary monitor first).
hotkeys_enabled = {hotkeys_enabled}
# Any of Ctrl, Alt, Shift, Win joined with "+".
hotkey_modifiers = "{hotkey_modifiers}"
# 1–9
hotkey_count = {hotkey_count}

# ─── Power Modes (VCP 0xD6) ──────────────────────────────────────────
# 1=On, 2=Standby, 3=Suspend, 4=Off, 5=Hard off.
# Many monitors only react to 4 (and ignore 2/3).
standby_mode = {standby_mode}
wake_mode = {wake_mode}
# Wake monitors that are still in standby when ShadowDesk exits.
wake_on_exit = {wake_on_exit}

# ─── Tray ────────────────────────────────────────────────────────────
tray_tooltip = "{tray_tooltip}"

# ─── Debug ───────────────────────────────────────────────────────────
verbose = {verbose}
"##,
            hotkeys_enabled = cfg.hotkeys_enabled,
            hotkey_modifiers = escape_toml_string(&cfg.hotkey_modifiers),
            hotkey_count = cfg.hotkey_count,
            standby_mode = cfg.standby_mode,
            wake_mode = cfg.wake_mode,
            wake_on_exit = cfg.wake_on_exit,
            tray_tooltip = escape_toml_string(&cfg.tray_tooltip),
            verbose = cfg.verbose,
        )
    }
}

/// Escape a string for safe inclusion inside a TOML basic string (`"..."`).
fn escape_toml_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
