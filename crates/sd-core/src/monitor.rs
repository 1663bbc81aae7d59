//! Monitor model shared by the DDC/CI layer, the tray and the CLI.

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

/// VCP code for Power Mode (MCCS).
pub const VCP_POWER_MODE: u8 = 0xD6;

/// VCP code for Luminance (brightness).
pub const VCP_BRIGHTNESS: u8 = 0x10;

/// One physical monitor as seen by a single enumeration pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorInfo {
    /// Global DDC index: position of the physical monitor in enumeration
    /// order. Only valid until the next enumeration.
    pub index: usize,
    pub description: String,
    pub min_brightness: u32,
    pub current_brightness: u32,
    pub max_brightness: u32,
    /// Driven by the primary logical display.
    pub primary: bool,
}

impl MonitorInfo {
    /// Current brightness as a percentage of the monitor's own range.
    pub fn brightness_percent(&self) -> f64 {
        if self.max_brightness <= self.min_brightness {
            return 0.0;
        }
        let span = f64::from(self.max_brightness - self.min_brightness);
        let above_min = f64::from(self.current_brightness) - f64::from(self.min_brightness);
        100.0 * above_min / span
    }

    /// Initial position of a 0–100 brightness slider.
    pub fn slider_position(&self) -> u32 {
        self.brightness_percent().round().clamp(0.0, 100.0) as u32
    }

    /// Map a 0–100 slider value onto `min_brightness..=max_brightness`.
    pub fn raw_brightness_for_percent(&self, percent: u32) -> u32 {
        let percent = percent.min(100);
        if self.max_brightness <= self.min_brightness {
            return self.min_brightness;
        }
        let span = u64::from(self.max_brightness - self.min_brightness);
        let offset = (span * u64::from(percent) + 50) / 100;
        self.min_brightness + offset as u32
    }
}

impl fmt::Display for MonitorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} | min={} cur={} max={} (≈ {:.1} %)",
            self.index,
            self.description,
            if self.primary { "(PRIMARY)" } else { "" },
            self.min_brightness,
            self.current_brightness,
            self.max_brightness,
            self.brightness_percent()
        )
    }
}

/// Stable sort putting primary monitors first. Enumeration order among the
/// rest is preserved and `index` is never touched.
pub fn sort_primary_first(monitors: &mut [MonitorInfo]) {
    monitors.sort_by_key(|m| Reverse(m.primary));
}

/// Title of a monitor entry in the tray menu: `"2: DELL U2720Q"`.
pub fn menu_title(position: usize, info: &MonitorInfo) -> String {
    if info.primary {
        format!("{}: {} (PRIMARY)", position + 1, info.description)
    } else {
        format!("{}: {}", position + 1, info.description)
    }
}

/// DDC/CI power mode values (VCP 0xD6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerMode {
    On,
    Standby,
    Suspend,
    Off,
    HardOff,
}

impl PowerMode {
    pub fn vcp_value(self) -> u32 {
        match self {
            PowerMode::On => 1,
            PowerMode::Standby => 2,
            PowerMode::Suspend => 3,
            PowerMode::Off => 4,
            PowerMode::HardOff => 5,
        }
    }

    pub fn from_vcp(value: u32) -> Option<Self> {
        match value {
            1 => Some(PowerMode::On),
            2 => Some(PowerMode::Standby),
            3 => Some(PowerMode::Suspend),
            4 => Some(PowerMode::Off),
            5 => Some(PowerMode::HardOff),
            _ => None,
        }
    }
}

impl fmt::Display for PowerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PowerMode::On => "on",
            PowerMode::Standby => "standby",
            PowerMode::Suspend => "suspend",
            PowerMode::Off => "off",
            PowerMode::HardOff => "hard-off",
        };
        f.write_str(name)
    }
}

impl FromStr for PowerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<u32>() {
            return PowerMode::from_vcp(n)
                .ok_or_else(|| format!("power mode {} is not a valid VCP 0xD6 value (1–5)", n));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "on" | "wake" => Ok(PowerMode::On),
            "standby" => Ok(PowerMode::Standby),
            "suspend" => Ok(PowerMode::Suspend),
            "off" => Ok(PowerMode::Off),
            "hard-off" | "hardoff" => Ok(PowerMode::HardOff),
            other => Err(format!("unknown power mode '{}'", other)),
        }
    }
}

#[cfg(test)]
#[path = "tests/monitor_tests.rs"]
mod tests;
