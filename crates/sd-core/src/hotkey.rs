//! Numbered standby/wake hotkeys (`Alt+1`, `Alt+2`, …).
//!
//! Bits and key codes use the Win32 values so `sd-tray` can hand them to
//! `RegisterHotKey` unchanged.

use std::fmt;
use std::str::FromStr;

use crate::config::Config;

/// First hotkey id; slot `n` uses `HOTKEY_ID_BASE + n`.
pub const HOTKEY_ID_BASE: i32 = 0x5D00;

/// Virtual-key code of the `1` key on the main keyboard row.
pub const VK_DIGIT_1: u32 = 0x31;

/// Modifier combination in `MOD_*` bit layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HotkeyModifiers(u32);

impl HotkeyModifiers {
    pub const ALT: HotkeyModifiers = HotkeyModifiers(0x0001);
    pub const CONTROL: HotkeyModifiers = HotkeyModifiers(0x0002);
    pub const SHIFT: HotkeyModifiers = HotkeyModifiers(0x0004);
    pub const WIN: HotkeyModifiers = HotkeyModifiers(0x0008);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: HotkeyModifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for HotkeyModifiers {
    type Output = HotkeyModifiers;

    fn bitor(self, rhs: HotkeyModifiers) -> HotkeyModifiers {
        HotkeyModifiers(self.0 | rhs.0)
    }
}

impl FromStr for HotkeyModifiers {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut mods = HotkeyModifiers::default();
        for part in s.split('+').map(str::trim).filter(|p| !p.is_empty()) {
            mods = mods
                | match part.to_ascii_lowercase().as_str() {
                    "alt" => HotkeyModifiers::ALT,
                    "ctrl" | "control" => HotkeyModifiers::CONTROL,
                    "shift" => HotkeyModifiers::SHIFT,
                    "win" | "super" => HotkeyModifiers::WIN,
                    _ => return Err(format!("unknown hotkey modifier '{}'", part)),
                };
        }
        if mods.is_empty() {
            return Err("hotkey modifiers must name at least one of Ctrl, Alt, Shift, Win".into());
        }
        Ok(mods)
    }
}

impl fmt::Display for HotkeyModifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (HotkeyModifiers::CONTROL, "Ctrl"),
            (HotkeyModifiers::ALT, "Alt"),
            (HotkeyModifiers::SHIFT, "Shift"),
            (HotkeyModifiers::WIN, "Win"),
        ];
        let parts: Vec<&str> = names
            .iter()
            .filter(|(m, _)| self.contains(*m))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&parts.join("+"))
    }
}

/// One registered hotkey slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBinding {
    pub id: i32,
    /// 0-based offset into the primary-first monitor list.
    pub position: usize,
    pub modifiers: HotkeyModifiers,
    pub key: u32,
}

impl HotkeyBinding {
    pub fn new(position: usize, modifiers: HotkeyModifiers) -> Self {
        Self {
            id: HOTKEY_ID_BASE + position as i32,
            position,
            modifiers,
            key: VK_DIGIT_1 + position as u32,
        }
    }

    /// Human-readable label, e.g. `"Alt+3"`.
    pub fn label(&self) -> String {
        format!("{}+{}", self.modifiers, self.position + 1)
    }
}

/// Build the numbered hotkey table from the config.
pub fn bindings_from_config(cfg: &Config) -> Result<Vec<HotkeyBinding>, String> {
    let modifiers: HotkeyModifiers = cfg.hotkey_modifiers.parse()?;
    let count = cfg.effective_hotkey_count() as usize;
    Ok((0..count).map(|pos| HotkeyBinding::new(pos, modifiers)).collect())
}

/// Map a `WM_HOTKEY` id back to its monitor position.
pub fn position_for_id(bindings: &[HotkeyBinding], id: i32) -> Option<usize> {
    bindings.iter().find(|b| b.id == id).map(|b| b.position)
}

/// Label for a monitor position, used in menu entries such as
/// `Standby / Wake (Alt+2)`. `None` if no hotkey covers the position.
pub fn label_for_position(bindings: &[HotkeyBinding], position: usize) -> Option<String> {
    bindings
        .iter()
        .find(|b| b.position == position)
        .map(HotkeyBinding::label)
}

#[cfg(test)]
#[path = "tests/hotkey_tests.rs"]
mod tests;
