use super::*;
use sd_core::config::Config;
use sd_core::hotkey::HotkeyModifiers;
use sd_core::monitor::MonitorInfo;
use std::cell::RefCell;

struct FakeControl {
    monitors: Vec<MonitorInfo>,
    powered: RefCell<Vec<(usize, u32)>>,
}

impl MonitorControl for FakeControl {
    fn list_monitors(&self) -> Result<Vec<MonitorInfo>, Box<dyn Error>> {
        Ok(self.monitors.clone())
    }

    fn set_brightness(&self, _index: usize, _value: u32) -> Result<(), Box<dyn Error>> {
        Ok(())
    }

    fn set_power_mode(&self, index: usize, mode: u32) -> Result<(), Box<dyn Error>> {
        self.powered.borrow_mut().push((index, mode));
        Ok(())
    }
}

fn monitor(index: usize, description: &str, primary: bool) -> MonitorInfo {
    MonitorInfo {
        index,
        description: description.to_string(),
        min_brightness: 0,
        current_brightness: 50,
        max_brightness: 100,
        primary,
    }
}

fn session(monitors: Vec<MonitorInfo>) -> Session<FakeControl> {
    let control = FakeControl {
        monitors,
        powered: RefCell::new(Vec::new()),
    };
    Session::new(control, Config::default())
}

// ── MenuCommand ids ──────────────────────────────────────────────

#[test]
fn fixed_commands_use_fixed_ids() {
    assert_eq!(MenuCommand::Reload.id(), IDM_RELOAD);
    assert_eq!(MenuCommand::Exit.id(), IDM_EXIT);
    assert_eq!(MenuCommand::from_id(IDM_RELOAD), Some(MenuCommand::Reload));
    assert_eq!(MenuCommand::from_id(IDM_EXIT), Some(MenuCommand::Exit));
}

#[test]
fn monitor_commands_interleave_toggle_and_brightness() {
    assert_eq!(MenuCommand::ToggleStandby { position: 0 }.id(), 2000);
    assert_eq!(MenuCommand::Brightness { position: 0 }.id(), 2001);
    assert_eq!(MenuCommand::ToggleStandby { position: 3 }.id(), 2006);
    assert_eq!(MenuCommand::Brightness { position: 3 }.id(), 2007);
}

#[test]
fn monitor_command_ids_decode_back() {
    for position in 0..12 {
        let toggle = MenuCommand::ToggleStandby { position };
        let brightness = MenuCommand::Brightness { position };
        assert_eq!(MenuCommand::from_id(toggle.id()), Some(toggle));
        assert_eq!(MenuCommand::from_id(brightness.id()), Some(brightness));
    }
}

#[test]
fn dismissed_menu_decodes_to_none() {
    // TrackPopupMenu returns 0 when nothing was chosen.
    assert_eq!(MenuCommand::from_id(0), None);
    assert_eq!(MenuCommand::from_id(999), None);
}

// ── Icon ─────────────────────────────────────────────────────────

#[test]
fn icon_is_16x16() {
    assert_eq!(icon_pixels().len(), 256);
}

#[test]
fn icon_outline_is_white_and_rest_black() {
    let pixels = icon_pixels();
    let at = |x: usize, y: usize| pixels[y * 16 + x];

    assert_eq!(at(3, 3), 0xFFFF_FFFF);
    assert_eq!(at(13, 13), 0xFFFF_FFFF);
    assert_eq!(at(13, 3), 0xFFFF_FFFF);
    assert_eq!(at(3, 13), 0xFFFF_FFFF);
    assert_eq!(at(8, 13), 0xFFFF_FFFF);

    assert_eq!(at(0, 0), 0xFF00_0000);
    assert_eq!(at(8, 8), 0xFF00_0000);
    assert_eq!(at(12, 12), 0xFF00_0000);
    assert_eq!(at(14, 3), 0xFF00_0000);
    assert_eq!(at(3, 14), 0xFF00_0000);
}

#[test]
fn icon_outline_pixel_count() {
    let white = icon_pixels().iter().filter(|&&p| p == 0xFFFF_FFFF).count();
    // 11 pixels per side, corners shared.
    assert_eq!(white, 40);
}

// ── Menu entries ─────────────────────────────────────────────────

#[test]
fn entries_follow_primary_first_order() {
    let s = session(vec![
        monitor(0, "Side", false),
        monitor(1, "Main", true),
    ]);
    let bindings: Vec<_> = (0..2)
        .map(|p| HotkeyBinding::new(p, HotkeyModifiers::ALT))
        .collect();

    let entries = monitor_entries(&s, &bindings);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].title, "1: Main (PRIMARY)");
    assert_eq!(entries[1].title, "2: Side");
    assert_eq!(entries[0].toggle_label, "Standby / Wake (Alt+1)");
    assert_eq!(entries[1].toggle_label, "Standby / Wake (Alt+2)");
}

#[test]
fn entries_without_hotkey_have_plain_label() {
    let s = session(vec![monitor(0, "A", true), monitor(1, "B", false)]);
    let bindings = vec![HotkeyBinding::new(0, HotkeyModifiers::ALT)];

    let entries = monitor_entries(&s, &bindings);
    assert_eq!(entries[1].toggle_label, "Standby / Wake");
}

#[test]
fn entries_reflect_standby_state() {
    let mut s = session(vec![monitor(0, "A", true), monitor(1, "B", false)]);
    s.standby(1).unwrap();

    let entries = monitor_entries(&s, &[]);
    assert!(!entries[0].in_standby);
    assert!(entries[1].in_standby);
}

#[test]
fn no_monitors_no_entries() {
    let s = session(Vec::new());
    assert!(monitor_entries(&s, &[]).is_empty());
}
