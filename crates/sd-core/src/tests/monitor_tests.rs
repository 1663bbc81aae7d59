use super::*;

fn monitor(index: usize, primary: bool) -> MonitorInfo {
    MonitorInfo {
        index,
        description: format!("Monitor {}", index),
        min_brightness: 0,
        current_brightness: 50,
        max_brightness: 100,
        primary,
    }
}

// ── brightness_percent ───────────────────────────────────────────

#[test]
fn percent_of_zero_to_hundred_range() {
    let info = monitor(0, false);
    assert_eq!(info.brightness_percent(), 50.0);
}

#[test]
fn percent_uses_monitor_range() {
    let info = MonitorInfo {
        min_brightness: 20,
        current_brightness: 70,
        max_brightness: 220,
        ..monitor(0, false)
    };
    assert_eq!(info.brightness_percent(), 25.0);
}

#[test]
fn percent_is_zero_for_degenerate_range() {
    let flat = MonitorInfo {
        min_brightness: 40,
        current_brightness: 40,
        max_brightness: 40,
        ..monitor(0, false)
    };
    let inverted = MonitorInfo {
        min_brightness: 80,
        max_brightness: 10,
        ..monitor(0, false)
    };
    assert_eq!(flat.brightness_percent(), 0.0);
    assert_eq!(inverted.brightness_percent(), 0.0);
}

#[test]
fn slider_position_is_clamped() {
    let below = MonitorInfo {
        min_brightness: 10,
        current_brightness: 0,
        max_brightness: 100,
        ..monitor(0, false)
    };
    let above = MonitorInfo {
        current_brightness: 150,
        ..monitor(0, false)
    };
    assert_eq!(below.slider_position(), 0);
    assert_eq!(above.slider_position(), 100);
}

#[test]
fn slider_position_rounds() {
    let info = MonitorInfo {
        current_brightness: 2,
        max_brightness: 3,
        ..monitor(0, false)
    };
    // 66.67 %
    assert_eq!(info.slider_position(), 67);
}

// ── raw_brightness_for_percent ───────────────────────────────────

#[test]
fn raw_brightness_identity_for_zero_to_hundred() {
    let info = monitor(0, false);
    assert_eq!(info.raw_brightness_for_percent(0), 0);
    assert_eq!(info.raw_brightness_for_percent(37), 37);
    assert_eq!(info.raw_brightness_for_percent(100), 100);
}

#[test]
fn raw_brightness_maps_onto_range() {
    let info = MonitorInfo {
        min_brightness: 20,
        max_brightness: 220,
        ..monitor(0, false)
    };
    assert_eq!(info.raw_brightness_for_percent(0), 20);
    assert_eq!(info.raw_brightness_for_percent(50), 120);
    assert_eq!(info.raw_brightness_for_percent(100), 220);
}

#[test]
fn raw_brightness_clamps_percent() {
    let info = monitor(0, false);
    assert_eq!(info.raw_brightness_for_percent(250), 100);
}

#[test]
fn raw_brightness_degenerate_range_returns_min() {
    let info = MonitorInfo {
        min_brightness: 30,
        max_brightness: 30,
        ..monitor(0, false)
    };
    assert_eq!(info.raw_brightness_for_percent(80), 30);
}

// ── Display ──────────────────────────────────────────────────────

#[test]
fn display_primary_monitor() {
    let info = MonitorInfo {
        description: "DELL U2720Q".to_string(),
        ..monitor(2, true)
    };
    assert_eq!(
        info.to_string(),
        "[2] DELL U2720Q (PRIMARY) | min=0 cur=50 max=100 (≈ 50.0 %)"
    );
}

#[test]
fn display_secondary_monitor_has_no_marker() {
    let text = monitor(1, false).to_string();
    assert!(text.starts_with("[1] Monitor 1 "));
    assert!(!text.contains("PRIMARY"));
}

// ── sort_primary_first ───────────────────────────────────────────

#[test]
fn sort_moves_primary_to_front() {
    let mut list = vec![monitor(0, false), monitor(1, false), monitor(2, true)];
    sort_primary_first(&mut list);
    let order: Vec<usize> = list.iter().map(|m| m.index).collect();
    assert_eq!(order, vec![2, 0, 1]);
}

#[test]
fn sort_is_stable_for_several_primaries() {
    // Two physical monitors behind the primary output (e.g. a splitter).
    let mut list = vec![
        monitor(0, false),
        monitor(1, true),
        monitor(2, false),
        monitor(3, true),
    ];
    sort_primary_first(&mut list);
    let order: Vec<usize> = list.iter().map(|m| m.index).collect();
    assert_eq!(order, vec![1, 3, 0, 2]);
}

#[test]
fn sort_keeps_indices_with_gaps() {
    let mut list = vec![monitor(0, false), monitor(3, true)];
    sort_primary_first(&mut list);
    assert_eq!(list[0].index, 3);
    assert_eq!(list[1].index, 0);
}

#[test]
fn sort_empty_list() {
    let mut list: Vec<MonitorInfo> = Vec::new();
    sort_primary_first(&mut list);
    assert!(list.is_empty());
}

// ── menu_title ───────────────────────────────────────────────────

#[test]
fn menu_title_is_one_based() {
    assert_eq!(menu_title(0, &monitor(4, true)), "1: Monitor 4 (PRIMARY)");
    assert_eq!(menu_title(1, &monitor(0, false)), "2: Monitor 0");
}

// ── PowerMode ────────────────────────────────────────────────────

#[test]
fn power_mode_vcp_values() {
    assert_eq!(VCP_POWER_MODE, 0xD6);
    assert_eq!(PowerMode::On.vcp_value(), 1);
    assert_eq!(PowerMode::Standby.vcp_value(), 2);
    assert_eq!(PowerMode::Suspend.vcp_value(), 3);
    assert_eq!(PowerMode::Off.vcp_value(), 4);
    assert_eq!(PowerMode::HardOff.vcp_value(), 5);
}

#[test]
fn power_mode_from_vcp_rejects_unknown() {
    assert_eq!(PowerMode::from_vcp(4), Some(PowerMode::Off));
    assert_eq!(PowerMode::from_vcp(0), None);
    assert_eq!(PowerMode::from_vcp(6), None);
}

#[test]
fn power_mode_parses_names_and_numbers() {
    assert_eq!("on".parse::<PowerMode>(), Ok(PowerMode::On));
    assert_eq!("Wake".parse::<PowerMode>(), Ok(PowerMode::On));
    assert_eq!("STANDBY".parse::<PowerMode>(), Ok(PowerMode::Standby));
    assert_eq!("hard-off".parse::<PowerMode>(), Ok(PowerMode::HardOff));
    assert_eq!(" 4 ".parse::<PowerMode>(), Ok(PowerMode::Off));
}

#[test]
fn power_mode_parse_errors() {
    assert!("9".parse::<PowerMode>().is_err());
    assert!("dim".parse::<PowerMode>().is_err());
}

#[test]
fn power_mode_display_parses_back() {
    for mode in [
        PowerMode::On,
        PowerMode::Standby,
        PowerMode::Suspend,
        PowerMode::Off,
        PowerMode::HardOff,
    ] {
        assert_eq!(mode.to_string().parse::<PowerMode>(), Ok(mode));
    }
}
