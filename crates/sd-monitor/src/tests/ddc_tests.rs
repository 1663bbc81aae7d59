use super::*;

// ── decode_description ───────────────────────────────────────────

#[test]
fn decode_description_empty() {
    let raw = [0u16; 128];
    assert_eq!(decode_description(&raw), "");
}

#[test]
fn decode_description_ascii() {
    let mut raw = [0u16; 128];
    for (i, ch) in "Generic PnP Monitor".encode_utf16().enumerate() {
        raw[i] = ch;
    }
    assert_eq!(decode_description(&raw), "Generic PnP Monitor");
}

#[test]
fn decode_description_trims_padding() {
    let mut raw = [0u16; 128];
    for (i, ch) in "  DELL U2720Q   ".encode_utf16().enumerate() {
        raw[i] = ch;
    }
    assert_eq!(decode_description(&raw), "DELL U2720Q");
}

#[test]
fn decode_description_null_terminated_mid() {
    let mut raw = [0u16; 128];
    raw[0] = 65; // A
    raw[1] = 66; // B
    raw[2] = 0;
    raw[3] = 67; // C (should not appear)
    assert_eq!(decode_description(&raw), "AB");
}

#[test]
fn decode_description_full_buffer_without_terminator() {
    let raw = [0x58u16; 128]; // 'X' * 128
    assert_eq!(decode_description(&raw).len(), 128);
}

// ── VcpValue ─────────────────────────────────────────────────────

#[test]
fn vcp_value_clone_and_eq() {
    let val = VcpValue {
        code: VCP_POWER_MODE,
        current: 1,
        max: 5,
        vcp_type: 0,
    };
    assert_eq!(val.clone(), val);
}

// ── Global index assignment ──────────────────────────────────────

type Display = Result<Vec<&'static str>, Box<dyn Error>>;

fn failed_display() -> Display {
    Err("GetPhysicalMonitorsFromHMONITOR failed for display 0x2".into())
}

/// Collect (index, description) pairs from a walk.
fn walk(displays: Vec<Display>) -> Vec<(usize, &'static str)> {
    let mut seen = Vec::new();
    walk_indexed(displays, |index, _display: &Vec<&'static str>, name: &&'static str| {
        seen.push((index, *name));
        Flow::Continue
    });
    seen
}

#[test]
fn indices_run_across_displays() {
    let seen = walk(vec![Ok(vec!["A", "B"]), Ok(vec!["C"])]);
    assert_eq!(seen, vec![(0, "A"), (1, "B"), (2, "C")]);
}

#[test]
fn unresolved_display_consumes_no_index() {
    let seen = walk(vec![Ok(vec!["A"]), failed_display(), Ok(vec!["C", "D"])]);
    assert_eq!(seen, vec![(0, "A"), (1, "C"), (2, "D")]);
}

#[test]
fn display_without_physical_monitors_consumes_no_index() {
    let seen = walk(vec![Ok(vec![]), Ok(vec!["A"])]);
    assert_eq!(seen, vec![(0, "A")]);
}

#[test]
fn walk_stops_when_visitor_asks() {
    let displays: Vec<Display> = vec![Ok(vec!["A", "B"]), Ok(vec!["C"])];
    let mut seen = Vec::new();
    walk_indexed(
        displays,
        |index, _display: &Vec<&'static str>, _name: &&'static str| {
            seen.push(index);
            if index == 1 {
                Flow::Stop
            } else {
                Flow::Continue
            }
        },
    );
    assert_eq!(seen, vec![0, 1]);
}

#[test]
fn failed_brightness_read_leaves_index_gap() {
    // Second monitor of the first display does not answer brightness.
    let displays: Vec<Display> = vec![Ok(vec!["A", "B"]), failed_display(), Ok(vec!["C"])];
    let mut listed = Vec::new();
    walk_indexed(displays, |index, _display: &Vec<&'static str>, name: &&'static str| {
        let brightness: Result<(u32, u32, u32), Box<dyn Error>> = if *name == "B" {
            Err("GetMonitorBrightness failed".into())
        } else {
            Ok((0, 50, 100))
        };
        listed.extend(listing_entry(index, name, false, brightness));
        Flow::Continue
    });

    let indices: Vec<usize> = listed.iter().map(|m| m.index).collect();
    assert_eq!(indices, vec![0, 2]);
    assert_eq!(listed[1].description, "C");
}

#[test]
fn listing_entry_copies_brightness_triple() {
    let info = listing_entry(3, "DELL U2720Q", true, Ok((10, 40, 90))).unwrap();
    assert_eq!(info.index, 3);
    assert_eq!(info.description, "DELL U2720Q");
    assert_eq!(
        (info.min_brightness, info.current_brightness, info.max_brightness),
        (10, 40, 90)
    );
    assert!(info.primary);
}

#[test]
fn listing_entry_skips_unreadable_monitor() {
    assert!(listing_entry(0, "X", false, Err("read failed".into())).is_none());
}

// ── Enumeration (read-only, safe on any Windows host) ────────────

#[test]
fn enumerate_hmonitors_does_not_panic() {
    // On headless CI this may return an empty list but should not panic.
    let result = enumerate_hmonitors();
    assert!(result.is_ok());
}

#[test]
fn list_monitors_indices_are_unique_and_increasing() {
    let monitors = list_monitors().unwrap();
    for pair in monitors.windows(2) {
        assert!(pair[0].index < pair[1].index);
    }
}

#[test]
fn traversal_can_stop_early() {
    let mut visited = 0usize;
    for_each_physical_monitor(|_| {
        visited += 1;
        Flow::Stop
    })
    .unwrap();
    assert!(visited <= 1);
}

#[test]
fn unknown_index_is_an_error() {
    // No system has this many physical monitors; nothing is written.
    let err = set_brightness(usize::MAX, 50).unwrap_err();
    assert!(err.to_string().contains("No monitor with index"));
}

#[test]
fn unknown_index_power_mode_is_an_error() {
    assert!(set_power_mode(usize::MAX, 1).is_err());
}
