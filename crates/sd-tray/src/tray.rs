//! System tray icon and its context menu.

use log::warn;
use std::error::Error;

use sd_core::hotkey::{self, HotkeyBinding};
use sd_core::monitor;
use sd_core::session::{MonitorControl, Session};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, POINT, WPARAM};
use windows::Win32::Graphics::Gdi::{CreateBitmap, DeleteObject, HGDIOBJ};
use windows::Win32::UI::Shell::{
    Shell_NotifyIconW, NIF_ICON, NIF_MESSAGE, NIF_TIP, NIM_ADD, NIM_DELETE, NOTIFYICONDATAW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreateIconIndirect, CreatePopupMenu, DestroyIcon, DestroyMenu, GetCursorPos,
    PostMessageW, SetForegroundWindow, TrackPopupMenu, HICON, HMENU, ICONINFO, MENU_ITEM_FLAGS,
    MF_CHECKED, MF_GRAYED, MF_POPUP, MF_SEPARATOR, MF_STRING, TPM_BOTTOMALIGN, TPM_NONOTIFY,
    TPM_RETURNCMD, TPM_RIGHTBUTTON, WM_APP, WM_NULL,
};

use crate::wide_str;

/// Custom message ID for tray icon callbacks.
pub const WM_TRAY_ICON: u32 = WM_APP + 1;

const TRAY_UID: u32 = 1;
const ICON_SIZE: usize = 16;

/// Menu item IDs.
pub const IDM_RELOAD: u32 = 1001;
pub const IDM_EXIT: u32 = 1002;
/// Per-monitor items: `IDM_MONITOR_BASE + 2 * position` (+1 for brightness).
pub const IDM_MONITOR_BASE: u32 = 2000;

/// A decoded menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Reload,
    Exit,
    ToggleStandby { position: usize },
    Brightness { position: usize },
}

impl MenuCommand {
    pub fn id(self) -> u32 {
        match self {
            MenuCommand::Reload => IDM_RELOAD,
            MenuCommand::Exit => IDM_EXIT,
            MenuCommand::ToggleStandby { position } => IDM_MONITOR_BASE + 2 * position as u32,
            MenuCommand::Brightness { position } => IDM_MONITOR_BASE + 2 * position as u32 + 1,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            IDM_RELOAD => Some(MenuCommand::Reload),
            IDM_EXIT => Some(MenuCommand::Exit),
            id if id >= IDM_MONITOR_BASE => {
                let offset = id - IDM_MONITOR_BASE;
                let position = (offset / 2) as usize;
                if offset % 2 == 0 {
                    Some(MenuCommand::ToggleStandby { position })
                } else {
                    Some(MenuCommand::Brightness { position })
                }
            }
            _ => None,
        }
    }
}

/// Menu text for one monitor, in position order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorEntry {
    pub title: String,
    pub toggle_label: String,
    pub in_standby: bool,
}

/// Build the per-monitor menu entries for the current session state.
pub fn monitor_entries<C: MonitorControl>(
    session: &Session<C>,
    bindings: &[HotkeyBinding],
) -> Vec<MonitorEntry> {
    session
        .monitors()
        .iter()
        .enumerate()
        .map(|(position, info)| MonitorEntry {
            title: monitor::menu_title(position, info),
            toggle_label: match hotkey::label_for_position(bindings, position) {
                Some(label) => format!("Standby / Wake ({})", label),
                None => "Standby / Wake".to_string(),
            },
            in_standby: session.is_in_standby(info.index),
        })
        .collect()
}

fn notify_data(hwnd: HWND) -> NOTIFYICONDATAW {
    NOTIFYICONDATAW {
        cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
        hWnd: hwnd,
        uID: TRAY_UID,
        ..Default::default()
    }
}

/// Add the system tray icon.
pub fn add_tray_icon(hwnd: HWND, icon: HICON, tooltip: &str) -> bool {
    let mut nid = notify_data(hwnd);
    nid.uFlags = NIF_ICON | NIF_MESSAGE | NIF_TIP;
    nid.uCallbackMessage = WM_TRAY_ICON;
    nid.hIcon = icon;

    let tip = wide_str(tooltip);
    let len = tip.len().min(nid.szTip.len() - 1);
    nid.szTip[..len].copy_from_slice(&tip[..len]);

    unsafe { Shell_NotifyIconW(NIM_ADD, &nid).as_bool() }
}

/// Remove the system tray icon.
pub fn remove_tray_icon(hwnd: HWND) {
    let nid = notify_data(hwnd);
    unsafe {
        let _ = Shell_NotifyIconW(NIM_DELETE, &nid);
    }
}

/// ARGB pixels of the tray icon: black square with a white outline from
/// (3, 3) to (13, 13), the same pixels as a 10×10 `drawRect` at (3, 3).
pub fn icon_pixels() -> Vec<u32> {
    const BLACK: u32 = 0xFF00_0000;
    const WHITE: u32 = 0xFFFF_FFFF;
    let (lo, hi) = (3usize, 13usize);

    (0..ICON_SIZE * ICON_SIZE)
        .map(|i| {
            let (x, y) = (i % ICON_SIZE, i / ICON_SIZE);
            let on_vertical = (x == lo || x == hi) && (lo..=hi).contains(&y);
            let on_horizontal = (y == lo || y == hi) && (lo..=hi).contains(&x);
            if on_vertical || on_horizontal {
                WHITE
            } else {
                BLACK
            }
        })
        .collect()
}

/// Build the tray icon from [`icon_pixels`]. Caller owns it (`destroy_icon`).
pub fn create_icon() -> Result<HICON, Box<dyn Error>> {
    let pixels = icon_pixels();
    // 1bpp AND mask, rows padded to 16 bits; all zero = fully opaque.
    let mask = [0u8; ICON_SIZE * 2];
    let size = ICON_SIZE as i32;

    unsafe {
        let color = CreateBitmap(size, size, 1, 32, Some(pixels.as_ptr() as *const _));
        let mask_bmp = CreateBitmap(size, size, 1, 1, Some(mask.as_ptr() as *const _));

        let info = ICONINFO {
            fIcon: BOOL::from(true),
            xHotspot: 0,
            yHotspot: 0,
            hbmMask: mask_bmp,
            hbmColor: color,
        };
        let icon = CreateIconIndirect(&info);

        // The icon keeps its own copies of both bitmaps.
        let _ = DeleteObject(HGDIOBJ(color.0));
        let _ = DeleteObject(HGDIOBJ(mask_bmp.0));

        Ok(icon?)
    }
}

pub fn destroy_icon(icon: HICON) {
    if !icon.is_invalid() {
        unsafe {
            let _ = DestroyIcon(icon);
        }
    }
}

fn append_item(menu: HMENU, flags: MENU_ITEM_FLAGS, id: usize, text: &str) {
    let text = wide_str(text);
    unsafe {
        if let Err(e) = AppendMenuW(menu, flags, id, PCWSTR(text.as_ptr())) {
            warn!("AppendMenuW failed: {}", e);
        }
    }
}

fn append_separator(menu: HMENU) {
    unsafe {
        let _ = AppendMenuW(menu, MF_SEPARATOR, 0, PCWSTR::null());
    }
}

/// Build the context menu. The caller destroys it with `DestroyMenu`.
pub fn build_menu(entries: &[MonitorEntry]) -> Result<HMENU, Box<dyn Error>> {
    let menu = unsafe { CreatePopupMenu()? };

    append_item(menu, MF_STRING, MenuCommand::Reload.id() as usize, "Reload monitors");
    append_separator(menu);

    if entries.is_empty() {
        append_item(menu, MF_STRING | MF_GRAYED, 0, "No DDC/CI monitors found");
    }

    for (position, entry) in entries.iter().enumerate() {
        let sub = unsafe { CreatePopupMenu()? };

        let toggle_flags = if entry.in_standby {
            MF_STRING | MF_CHECKED
        } else {
            MF_STRING
        };
        append_item(
            sub,
            toggle_flags,
            MenuCommand::ToggleStandby { position }.id() as usize,
            &entry.toggle_label,
        );
        append_item(
            sub,
            MF_STRING,
            MenuCommand::Brightness { position }.id() as usize,
            "Brightness...",
        );

        append_item(menu, MF_STRING | MF_POPUP, sub.0 as usize, &entry.title);
    }

    append_separator(menu);
    append_item(menu, MF_STRING, MenuCommand::Exit.id() as usize, "Exit");

    Ok(menu)
}

/// Show the menu at the cursor and return the chosen command, if any.
///
/// Runs a modal loop: the caller must not hold any app state borrowed
/// across this call.
pub fn track_menu(hwnd: HWND, menu: HMENU) -> Option<MenuCommand> {
    unsafe {
        let mut pt = POINT::default();
        let _ = GetCursorPos(&mut pt);

        // Required for TrackPopupMenu to work correctly with tray icons
        let _ = SetForegroundWindow(hwnd);

        let chosen = TrackPopupMenu(
            menu,
            TPM_RETURNCMD | TPM_NONOTIFY | TPM_RIGHTBUTTON | TPM_BOTTOMALIGN,
            pt.x,
            pt.y,
            0,
            hwnd,
            None,
        );

        // Makes the menu close properly when focus moves elsewhere.
        let _ = PostMessageW(hwnd, WM_NULL, WPARAM(0), LPARAM(0));
        let _ = DestroyMenu(menu);

        MenuCommand::from_id(chosen.0 as u32)
    }
}

#[cfg(test)]
#[path = "tests/tray_tests.rs"]
mod tests;
