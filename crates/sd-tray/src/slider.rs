//! Per-monitor brightness window: a single 0–100 trackbar.
//!
//! Each slider movement is reported through the `on_change` callback given
//! to [`open`]; repeated positions are not re-sent because a DDC/CI write
//! takes tens of milliseconds.

use log::{debug, warn};
use std::cell::RefCell;
use std::error::Error;

use sd_core::monitor::MonitorInfo;
use windows::core::PCWSTR;
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::{GetSysColorBrush, COLOR_BTNFACE};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Controls::{InitCommonControlsEx, ICC_BAR_CLASSES, INITCOMMONCONTROLSEX};
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::wide_str;

const CLASS_NAME: &str = "ShadowDeskBrightnessWnd";
const TRACKBAR_CLASS: &str = "msctls_trackbar32";

const WINDOW_WIDTH: i32 = 400;
const WINDOW_HEIGHT: i32 = 120;

// Trackbar messages and styles (commctrl.h)
const TBM_GETPOS: u32 = WM_USER;
const TBM_SETPOS: u32 = WM_USER + 5;
const TBM_SETRANGE: u32 = WM_USER + 6;
const TBM_SETTICFREQ: u32 = WM_USER + 20;
const TBM_SETPAGESIZE: u32 = WM_USER + 21;
const TBS_AUTOTICKS: u32 = 0x0001;

const TICK_FREQUENCY: usize = 5;
const PAGE_SIZE: isize = 25;

/// Called with `(global index, slider percent)` on every new position.
pub type BrightnessCallback = fn(usize, u32);

struct SliderState {
    hwnd: isize,
    index: usize,
    last: u32,
    on_change: BrightnessCallback,
}

thread_local! {
    static SLIDERS: RefCell<Vec<SliderState>> = const { RefCell::new(Vec::new()) };
}

/// Title of the brightness window for a monitor.
pub fn window_title(index: usize) -> String {
    format!("Brightness - Monitor {}", index)
}

/// `MAKELONG(min, max)` as used by `TBM_SETRANGE`.
pub fn make_range(min: u16, max: u16) -> isize {
    ((max as u32) << 16 | min as u32) as isize
}

/// Open (or focus) the brightness window for `info`.
pub fn open(info: &MonitorInfo, on_change: BrightnessCallback) -> Result<(), Box<dyn Error>> {
    let existing = SLIDERS.with(|s| {
        s.borrow()
            .iter()
            .find(|st| st.index == info.index)
            .map(|st| st.hwnd)
    });
    if let Some(h) = existing {
        unsafe {
            let _ = SetForegroundWindow(HWND(h as _));
        }
        return Ok(());
    }

    let hinstance: HINSTANCE = unsafe { GetModuleHandleW(PCWSTR::null())? }.into();
    register_class(hinstance);

    let class_name = wide_str(CLASS_NAME);
    let title = wide_str(&window_title(info.index));
    let (screen_w, screen_h) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };

    let hwnd = unsafe {
        CreateWindowExW(
            WS_EX_TOPMOST,
            PCWSTR(class_name.as_ptr()),
            PCWSTR(title.as_ptr()),
            WS_OVERLAPPED | WS_CAPTION | WS_SYSMENU,
            (screen_w - WINDOW_WIDTH) / 2,
            (screen_h - WINDOW_HEIGHT) / 2,
            WINDOW_WIDTH,
            WINDOW_HEIGHT,
            HWND::default(),
            HMENU::default(),
            hinstance,
            None,
        )?
    };

    let trackbar_class = wide_str(TRACKBAR_CLASS);
    let trackbar = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            PCWSTR(trackbar_class.as_ptr()),
            PCWSTR::null(),
            WS_CHILD | WS_VISIBLE | WS_TABSTOP | WINDOW_STYLE(TBS_AUTOTICKS),
            12,
            16,
            WINDOW_WIDTH - 40,
            40,
            hwnd,
            HMENU::default(),
            hinstance,
            None,
        )
    };
    let trackbar = match trackbar {
        Ok(t) => t,
        Err(e) => {
            unsafe {
                let _ = DestroyWindow(hwnd);
            }
            return Err(format!("Could not create brightness slider: {}", e).into());
        }
    };

    let initial = info.slider_position();
    unsafe {
        SendMessageW(trackbar, TBM_SETRANGE, WPARAM(1), LPARAM(make_range(0, 100)));
        SendMessageW(trackbar, TBM_SETTICFREQ, WPARAM(TICK_FREQUENCY), LPARAM(0));
        SendMessageW(trackbar, TBM_SETPAGESIZE, WPARAM(0), LPARAM(PAGE_SIZE));
        SendMessageW(trackbar, TBM_SETPOS, WPARAM(1), LPARAM(initial as isize));
    }

    SLIDERS.with(|s| {
        s.borrow_mut().push(SliderState {
            hwnd: hwnd.0 as isize,
            index: info.index,
            last: initial,
            on_change,
        })
    });

    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOW);
        let _ = SetForegroundWindow(hwnd);
        let _ = windows::Win32::UI::Input::KeyboardAndMouse::SetFocus(trackbar);
    }

    debug!("Brightness window opened for monitor {} at {}%", info.index, initial);
    Ok(())
}

/// Close every open brightness window and forget its monitor index.
pub fn close_all() {
    let handles: Vec<isize> = SLIDERS.with(|s| s.borrow().iter().map(|st| st.hwnd).collect());
    for h in handles {
        unsafe {
            let _ = DestroyWindow(HWND(h as _));
        }
    }
    SLIDERS.with(|s| s.borrow_mut().clear());
}

fn register_class(hinstance: HINSTANCE) {
    let icc = INITCOMMONCONTROLSEX {
        dwSize: std::mem::size_of::<INITCOMMONCONTROLSEX>() as u32,
        dwICC: ICC_BAR_CLASSES,
    };
    let class_name = wide_str(CLASS_NAME);

    unsafe {
        let _ = InitCommonControlsEx(&icc);

        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: Some(slider_proc),
            hInstance: hinstance,
            hCursor: LoadCursorW(HINSTANCE::default(), IDC_ARROW).unwrap_or_default(),
            hbrBackground: GetSysColorBrush(COLOR_BTNFACE),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            ..Default::default()
        };
        // Fails harmlessly once the class exists.
        RegisterClassExW(&wc);
    }
}

/// Record a new slider position; returns the callback to run if it changed.
fn take_change(hwnd: isize, position: u32) -> Option<(BrightnessCallback, usize)> {
    SLIDERS.with(|s| {
        let mut sliders = s.borrow_mut();
        let state = sliders.iter_mut().find(|st| st.hwnd == hwnd)?;
        if state.last == position {
            return None;
        }
        state.last = position;
        Some((state.on_change, state.index))
    })
}

unsafe extern "system" fn slider_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_HSCROLL => {
            let trackbar = HWND(lparam.0 as _);
            if !trackbar.is_invalid() {
                let position = SendMessageW(trackbar, TBM_GETPOS, WPARAM(0), LPARAM(0)).0 as u32;
                if let Some((on_change, index)) = take_change(hwnd.0 as isize, position) {
                    on_change(index, position);
                }
            }
            LRESULT(0)
        }

        WM_CLOSE => {
            if let Err(e) = DestroyWindow(hwnd) {
                warn!("DestroyWindow failed: {}", e);
            }
            LRESULT(0)
        }

        WM_DESTROY => {
            let key = hwnd.0 as isize;
            SLIDERS.with(|s| s.borrow_mut().retain(|st| st.hwnd != key));
            LRESULT(0)
        }

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

#[cfg(test)]
#[path = "tests/slider_tests.rs"]
mod tests;
