//! ShadowDesk tray application.
//!
//! A hidden top-level window owns the tray icon and the global hotkeys.
//! All monitor state lives in a [`Session`] kept in thread-local storage
//! and touched only from the UI thread.

mod hotkeys;
pub mod slider;
pub mod tray;

use log::{debug, error, info, warn};
use std::cell::RefCell;
use std::error::Error;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use sd_core::config::Config;
use sd_core::hotkey::{self, HotkeyBinding};
use sd_core::session::Session;
use sd_monitor::DdcController;
use tray::MenuCommand;
use windows::core::PCWSTR;
use windows::Win32::Foundation::{
    GetLastError, BOOL, ERROR_ALREADY_EXISTS, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::CreateMutexW;
use windows::Win32::UI::WindowsAndMessaging::*;

const WINDOW_CLASS: &str = "ShadowDeskTrayWnd";
const SINGLE_INSTANCE_MUTEX: &str = "Local\\ShadowDeskSingleInstance";

/// Posted by the Ctrl+C handler to end the message loop.
const WM_QUIT_APP: u32 = WM_USER + 1;

/// Explorer broadcasts this after restarting; the icon must be re-added.
static TASKBAR_CREATED: AtomicU32 = AtomicU32::new(0);

/// Null-terminated UTF-16 for Win32 string parameters.
pub(crate) fn wide_str(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

struct App {
    session: Session<DdcController>,
    bindings: Vec<HotkeyBinding>,
    registered: Vec<i32>,
    icon: HICON,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

/// Run `f` against the app state. Returns `None` when the state is gone or
/// already borrowed further up the stack.
fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
    APP.with(|cell| match cell.try_borrow_mut() {
        Ok(mut guard) => guard.as_mut().map(f),
        Err(_) => {
            warn!("Tray state is busy, event dropped");
            None
        }
    })
}

/// True when the named mutex already existed, i.e. another instance holds it.
///
/// The handle is never closed, so the mutex lives until this process exits.
fn is_already_running(mutex_name: &str) -> bool {
    let name = wide_str(mutex_name);

    unsafe {
        match CreateMutexW(None, true, PCWSTR(name.as_ptr())) {
            Ok(_) => GetLastError() == ERROR_ALREADY_EXISTS,
            Err(e) => {
                warn!("Single-instance check failed: {}", e);
                false
            }
        }
    }
}

/// Run the tray application until the user chooses Exit or presses Ctrl+C.
pub fn run(config: Config) -> Result<(), Box<dyn Error>> {
    if is_already_running(SINGLE_INSTANCE_MUTEX) {
        info!("ShadowDesk is already running");
        return Ok(());
    }

    let hwnd_slot: Arc<Mutex<Option<isize>>> = Arc::new(Mutex::new(None));
    let hwnd_for_handler = hwnd_slot.clone();
    ctrlc::set_handler(move || {
        info!("Ctrl+C received, shutting down");
        if let Ok(guard) = hwnd_for_handler.lock() {
            if let Some(h) = *guard {
                unsafe {
                    let _ = PostMessageW(HWND(h as _), WM_QUIT_APP, WPARAM(0), LPARAM(0));
                }
            }
        }
    })?;

    let hinstance: HINSTANCE = unsafe { GetModuleHandleW(PCWSTR::null())? }.into();
    let class_name = wide_str(WINDOW_CLASS);
    let wc = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        lpfnWndProc: Some(wnd_proc),
        hInstance: hinstance,
        lpszClassName: PCWSTR(class_name.as_ptr()),
        ..Default::default()
    };
    if unsafe { RegisterClassExW(&wc) } == 0 {
        return Err("Failed to register window class".into());
    }

    // A hidden top-level window; message-only windows miss TaskbarCreated.
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            PCWSTR(class_name.as_ptr()),
            PCWSTR(class_name.as_ptr()),
            WINDOW_STYLE::default(),
            0,
            0,
            0,
            0,
            HWND::default(),
            HMENU::default(),
            hinstance,
            None,
        )?
    };
    if let Ok(mut guard) = hwnd_slot.lock() {
        *guard = Some(hwnd.0 as isize);
    }

    let taskbar_msg = wide_str("TaskbarCreated");
    TASKBAR_CREATED.store(
        unsafe { RegisterWindowMessageW(PCWSTR(taskbar_msg.as_ptr())) },
        Ordering::SeqCst,
    );

    let bindings = if config.hotkeys_enabled {
        match hotkey::bindings_from_config(&config) {
            Ok(b) => b,
            Err(e) => {
                warn!("Hotkeys disabled: {}", e);
                Vec::new()
            }
        }
    } else {
        info!("Hotkeys disabled in config");
        Vec::new()
    };
    let registered = hotkeys::register_all(hwnd, &bindings);

    let icon = tray::create_icon().unwrap_or_else(|e| {
        warn!("Could not build tray icon: {}", e);
        HICON::default()
    });
    if !tray::add_tray_icon(hwnd, icon, &config.tray_tooltip) {
        warn!("Shell_NotifyIconW(NIM_ADD) failed");
    }

    let session = Session::new(DdcController::new(), config);
    info!("Tray started with {} DDC/CI monitor(s)", session.monitors().len());

    APP.with(|cell| {
        *cell.borrow_mut() = Some(App {
            session,
            bindings,
            registered,
            icon,
        })
    });

    unsafe {
        let mut msg = MSG::default();
        loop {
            let ret = GetMessageW(&mut msg, HWND::default(), 0, 0);
            if ret == BOOL(0) || ret == BOOL(-1) {
                break;
            }
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    shutdown(hwnd);

    unsafe {
        let _ = DestroyWindow(hwnd);
        let _ = UnregisterClassW(PCWSTR(class_name.as_ptr()), hinstance);
    }

    info!("Tray stopped");
    Ok(())
}

fn shutdown(hwnd: HWND) {
    slider::close_all();

    let app = APP.with(|cell| cell.borrow_mut().take());
    let Some(mut app) = app else {
        return;
    };

    if app.session.config().wake_on_exit {
        let woken = app.session.wake_all();
        if woken > 0 {
            info!("Woke {} monitor(s) on exit", woken);
        }
    }

    hotkeys::unregister_all(hwnd, &app.registered);
    tray::remove_tray_icon(hwnd);
    tray::destroy_icon(app.icon);
}

fn show_menu(hwnd: HWND) {
    // Build under the borrow, track outside it: TrackPopupMenu pumps messages.
    let menu = with_app(|app| {
        let entries = tray::monitor_entries(&app.session, &app.bindings);
        tray::build_menu(&entries)
    });

    let menu = match menu {
        Some(Ok(menu)) => menu,
        Some(Err(e)) => {
            error!("Could not build tray menu: {}", e);
            return;
        }
        None => return,
    };

    if let Some(command) = tray::track_menu(hwnd, menu) {
        handle_command(command);
    }
}

fn handle_command(command: MenuCommand) {
    debug!("Menu command: {:?}", command);

    match command {
        MenuCommand::Reload => {
            // Open windows hold global indices from the previous enumeration.
            slider::close_all();
            with_app(|app| app.session.reload());
        }

        MenuCommand::Exit => unsafe { PostQuitMessage(0) },

        MenuCommand::ToggleStandby { position } => toggle_position(position),

        MenuCommand::Brightness { position } => {
            let info = with_app(|app| app.session.monitor_at(position).cloned()).flatten();
            match info {
                Some(info) => {
                    if let Err(e) = slider::open(&info, apply_brightness) {
                        error!("Could not open brightness window: {}", e);
                    }
                }
                None => warn!("No monitor at menu position {}", position),
            }
        }
    }
}

fn toggle_position(position: usize) {
    with_app(|app| match app.session.toggle_position(position) {
        Ok(transition) => debug!("Position {} -> {}", position, transition),
        Err(e) => warn!("Toggle failed: {}", e),
    });
}

fn apply_brightness(index: usize, percent: u32) {
    with_app(|app| {
        if let Err(e) = app.session.set_brightness_percent(index, percent) {
            warn!("Brightness change on monitor {} failed: {}", index, e);
        }
    });
}

fn readd_icon(hwnd: HWND) {
    with_app(|app| {
        info!("Taskbar restarted, re-adding tray icon");
        if !tray::add_tray_icon(hwnd, app.icon, &app.session.config().tray_tooltip) {
            warn!("Shell_NotifyIconW(NIM_ADD) failed");
        }
    });
}

unsafe extern "system" fn wnd_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        tray::WM_TRAY_ICON => {
            let event = (lparam.0 & 0xFFFF) as u32;
            if event == WM_RBUTTONUP || event == WM_LBUTTONUP || event == WM_CONTEXTMENU {
                show_menu(hwnd);
            }
            LRESULT(0)
        }

        WM_HOTKEY => {
            let id = wparam.0 as i32;
            let position = with_app(|app| hotkey::position_for_id(&app.bindings, id)).flatten();
            if let Some(position) = position {
                toggle_position(position);
            }
            LRESULT(0)
        }

        WM_QUIT_APP => {
            PostQuitMessage(0);
            LRESULT(0)
        }

        WM_DESTROY => LRESULT(0),

        m if m != 0 && m == TASKBAR_CREATED.load(Ordering::SeqCst) => {
            readd_icon(hwnd);
            LRESULT(0)
        }

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
