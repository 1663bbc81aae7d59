// Global hotkeys using Win32 RegisterHotKey API

use log::{info, warn};
use sd_core::hotkey::HotkeyBinding;
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS, MOD_NOREPEAT,
};

/// `RegisterHotKey` modifier flags for a binding (auto-repeat suppressed).
pub fn modifier_flags(binding: &HotkeyBinding) -> HOT_KEY_MODIFIERS {
    HOT_KEY_MODIFIERS(binding.modifiers.bits() | MOD_NOREPEAT.0)
}

/// Register every binding on `hwnd`. A key that is already taken by another
/// program is logged and skipped. Returns the ids that were registered.
pub fn register_all(hwnd: HWND, bindings: &[HotkeyBinding]) -> Vec<i32> {
    let mut registered = Vec::with_capacity(bindings.len());

    for binding in bindings {
        match unsafe { RegisterHotKey(hwnd, binding.id, modifier_flags(binding), binding.key) } {
            Ok(()) => registered.push(binding.id),
            Err(e) => warn!("Could not register hotkey {}: {}", binding.label(), e),
        }
    }

    info!("Registered {} of {} hotkeys", registered.len(), bindings.len());
    registered
}

/// Unregister previously registered hotkey ids.
pub fn unregister_all(hwnd: HWND, ids: &[i32]) {
    for &id in ids {
        unsafe {
            let _ = UnregisterHotKey(hwnd, id);
        }
    }
}
