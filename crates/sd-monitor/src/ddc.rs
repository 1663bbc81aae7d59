//! DDC/CI control via the Windows Monitor Configuration API.
//!
//! Uses `EnumDisplayMonitors` to walk the logical displays and `dxva2.dll`
//! to resolve each one to its physical monitors. Every physical monitor gets
//! a global index in enumeration order; brightness, power mode and raw VCP
//! writes all address a monitor by that index through one shared traversal.
//!
//! Physical monitor handles are owned by [`PhysicalMonitors`] and destroyed
//! when it drops, whichever way the traversal ends.

use log::{debug, info, warn};
use std::error::Error;
use std::io;
use std::ptr;

use sd_core::monitor::{MonitorInfo, VCP_POWER_MODE};
use windows::Win32::Foundation::{BOOL, LPARAM, POINT, RECT};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, MonitorFromPoint, HDC, HMONITOR, MONITOR_DEFAULTTOPRIMARY,
};

// ============================================================================
// DDC/CI FFI (dxva2.dll)
// ============================================================================

/// Opaque handle to a physical monitor.
type HANDLE = *mut std::ffi::c_void;

/// Physical monitor as returned by `GetPhysicalMonitorsFromHMONITOR`.
#[repr(C)]
struct PhysicalMonitor {
    handle: HANDLE,
    description: [u16; 128],
}

#[link(name = "dxva2")]
extern "system" {
    fn GetNumberOfPhysicalMonitorsFromHMONITOR(h_monitor: isize, num_monitors: *mut u32) -> BOOL;

    fn GetPhysicalMonitorsFromHMONITOR(
        h_monitor: isize,
        array_size: u32,
        physical_monitors: *mut PhysicalMonitor,
    ) -> BOOL;

    fn DestroyPhysicalMonitor(h_monitor: HANDLE) -> BOOL;

    fn GetMonitorBrightness(
        h_monitor: HANDLE,
        minimum_brightness: *mut u32,
        current_brightness: *mut u32,
        maximum_brightness: *mut u32,
    ) -> BOOL;

    fn SetMonitorBrightness(h_monitor: HANDLE, new_brightness: u32) -> BOOL;

    fn SetVCPFeature(h_monitor: HANDLE, vcp_code: u8, new_value: u32) -> BOOL;

    fn GetVCPFeatureAndVCPFeatureReply(
        h_monitor: HANDLE,
        vcp_code: u8,
        vcp_type: *mut u32,
        current_value: *mut u32,
        maximum_value: *mut u32,
    ) -> BOOL;
}

// ============================================================================
// Handle ownership
// ============================================================================

/// The physical monitors behind one `HMONITOR`. Handles are destroyed on drop.
struct PhysicalMonitors {
    hmonitor: isize,
    monitors: Vec<PhysicalMonitor>,
}

impl PhysicalMonitors {
    /// Resolve an `HMONITOR` to its physical monitors.
    fn from_hmonitor(hmon: isize) -> Result<Self, Box<dyn Error>> {
        let mut count: u32 = 0;
        let ok = unsafe { GetNumberOfPhysicalMonitorsFromHMONITOR(hmon, &mut count) };
        if !ok.as_bool() {
            let err = io::Error::last_os_error();
            return Err(format!(
                "GetNumberOfPhysicalMonitorsFromHMONITOR failed for display 0x{:X}: {}",
                hmon, err
            )
            .into());
        }
        if count == 0 {
            return Ok(Self {
                hmonitor: hmon,
                monitors: Vec::new(),
            });
        }

        let mut monitors: Vec<PhysicalMonitor> = (0..count)
            .map(|_| PhysicalMonitor {
                handle: ptr::null_mut(),
                description: [0u16; 128],
            })
            .collect();

        let ok = unsafe { GetPhysicalMonitorsFromHMONITOR(hmon, count, monitors.as_mut_ptr()) };
        if !ok.as_bool() {
            let err = io::Error::last_os_error();
            return Err(format!(
                "GetPhysicalMonitorsFromHMONITOR failed for display 0x{:X}: {}",
                hmon, err
            )
            .into());
        }

        Ok(Self {
            hmonitor: hmon,
            monitors,
        })
    }
}

impl AsRef<[PhysicalMonitor]> for PhysicalMonitors {
    fn as_ref(&self) -> &[PhysicalMonitor] {
        &self.monitors
    }
}

impl Drop for PhysicalMonitors {
    fn drop(&mut self) {
        for pm in &self.monitors {
            if !pm.handle.is_null() {
                unsafe {
                    let _ = DestroyPhysicalMonitor(pm.handle);
                }
            }
        }
    }
}

// ============================================================================
// Traversal
// ============================================================================

/// A physical monitor during one traversal step. The handle is only valid
/// inside the visitor.
pub(crate) struct Target {
    pub index: usize,
    pub description: String,
    pub primary: bool,
    handle: HANDLE,
}

/// Whether a traversal keeps going after the current monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Stop,
}

/// Assign global indices across displays and visit each physical monitor
/// with its index and owning display.
///
/// Every physical monitor of a resolved display consumes one index, even
/// when the visitor fails on it. A display that could not be resolved is
/// logged and consumes none.
fn walk_indexed<I, D, T, F>(displays: I, mut visit: F)
where
    I: IntoIterator<Item = Result<D, Box<dyn Error>>>,
    D: AsRef<[T]>,
    F: FnMut(usize, &D, &T) -> Flow,
{
    let mut index = 0usize;

    for display in displays {
        let display = match display {
            Ok(d) => d,
            Err(e) => {
                warn!("Skipping display: {}", e);
                continue;
            }
        };

        for item in display.as_ref() {
            let current = index;
            index += 1;
            if visit(current, &display, item) == Flow::Stop {
                return;
            }
        }
    }
}

/// Visit every physical monitor in enumeration order. Handles of a display
/// are released as soon as the walk moves past it.
fn for_each_physical_monitor<F>(mut visit: F) -> Result<(), Box<dyn Error>>
where
    F: FnMut(&Target) -> Flow,
{
    let primary = primary_hmonitor();
    let displays = enumerate_hmonitors()?
        .into_iter()
        .map(PhysicalMonitors::from_hmonitor);

    walk_indexed(displays, |index, display: &PhysicalMonitors, pm: &PhysicalMonitor| {
        visit(&Target {
            index,
            description: decode_description(&pm.description),
            primary: display.hmonitor == primary,
            handle: pm.handle,
        })
    });

    Ok(())
}

/// Run `action` on the physical monitor at `index`.
fn with_physical_monitor<T, F>(index: usize, action: F) -> Result<T, Box<dyn Error>>
where
    F: FnOnce(&Target) -> Result<T, Box<dyn Error>>,
{
    let mut action = Some(action);
    let mut outcome: Option<Result<T, Box<dyn Error>>> = None;

    for_each_physical_monitor(|target| {
        if target.index != index {
            return Flow::Continue;
        }
        if let Some(act) = action.take() {
            outcome = Some(act(target));
        }
        Flow::Stop
    })?;

    outcome.unwrap_or_else(|| Err(format!("No monitor with index {} found", index).into()))
}

// ============================================================================
// Public API
// ============================================================================

/// Result of reading a VCP feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcpValue {
    /// The VCP code that was read.
    pub code: u8,
    /// Current value.
    pub current: u32,
    /// Maximum value (for continuous controls) or 0.
    pub max: u32,
    /// VCP type: 0 = Set Parameter (continuous), 1 = Momentary.
    pub vcp_type: u32,
}

/// List every physical monitor that answers a brightness read.
///
/// Monitors whose brightness cannot be read are logged and left out, but
/// still consume their global index so the remaining indices stay valid
/// for [`set_brightness`] and [`set_power_mode`].
pub fn list_monitors() -> Result<Vec<MonitorInfo>, Box<dyn Error>> {
    let mut result = Vec::new();

    for_each_physical_monitor(|target| {
        let brightness = read_brightness(target.handle);
        result.extend(listing_entry(target.index, &target.description, target.primary, brightness));
        Flow::Continue
    })?;

    debug!("Enumerated {} DDC/CI monitor(s)", result.len());
    Ok(result)
}

/// Set the raw brightness of the monitor at `index`.
pub fn set_brightness(index: usize, value: u32) -> Result<(), Box<dyn Error>> {
    info!("Setting brightness of monitor {} to {}", index, value);
    with_physical_monitor(index, |target| {
        let ok = unsafe { SetMonitorBrightness(target.handle, value) };
        if !ok.as_bool() {
            let err = io::Error::last_os_error();
            return Err(format!(
                "SetMonitorBrightness failed for monitor {} ({}): {}",
                index, target.description, err
            )
            .into());
        }
        info!("Brightness set for monitor {} ({})", index, target.description);
        Ok(())
    })
}

/// Write VCP 0xD6 (power mode) on the monitor at `index`.
pub fn set_power_mode(index: usize, mode: u32) -> Result<(), Box<dyn Error>> {
    info!("Setting power mode of monitor {} to {}", index, mode);
    with_physical_monitor(index, |target| {
        set_vcp_raw(target.handle, VCP_POWER_MODE, mode).map_err(|e| {
            format!(
                "Power mode not applied to monitor {} ({}): {}",
                index, target.description, e
            )
        })?;
        info!("Power mode set for monitor {} ({}), mode={}", index, target.description, mode);
        Ok(())
    })
}

/// Read any VCP code from the monitor at `index`.
pub fn get_vcp(index: usize, vcp_code: u8) -> Result<VcpValue, Box<dyn Error>> {
    with_physical_monitor(index, |target| get_vcp_raw(target.handle, vcp_code))
}

/// Write any VCP code on the monitor at `index`.
pub fn set_vcp(index: usize, vcp_code: u8, value: u32) -> Result<(), Box<dyn Error>> {
    with_physical_monitor(index, |target| set_vcp_raw(target.handle, vcp_code, value))
}

// ============================================================================
// Internal helpers
// ============================================================================

/// Listing entry for one physical monitor, or `None` (logged) when its
/// brightness could not be read.
fn listing_entry(
    index: usize,
    description: &str,
    primary: bool,
    brightness: Result<(u32, u32, u32), Box<dyn Error>>,
) -> Option<MonitorInfo> {
    match brightness {
        Ok((min, current, max)) => Some(MonitorInfo {
            index,
            description: description.to_string(),
            min_brightness: min,
            current_brightness: current,
            max_brightness: max,
            primary,
        }),
        Err(e) => {
            warn!("[{}] {} -> brightness read failed: {}", index, description, e);
            None
        }
    }
}

/// Read the (min, current, max) brightness triple from a physical monitor.
fn read_brightness(handle: HANDLE) -> Result<(u32, u32, u32), Box<dyn Error>> {
    let mut min: u32 = 0;
    let mut current: u32 = 0;
    let mut max: u32 = 0;

    let ok = unsafe { GetMonitorBrightness(handle, &mut min, &mut current, &mut max) };
    if !ok.as_bool() {
        let err = io::Error::last_os_error();
        return Err(format!("GetMonitorBrightness failed: {}", err).into());
    }
    Ok((min, current, max))
}

/// Read a VCP code from a raw physical monitor handle.
fn get_vcp_raw(handle: HANDLE, vcp_code: u8) -> Result<VcpValue, Box<dyn Error>> {
    let mut vcp_type: u32 = 0;
    let mut current: u32 = 0;
    let mut maximum: u32 = 0;

    let ok = unsafe {
        GetVCPFeatureAndVCPFeatureReply(handle, vcp_code, &mut vcp_type, &mut current, &mut maximum)
    };
    if !ok.as_bool() {
        let err = io::Error::last_os_error();
        return Err(format!("GetVCPFeatureAndVCPFeatureReply(0x{:02X}) failed: {}", vcp_code, err).into());
    }

    Ok(VcpValue {
        code: vcp_code,
        current,
        max: maximum,
        vcp_type,
    })
}

/// Write a VCP code to a raw physical monitor handle.
fn set_vcp_raw(handle: HANDLE, vcp_code: u8, value: u32) -> Result<(), Box<dyn Error>> {
    let ok = unsafe { SetVCPFeature(handle, vcp_code, value) };
    if !ok.as_bool() {
        let err = io::Error::last_os_error();
        return Err(format!("SetVCPFeature(0x{:02X}, {}) failed: {}", vcp_code, value, err).into());
    }
    Ok(())
}

/// `HMONITOR` of the primary display: the one containing (0, 0).
fn primary_hmonitor() -> isize {
    let hmon = unsafe { MonitorFromPoint(POINT { x: 0, y: 0 }, MONITOR_DEFAULTTOPRIMARY) };
    hmon.0 as isize
}

/// Enumerate all HMONITOR handles on the system.
fn enumerate_hmonitors() -> Result<Vec<isize>, Box<dyn Error>> {
    let mut handles: Vec<isize> = Vec::new();

    unsafe extern "system" fn callback(
        hmonitor: HMONITOR,
        _hdc: HDC,
        _rect: *mut RECT,
        data: LPARAM,
    ) -> BOOL {
        let vec = &mut *(data.0 as *mut Vec<isize>);
        vec.push(hmonitor.0 as isize);
        BOOL::from(true)
    }

    let ok = unsafe {
        EnumDisplayMonitors(
            HDC::default(),
            None,
            Some(callback),
            LPARAM(&mut handles as *mut Vec<isize> as isize),
        )
    };

    if !ok.as_bool() {
        return Err("EnumDisplayMonitors failed".into());
    }

    Ok(handles)
}

/// Decode the physical monitor description from a null-terminated UTF-16 array.
fn decode_description(raw: &[u16; 128]) -> String {
    let end = raw.iter().position(|&c| c == 0).unwrap_or(raw.len());
    String::from_utf16_lossy(&raw[..end]).trim().to_string()
}

#[cfg(test)]
#[path = "tests/ddc_tests.rs"]
mod tests;
