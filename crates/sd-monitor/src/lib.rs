//! Physical monitor enumeration and DDC/CI control.
//!
//! The [`ddc`] module talks to `dxva2.dll`; [`DdcController`] exposes it to
//! the rest of ShadowDesk through [`sd_core::session::MonitorControl`].

pub mod ddc;

use sd_core::monitor::MonitorInfo;
use sd_core::session::MonitorControl;
use std::error::Error;

/// The real hardware backend. Stateless: every call runs a fresh
/// enumeration pass, so indices are those of the latest
/// [`MonitorControl::list_monitors`] as long as the display topology has
/// not changed in between.
#[derive(Debug, Default, Clone, Copy)]
pub struct DdcController;

impl DdcController {
    pub fn new() -> Self {
        Self
    }
}

impl MonitorControl for DdcController {
    fn list_monitors(&self) -> Result<Vec<MonitorInfo>, Box<dyn Error>> {
        ddc::list_monitors()
    }

    fn set_brightness(&self, index: usize, value: u32) -> Result<(), Box<dyn Error>> {
        ddc::set_brightness(index, value)
    }

    fn set_power_mode(&self, index: usize, mode: u32) -> Result<(), Box<dyn Error>> {
        ddc::set_power_mode(index, mode)
    }
}
