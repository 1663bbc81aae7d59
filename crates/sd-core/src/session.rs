//! Running state of the tray app, independent of any window.
//!
//! A [`Session`] owns the primary-first monitor list from the last
//! enumeration and the set of global indices it has put into standby.
//! All hardware access goes through [`MonitorControl`], implemented for
//! real by `sd_monitor::DdcController`.

use log::{error, info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt;

use crate::config::Config;
use crate::monitor::{self, MonitorInfo};

/// Hardware seam: enumerate monitors and write DDC/CI values by global index.
pub trait MonitorControl {
    /// Enumerate physical monitors that answered a brightness read.
    fn list_monitors(&self) -> Result<Vec<MonitorInfo>, Box<dyn Error>>;

    /// Write a raw brightness value to the monitor at `index`.
    fn set_brightness(&self, index: usize, value: u32) -> Result<(), Box<dyn Error>>;

    /// Write VCP 0xD6 (power mode) to the monitor at `index`.
    fn set_power_mode(&self, index: usize, mode: u32) -> Result<(), Box<dyn Error>>;
}

/// What a standby toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Standby,
    Wake,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Standby => f.write_str("Standby"),
            Transition::Wake => f.write_str("Wake"),
        }
    }
}

pub struct Session<C> {
    control: C,
    config: Config,
    monitors: Vec<MonitorInfo>,
    standby: BTreeSet<usize>,
}

impl<C: MonitorControl> Session<C> {
    /// Create a session and run the first enumeration.
    pub fn new(control: C, config: Config) -> Self {
        let mut session = Self {
            control,
            config,
            monitors: Vec::new(),
            standby: BTreeSet::new(),
        };
        session.reload();
        session
    }

    /// Re-enumerate monitors (primary first) and forget standby state.
    pub fn reload(&mut self) {
        self.monitors = match self.control.list_monitors() {
            Ok(mut monitors) => {
                monitor::sort_primary_first(&mut monitors);
                monitors
            }
            Err(e) => {
                error!("Monitor enumeration failed: {}", e);
                Vec::new()
            }
        };
        self.standby.clear();

        info!("Monitors reloaded (primary first): {}", self.monitors.len());
        for info in &self.monitors {
            info!("  {}", info);
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    /// Monitors in position order (primary first).
    pub fn monitors(&self) -> &[MonitorInfo] {
        &self.monitors
    }

    pub fn monitor_at(&self, position: usize) -> Option<&MonitorInfo> {
        self.monitors.get(position)
    }

    pub fn find_by_index(&self, index: usize) -> Option<&MonitorInfo> {
        self.monitors.iter().find(|m| m.index == index)
    }

    pub fn is_in_standby(&self, index: usize) -> bool {
        self.standby.contains(&index)
    }

    pub fn standby_indices(&self) -> Vec<usize> {
        self.standby.iter().copied().collect()
    }

    /// Put a known monitor into standby. It is marked even when the DDC
    /// write reports failure: many monitors go dark and still return an
    /// error, and the next toggle must then wake them.
    pub fn standby(&mut self, index: usize) -> Result<(), Box<dyn Error>> {
        let result = self.control.set_power_mode(index, self.config.standby_mode);
        if self.find_by_index(index).is_some() {
            self.standby.insert(index);
        }
        match &result {
            Ok(()) => info!("Monitor {} -> Standby", index),
            Err(e) => warn!("Monitor {} -> Standby reported failure: {}", index, e),
        }
        result
    }

    /// Wake a monitor. It leaves the standby set whatever the DDC write
    /// returns.
    pub fn wake(&mut self, index: usize) -> Result<(), Box<dyn Error>> {
        let result = self.control.set_power_mode(index, self.config.wake_mode);
        self.standby.remove(&index);
        match &result {
            Ok(()) => info!("Monitor {} -> Wake", index),
            Err(e) => warn!("Monitor {} -> Wake reported failure: {}", index, e),
        }
        result
    }

    /// Wake the monitor if this session put it into standby, otherwise
    /// put it into standby. The standby set follows the requested state
    /// even when the DDC write fails; the error is still returned.
    pub fn toggle_standby(&mut self, index: usize) -> Result<Transition, Box<dyn Error>> {
        if self.standby.contains(&index) {
            self.wake(index)?;
            Ok(Transition::Wake)
        } else {
            self.standby(index)?;
            Ok(Transition::Standby)
        }
    }

    /// Toggle the monitor at `position` in the primary-first list
    /// (hotkey `Alt+(position+1)`).
    pub fn toggle_position(&mut self, position: usize) -> Result<Transition, Box<dyn Error>> {
        let index = match self.monitors.get(position) {
            Some(info) => info.index,
            None => {
                return Err(format!(
                    "No monitor for {}+{} ({} known)",
                    self.config.hotkey_modifiers,
                    position + 1,
                    self.monitors.len()
                )
                .into())
            }
        };
        self.toggle_standby(index)
    }

    /// Set brightness from a 0–100 slider value, mapped onto the monitor's
    /// own range. The cached brightness follows on success.
    pub fn set_brightness_percent(&mut self, index: usize, percent: u32) -> Result<(), Box<dyn Error>> {
        let raw = match self.find_by_index(index) {
            Some(info) => info.raw_brightness_for_percent(percent),
            None => return Err(format!("No monitor with index {}", index).into()),
        };
        self.control.set_brightness(index, raw)?;
        if let Some(info) = self.monitors.iter_mut().find(|m| m.index == index) {
            info.current_brightness = raw;
        }
        info!("Monitor {} brightness -> {}% (raw {})", index, percent.min(100), raw);
        Ok(())
    }

    /// Wake every monitor still in standby. Returns how many woke.
    pub fn wake_all(&mut self) -> usize {
        let mut woken = 0usize;
        for index in self.standby_indices() {
            match self.wake(index) {
                Ok(()) => woken += 1,
                Err(e) => warn!("Could not wake monitor {}: {}", index, e),
            }
        }
        woken
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
