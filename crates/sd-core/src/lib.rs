//! Shared building blocks for ShadowDesk.
//!
//! Everything here is free of Win32 calls so it can be exercised on any
//! host: the TOML configuration, the monitor model and its primary-first
//! ordering, hotkey bindings, and the [`session::Session`] that tracks
//! which monitors have been put into standby.

pub mod config;
pub mod hotkey;
pub mod monitor;
pub mod session;
