//! ShadowDesk: DDC/CI brightness and standby control.
//!
//! Without a command it runs the tray app: a menu per monitor plus global
//! `Alt+1`…`Alt+N` hotkeys that put monitors into standby and wake them.
//! The subcommands drive the same DDC/CI calls from a console.

use clap::{Parser, Subcommand};
use sd_core::config::{self, Config};
use sd_core::hotkey;
use sd_core::monitor::{self, PowerMode, VCP_BRIGHTNESS, VCP_POWER_MODE};
use sd_core::session::Session;
use sd_monitor::{ddc, DdcController};
use std::error::Error;
use std::fs::OpenOptions;

#[derive(Parser)]
#[command(
    name = "shadowdesk",
    version,
    about = "DDC/CI monitor brightness and standby control",
    long_about = "Controls monitor brightness and power state over DDC/CI.\n\n\
        Run without a command to start the tray icon with global hotkeys\n\
        (Alt+1 … Alt+N toggle standby of the N-th monitor, primary first)."
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the tray icon and hotkeys (default)
    Tray,

    /// List DDC/CI monitors, primary first
    List,

    /// Set monitor brightness
    Brightness {
        /// Global monitor index (see `list`)
        index: usize,

        /// Brightness in percent of the monitor's range
        value: u32,

        /// Send VALUE to the monitor unmapped
        #[arg(long)]
        raw: bool,
    },

    /// Put a monitor into standby (config `standby_mode`)
    Standby {
        /// Global monitor index (see `list`)
        index: usize,
    },

    /// Wake a monitor (config `wake_mode`)
    Wake {
        /// Global monitor index (see `list`)
        index: usize,
    },

    /// Read or write the power mode (VCP 0xD6)
    Power {
        /// Global monitor index (see `list`)
        index: usize,

        /// on, standby, suspend, off, hard-off or 1–5; omit to read
        mode: Option<String>,
    },

    /// Read or write a raw VCP code
    Vcp {
        /// Global monitor index (see `list`)
        index: usize,

        /// VCP code: hex (0x10), decimal, `brightness` or `power`
        code: String,

        /// Value to write; omit to read
        value: Option<u32>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print config file path
    Path,
    /// Reset config to defaults
    Reset,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // Logger first so config load and parse messages are not lost.
    match cli.command {
        None | Some(Commands::Tray) => init_tray_logger(cli.verbose),
        Some(_) => init_console_logger(cli.verbose),
    }

    let cfg = Config::load();
    if cfg.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    match cli.command {
        None | Some(Commands::Tray) => sd_tray::run(cfg)?,
        Some(Commands::List) => cmd_list(&cfg)?,
        Some(Commands::Brightness { index, value, raw }) => cmd_brightness(cfg, index, value, raw)?,
        Some(Commands::Standby { index }) => cmd_power_write(index, cfg.standby_mode)?,
        Some(Commands::Wake { index }) => cmd_power_write(index, cfg.wake_mode)?,
        Some(Commands::Power { index, mode }) => cmd_power(index, mode)?,
        Some(Commands::Vcp { index, code, value }) => cmd_vcp(index, &code, value)?,
        Some(Commands::Config { action }) => cmd_config(&cfg, action)?,
    }

    Ok(())
}

fn level(verbose: bool, default: log::LevelFilter) -> log::LevelFilter {
    if verbose {
        log::LevelFilter::Debug
    } else {
        default
    }
}

/// The logger itself passes everything up to `Debug`; the effective level
/// is the global max level, which `verbose = true` in the config can raise
/// once the config has been read.
fn install(mut builder: env_logger::Builder, max: log::LevelFilter) {
    builder.filter_level(log::LevelFilter::Debug).init();
    log::set_max_level(max);
}

/// CLI mode: console logger on stderr.
fn init_console_logger(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder.format_timestamp(None);
    install(builder, level(verbose, log::LevelFilter::Warn));
}

/// Tray mode has no console to rely on; log to `shadowdesk.log` next to
/// the config, or stderr if that file cannot be opened.
fn init_tray_logger(verbose: bool) {
    let mut builder = env_logger::Builder::new();

    let path = config::log_path();
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(e) => eprintln!("[WARN] Cannot open log file {}: {}", path.display(), e),
    }

    install(builder, level(verbose, log::LevelFilter::Info));
}

// ============================================================================
// Command implementations
// ============================================================================

fn cmd_list(cfg: &Config) -> Result<(), Box<dyn Error>> {
    let mut monitors = ddc::list_monitors()?;
    monitor::sort_primary_first(&mut monitors);

    if monitors.is_empty() {
        println!("No DDC/CI monitors found.");
        return Ok(());
    }

    let bindings = if cfg.hotkeys_enabled {
        hotkey::bindings_from_config(cfg).unwrap_or_else(|e| {
            log::warn!("Hotkeys disabled: {}", e);
            Vec::new()
        })
    } else {
        Vec::new()
    };

    println!("Found {} monitor(s):\n", monitors.len());
    for (position, info) in monitors.iter().enumerate() {
        let key = hotkey::label_for_position(&bindings, position).unwrap_or_else(|| "-".to_string());
        println!("  {:<10} {}", key, info);
    }

    Ok(())
}

fn cmd_brightness(cfg: Config, index: usize, value: u32, raw: bool) -> Result<(), Box<dyn Error>> {
    if raw {
        ddc::set_brightness(index, value)?;
        println!("[OK] Monitor {} brightness set to raw {}", index, value);
        return Ok(());
    }

    if value > 100 {
        return Err(format!("Brightness {} is out of range (0–100, use --raw for device units)", value).into());
    }

    let mut session = Session::new(DdcController::new(), cfg);
    session.set_brightness_percent(index, value)?;
    println!("[OK] Monitor {} brightness set to {}%", index, value);
    Ok(())
}

fn cmd_power_write(index: usize, mode: u32) -> Result<(), Box<dyn Error>> {
    ddc::set_power_mode(index, mode)?;
    match PowerMode::from_vcp(mode) {
        Some(m) => println!("[OK] Monitor {} power mode set to {} ({})", index, mode, m),
        None => println!("[OK] Monitor {} power mode set to {}", index, mode),
    }
    Ok(())
}

fn cmd_power(index: usize, mode: Option<String>) -> Result<(), Box<dyn Error>> {
    match mode {
        Some(text) => {
            let mode: PowerMode = text.parse()?;
            cmd_power_write(index, mode.vcp_value())
        }
        None => {
            let value = ddc::get_vcp(index, VCP_POWER_MODE)?;
            match PowerMode::from_vcp(value.current) {
                Some(m) => println!("Monitor {}: power mode {} ({})", index, value.current, m),
                None => println!("Monitor {}: power mode {} (unknown)", index, value.current),
            }
            Ok(())
        }
    }
}

/// Parse a VCP code given as hex, decimal or one of the known names.
fn parse_vcp_code(text: &str) -> Result<u8, String> {
    let trimmed = text.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "brightness" => return Ok(VCP_BRIGHTNESS),
        "power" => return Ok(VCP_POWER_MODE),
        _ => {}
    }

    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => trimmed.parse::<u8>(),
    };
    parsed.map_err(|_| format!("invalid VCP code '{}'", text))
}

fn cmd_vcp(index: usize, code: &str, value: Option<u32>) -> Result<(), Box<dyn Error>> {
    let code = parse_vcp_code(code)?;

    match value {
        Some(v) => {
            ddc::set_vcp(index, code, v)?;
            println!("[OK] Monitor {} VCP 0x{:02X} set to {}", index, code, v);
        }
        None => {
            let reply = ddc::get_vcp(index, code)?;
            println!(
                "Monitor {}: VCP 0x{:02X} current={} max={} type={}",
                index, reply.code, reply.current, reply.max, reply.vcp_type
            );
        }
    }
    Ok(())
}

fn cmd_config(cfg: &Config, action: Option<ConfigAction>) -> Result<(), Box<dyn Error>> {
    match action {
        None | Some(ConfigAction::Show) => {
            let path = config::config_path();
            println!("Config file: {}\n", path.display());
            println!("── Hotkeys ──");
            println!("  hotkeys_enabled  = {}", cfg.hotkeys_enabled);
            println!("  hotkey_modifiers = \"{}\"", cfg.hotkey_modifiers);
            println!("  hotkey_count     = {}", cfg.hotkey_count);
            println!("\n── Power Modes ──");
            println!("  standby_mode     = {}", cfg.standby_mode);
            println!("  wake_mode        = {}", cfg.wake_mode);
            println!("  wake_on_exit     = {}", cfg.wake_on_exit);
            println!("\n── Tray ──");
            println!("  tray_tooltip     = \"{}\"", cfg.tray_tooltip);
            println!("\n── Debug ──");
            println!("  verbose          = {}", cfg.verbose);
        }
        Some(ConfigAction::Path) => {
            println!("{}", config::config_path().display());
        }
        Some(ConfigAction::Reset) => {
            Config::write_default()?;
            println!(
                "[OK] Config reset to defaults at {}",
                config::config_path().display()
            );
        }
    }
    Ok(())
}
