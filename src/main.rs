//! # Fake Joy
//!
//! Drive joystick-consuming robot software from a keyboard.
//!
//! This application reads keystrokes from the terminal, maps them to the
//! buttons of a Logitech F710 gamepad and publishes the button vector on the
//! bus at a fixed rate.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info};

use fake_joy::bus::transport::UdpTransport;
use fake_joy::bus::Bus;
use fake_joy::config::Config;
use fake_joy::controller::teleop::Controller;
use fake_joy::display::terminal::CrosstermGrid;
use fake_joy::display::TextWindow;
use fake_joy::logging;

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for Fake Joy
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, else `config/default.toml`,
///      else built-in defaults)
///    - Set up file logging
///    - Bind the bus socket and take over the terminal
///
/// 2. **Main Loop**
///    - Drain keys, render, publish, reset, sleep until the next tick
///
/// 3. **Shutdown**
///    - `q`, Ctrl+C or SIGINT stops the loop
///    - The terminal is restored before exit
///
/// # Errors
///
/// Returns error if:
/// - The configuration cannot be loaded
/// - The log directory or bus socket cannot be set up
/// - stdout is not a terminal
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = load_config()?;
    let _guard = logging::init(&config.logging).context("Failed to set up logging")?;

    info!("Fake Joy v{} starting...", env!("CARGO_PKG_VERSION"));

    let transport = UdpTransport::bind(config.bind_addr()?, config.target_addr()?)
        .await
        .context("Failed to bind bus socket")?;
    let bus = Bus::new(&config.bus.node_name, transport);

    let grid = CrosstermGrid::open().context("Failed to open terminal")?;
    let window = TextWindow::new(grid, config.display.lines, config.display.margin)?;
    let mut controller = Controller::new(window, bus, &config)?;

    let result = controller.run().await;
    // Restore the terminal before anything is printed
    drop(controller);

    if let Err(e) = &result {
        error!("Teleop loop failed: {}", e);
    }
    info!("Bye");
    Ok(result?)
}

fn load_config() -> Result<Config> {
    match std::env::args().nth(1) {
        Some(path) => Config::load(&path).with_context(|| format!("Failed to load {}", path)),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("Failed to load {}", DEFAULT_CONFIG_PATH)),
        None => Ok(Config::default()),
    }
}
