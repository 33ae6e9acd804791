//! Tenbin - host simulator
//!
//! Runs the control core against the emulated board: buttons come from a
//! stdin console, the display is a text frame on stdout, and the captive
//! portal listens on local TCP/UDP sockets so a browser (or `curl`) can
//! play the phone.
//!
//! Named after the Japanese 天秤 ("balance scale").

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use embassy_executor::Executor;
use log::{info, LevelFilter};
use static_cell::StaticCell;

use tenbin_core::config::PortVariant;
use tenbin_core::{App, VersionInfo};
use tenbin_drivers::EmulatedPort;

mod config;
mod console;
mod delay;
mod display;
mod portal;
mod store;
mod tasks;

use crate::config::SimConfig;
use crate::delay::StdDelay;
use crate::display::TerminalDisplay;
use crate::portal::TcpPortal;
use crate::store::FileCredentialStore;
use crate::tasks::SimApp;

/// Firmware identity shown on the version screen
const VERSION: VersionInfo = VersionInfo::new(
    concat!("tenbin ", env!("CARGO_PKG_VERSION")),
    env!("BUILD_TIMESTAMP"),
);

static EXECUTOR: StaticCell<Executor> = StaticCell::new();

#[derive(Debug, Parser)]
#[command(version, about = "Tenbin device simulator")]
struct Args {
    /// TOML configuration (defaults to the embedded tenbin.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding persisted state (stored WiFi credentials)
    #[arg(long, default_value = ".tenbin")]
    state_dir: PathBuf,

    /// Log level; RUST_LOG overrides it
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn build_app(config: SimConfig, state_dir: PathBuf) -> Result<SimApp> {
    if config.device.variant == PortVariant::Physical {
        bail!("the physical variant needs board peripherals; only `emulated` runs on the host");
    }

    fs::create_dir_all(&state_dir)
        .with_context(|| format!("creating state directory {}", state_dir.display()))?;
    let store = FileCredentialStore::new(state_dir.join(&config.device.credentials_file));
    info!("Credentials file: {}", store.path().display());

    let port = EmulatedPort::new(store, config.device.emulated_options()?);
    let web = TcpPortal::new(config.portal.bind);
    let display = TerminalDisplay::new(std::io::stdout());

    Ok(App::new(config.app, port, web, display, StdDelay, VERSION))
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level)
        .parse_default_env()
        .init();

    info!("Tenbin simulator starting...");

    let config = SimConfig::load(args.config.as_deref())?;
    let interval_ms = config.app.tick_interval_ms;

    let mut app = build_app(config, args.state_dir)?;
    app.boot();

    console::spawn_reader()?;
    info!("{}", console::HELP);

    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| {
        spawner.must_spawn(tasks::tick_task(app, interval_ms));
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenbin_core::state::ScreenState;
    use tenbin_hal::CredentialStore;

    #[test]
    fn test_build_timestamp_format() {
        let stamp = VERSION.build.as_bytes();
        assert_eq!(stamp.len(), "2026/10/16 09:30".len());
        for (i, byte) in stamp.iter().enumerate() {
            match i {
                4 | 7 => assert_eq!(*byte, b'/'),
                10 => assert_eq!(*byte, b' '),
                13 => assert_eq!(*byte, b':'),
                _ => assert!(byte.is_ascii_digit()),
            }
        }
    }

    #[test]
    fn test_physical_variant_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SimConfig::default();
        config.device.variant = PortVariant::Physical;
        assert!(build_app(config, dir.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_stored_credentials_boot_to_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileCredentialStore::new(dir.path().join("wifi.toml"));
        store
            .store(&tenbin_hal::WifiCredentials::new("HomeWiFi_2.4G", "secret").unwrap())
            .unwrap();

        let mut app = build_app(SimConfig::default(), dir.path().to_path_buf()).unwrap();
        app.boot();
        assert_eq!(app.screen(), ScreenState::Start);
    }

    #[test]
    fn test_console_submission_provisions() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SimConfig::default();
        // Let the OS pick free ports
        config.app.provisioning.http_port = 0;
        config.app.provisioning.dns_port = 0;

        let mut app = build_app(config, dir.path().to_path_buf()).unwrap();
        app.boot();
        assert_eq!(app.screen(), ScreenState::ProvisioningSetup);

        app.web_mut().inject_submission("HomeWiFi_2.4G", "secret");
        app.tick(10);
        app.tick(20);
        assert_eq!(app.screen(), ScreenState::Start);
        assert!(dir.path().join("wifi.toml").exists());
    }
}
