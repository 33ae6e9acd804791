//! Tick task
//!
//! Drives [`App::tick`](tenbin_core::App::tick) at the configured period
//! and applies console commands between ticks.

use std::io::Stdout;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Instant, Ticker};
use log::{info, warn};
use tenbin_core::{App, Lifecycle};
use tenbin_drivers::EmulatedPort;
use tenbin_hal::Button;

use crate::console::{Command, CONSOLE_CHANNEL, HELP};
use crate::delay::StdDelay;
use crate::display::TerminalDisplay;
use crate::portal::TcpPortal;
use crate::store::FileCredentialStore;

pub type SimPort = EmulatedPort<FileCredentialStore>;

pub type SimApp =
    App<SimPort, TcpPortal, TerminalDisplay<Stdout>, StdDelay, CriticalSectionRawMutex>;

/// Scheduled button releases, by button index (ms timestamps)
#[derive(Debug, Default)]
struct Releases([Option<u32>; 2]);

impl Releases {
    fn schedule(&mut self, button: Button, at_ms: u32) {
        self.0[button.index()] = Some(at_ms);
    }

    fn cancel(&mut self, button: Button) {
        self.0[button.index()] = None;
    }

    /// Take every release due at `now_ms`
    fn due(&mut self, now_ms: u32) -> impl Iterator<Item = Button> + '_ {
        Button::ALL.into_iter().filter(move |b| {
            let slot = &mut self.0[b.index()];
            match *slot {
                Some(at) if now_ms.wrapping_sub(at) < u32::MAX / 2 => {
                    *slot = None;
                    true
                }
                _ => false,
            }
        })
    }
}

/// Apply one console command; returns false on quit
fn apply(app: &mut SimApp, command: Command, now_ms: u32, releases: &mut Releases) -> bool {
    match command {
        Command::Tap(button) => {
            app.port_mut().press(button);
            releases.schedule(button, now_ms.wrapping_add(1));
        }
        Command::Down(button) => {
            releases.cancel(button);
            app.port_mut().press(button);
        }
        Command::Up(button) => {
            releases.cancel(button);
            app.port_mut().release(button);
        }
        Command::Hold(button, ms) => {
            app.port_mut().press(button);
            releases.schedule(button, now_ms.wrapping_add(ms));
        }
        Command::Wifi { ssid, password } => {
            if app.web_mut().is_running() {
                app.web_mut().inject_submission(&ssid, &password);
            } else {
                warn!("Captive portal is not running");
            }
        }
        Command::Screen(raw) => match app.force_screen(raw) {
            Ok(screen) => info!("Forced screen {:?}", screen),
            Err(e) => warn!("Screen jump refused: {:?}", e),
        },
        Command::Help => println!("{}", HELP),
        Command::Quit => return false,
    }
    true
}

/// Tick task - runs the application until quit or restart
#[embassy_executor::task]
pub async fn tick_task(mut app: SimApp, interval_ms: u32) {
    info!("Tick task started ({} ms)", interval_ms);

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(interval_ms.max(1))));
    let start = Instant::now();
    let mut releases = Releases::default();

    loop {
        ticker.next().await;

        let now_ms = start.elapsed().as_millis() as u32;

        while let Ok(command) = CONSOLE_CHANNEL.try_receive() {
            if !apply(&mut app, command, now_ms, &mut releases) {
                info!("Quit requested");
                std::process::exit(0);
            }
        }
        for button in releases.due(now_ms).collect::<Vec<_>>() {
            app.port_mut().release(button);
        }

        if app.tick(now_ms) == Lifecycle::Restarting {
            info!("Device restart requested, exiting");
            std::process::exit(0);
        }
    }
}
