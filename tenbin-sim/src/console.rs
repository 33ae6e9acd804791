//! Stdin debug console
//!
//! A reader thread parses one command per line and queues it for the tick
//! task, which applies it between ticks.
//!
//! ```text
//! a | b               tap a button
//! down a|b / up a|b   press or release
//! hold a|b <ms>       press, release after <ms>
//! wifi <ssid> [pass]  submit credentials through the portal
//! screen <n>          jump to a screen by discriminant
//! quit
//! ```

use std::io::BufRead;
use std::thread;

use anyhow::{bail, Context, Result};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{info, warn};
use tenbin_hal::Button;

/// Channel capacity for console commands
const CONSOLE_CHANNEL_SIZE: usize = 8;

/// Parsed console commands, consumed by the tick task
pub static CONSOLE_CHANNEL: Channel<CriticalSectionRawMutex, Command, CONSOLE_CHANNEL_SIZE> =
    Channel::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Tap(Button),
    Down(Button),
    Up(Button),
    Hold(Button, u32),
    Wifi { ssid: String, password: String },
    Screen(u8),
    Help,
    Quit,
}

pub const HELP: &str = "commands: a | b | down <a|b> | up <a|b> | hold <a|b> <ms> | \
                        wifi <ssid> [password] | screen <n> | help | quit";

fn parse_button(token: Option<&str>) -> Result<Button> {
    match token.map(str::to_ascii_lowercase).as_deref() {
        Some("a") => Ok(Button::A),
        Some("b") => Ok(Button::B),
        Some(other) => bail!("unknown button {:?}", other),
        None => bail!("missing button"),
    }
}

/// Parse one console line; blank lines yield `None`
pub fn parse(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim_start();
    let mut args = rest.split_whitespace();

    let command = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "a" => Command::Tap(Button::A),
        "b" => Command::Tap(Button::B),
        "down" => Command::Down(parse_button(args.next())?),
        "up" => Command::Up(parse_button(args.next())?),
        "hold" => {
            let button = parse_button(args.next())?;
            let ms = args
                .next()
                .context("missing hold duration")?
                .parse()
                .context("hold duration must be milliseconds")?;
            Command::Hold(button, ms)
        }
        "wifi" => {
            // Everything after the SSID is the password, spaces included
            let (ssid, password) = rest.split_once(' ').unwrap_or((rest, ""));
            if ssid.is_empty() {
                bail!("usage: wifi <ssid> [password]");
            }
            Command::Wifi {
                ssid: ssid.to_string(),
                password: password.to_string(),
            }
        }
        "screen" => {
            let raw = args
                .next()
                .context("missing screen number")?
                .parse()
                .context("screen must be 0-255")?;
            Command::Screen(raw)
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command {:?}", other),
    };
    Ok(Some(command))
}

/// Start the stdin reader thread
pub fn spawn_reader() -> Result<()> {
    thread::Builder::new()
        .name("console".into())
        .spawn(|| {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("Console read failed: {}", e);
                        break;
                    }
                };
                match parse(&line) {
                    Ok(Some(command)) => {
                        if CONSOLE_CHANNEL.try_send(command).is_err() {
                            warn!("Console queue full, command dropped");
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!("{:#}. {}", e, HELP),
                }
            }
            info!("Console closed");
        })
        .context("spawning console thread")?;
    Ok(())
}
