//! Scan result JSON

use core::fmt::Write;

use heapless::String;
use tenbin_hal::WifiNetwork;

/// Worst case for one entry: every SSID byte escaped as `\u00XX`
const ENTRY_LEN: usize = 256;

/// Render `[{"ssid":..,"rssi":..,"secure":..}, ...]`
///
/// Entries that would overflow `N` are dropped so the output is always
/// valid JSON.
pub(crate) fn scan_json<const N: usize>(networks: &[WifiNetwork]) -> String<N> {
    let mut out: String<N> = String::new();
    let _ = out.push('[');

    for network in networks {
        let mut entry: String<ENTRY_LEN> = String::new();
        if write_entry(&mut entry, network).is_err() {
            continue;
        }
        let separator = if out.len() > 1 { 1 } else { 0 };
        // Leave room for the closing bracket
        if out.len() + separator + entry.len() + 1 > N {
            break;
        }
        if separator == 1 {
            let _ = out.push(',');
        }
        let _ = out.push_str(&entry);
    }

    let _ = out.push(']');
    out
}

fn write_entry<W: Write>(out: &mut W, network: &WifiNetwork) -> core::fmt::Result {
    out.write_str("{\"ssid\":\"")?;
    for c in network.ssid.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    write!(
        out,
        "\",\"rssi\":{},\"secure\":{}}}",
        network.rssi, network.secure
    )
}
