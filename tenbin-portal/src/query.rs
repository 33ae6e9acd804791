//! `application/x-www-form-urlencoded` decoding

use heapless::{String, Vec};

/// Form decoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueryError {
    /// `%` not followed by two hex digits
    InvalidEscape,
    /// Decoded value exceeds the destination capacity
    TooLong,
    /// Decoded bytes are not UTF-8
    InvalidUtf8,
}

/// Raw value for `key` in an encoded `a=1&b=2` string
///
/// A key present without `=` yields an empty value.
pub fn lookup<'a>(encoded: &'a str, key: &str) -> Option<&'a str> {
    encoded
        .split('&')
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (k == key).then_some(v)
        })
}

/// Percent-decode a form value, treating `+` as space
pub fn decode<const N: usize>(raw: &str) -> Result<String<N>, QueryError> {
    let input = raw.as_bytes();
    let mut bytes: Vec<u8, N> = Vec::new();
    let mut i = 0;

    while i < input.len() {
        let byte = match input[i] {
            b'+' => {
                i += 1;
                b' '
            }
            b'%' => {
                let hi = input.get(i + 1).and_then(|b| hex_value(*b));
                let lo = input.get(i + 2).and_then(|b| hex_value(*b));
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        i += 3;
                        (hi << 4) | lo
                    }
                    _ => return Err(QueryError::InvalidEscape),
                }
            }
            other => {
                i += 1;
                other
            }
        };
        bytes.push(byte).map_err(|_| QueryError::TooLong)?;
    }

    let text = core::str::from_utf8(&bytes).map_err(|_| QueryError::InvalidUtf8)?;
    let mut out = String::new();
    out.push_str(text).map_err(|_| QueryError::TooLong)?;
    Ok(out)
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}
