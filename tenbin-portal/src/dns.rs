//! Wildcard DNS responder
//!
//! Answers every `A` (or `ANY`) question with the access point address so
//! that a joining phone resolves any host to the portal.

use core::net::Ipv4Addr;

/// TTL of synthesized answers
pub const DNS_TTL_SECS: u32 = 60;

const HEADER_LEN: usize = 12;
const TYPE_A: u16 = 1;
const TYPE_ANY: u16 = 255;
const CLASS_IN: u16 = 1;
/// Compression pointer to the question name at offset 12
const NAME_POINTER: [u8; 2] = [0xC0, 0x0C];
const ANSWER_LEN: usize = 16;

/// DNS codec errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DnsError {
    /// Shorter than a header plus question
    TooShort,
    /// Not a standard query (response bit set or no question)
    NotQuery,
    /// Question name could not be walked
    Malformed,
    /// Output buffer cannot hold the response
    BufferTooSmall,
}

/// Build the response to `query` in `out`, returning its length
///
/// Only the first question is answered. Non-`A` questions get an empty
/// answer section.
pub fn answer(query: &[u8], address: Ipv4Addr, out: &mut [u8]) -> Result<usize, DnsError> {
    if query.len() < HEADER_LEN + 5 {
        return Err(DnsError::TooShort);
    }
    let flags = query[2];
    if flags & 0x80 != 0 {
        return Err(DnsError::NotQuery);
    }
    let qdcount = u16::from_be_bytes([query[4], query[5]]);
    if qdcount == 0 {
        return Err(DnsError::NotQuery);
    }

    let name_end = question_name_end(query)?;
    let question_end = name_end + 4;
    if query.len() < question_end {
        return Err(DnsError::TooShort);
    }
    let qtype = u16::from_be_bytes([query[name_end], query[name_end + 1]]);
    let qclass = u16::from_be_bytes([query[name_end + 2], query[name_end + 3]]);
    let answers = (qtype == TYPE_A || qtype == TYPE_ANY) && qclass == CLASS_IN;

    let total = question_end + if answers { ANSWER_LEN } else { 0 };
    if out.len() < total {
        return Err(DnsError::BufferTooSmall);
    }

    // Header: same id, QR | opcode | AA | RD, RA clear, RCODE 0
    out[0] = query[0];
    out[1] = query[1];
    out[2] = 0x80 | (flags & 0x78) | 0x04 | (flags & 0x01);
    out[3] = 0;
    out[4..6].copy_from_slice(&1u16.to_be_bytes());
    out[6..8].copy_from_slice(&u16::from(answers).to_be_bytes());
    out[8..12].fill(0);

    out[HEADER_LEN..question_end].copy_from_slice(&query[HEADER_LEN..question_end]);

    if answers {
        let rr = &mut out[question_end..total];
        rr[0..2].copy_from_slice(&NAME_POINTER);
        rr[2..4].copy_from_slice(&TYPE_A.to_be_bytes());
        rr[4..6].copy_from_slice(&CLASS_IN.to_be_bytes());
        rr[6..10].copy_from_slice(&DNS_TTL_SECS.to_be_bytes());
        rr[10..12].copy_from_slice(&4u16.to_be_bytes());
        rr[12..16].copy_from_slice(&address.octets());
    }

    Ok(total)
}

/// Offset just past the terminating zero label of the first question
fn question_name_end(query: &[u8]) -> Result<usize, DnsError> {
    let mut pos = HEADER_LEN;
    loop {
        let len = *query.get(pos).ok_or(DnsError::TooShort)? as usize;
        if len == 0 {
            return Ok(pos + 1);
        }
        if len > 63 {
            // Pointers and extended labels are not valid in a query name
            return Err(DnsError::Malformed);
        }
        pos += 1 + len;
    }
}
