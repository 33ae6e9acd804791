//! Label-slot render surface

use core::fmt::{self, Write};

use heapless::String;

/// Maximum bytes per label
pub const LINE_LEN: usize = 64;

/// Maximum bytes of QR payload (a portal URL)
pub const QR_PAYLOAD_LEN: usize = 48;

/// Number of label slots
pub const LABEL_COUNT: usize = 7;

/// Label slots on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Label {
    Title = 0,
    /// Free text under the title (SSID, version text)
    Body = 1,
    /// Portal address or secondary body text
    Detail = 2,
    Accel = 3,
    Battery = 4,
    /// Transient feedback line
    Status = 5,
    /// Prompt line at the bottom
    Instruction = 6,
}

impl Label {
    /// All labels in draw order
    pub const ALL: [Label; LABEL_COUNT] = [
        Label::Title,
        Label::Body,
        Label::Detail,
        Label::Accel,
        Label::Battery,
        Label::Status,
        Label::Instruction,
    ];
}

/// Render surface
///
/// Holds the text of every label on the active screen plus an optional QR
/// payload. The dirty flag is raised by every mutation and cleared once a
/// backend has presented the content.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    labels: [String<LINE_LEN>; LABEL_COUNT],
    qr_payload: Option<String<QR_PAYLOAD_LEN>>,
    dirty: bool,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    /// Create an empty surface
    pub fn new() -> Self {
        Self {
            labels: core::array::from_fn(|_| String::new()),
            qr_payload: None,
            dirty: true,
        }
    }

    /// Blank every label and drop the QR payload
    pub fn clear(&mut self) {
        for label in &mut self.labels {
            label.clear();
        }
        self.qr_payload = None;
        self.dirty = true;
    }

    /// Replace a label's text, truncating on a character boundary
    pub fn set(&mut self, label: Label, text: &str) {
        let slot = &mut self.labels[label as usize];
        if slot.as_str() == text {
            return;
        }
        slot.clear();
        let _ = slot.push_str(truncate(text, LINE_LEN));
        self.dirty = true;
    }

    /// Replace a label's text with formatted output
    ///
    /// Output beyond [`LINE_LEN`] is dropped.
    pub fn set_fmt(&mut self, label: Label, args: fmt::Arguments<'_>) {
        let mut line: String<LINE_LEN> = String::new();
        let _ = line.write_fmt(args);
        self.set(label, line.as_str());
    }

    /// Blank one label
    pub fn clear_label(&mut self, label: Label) {
        self.set(label, "");
    }

    /// Text of a label
    pub fn get(&self, label: Label) -> &str {
        self.labels[label as usize].as_str()
    }

    /// Set or drop the QR payload
    pub fn set_qr_payload(&mut self, payload: Option<&str>) {
        self.qr_payload = payload.map(|p| {
            let mut s = String::new();
            let _ = s.push_str(truncate(p, QR_PAYLOAD_LEN));
            s
        });
        self.dirty = true;
    }

    pub fn qr_payload(&self) -> Option<&str> {
        self.qr_payload.as_ref().map(|s| s.as_str())
    }

    /// Non-empty labels in draw order
    pub fn labels(&self) -> impl Iterator<Item = (Label, &str)> {
        Label::ALL
            .into_iter()
            .map(move |label| (label, self.get(label)))
            .filter(|(_, text)| !text.is_empty())
    }

    /// Check if the surface needs presenting
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark surface as clean (after presenting)
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Mark surface as dirty (needs presenting)
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

/// Longest prefix of `text` that fits in `max` bytes
fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(feature = "defmt")]
impl defmt::Format for Surface {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Surface[");
        for (i, (_, text)) in self.labels().enumerate() {
            if i > 0 {
                defmt::write!(f, ", ");
            }
            defmt::write!(f, "{}", text);
        }
        defmt::write!(f, "]");
    }
}
