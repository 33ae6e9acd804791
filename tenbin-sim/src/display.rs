//! Terminal display backend
//!
//! Renders each presented surface as a boxed text frame. QR codes are
//! shown as their payload.

use std::io::Write;

use tenbin_core::render::{DisplayBackend, DisplayError, Label};

/// Inner width of the frame, in characters
const WIDTH: usize = 30;

pub struct TerminalDisplay<W: Write> {
    out: W,
    lines: Vec<String>,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            lines: Vec::new(),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn push(&mut self, text: &str) {
        for line in text.lines() {
            let clipped: String = line.chars().take(WIDTH).collect();
            self.lines.push(clipped);
        }
    }
}

impl<W: Write> DisplayBackend for TerminalDisplay<W> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.lines.clear();
        Ok(())
    }

    fn draw_label(&mut self, label: Label, text: &str) -> Result<(), DisplayError> {
        if label == Label::Status && !self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.push(text);
        Ok(())
    }

    fn draw_qr(&mut self, payload: &str) -> Result<(), DisplayError> {
        self.push(&format!("[QR] {}", payload));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let border = "─".repeat(WIDTH + 2);
        let mut frame = format!("┌{}┐\n", border);
        for line in &self.lines {
            let pad = WIDTH - line.chars().count();
            frame.push_str(&format!("│ {}{} │\n", line, " ".repeat(pad)));
        }
        frame.push_str(&format!("└{}┘\n", border));

        self.out
            .write_all(frame.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|_| DisplayError::Communication)
    }
}
