/// Incremental decoder for `text/event-stream` bodies.
///
/// Only `data` fields are kept; each completed event yields its data lines joined by `\n`.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data_lines: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds raw bytes and returns every event completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();

        // Bytes are buffered until a full line exists so multi-byte characters never split.
        while let Some(position) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let raw_line = self.buffer.drain(..=position).collect::<Vec<_>>();
            let line = String::from_utf8_lossy(&raw_line).into_owned();
            if let Some(event) = self.accept_line(line.trim_end_matches(['\n', '\r'])) {
                events.push(event);
            }
        }

        events
    }

    /// Flushes a trailing event that was not terminated by a blank line.
    pub fn finish(&mut self) -> Option<String> {
        if !self.buffer.is_empty() {
            let raw_line = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&raw_line).into_owned();
            // A dangling line can only add data; it cannot terminate an event on its own.
            let _ = self.accept_line(line.trim_end_matches('\r'));
        }

        self.flush_event()
    }

    fn accept_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.flush_event();
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        if field == "data" {
            self.data_lines.push(value.to_string());
        }

        None
    }

    fn flush_event(&mut self) -> Option<String> {
        if self.data_lines.is_empty() {
            return None;
        }

        Some(std::mem::take(&mut self.data_lines).join("\n"))
    }
}
