//! Incremental Server-Sent Events decoder.

use tracing::warn;

/// Longest line or event payload the decoder buffers.
pub const MAX_EVENT_LENGTH: usize = 1 << 20;

/// One dispatched SSE event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseEvent {
    /// Event type; `None` for the default `message` type.
    pub event: Option<String>,
    pub data: String,
    /// Last event id seen on the stream.
    pub id: Option<String>,
    pub retry: Option<u64>,
}

impl SseEvent {
    /// Whether this is a plain `message` event.
    pub fn is_message(&self) -> bool {
        matches!(self.event.as_deref(), None | Some("message"))
    }
}

/// Turns arbitrary byte chunks into complete events.
///
/// Lines and event payloads longer than the limit are dropped; decoding
/// resumes at the next line or event.
#[derive(Debug)]
pub struct SseDecoder {
    max_len: usize,
    line: Vec<u8>,
    line_dropped: bool,
    skip_lf: bool,
    started: bool,
    data: String,
    data_dropped: bool,
    event: Option<String>,
    last_id: Option<String>,
    retry: Option<u64>,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_max_len(MAX_EVENT_LENGTH)
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            max_len,
            line: Vec::new(),
            line_dropped: false,
            skip_lf: false,
            started: false,
            data: String::new(),
            data_dropped: false,
            event: None,
            last_id: None,
            retry: None,
        }
    }

    /// Feed a chunk and return every event it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        let mut events = Vec::new();

        for &byte in chunk {
            if self.skip_lf {
                self.skip_lf = false;
                if byte == b'\n' {
                    continue;
                }
            }

            match byte {
                b'\n' => self.end_line(&mut events),
                b'\r' => {
                    self.end_line(&mut events);
                    self.skip_lf = true;
                }
                _ if self.line_dropped => {}
                _ if self.line.len() >= self.max_len => {
                    warn!(limit = self.max_len, "dropping oversized SSE line");
                    self.line = Vec::new();
                    self.line_dropped = true;
                }
                _ => self.line.push(byte),
            }
        }

        events
    }

    fn end_line(&mut self, events: &mut Vec<SseEvent>) {
        let mut raw = std::mem::take(&mut self.line);

        if std::mem::take(&mut self.line_dropped) {
            self.started = true;
            return;
        }

        if !self.started {
            self.started = true;
            if raw.starts_with(b"\xEF\xBB\xBF") {
                raw.drain(..3);
            }
        }

        let line = String::from_utf8_lossy(&raw);

        if line.is_empty() {
            if let Some(event) = self.dispatch() {
                events.push(event);
            }
            return;
        }

        // comment / keep-alive
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (&*line, ""),
        };

        match field {
            "data" if self.data_dropped => {}
            "data" if self.data.len() + value.len() >= self.max_len => {
                warn!(limit = self.max_len, "dropping oversized SSE event");
                self.data = String::new();
                self.data_dropped = true;
            }
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
            }
            "event" => self.event = Some(value.to_string()),
            "id" if !value.contains('\0') => self.last_id = Some(value.to_string()),
            "retry" if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) => {
                self.retry = value.parse().ok();
            }
            _ => {}
        }
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        let retry = self.retry.take();

        if std::mem::take(&mut self.data_dropped) || self.data.is_empty() {
            return None;
        }

        let mut data = std::mem::take(&mut self.data);
        if data.ends_with('\n') {
            data.pop();
        }

        Some(SseEvent {
            event: event.filter(|e| !e.is_empty()),
            data,
            id: self.last_id.clone(),
            retry,
        })
    }
}
