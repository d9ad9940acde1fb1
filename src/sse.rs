//! Incremental Server-Sent Events parser.
//!
//! Consumes one already-delimited line at a time via [`SseParser::ingest_line`]
//! and dispatches a transient [`SseEvent`] to a callback on a blank line or at
//! [`SseParser::finish`]. Mirrors the wire dialect consumed by the reference
//! `conduit_sse_parser.c`: `field: value` / `field` lines, `:`-prefixed
//! comments, blank-line event termination, `\r`-stripped line endings, and a
//! leading UTF-8 BOM stripped per line.

/// Default reconnection time advertised before any `retry:` field is seen.
pub const DEFAULT_RECONNECTION_TIME_MS: i64 = 3000;

/// Per-digit accumulation guard: once the running value exceeds this, the
/// next multiply-by-10 is rejected rather than risking a 32-bit multiply
/// overflow further downstream in reconnection timers. The fully
/// accumulated value is not re-checked against this bound afterward, so a
/// value like 300000000 (which never exceeds this threshold on any digit
/// prefix) is accepted. Preserved verbatim from `conduit_sse_parser.c`.
const MAX_RETRY_MS: i64 = 214_748_364;

/// A single dispatched SSE event, borrowing from the parser's internal
/// buffers for the duration of the callback. Copy out any field you need to
/// retain past the callback invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SseEvent<'a> {
    /// The event's `id:` field, if one was set on this event.
    pub id: Option<&'a [u8]>,
    /// The event's `event:` field, if one was set. Absence conventionally
    /// means `"message"`.
    pub event: Option<&'a [u8]>,
    /// The accumulated `data:` payload. Always present, possibly empty.
    pub data: &'a [u8],
    /// The most recent `retry:` value on this event, in milliseconds, or
    /// `-1` if none was set on this event.
    pub retry: i64,
}

#[derive(Debug, Default)]
struct PendingEvent {
    id: Vec<u8>,
    event: Vec<u8>,
    data: Vec<u8>,
    retry: i64,
    has_id: bool,
    has_event: bool,
    has_data: bool,
}

impl PendingEvent {
    fn reset(&mut self) {
        self.id.clear();
        self.event.clear();
        self.data.clear();
        self.retry = -1;
        self.has_id = false;
        self.has_event = false;
        self.has_data = false;
    }
}

/// Stateful incremental SSE parser. Single-owner: mutate from one thread at
/// a time, share across threads only behind external synchronization.
#[derive(Debug)]
pub struct SseParser {
    current: PendingEvent,
    last_event_id: Vec<u8>,
    reconnection_time_ms: i64,
}

impl Default for SseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SseParser {
    /// Creates a new parser with no last-event-id and the default
    /// reconnection time.
    pub fn new() -> Self {
        let mut current = PendingEvent::default();
        current.retry = -1;
        Self {
            current,
            last_event_id: Vec::new(),
            reconnection_time_ms: DEFAULT_RECONNECTION_TIME_MS,
        }
    }

    /// The most recent non-NUL-containing `id:` value seen across the
    /// parser's lifetime. Persists across dispatches.
    pub fn last_event_id(&self) -> Option<&[u8]> {
        if self.last_event_id.is_empty() {
            None
        } else {
            Some(&self.last_event_id)
        }
    }

    /// The current reconnection time in milliseconds, updated by `retry:`
    /// fields. Persists across dispatches.
    pub fn reconnection_time_ms(&self) -> i64 {
        self.reconnection_time_ms
    }

    /// Processes one line, with its line-terminator already stripped by the
    /// caller (e.g. by [`crate::line_buffer::LineBuffer::next_line`]). May
    /// invoke `on_event` once if the line completes an event.
    pub fn ingest_line(&mut self, line: &[u8], mut on_event: impl FnMut(SseEvent<'_>)) {
        let mut line = line;

        while let Some((&last, rest)) = line.split_last() {
            if last == b'\r' {
                line = rest;
            } else {
                break;
            }
        }

        if line.len() >= 3 && line[0] == 0xEF && line[1] == 0xBB && line[2] == 0xBF {
            line = &line[3..];
        }

        if line.is_empty() {
            self.dispatch_if_needed(&mut on_event);
            return;
        }

        if line[0] == b':' {
            tracing::trace!("sse comment line ignored");
            return;
        }

        let (field, value) = match line.iter().position(|&b| b == b':') {
            Some(colon) => {
                let field = &line[..colon];
                let mut value = &line[colon + 1..];
                if value.first() == Some(&b' ') {
                    value = &value[1..];
                }
                (field, value)
            }
            None => (line, &line[line.len()..]),
        };

        match field {
            b"event" => {
                self.current.event.clear();
                self.current.event.extend_from_slice(value);
                self.current.has_event = true;
            }
            b"data" => {
                if !self.current.data.is_empty() {
                    self.current.data.push(b'\n');
                }
                self.current.data.extend_from_slice(value);
                self.current.has_data = true;
            }
            b"id" => {
                if value.contains(&0) {
                    tracing::trace!("sse id field containing NUL byte ignored");
                } else {
                    self.current.id.clear();
                    self.current.id.extend_from_slice(value);
                    self.current.has_id = true;
                    self.last_event_id.clear();
                    self.last_event_id.extend_from_slice(value);
                }
            }
            b"retry" => match parse_retry_ms(value) {
                Some(ms) => {
                    self.reconnection_time_ms = ms;
                    self.current.retry = ms;
                }
                None => tracing::trace!("sse retry field rejected (non-digit or out of range)"),
            },
            other => {
                tracing::trace!(field = ?String::from_utf8_lossy(other), "unknown sse field ignored");
            }
        }
    }

    /// Call at end-of-stream. Dispatches any pending event whose data is
    /// non-empty or whose `id`/`event` fields were explicitly set.
    pub fn finish(&mut self, mut on_event: impl FnMut(SseEvent<'_>)) {
        if !self.current.data.is_empty() || self.current.has_id || self.current.has_event {
            self.dispatch_if_needed(&mut on_event);
        }
    }

    fn dispatch_if_needed(&mut self, on_event: &mut impl FnMut(SseEvent<'_>)) {
        let is_empty = self.current.data.is_empty()
            && !self.current.has_id
            && !self.current.has_event
            && !self.current.has_data;

        if !is_empty {
            on_event(SseEvent {
                id: self.current.has_id.then_some(self.current.id.as_slice()),
                event: self
                    .current
                    .has_event
                    .then_some(self.current.event.as_slice()),
                data: self.current.data.as_slice(),
                retry: self.current.retry,
            });
        }

        self.current.reset();
    }
}

/// Parses a `retry:` value as a positive ASCII-digit integer, rejecting
/// anything non-digit, empty, or zero. Guards each digit shift against
/// overflow past [`MAX_RETRY_MS`] but, matching the reference parser,
/// never re-checks the fully accumulated value afterward.
fn parse_retry_ms(value: &[u8]) -> Option<i64> {
    if value.is_empty() {
        return None;
    }
    let mut ms: i64 = 0;
    for &b in value {
        if !b.is_ascii_digit() {
            return None;
        }
        if ms > MAX_RETRY_MS {
            return None;
        }
        ms = ms * 10 + i64::from(b - b'0');
    }
    if ms > 0 {
        Some(ms)
    } else {
        None
    }
}
