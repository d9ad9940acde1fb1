//! Growable byte buffer with amortized-O(1) line extraction.
//!
//! Bytes accumulate at the tail via [`LineBuffer::append`] and are consumed
//! from the head via [`LineBuffer::next_line`], which advances an internal
//! read cursor instead of shifting the buffer on every call. The buffer is
//! compacted back to offset zero only once the read cursor has drifted past
//! half of capacity, matching the reference implementation in
//! `conduit_line_buffer.c`.

/// Minimum initial capacity for a new [`LineBuffer`], in bytes.
pub const MIN_CAPACITY: usize = 256;

/// A growable byte buffer that hands out one line at a time.
///
/// Line delimiters are `\n`, `\r`, or `\r\n` (the CRLF pair is collapsed into
/// a single delimiter). Delimiters are stripped from the returned line and
/// consumed from the buffer.
#[derive(Debug, Default)]
pub struct LineBuffer {
    data: Vec<u8>,
    read_pos: usize,
}

impl LineBuffer {
    /// Creates a new buffer with at least `initial_capacity` bytes of
    /// storage (clamped up to [`MIN_CAPACITY`]).
    pub fn new(initial_capacity: usize) -> Self {
        let capacity = initial_capacity.max(MIN_CAPACITY);
        Self {
            data: Vec::with_capacity(capacity),
            read_pos: 0,
        }
    }

    /// Number of unread bytes currently buffered.
    pub fn pending(&self) -> usize {
        self.data.len() - self.read_pos
    }

    /// Appends `bytes` to the tail of the buffer, compacting first if the
    /// read cursor has drifted past capacity's midpoint.
    pub fn append(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.maybe_compact();
        self.data.extend_from_slice(bytes);
    }

    /// Compacts the buffer (drops already-read bytes) whenever the read
    /// cursor has advanced past half of the current capacity. Safe to call
    /// at any time; a no-op when compaction is not yet due.
    fn maybe_compact(&mut self) {
        if self.read_pos > 0 && self.read_pos > self.data.capacity() / 2 {
            self.data.drain(..self.read_pos);
            self.read_pos = 0;
            tracing::trace!(pending = self.data.len(), "line buffer compacted");
        }
    }

    /// Returns the next complete line, with its trailing delimiter stripped
    /// and consumed, or `None` if no complete line is currently buffered.
    ///
    /// The returned slice borrows directly from internal storage (no copy).
    /// `\r\n` is treated as a single delimiter; a lone `\r` or `\n` also
    /// terminates a line.
    pub fn next_line(&mut self) -> Option<&[u8]> {
        let pending = &self.data[self.read_pos..];
        let delim_pos = pending.iter().position(|&b| b == b'\n' || b == b'\r')?;

        let line_start = self.read_pos;
        let line_end = self.read_pos + delim_pos;
        let mut consume = delim_pos + 1;

        if self.data[line_end] == b'\r' {
            let next = line_end + 1;
            if next < self.data.len() && self.data[next] == b'\n' {
                consume += 1;
            }
        }

        self.read_pos += consume;
        self.maybe_compact();

        Some(&self.data[line_start..line_end])
    }

    /// Copies up to `out.len()` remaining bytes into `out`, advancing the
    /// read cursor, and returns the number of bytes copied. Intended for
    /// flushing any trailing partial line at end-of-stream.
    pub fn drain(&mut self, out: &mut [u8]) -> usize {
        let pending = self.pending();
        let to_copy = pending.min(out.len());
        out[..to_copy].copy_from_slice(&self.data[self.read_pos..self.read_pos + to_copy]);
        self.read_pos += to_copy;
        to_copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_buffer_yields_lf_cr_crlf_in_sequence() {
        let mut buf = LineBuffer::new(0);
        buf.append(b"a\r\nb\nc\rd");

        assert_eq!(buf.next_line(), Some(&b"a"[..]));
        assert_eq!(buf.next_line(), Some(&b"b"[..]));
        assert_eq!(buf.next_line(), Some(&b"c"[..]));
        assert_eq!(buf.next_line(), None); // "d" has no delimiter yet
        assert_eq!(buf.pending(), 1);
    }

    #[test]
    fn pending_accounts_for_all_appended_and_consumed_bytes() {
        let mut buf = LineBuffer::new(0);
        buf.append(b"hello\nworld\n");
        assert_eq!(buf.pending(), 12);

        buf.next_line();
        assert_eq!(buf.pending(), 6);

        buf.next_line();
        assert_eq!(buf.pending(), 0);
    }

    #[test]
    fn next_line_returns_none_when_no_delimiter_present() {
        let mut buf = LineBuffer::new(0);
        buf.append(b"no newline here");
        assert_eq!(buf.next_line(), None);
        assert_eq!(buf.pending(), 16);
    }

    #[test]
    fn drain_flushes_trailing_partial_line() {
        let mut buf = LineBuffer::new(0);
        buf.append(b"abc\ndef");
        buf.next_line();

        let mut out = [0u8; 8];
        let n = buf.drain(&mut out);
        assert_eq!(&out[..n], b"def");
        assert_eq!(buf.pending(), 0);
    }

    #[test]
    fn drain_copies_at_most_out_capacity() {
        let mut buf = LineBuffer::new(0);
        buf.append(b"abcdef");

        let mut out = [0u8; 3];
        let n = buf.drain(&mut out);
        assert_eq!(n, 3);
        assert_eq!(&out, b"abc");
        assert_eq!(buf.pending(), 3);
    }

    #[test]
    fn compaction_preserves_pending_bytes_across_many_small_lines() {
        let mut buf = LineBuffer::new(0);
        for i in 0..1000 {
            buf.append(format!("line-{i}\n").as_bytes());
        }
        let mut count = 0;
        while buf.next_line().is_some() {
            count += 1;
        }
        assert_eq!(count, 1000);
        assert_eq!(buf.pending(), 0);
    }

    #[test]
    fn split_across_appends_is_equivalent_to_one_append() {
        let full = b"field: value\r\nfield2: value2\n\n";
        let mut whole = LineBuffer::new(0);
        whole.append(full);
        let mut whole_lines = Vec::new();
        while let Some(l) = whole.next_line() {
            whole_lines.push(l.to_vec());
        }

        let mut chunked = LineBuffer::new(0);
        for chunk in full.chunks(3) {
            chunked.append(chunk);
        }
        let mut chunked_lines = Vec::new();
        while let Some(l) = chunked.next_line() {
            chunked_lines.push(l.to_vec());
        }

        assert_eq!(whole_lines, chunked_lines);
    }
}
