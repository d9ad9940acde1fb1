//! Minimal completion of truncated JSON: computes the shortest suffix that
//! turns `input[..end_offset]` into valid JSON and returns
//! `input[..end_offset] ++ suffix`, rather than attempting to repair
//! malformed content the way [`crate::json::repair`] does.
//!
//! A direct port of `conduit_json_completer.c`'s recursive descent over
//! `complete_value`/`complete_object`/`complete_array`/`complete_string`/
//! `complete_number`/`complete_special`.

use super::scan::is_json_whitespace;
use crate::error::CompleterError;

/// Stack scratch space for composite suffixes (an inner value's completion
/// plus an enclosing `]`, `}`, or `: null}`). Matches the reference
/// implementation's `char suffix_buf[128]`; a composite suffix that would
/// not fit falls back to just the immediate closer, same as the original.
const SUFFIX_BUF_LEN: usize = 128;

#[derive(Clone, Copy)]
enum Suffix {
    Static(&'static [u8]),
    Buf([u8; SUFFIX_BUF_LEN], usize),
}

impl Suffix {
    fn as_bytes(&self) -> &[u8] {
        match self {
            Suffix::Static(s) => s,
            Suffix::Buf(buf, len) => &buf[..*len],
        }
    }

    fn len(&self) -> usize {
        match self {
            Suffix::Static(s) => s.len(),
            Suffix::Buf(_, len) => *len,
        }
    }

    /// Builds `prefix ++ tail`, falling back to `fallback` if the combined
    /// length would not fit in the scratch buffer.
    fn composite(prefix: &[u8], tail: &[u8], fallback: &'static [u8]) -> Suffix {
        let total = prefix.len() + tail.len();
        if total < SUFFIX_BUF_LEN {
            let mut buf = [0u8; SUFFIX_BUF_LEN];
            buf[..prefix.len()].copy_from_slice(prefix);
            buf[prefix.len()..total].copy_from_slice(tail);
            Suffix::Buf(buf, total)
        } else {
            Suffix::Static(fallback)
        }
    }
}

struct Completion {
    suffix: Suffix,
    end_offset: usize,
}

fn skip_ws(json: &[u8], len: usize, mut pos: usize) -> usize {
    while pos < len && is_json_whitespace(json[pos]) {
        pos += 1;
    }
    pos
}

fn complete_string(json: &[u8], len: usize, pos: usize) -> Option<Completion> {
    if pos >= len || json[pos] != b'"' {
        return None;
    }
    let mut cur = pos + 1;
    let mut escaped = false;
    while cur < len {
        match json[cur] {
            b'\\' => escaped = !escaped,
            b'"' if !escaped => return None,
            _ => escaped = false,
        }
        cur += 1;
    }
    Some(Completion {
        suffix: Suffix::Static(b"\""),
        end_offset: cur,
    })
}

fn complete_number(json: &[u8], len: usize, pos: usize) -> Option<Completion> {
    let mut cur = pos;
    if cur < len && json[cur] == b'-' {
        cur += 1;
    }

    if cur >= len {
        return Some(Completion {
            suffix: Suffix::Static(b"0"),
            end_offset: cur,
        });
    }

    if json[cur] == b'.' {
        return Some(Completion {
            suffix: Suffix::Static(b"0.0"),
            end_offset: cur,
        });
    }

    while cur < len && json[cur].is_ascii_digit() {
        cur += 1;
    }

    if cur < len && json[cur] == b'.' {
        cur += 1;
        let frac_start = cur;
        while cur < len && json[cur].is_ascii_digit() {
            cur += 1;
        }
        if cur == frac_start {
            return Some(Completion {
                suffix: Suffix::Static(b"0"),
                end_offset: cur,
            });
        }
    }

    if cur < len && (json[cur] == b'e' || json[cur] == b'E') {
        cur += 1;
        if cur < len && (json[cur] == b'+' || json[cur] == b'-') {
            cur += 1;
        }
        if cur >= len || !json[cur].is_ascii_digit() {
            return Some(Completion {
                suffix: Suffix::Static(b"0"),
                end_offset: cur,
            });
        }
        while cur < len && json[cur].is_ascii_digit() {
            cur += 1;
        }
    }

    None
}

fn complete_special(json: &[u8], len: usize, pos: usize, value: &'static [u8]) -> Option<Completion> {
    let mut cur = pos;
    let mut matched = 0usize;
    while cur < len && matched < value.len() {
        if json[cur] != value[matched] {
            return None;
        }
        cur += 1;
        matched += 1;
    }
    if matched == value.len() {
        return None;
    }
    Some(Completion {
        suffix: Suffix::Static(&value[matched..]),
        end_offset: cur,
    })
}

fn complete_array(json: &[u8], len: usize, pos: usize, depth: usize, max_depth: usize) -> Option<Completion> {
    if pos >= len || json[pos] != b'[' {
        return None;
    }
    let mut cur = pos + 1;
    let mut requires_comma = false;
    let mut last_valid = cur;

    cur = skip_ws(json, len, cur);
    if cur >= len || json[cur] == b']' {
        return Some(Completion {
            suffix: Suffix::Static(b"]"),
            end_offset: cur,
        });
    }

    loop {
        if cur >= len {
            break;
        }
        if json[cur] == b']' {
            return None;
        }

        if requires_comma {
            if json[cur] == b',' {
                requires_comma = false;
                cur += 1;
                cur = skip_ws(json, len, cur);
                if cur >= len {
                    break;
                }
                last_valid = cur;
            } else {
                return Some(Completion {
                    suffix: Suffix::Static(b"]"),
                    end_offset: last_valid,
                });
            }
        }

        if cur >= len {
            break;
        }
        if json[cur] == b']' {
            return None;
        }

        if let Some(elem) = complete_value(json, len, cur, depth + 1, max_depth) {
            return Some(Completion {
                suffix: Suffix::composite(elem.suffix.as_bytes(), b"]", b"]"),
                end_offset: elem.end_offset,
            });
        }

        cur = find_end_of_complete_value(json, len, cur, max_depth);
        last_valid = cur;
        requires_comma = true;
    }

    Some(Completion {
        suffix: Suffix::Static(b"]"),
        end_offset: last_valid,
    })
}

fn complete_object(json: &[u8], len: usize, pos: usize, depth: usize, max_depth: usize) -> Option<Completion> {
    if pos >= len || json[pos] != b'{' {
        return None;
    }
    let mut cur = pos + 1;
    let mut requires_comma = false;
    let mut last_valid = cur;

    cur = skip_ws(json, len, cur);
    if cur >= len || json[cur] == b'}' {
        return Some(Completion {
            suffix: Suffix::Static(b"}"),
            end_offset: cur,
        });
    }

    loop {
        if cur >= len {
            break;
        }
        if json[cur] == b'}' {
            return None;
        }

        if requires_comma {
            if json[cur] == b',' {
                requires_comma = false;
                cur += 1;
                cur = skip_ws(json, len, cur);
                if cur >= len {
                    break;
                }
                last_valid = cur;
            } else {
                return Some(Completion {
                    suffix: Suffix::Static(b"}"),
                    end_offset: last_valid,
                });
            }
        }

        if cur >= len {
            break;
        }
        if json[cur] == b'}' {
            return None;
        }

        if let Some(key) = complete_string(json, len, cur) {
            return Some(Completion {
                suffix: Suffix::composite(key.suffix.as_bytes(), b": null}", b"}"),
                end_offset: key.end_offset,
            });
        }

        let key_end = find_end_of_complete_value(json, len, cur, max_depth);
        if key_end <= cur {
            return Some(Completion {
                suffix: Suffix::Static(b"}"),
                end_offset: last_valid,
            });
        }
        cur = key_end;
        last_valid = cur;

        cur = skip_ws(json, len, cur);
        if cur >= len || json[cur] != b':' {
            return Some(Completion {
                suffix: Suffix::Static(b": null}"),
                end_offset: last_valid,
            });
        }
        cur += 1;
        last_valid = cur;

        cur = skip_ws(json, len, cur);
        if cur >= len {
            return Some(Completion {
                suffix: Suffix::Static(b"null}"),
                end_offset: last_valid,
            });
        }

        if let Some(val) = complete_value(json, len, cur, depth + 1, max_depth) {
            return Some(Completion {
                suffix: Suffix::composite(val.suffix.as_bytes(), b"}", b"}"),
                end_offset: val.end_offset,
            });
        }

        cur = find_end_of_complete_value(json, len, cur, max_depth);
        last_valid = cur;
        requires_comma = true;
    }

    Some(Completion {
        suffix: Suffix::Static(b"}"),
        end_offset: last_valid,
    })
}

fn complete_value(json: &[u8], len: usize, pos: usize, depth: usize, max_depth: usize) -> Option<Completion> {
    if depth >= max_depth {
        return None;
    }
    let pos = skip_ws(json, len, pos);
    if pos >= len {
        return None;
    }
    match json[pos] {
        b'{' => complete_object(json, len, pos, depth, max_depth),
        b'[' => complete_array(json, len, pos, depth, max_depth),
        b'"' => complete_string(json, len, pos),
        b't' => complete_special(json, len, pos, b"true"),
        b'f' => complete_special(json, len, pos, b"false"),
        b'n' => complete_special(json, len, pos, b"null"),
        b'-' | b'0'..=b'9' => complete_number(json, len, pos),
        _ => None,
    }
}

/// Returns the offset just past the value starting at `pos`, whether that
/// value is complete or not. Used while walking array/object siblings to
/// skip over an element we are not currently trying to complete.
fn find_end_of_complete_value(json: &[u8], len: usize, pos: usize, max_depth: usize) -> usize {
    let pos = skip_ws(json, len, pos);
    if pos >= len {
        return pos;
    }

    if let Some(c) = complete_value(json, len, pos, 0, max_depth) {
        return c.end_offset;
    }

    match json[pos] {
        b'"' => {
            let mut cur = pos + 1;
            let mut escaped = false;
            while cur < len {
                match json[cur] {
                    b'\\' => escaped = !escaped,
                    b'"' if !escaped => return cur + 1,
                    _ => escaped = false,
                }
                cur += 1;
            }
            cur
        }
        open @ (b'{' | b'[') => {
            let close = if open == b'{' { b'}' } else { b']' };
            let mut level = 0i64;
            let mut cur = pos;
            let mut in_str = false;
            let mut esc = false;
            while cur < len {
                let ch = json[cur];
                if in_str {
                    match ch {
                        b'\\' => esc = !esc,
                        b'"' if !esc => in_str = false,
                        _ => esc = false,
                    }
                } else if ch == b'"' {
                    in_str = true;
                    esc = false;
                } else if ch == open {
                    level += 1;
                } else if ch == close {
                    level -= 1;
                    if level == 0 {
                        return cur + 1;
                    }
                }
                cur += 1;
            }
            cur
        }
        b't' if json[pos..].starts_with(b"true") => pos + 4,
        b'f' if json[pos..].starts_with(b"false") => pos + 5,
        b'n' if json[pos..].starts_with(b"null") => pos + 4,
        b'-' | b'0'..=b'9' => {
            let mut cur = pos;
            while cur < len
                && matches!(json[cur], b'-' | b'+' | b'.' | b'e' | b'E' | b'0'..=b'9')
            {
                cur += 1;
            }
            cur
        }
        _ => pos,
    }
}

/// Completes truncated JSON in `input` into `output`.
///
/// Returns `Ok(Some(n))` if a completion was applied, where `n` is the
/// number of bytes written (excluding the trailing NUL, always appended on
/// success). Returns `Ok(None)` if `input` is empty or already a complete
/// JSON value with nothing to append.
///
/// `max_depth` bounds recursion into nested arrays/objects; non-positive
/// values fall back to 64, matching the reference implementation.
pub fn complete(
    input: &[u8],
    output: &mut [u8],
    max_depth: usize,
) -> Result<Option<usize>, CompleterError> {
    if output.is_empty() {
        return Err(CompleterError::BufferTooSmall {
            needed: 1,
            available: 0,
        });
    }

    if input.is_empty() {
        output[0] = b'\0';
        return Ok(None);
    }

    let max_depth = if max_depth < 1 { 64 } else { max_depth };

    let Some(c) = complete_value(input, input.len(), 0, 0, max_depth) else {
        output[0] = b'\0';
        return Ok(None);
    };

    let suffix = c.suffix.as_bytes();
    let total = c.end_offset + suffix.len();
    if total + 1 > output.len() {
        return Err(CompleterError::BufferTooSmall {
            needed: total + 1,
            available: output.len(),
        });
    }

    output[..c.end_offset].copy_from_slice(&input[..c.end_offset]);
    output[c.end_offset..total].copy_from_slice(suffix);
    output[total] = b'\0';

    Ok(Some(total))
}

/// Completes `input` into an owned `String`, or `None` if no completion was
/// needed. Grows its own buffer, so this can never fail on output capacity.
pub fn complete_to_string(input: &[u8], max_depth: usize) -> Option<String> {
    let mut buf = vec![0u8; input.len() + SUFFIX_BUF_LEN + 1];
    loop {
        match complete(input, &mut buf, max_depth) {
            Ok(None) => return None,
            Ok(Some(n)) => {
                buf.truncate(n);
                return Some(
                    String::from_utf8(buf)
                        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()),
                );
            }
            Err(CompleterError::BufferTooSmall { needed, .. }) => {
                buf.resize(needed.max(buf.len() * 2), 0);
            }
        }
    }
}
