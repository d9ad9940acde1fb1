//! Single-pass repair of possibly-truncated JSON into valid JSON.
//!
//! The algorithm is a direct port of `conduit_json_repair.c`'s five phases:
//! copy-with-tracking, close an open string, drop a trailing comma or
//! incomplete key/value pair, append closers for any still-open brackets,
//! and a final aliased pass that removes any trailing commas left directly
//! before a closing bracket.

use super::scan::{find_context, is_json_whitespace, trim_trailing_whitespace, BracketKind, Context};
use super::DEFAULT_MAX_DEPTH;
use crate::error::RepairError;

/// Repairs possibly-truncated JSON in `input`, writing the result into
/// `output`. Returns the number of bytes written (excluding the trailing
/// NUL, which is always appended on success).
///
/// `max_depth` bounds the bracket-nesting stack; it is clamped to 256
/// regardless of the value passed in, matching the reference
/// implementation's fixed-size stack.
///
/// Never fails on input content: empty or whitespace-only input repairs to
/// `{}`. The only failure mode is `output` being too small to hold the
/// reserved closer/terminator space or the final content.
pub fn repair(input: &[u8], output: &mut [u8], max_depth: usize) -> Result<usize, RepairError> {
    if output.len() < 3 {
        return Err(RepairError::BufferTooSmall {
            needed: 3,
            available: output.len(),
        });
    }

    let start = input
        .iter()
        .position(|&b| !is_json_whitespace(b))
        .unwrap_or(input.len());

    if start >= input.len() {
        output[0] = b'{';
        output[1] = b'}';
        output[2] = b'\0';
        return Ok(2);
    }

    let effective_max = max_depth.clamp(1, DEFAULT_MAX_DEPTH);
    let reserved = effective_max + 2;
    if output.len() <= reserved {
        return Err(RepairError::BufferTooSmall {
            needed: reserved + 1,
            available: output.len(),
        });
    }
    let capacity_for_content = output.len() - reserved;

    // Phase A: copy while tracking string/bracket state.
    let mut in_string = false;
    let mut escape_next = false;
    let mut stack: Vec<BracketKind> = Vec::with_capacity(effective_max);
    let mut out = 0usize;

    for &c in &input[start..] {
        if out >= capacity_for_content {
            break;
        }
        if escape_next {
            escape_next = false;
            output[out] = c;
            out += 1;
            continue;
        }
        if in_string {
            match c {
                b'\\' => escape_next = true,
                b'"' => in_string = false,
                _ => {}
            }
            output[out] = c;
            out += 1;
            continue;
        }
        match c {
            b'"' => in_string = true,
            b'{' => {
                if stack.len() < effective_max {
                    stack.push(BracketKind::Brace);
                }
            }
            b'}' => {
                stack.pop();
            }
            b'[' => {
                if stack.len() < effective_max {
                    stack.push(BracketKind::Square);
                }
            }
            b']' => {
                stack.pop();
            }
            _ => {}
        }
        output[out] = c;
        out += 1;
    }

    // Phase B: close an open string.
    if in_string {
        out = remove_partial_unicode_escape(output, out);
        if escape_next && out > 0 && output[out - 1] == b'\\' {
            out -= 1;
        }
        if out < output.len() - 1 {
            output[out] = b'"';
            out += 1;
        }
    }

    // Phase C: drop trailing whitespace/comma, then incomplete key/value.
    out = trim_trailing_whitespace(output, out);
    if out > 0 && output[out - 1] == b',' {
        out -= 1;
    }
    out = remove_incomplete_kvp(output, out);

    // Phase D: close open brackets, dropping a trailing comma before each.
    while let Some(kind) = stack.pop() {
        if out >= output.len() - 1 {
            break;
        }
        out = trim_trailing_whitespace(output, out);
        if out > 0 && output[out - 1] == b',' {
            out -= 1;
        }
        output[out] = kind.closer();
        out += 1;
    }

    output[out] = b'\0';

    // Phase E: final aliased pass removing any trailing commas left
    // directly before a closing bracket. `write_idx <= read_idx` at every
    // step, so mutating `output` in place while reading from it is safe.
    let final_len = remove_trailing_commas(output, out);
    output[final_len] = b'\0';

    Ok(final_len)
}

/// Repairs `input` into an owned, always-sufficiently-sized `String`.
///
/// Grows its own buffer, so this can never fail on output capacity; only
/// `max_depth` still bounds bracket nesting.
pub fn repair_to_string(input: &[u8], max_depth: usize) -> String {
    let mut buf = vec![0u8; input.len() + max_depth.clamp(1, DEFAULT_MAX_DEPTH) + 16];
    loop {
        match repair(input, &mut buf, max_depth) {
            Ok(n) => {
                buf.truncate(n);
                return String::from_utf8(buf)
                    .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
            }
            Err(RepairError::BufferTooSmall { needed, .. }) => {
                buf.resize(needed.max(buf.len() * 2), 0);
            }
        }
    }
}

/// Removes a trailing partial `\uXXXX` escape (fewer than 4 hex digits
/// after `\u`) from `output[..len]`, returning the truncated length.
fn remove_partial_unicode_escape(output: &[u8], len: usize) -> usize {
    if len < 2 {
        return len;
    }
    let search_start = len.saturating_sub(6);
    let backslash_pos = output[search_start..len]
        .iter()
        .rposition(|&b| b == b'\\')
        .map(|i| search_start + i);

    let Some(pos) = backslash_pos else {
        return len;
    };
    if pos + 1 >= len {
        return len;
    }
    if output[pos + 1] == b'u' {
        let hex_count = output[pos + 2..len]
            .iter()
            .take_while(|&&b| b.is_ascii_hexdigit())
            .count();
        if hex_count < 4 {
            return pos;
        }
    }
    len
}

/// Drops a trailing incomplete key/value pair from `output[..len]`:
/// a dangling comma, a `"key":` with no value, or a bare trailing string
/// that is an incomplete object key (determined by the forward
/// string-aware [`find_context`] scan rather than a naive backward count).
fn remove_incomplete_kvp(output: &[u8], len: usize) -> usize {
    let mut len = trim_trailing_whitespace(output, len);

    if len > 0 && output[len - 1] == b',' {
        len -= 1;
        len = trim_trailing_whitespace(output, len);
    }

    if len > 0 && output[len - 1] == b':' {
        len -= 1;
        len = trim_trailing_whitespace(output, len);

        if len > 0 && output[len - 1] == b'"' {
            len -= 1;
            while len > 0 && output[len - 1] != b'"' {
                len -= 1;
            }
            if len > 0 {
                len -= 1;
            }
            len = trim_trailing_whitespace(output, len);
            if len > 0 && output[len - 1] == b',' {
                len -= 1;
            }
        }
    }

    if len > 0 && output[len - 1] == b'"' {
        let close_quote = len - 1;
        let mut idx = close_quote;
        if idx > 0 {
            idx -= 1;
        }
        while idx > 0 {
            if output[idx] == b'"' {
                let mut backslashes = 0usize;
                let mut check = idx;
                while check > 0 && output[check - 1] == b'\\' {
                    backslashes += 1;
                    check -= 1;
                }
                if backslashes % 2 == 0 {
                    break;
                }
            }
            idx -= 1;
        }

        let mut prev = idx;
        if prev > 0 {
            prev -= 1;
        }
        while prev > 0 && is_json_whitespace(output[prev]) {
            prev -= 1;
        }

        if prev < len && output[prev] == b'{' {
            len = idx;
            len = trim_trailing_whitespace(output, len);
        } else if prev < len && output[prev] == b',' {
            if find_context(output, prev) == Context::Object {
                len = idx;
                len = trim_trailing_whitespace(output, len);
                if len > 0 && output[len - 1] == b',' {
                    len -= 1;
                }
            }
        }
    }

    len
}

/// Removes any `,` that is followed, through ASCII whitespace, by `}` or
/// `]`, compacting `input[..input_len]` in place. Safe for aliased use
/// (output == input) because `out <= i` at every step.
fn remove_trailing_commas(input: &mut [u8], input_len: usize) -> usize {
    let mut out = 0usize;
    let mut in_string = false;
    let mut escape_next = false;
    let mut i = 0usize;

    while i < input_len {
        let c = input[i];

        if escape_next {
            escape_next = false;
            input[out] = c;
            out += 1;
            i += 1;
            continue;
        }

        if in_string {
            match c {
                b'\\' => escape_next = true,
                b'"' => in_string = false,
                _ => {}
            }
            input[out] = c;
            out += 1;
            i += 1;
            continue;
        }

        if c == b'"' {
            in_string = true;
            input[out] = c;
            out += 1;
            i += 1;
            continue;
        }

        if c == b',' {
            let mut j = i + 1;
            while j < input_len && is_json_whitespace(input[j]) {
                j += 1;
            }
            if j < input_len && (input[j] == b'}' || input[j] == b']') {
                i += 1;
                continue;
            }
        }

        input[out] = c;
        out += 1;
        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repair_str(input: &str) -> String {
        repair_to_string(input.as_bytes(), 256)
    }

    #[test]
    fn closes_unclosed_array_after_trailing_comma() {
        assert_eq!(repair_str(r#"{"a": [1, 2,"#), r#"{"a": [1, 2]}"#);
    }

    #[test]
    fn closes_unterminated_string_value() {
        assert_eq!(repair_str(r#"{"key":"val"#), r#"{"key":"val"}"#);
    }

    #[test]
    fn drops_incomplete_key_at_object_start() {
        assert_eq!(repair_str(r#"{"a":1,""#), r#"{"a":1}"#);
    }

    #[test]
    fn empty_input_becomes_empty_object() {
        assert_eq!(repair_str(""), "{}");
        assert_eq!(repair_str("   \n\t"), "{}");
    }

    #[test]
    fn valid_json_passes_through_unchanged_modulo_whitespace() {
        let input = r#"{"a":1,"b":[1,2,3]}"#;
        assert_eq!(repair_str(input), input);
    }

    #[test]
    fn valid_json_with_surrounding_whitespace_is_trimmed() {
        assert_eq!(repair_str("  {\"a\":1}  "), r#"{"a":1}"#);
    }

    #[test]
    fn removes_trailing_comma_before_existing_closer() {
        assert_eq!(repair_str(r#"{"a":1,}"#), r#"{"a":1}"#);
    }

    #[test]
    fn partial_unicode_escape_is_trimmed_before_closing_string() {
        // \u00 has only 2 hex digits -- the whole escape is dropped.
        assert_eq!(repair_str(r#"{"a":"x\u00"#), r#"{"a":"x"}"#);
    }

    #[test]
    fn brackets_inside_strings_do_not_confuse_context_scan() {
        assert_eq!(
            repair_str(r#"{"key": "[not an array", "next":"#),
            r#"{"key": "[not an array"}"#
        );
    }

    #[test]
    fn nested_unclosed_structures_close_in_reverse_order() {
        assert_eq!(
            repair_str(r#"{"a":{"b":[1,2,{"c":3"#),
            r#"{"a":{"b":[1,2,{"c":3}]}}"#
        );
    }

    #[test]
    fn output_too_small_reports_buffer_too_small() {
        let mut out = [0u8; 4];
        let err = repair(br#"{"a":1}"#, &mut out, 256).unwrap_err();
        assert!(matches!(err, RepairError::BufferTooSmall { .. }));
    }

    #[test]
    fn whitespace_only_nontrivial_unicode_is_untouched() {
        assert_eq!(repair_str(r#"{"name":"café"}"#), r#"{"name":"café"}"#);
    }

    #[test]
    fn max_depth_caps_nesting_and_still_closes() {
        let deeply_nested = "[".repeat(10);
        let repaired = repair_to_string(deeply_nested.as_bytes(), 4);
        // Only 4 levels are tracked; repaired output must still be balanced
        // brackets with no trailing garbage.
        let opens = repaired.bytes().filter(|&b| b == b'[').count();
        let closes = repaired.bytes().filter(|&b| b == b']').count();
        assert_eq!(opens, closes);
    }
}
