//! Integration tests for `llmstream::complete`, exercising the
//! minimal-suffix completion path against realistic truncated payloads.

use llmstream::complete_to_string;

#[test]
fn completes_partial_function_call_arguments() {
    let partial = r#"{"name":"get_weather","arguments":{"city":"Tokyo","units":"metri"#;
    let completed = complete_to_string(partial.as_bytes(), 64);

    // Completion should extend, not rewrite, the original prefix.
    let completed = completed.expect("partial input should need completion");
    assert!(completed.starts_with(r#"{"name":"get_weather","arguments":{"city":"Tokyo","units":"metri"#));
    assert!(completed.ends_with('}'));
}

#[test]
fn fully_formed_object_needs_no_completion() {
    let complete_json = r#"{"name":"get_weather","arguments":{"city":"Tokyo"}}"#;
    assert_eq!(complete_to_string(complete_json.as_bytes(), 64), None);
}

#[test]
fn completion_grows_monotonically_as_more_tokens_arrive() {
    let steps = [
        r#"{"choices":[{"delta":{"content":"Hel"#,
        r#"{"choices":[{"delta":{"content":"Hello"#,
        r#"{"choices":[{"delta":{"content":"Hello, world"#,
    ];
    for step in steps {
        let completed = complete_to_string(step.as_bytes(), 64)
            .expect("every truncated fragment here needs completion");
        assert!(completed.starts_with(step));
    }
}

#[test]
fn small_output_buffer_reports_buffer_too_small_without_panicking() {
    use llmstream::complete;
    use llmstream::error::CompleterError;

    let mut out = [0u8; 1];
    let err = complete(br#"{"a": [1,2,3,"#, &mut out, 64).unwrap_err();
    assert!(matches!(err, CompleterError::BufferTooSmall { .. }));
}
