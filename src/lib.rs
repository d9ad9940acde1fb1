//! llmstream - streaming ingestion primitives for LLM endpoints.
//!
//! Bundles the pieces commonly needed when consuming a streaming LLM
//! response byte-by-byte off the wire: an amortized line buffer, an
//! incremental Server-Sent Events parser, single-pass JSON repair and
//! minimal-completion for truncated tool-call/function-call payloads, and
//! scalar vector ops for embedding similarity.
//!
//! Each module is independent and can be used on its own; nothing here
//! assumes a particular HTTP client or async runtime.

pub mod error;
pub mod json;
pub mod line_buffer;
pub mod sse;
pub mod vector;

pub use json::{complete, complete_to_string, repair, repair_to_string, DEFAULT_MAX_DEPTH};
pub use line_buffer::LineBuffer;
pub use sse::{SseEvent, SseParser};
