//! Single-pass JSON repair and minimal-completion for truncated LLM output.
//!
//! Neither module performs full JSON parsing or validation of complete,
//! well-formed input — both are purpose-built for the truncation patterns
//! streaming LLM responses produce (an open string, a dangling comma, an
//! unfinished number or keyword, unbalanced brackets).

mod scan;

pub mod completer;
pub mod repair;

pub use completer::{complete, complete_to_string};
pub use repair::{repair, repair_to_string};

/// Bracket stack depth cap shared by repair and completion, and the default
/// used when a caller does not supply a tighter `max_depth`.
pub const DEFAULT_MAX_DEPTH: usize = 256;
