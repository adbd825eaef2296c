// src/error.rs - Error type shared by every fallible buffer operation

use thiserror::Error;

/// Errors reported by [`GapBuffer`](crate::buffer::GapBuffer) operations.
///
/// Every operation that returns one of these leaves the buffer exactly as it
/// was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GapBufferError {
    #[error("allocation of {requested} bytes failed")]
    AllocationFailed { requested: usize },
    #[error("region too small: {required} bytes required, {available} available")]
    TooSmall { required: usize, available: usize },
    #[error("invalid UTF-8 sequence at byte {valid_up_to}")]
    InvalidUtf8 { valid_up_to: usize },
    #[error("buffer is bound to fixed memory: {needed} free bytes needed, {available} available")]
    NotResizable { needed: usize, available: usize },
    #[error("corrupt region header: {0}")]
    CorruptRegion(&'static str),
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, GapBufferError>;
