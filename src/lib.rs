// lib.rs - Library root for gapbuf, a cursor-oriented UTF-8 gap buffer
//
// `GapBuffer` keeps text in one byte region split by a movable gap at the
// edit cursor. Typical use:
//
//     let mut buffer = gapbuf::GapBuffer::new();
//     buffer.insert("Hello, world!")?;
//     buffer.move_absolute(7);
//     buffer.insert("my ")?;
//     assert_eq!(buffer.to_string(), "Hello, my world!");

pub mod buffer;
pub mod cli;
pub mod config;
pub mod error;
pub mod fuzz;
pub mod lines;
pub mod motion;
pub mod region;
pub mod utf8;

pub use buffer::GapBuffer;
pub use error::GapBufferError;
pub use lines::{Line, LineIter};
