//! Seekable reader trait

use std::io::{Read, Seek};

/// Readers that can both read and seek
///
/// TIFF parsing jumps between IFDs, value arrays and image blocks, so
/// every reader it accepts must support random access. Files, buffered
/// files and in-memory cursors all qualify.
pub trait SeekableReader: Read + Seek + Send + Sync {}

impl<T: Read + Seek + Send + Sync> SeekableReader for T {}
