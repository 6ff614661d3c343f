//! I/O building blocks
//!
//! Byte order strategies and the seekable reader trait used by TIFF
//! parsing, plus the `.npy` codec used to exchange arrays with inference.

pub mod seekable;
pub mod byte_order;
pub mod npy;
