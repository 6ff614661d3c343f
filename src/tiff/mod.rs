//! TIFF container parsing
//!
//! Reads the header and Image File Directories of TIFF and BigTIFF files.
//! Pixel decoding lives in `crate::raster`, which builds on these types.

pub mod errors;
pub mod ifd;
pub(crate) mod types;
pub mod reader;
pub(crate) mod constants;
pub(crate) mod tags;
pub(crate) mod validation;
#[cfg(test)]
mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use errors::{TiffError, TiffResult};
pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use types::TIFF;
