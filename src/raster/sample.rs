//! Sample formats and raw sample decoding
//!
//! Bands arrive as unsigned or signed integers of various widths, or as
//! 32-bit floats. Every format is widened to `f32` so scenes stack into a
//! single array type.

use std::fmt;

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::{predictor, sample_format};
use crate::tiff::errors::{TiffError, TiffResult};

/// Pixel representation of a band file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    U8,
    U16,
    U32,
    I16,
    I32,
    F32,
}

impl SampleFormat {
    /// Resolves the BitsPerSample / SampleFormat tag pair
    ///
    /// # Returns
    /// The format, or `UnsupportedSampleFormat` for any other combination
    pub fn from_tags(bits: u64, format: u64) -> TiffResult<Self> {
        let format_code = u16::try_from(format).unwrap_or(0);
        match (bits, format_code) {
            (8, sample_format::UNSIGNED) => Ok(SampleFormat::U8),
            (16, sample_format::UNSIGNED) => Ok(SampleFormat::U16),
            (32, sample_format::UNSIGNED) => Ok(SampleFormat::U32),
            (16, sample_format::SIGNED) => Ok(SampleFormat::I16),
            (32, sample_format::SIGNED) => Ok(SampleFormat::I32),
            (32, sample_format::IEEEFP) => Ok(SampleFormat::F32),
            _ => Err(TiffError::UnsupportedSampleFormat { bits, format }),
        }
    }

    /// Bytes occupied by one sample
    pub fn bytes(&self) -> usize {
        match self {
            SampleFormat::U8 => 1,
            SampleFormat::U16 | SampleFormat::I16 => 2,
            SampleFormat::U32 | SampleFormat::I32 | SampleFormat::F32 => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SampleFormat::U8 => "u8",
            SampleFormat::U16 => "u16",
            SampleFormat::U32 => "u32",
            SampleFormat::I16 => "i16",
            SampleFormat::I32 => "i32",
            SampleFormat::F32 => "f32",
        }
    }

    /// Reads the raw bits of one sample
    fn word(&self, bytes: &[u8], order: ByteOrder) -> u32 {
        match self.bytes() {
            1 => bytes[0] as u32,
            2 => order.u16_from(bytes) as u32,
            _ => order.u32_from(bytes),
        }
    }

    /// Interprets the raw bits of one sample as a value
    fn value(&self, word: u32) -> f32 {
        match self {
            SampleFormat::U8 | SampleFormat::U16 | SampleFormat::U32 => word as f32,
            SampleFormat::I16 => word as u16 as i16 as f32,
            SampleFormat::I32 => word as i32 as f32,
            SampleFormat::F32 => f32::from_bits(word),
        }
    }

    /// Adds two raw words modulo the sample width
    fn wrapping_add(&self, a: u32, b: u32) -> u32 {
        match self.bytes() {
            1 => (a as u8).wrapping_add(b as u8) as u32,
            2 => (a as u16).wrapping_add(b as u16) as u32,
            _ => a.wrapping_add(b),
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Checks that a predictor code can be undone for a sample format
pub fn check_predictor(code: u64, format: SampleFormat) -> TiffResult<()> {
    let none = predictor::NONE as u64;
    let horizontal = predictor::HORIZONTAL_DIFFERENCING as u64;

    if code == none || (code == horizontal && format != SampleFormat::F32) {
        Ok(())
    } else {
        Err(TiffError::UnsupportedPredictor(code))
    }
}

/// Decodes a block of `rows x row_len` samples into `f32`
///
/// With horizontal differencing each row stores its first sample as is
/// and every following sample as the difference to its left neighbour.
///
/// # Arguments
/// * `data` - Decompressed block bytes
/// * `row_len` - Samples per stored row
/// * `rows` - Stored rows to decode
/// * `format` - Sample format of the band
/// * `order` - Byte order of the file
/// * `predictor_code` - Predictor tag value
pub fn decode_block(
    data: &[u8],
    row_len: usize,
    rows: usize,
    format: SampleFormat,
    order: ByteOrder,
    predictor_code: u64,
) -> TiffResult<Vec<f32>> {
    let size = format.bytes();
    let expected = row_len * rows * size;
    if data.len() < expected {
        return Err(TiffError::TruncatedData { expected, actual: data.len() });
    }

    let differenced = predictor_code == predictor::HORIZONTAL_DIFFERENCING as u64;
    let mut values = Vec::with_capacity(row_len * rows);

    for row in data[..expected].chunks_exact(row_len * size) {
        let mut previous = 0u32;
        for (i, sample) in row.chunks_exact(size).enumerate() {
            let mut word = format.word(sample, order);
            if differenced && i > 0 {
                word = format.wrapping_add(word, previous);
            }
            previous = word;
            values.push(format.value(word));
        }
    }

    Ok(values)
}
