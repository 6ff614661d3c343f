//! Image File Directory (IFD) structures and methods
//!
//! An IFD is the tag table describing one image in a TIFF file. Band
//! rasters only ever need the first one, but the reader walks the whole
//! chain so multi-page files are reported correctly.

use std::collections::HashMap;
use std::fmt;

use log::{debug, trace};

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::{predictor, sample_format, tags};
use crate::tiff::tags as tag_names;

/// Represents an Image File Directory (IFD) in a TIFF file
#[derive(Debug, Clone)]
pub struct IFD {
    /// Entries in this IFD
    pub entries: Vec<IFDEntry>,
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in the file
    pub offset: u64,
    /// Cached tag values for quick lookup
    tag_map: HashMap<u16, IFDEntry>,
}

/// Represents an entry in an Image File Directory (IFD)
///
/// For values that fit in the entry itself, `value_offset` holds the first
/// decoded value and `inline_bytes` the raw field in file byte order. For
/// larger values `value_offset` is the file offset of the value array.
#[derive(Debug, Clone)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Value or offset to values
    pub value_offset: u64,
    /// Raw value field, padded to eight bytes
    pub inline_bytes: [u8; 8],
}

impl IFDEntry {
    /// Creates an entry from an already decoded value
    ///
    /// The inline field is laid out little-endian.
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64) -> Self {
        Self {
            tag,
            field_type,
            count,
            value_offset,
            inline_bytes: value_offset.to_le_bytes(),
        }
    }

    /// Creates an entry from the raw value field as stored in the file
    ///
    /// # Arguments
    /// * `raw` - The 4 (TIFF) or 8 (BigTIFF) byte value field
    /// * `order` - Byte order of the file
    pub fn from_raw(tag: u16, field_type: u16, count: u64, raw: &[u8], order: ByteOrder) -> Self {
        let mut inline_bytes = [0u8; 8];
        inline_bytes[..raw.len()].copy_from_slice(raw);

        let is_big_tiff = raw.len() == 8;
        let mut entry = Self { tag, field_type, count, value_offset: 0, inline_bytes };

        entry.value_offset = if entry.is_value_inline(is_big_tiff) {
            match tag_names::field_type_size(field_type).unwrap_or(1) {
                1 => raw[0] as u64,
                2 => order.u16_from(raw) as u64,
                4 => order.u32_from(raw) as u64,
                _ => order.u64_from(&inline_bytes),
            }
        } else if is_big_tiff {
            order.u64_from(raw)
        } else {
            order.u32_from(raw) as u64
        };

        debug!("IFD entry: tag={} ({}), type={} ({}), count={}, value/offset={}",
               tag, tag_names::get_tag_name(tag), field_type,
               tag_names::get_field_type_name(field_type), count, entry.value_offset);

        entry
    }

    /// Whether the values live in the entry rather than at an offset
    pub fn is_value_inline(&self, is_big_tiff: bool) -> bool {
        let size = tag_names::field_type_size(self.field_type).unwrap_or(1);
        let total_size = size * self.count as usize;
        let inline_size = if is_big_tiff { 8 } else { 4 };

        total_size <= inline_size
    }

    /// Human-readable description of this entry
    pub fn description(&self) -> String {
        let value_display = match self.tag {
            tags::COMPRESSION => format!("{} ({})",
                                         self.value_offset,
                                         tag_names::get_compression_name(self.value_offset)),
            tags::PHOTOMETRIC_INTERPRETATION => format!("{} ({})",
                                                        self.value_offset,
                                                        tag_names::get_photometric_name(self.value_offset)),
            tags::SAMPLE_FORMAT => format!("{} ({})",
                                           self.value_offset,
                                           tag_names::get_sample_format_name(self.value_offset)),
            _ => self.value_offset.to_string(),
        };

        format!("Tag: {} ({}), Type: {} ({}), Count: {}, Value/Offset: {}",
                self.tag, tag_names::get_tag_name(self.tag), self.field_type,
                tag_names::get_field_type_name(self.field_type), self.count, value_display)
    }
}

impl IFD {
    /// Creates an empty IFD
    pub fn new(number: usize, offset: u64) -> Self {
        Self {
            entries: Vec::new(),
            number,
            offset,
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry and indexes it by tag
    pub fn add_entry(&mut self, entry: IFDEntry) {
        trace!("Adding entry to IFD #{}: {}", self.number, entry.description());

        self.tag_map.insert(entry.tag, entry.clone());
        self.entries.push(entry);
    }

    /// Gets a tag value (value_offset) directly
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        self.tag_map.get(&tag).map(|entry| entry.value_offset)
    }

    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag_map.contains_key(&tag)
    }

    /// Gets an IFD entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag)
    }

    /// Width and height of the image, if both tags are present
    pub fn get_dimensions(&self) -> Option<(u64, u64)> {
        let width = self.get_tag_value(tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(tags::IMAGE_LENGTH)?;
        Some((width, height))
    }

    /// Samples per pixel, 1 when absent
    pub fn get_samples_per_pixel(&self) -> u64 {
        self.get_tag_value(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    /// Bits per sample of the first sample, 1 when absent
    pub fn get_bits_per_sample(&self) -> u64 {
        self.get_tag_value(tags::BITS_PER_SAMPLE).unwrap_or(1)
    }

    /// Sample format of the first sample, unsigned when absent
    pub fn get_sample_format(&self) -> u64 {
        self.get_tag_value(tags::SAMPLE_FORMAT)
            .unwrap_or(sample_format::UNSIGNED as u64)
    }

    /// Compression code, uncompressed when absent
    pub fn get_compression(&self) -> u64 {
        self.get_tag_value(tags::COMPRESSION).unwrap_or(1)
    }

    /// Predictor code, none when absent
    pub fn get_predictor(&self) -> u64 {
        self.get_tag_value(tags::PREDICTOR).unwrap_or(predictor::NONE as u64)
    }

    /// Whether image data is organised in tiles rather than strips
    pub fn is_tiled(&self) -> bool {
        self.has_tag(tags::TILE_WIDTH) && self.has_tag(tags::TILE_OFFSETS)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for IFD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IFD #{} (offset: {})", self.number, self.offset)?;
        writeln!(f, "  Number of entries: {}", self.entries.len())?;

        if let Some((width, height)) = self.get_dimensions() {
            writeln!(f, "  Dimensions: {}x{}", width, height)?;
        }

        writeln!(f, "  Samples per pixel: {}", self.get_samples_per_pixel())?;
        writeln!(f, "  Layout: {}", if self.is_tiled() { "tiled" } else { "stripped" })?;

        writeln!(f, "  Tags:")?;
        for entry in &self.entries {
            writeln!(f, "    {}", entry.description())?;
        }

        Ok(())
    }
}
