//! Single-band raster decoding
//!
//! Reads the first image of a TIFF or BigTIFF file into an `(H, W)` array
//! of `f32`. Stripped and tiled files share one code path: a strip is
//! treated as a block spanning the full image width.

use log::{debug, info};
use ndarray::Array2;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::compression::{CompressionFactory, CompressionHandler};
use crate::io::byte_order::ByteOrder;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::tags;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::{TiffReader, TIFF};

use super::sample::{self, SampleFormat};

/// Where the encoded blocks of an image live and how to decode them
#[derive(Debug, Clone)]
struct BlockPlan {
    width: usize,
    height: usize,
    block_width: usize,
    block_height: usize,
    blocks_across: usize,
    tiled: bool,
    offsets: Vec<u64>,
    byte_counts: Vec<u64>,
    compression: u64,
    predictor: u64,
    format: SampleFormat,
    order: ByteOrder,
}

impl BlockPlan {
    fn blocks_down(&self) -> usize {
        (self.height + self.block_height - 1) / self.block_height
    }

    /// Stored rows of block `index`; the last strip may be short, tiles never are
    fn stored_rows(&self, index: usize) -> usize {
        if self.tiled {
            self.block_height
        } else {
            let start = (index / self.blocks_across) * self.block_height;
            self.block_height.min(self.height - start)
        }
    }
}

/// Decoder for single-band TIFF rasters
pub struct BandReader<R: SeekableReader> {
    /// Reader positioned anywhere in the file
    reader: R,
    /// Header and IFD parser
    tiff_reader: TiffReader,
    /// Parsed container
    tiff: TIFF,
}

impl BandReader<BufReader<File>> {
    /// Opens a band file and parses its header
    pub fn open(path: &Path) -> TiffResult<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::with_capacity(1024 * 1024, file))
    }
}

impl<R: SeekableReader> BandReader<R> {
    /// Parses the TIFF header and IFD chain of `reader`
    pub fn new(mut reader: R) -> TiffResult<Self> {
        let mut tiff_reader = TiffReader::new();
        let tiff = tiff_reader.read(&mut reader)?;
        tiff.require_main_ifd()?;

        Ok(BandReader { reader, tiff_reader, tiff })
    }

    /// The parsed container
    pub fn tiff(&self) -> &TIFF {
        &self.tiff
    }

    /// `(height, width)` of the first image
    pub fn dimensions(&self) -> TiffResult<(usize, usize)> {
        let ifd = self.tiff.require_main_ifd()?;
        let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;
        Ok((height as usize, width as usize))
    }

    /// Sample format of the first image
    pub fn sample_format(&self) -> TiffResult<SampleFormat> {
        let ifd = self.tiff.require_main_ifd()?;
        SampleFormat::from_tags(ifd.get_bits_per_sample(), ifd.get_sample_format())
    }

    /// Collects every tag needed to decode the first image
    fn plan(&mut self) -> TiffResult<BlockPlan> {
        let ifd = self.tiff.require_main_ifd()?;

        let samples = ifd.get_samples_per_pixel();
        if samples != 1 {
            return Err(TiffError::NotSingleBand(samples));
        }

        let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;
        let (width, height) = (width as usize, height as usize);
        if width == 0 || height == 0 {
            return Err(TiffError::MissingDimensions);
        }

        let format = SampleFormat::from_tags(ifd.get_bits_per_sample(), ifd.get_sample_format())?;
        let predictor = ifd.get_predictor();
        sample::check_predictor(predictor, format)?;

        let tiled = ifd.is_tiled();
        let (offset_tag, count_tag) = if tiled {
            (tags::TILE_OFFSETS, tags::TILE_BYTE_COUNTS)
        } else {
            (tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS)
        };

        let (block_width, block_height) = if tiled {
            let tile_width = ifd.get_tag_value(tags::TILE_WIDTH).ok_or(TiffError::TagNotFound(tags::TILE_WIDTH))?;
            let tile_height = ifd.get_tag_value(tags::TILE_LENGTH).ok_or(TiffError::TagNotFound(tags::TILE_LENGTH))?;
            (tile_width as usize, tile_height as usize)
        } else {
            let rows_per_strip = ifd.get_tag_value(tags::ROWS_PER_STRIP)
                .map(|rows| rows as usize)
                .unwrap_or(height)
                .min(height);
            (width, rows_per_strip)
        };

        if block_width == 0 || block_height == 0 {
            return Err(TiffError::GenericError(format!(
                "Invalid block size {}x{}", block_width, block_height
            )));
        }

        let offsets = self.tiff_reader.read_tag_values(&mut self.reader, ifd, offset_tag)?;
        let byte_counts = self.tiff_reader.read_tag_values(&mut self.reader, ifd, count_tag)?;

        let plan = BlockPlan {
            width,
            height,
            block_width,
            block_height,
            blocks_across: (width + block_width - 1) / block_width,
            tiled,
            offsets,
            byte_counts,
            compression: ifd.get_compression(),
            predictor,
            format,
            order: self.tiff.byte_order,
        };

        let expected_blocks = plan.blocks_across * plan.blocks_down();
        if plan.offsets.len() < expected_blocks || plan.byte_counts.len() < expected_blocks {
            return Err(TiffError::GenericError(format!(
                "Expected {} blocks, found {} offsets and {} byte counts",
                expected_blocks, plan.offsets.len(), plan.byte_counts.len()
            )));
        }

        Ok(plan)
    }

    /// Decodes the first image into an `(H, W)` array
    ///
    /// # Returns
    /// The band, or an error if the layout, compression, predictor or
    /// sample format is not supported
    pub fn read_band(&mut self) -> TiffResult<Array2<f32>> {
        let plan = self.plan()?;
        let handler = CompressionFactory::create_handler(plan.compression)?;

        info!("Decoding {}x{} {} band ({} {}x{} {}, {})",
              plan.height, plan.width, plan.format,
              plan.blocks_across * plan.blocks_down(), plan.block_width, plan.block_height,
              if plan.tiled { "tiles" } else { "strips" }, handler.name());

        let mut band = Array2::<f32>::zeros((plan.height, plan.width));

        for index in 0..plan.blocks_across * plan.blocks_down() {
            let rows = plan.stored_rows(index);
            let values = self.read_block(&plan, index, rows, &*handler)?;

            let top = (index / plan.blocks_across) * plan.block_height;
            let left = (index % plan.blocks_across) * plan.block_width;
            let visible_rows = rows.min(plan.height - top);
            let visible_cols = plan.block_width.min(plan.width - left);

            for r in 0..visible_rows {
                let source = &values[r * plan.block_width..r * plan.block_width + visible_cols];
                for (c, value) in source.iter().enumerate() {
                    band[[top + r, left + c]] = *value;
                }
            }
        }

        Ok(band)
    }

    /// Reads, decompresses and decodes one strip or tile
    fn read_block(
        &mut self,
        plan: &BlockPlan,
        index: usize,
        rows: usize,
        handler: &dyn CompressionHandler,
    ) -> TiffResult<Vec<f32>> {
        let offset = plan.offsets[index];
        let byte_count = plan.byte_counts[index] as usize;
        debug!("Reading block {} at offset {} with {} bytes", index, offset, byte_count);

        self.reader.seek(SeekFrom::Start(offset))?;
        let mut compressed = vec![0u8; byte_count];
        self.reader.read_exact(&mut compressed)?;

        let data = handler.decompress(&compressed)?;
        sample::decode_block(&data, plan.block_width, rows, plan.format, plan.order, plan.predictor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
    use std::io::Cursor;

    /// Writes a classic TIFF whose single IFD sits right after the header,
    /// followed by the value arrays and the image blocks
    fn build_tiff<B: byteorder::ByteOrder>(
        marker: u16,
        entries: &[(u16, u16, Vec<u32>)],
        blocks: &[Vec<u8>],
        tiled: bool,
    ) -> Vec<u8> {
        let (offset_tag, count_tag) = if tiled { (324u16, 325u16) } else { (273u16, 279u16) };
        let entry_count = entries.len() + 2;
        let ifd_end = 8 + 2 + 12 * entry_count + 4;

        // two LONG arrays for offsets and byte counts, then the block data
        let arrays_len = if blocks.len() > 1 { blocks.len() * 8 } else { 0 };
        let mut data_offset = ifd_end + arrays_len;
        let mut offsets = Vec::new();
        for block in blocks {
            offsets.push(data_offset as u32);
            data_offset += block.len();
        }
        let counts: Vec<u32> = blocks.iter().map(|b| b.len() as u32).collect();

        let mut all: Vec<(u16, u16, Vec<u32>)> = entries.to_vec();
        all.push((offset_tag, 4, offsets));
        all.push((count_tag, 4, counts));
        all.sort_by_key(|e| e.0);

        let mut buf = Vec::new();
        buf.write_u16::<LittleEndian>(marker).unwrap();
        buf.write_u16::<B>(42).unwrap();
        buf.write_u32::<B>(8).unwrap();
        buf.write_u16::<B>(entry_count as u16).unwrap();

        let mut array_pos = ifd_end;
        let mut arrays = Vec::new();
        for (tag, field_type, values) in &all {
            buf.write_u16::<B>(*tag).unwrap();
            buf.write_u16::<B>(*field_type).unwrap();
            buf.write_u32::<B>(values.len() as u32).unwrap();
            if values.len() == 1 {
                if *field_type == 3 {
                    buf.write_u16::<B>(values[0] as u16).unwrap();
                    buf.write_u16::<B>(0).unwrap();
                } else {
                    buf.write_u32::<B>(values[0]).unwrap();
                }
            } else {
                buf.write_u32::<B>(array_pos as u32).unwrap();
                for v in values {
                    arrays.write_u32::<B>(*v).unwrap();
                }
                array_pos += values.len() * 4;
            }
        }
        buf.write_u32::<B>(0).unwrap();
        buf.extend_from_slice(&arrays);
        for block in blocks {
            buf.extend_from_slice(block);
        }
        buf
    }

    #[test]
    fn test_stripped_u16_little_endian() {
        // 3x2 image, two rows per strip: the second strip holds one row
        let mut strip0 = Vec::new();
        for v in [1u16, 2, 3, 4] {
            strip0.write_u16::<LittleEndian>(v).unwrap();
        }
        let mut strip1 = Vec::new();
        for v in [5u16, 6] {
            strip1.write_u16::<LittleEndian>(v).unwrap();
        }

        let bytes = build_tiff::<LittleEndian>(
            0x4949,
            &[(256, 3, vec![2]), (257, 3, vec![3]), (258, 3, vec![16]), (278, 3, vec![2])],
            &[strip0, strip1],
            false,
        );

        let mut reader = BandReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.dimensions().unwrap(), (3, 2));
        assert_eq!(reader.sample_format().unwrap(), SampleFormat::U16);

        let band = reader.read_band().unwrap();
        assert_eq!(band, ndarray::arr2(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]));
    }

    #[test]
    fn test_tiled_big_endian_f32_clips_edge_tiles() {
        // 3x3 image in 2x2 tiles, the right and bottom tiles are padded
        let mut tiles = Vec::new();
        for tile in 0..4 {
            let mut data = Vec::new();
            for i in 0..4 {
                data.write_f32::<BigEndian>((tile * 10 + i) as f32).unwrap();
            }
            tiles.push(data);
        }

        let bytes = build_tiff::<BigEndian>(
            0x4D4D,
            &[
                (256, 3, vec![3]), (257, 3, vec![3]), (258, 3, vec![32]),
                (322, 3, vec![2]), (323, 3, vec![2]), (339, 3, vec![3]),
            ],
            &tiles,
            true,
        );

        let band = BandReader::new(Cursor::new(bytes)).unwrap().read_band().unwrap();
        assert_eq!(band, ndarray::arr2(&[
            [0.0, 1.0, 10.0],
            [2.0, 3.0, 12.0],
            [20.0, 21.0, 30.0],
        ]));
    }

    #[test]
    fn test_deflate_with_predictor() {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;

        // 1x4 u8 row [5, 7, 7, 1] stored as differences
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&[5, 2, 0, 250]).unwrap();
        let strip = encoder.finish().unwrap();

        let bytes = build_tiff::<LittleEndian>(
            0x4949,
            &[(256, 3, vec![4]), (257, 3, vec![1]), (258, 3, vec![8]), (259, 3, vec![8]), (317, 3, vec![2])],
            &[strip],
            false,
        );

        let band = BandReader::new(Cursor::new(bytes)).unwrap().read_band().unwrap();
        assert_eq!(band, ndarray::arr2(&[[5.0, 7.0, 7.0, 1.0]]));
    }

    #[test]
    fn test_multi_sample_image_is_rejected() {
        let bytes = build_tiff::<LittleEndian>(
            0x4949,
            &[(256, 3, vec![1]), (257, 3, vec![1]), (258, 3, vec![8]), (277, 3, vec![3])],
            &[vec![1, 2, 3]],
            false,
        );

        let mut reader = BandReader::new(Cursor::new(bytes)).unwrap();
        assert!(matches!(reader.read_band(), Err(TiffError::NotSingleBand(3))));
    }

    #[test]
    fn test_unsupported_compression_is_rejected() {
        let bytes = build_tiff::<LittleEndian>(
            0x4949,
            &[(256, 3, vec![1]), (257, 3, vec![1]), (258, 3, vec![8]), (259, 3, vec![5])],
            &[vec![0]],
            false,
        );

        let mut reader = BandReader::new(Cursor::new(bytes)).unwrap();
        assert!(matches!(reader.read_band(), Err(TiffError::UnsupportedCompression(5))));
    }
}
