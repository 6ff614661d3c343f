//! Mask arrays and their on-disk formats

use image::GrayImage;
use log::info;
use ndarray::Array2;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::errors::{KitError, KitResult};
use crate::io::npy::write_npy;

/// Formats `MaskArray::save_to_file` understands
pub const ARRAY_FORMATS: [&str; 4] = ["png", "csv", "json", "npy"];

/// A single-channel 8-bit mask
///
/// Holds class labels (or scaled values) in row-major order together with
/// the dimensions needed to interpret them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskArray {
    /// Width of the mask (columns)
    pub width: u32,
    /// Height of the mask (rows)
    pub height: u32,
    /// Values in row-major order
    pub data: Vec<u8>,
}

impl MaskArray {
    /// Wraps an `(H, W)` array
    pub fn from_array(mask: &Array2<u8>) -> Self {
        let (height, width) = mask.dim();
        MaskArray {
            width: width as u32,
            height: height as u32,
            data: mask.iter().copied().collect(),
        }
    }

    /// The mask as an `(H, W)` array
    pub fn to_array(&self) -> KitResult<Array2<u8>> {
        Array2::from_shape_vec((self.height as usize, self.width as usize), self.data.clone())
            .map_err(|e| KitError::Generic(format!("Mask data does not fit its size: {}", e)))
    }

    /// Reads the first channel of an image file as a mask
    pub fn load(path: &Path) -> KitResult<Self> {
        let gray = image::open(path)?.to_luma8();
        info!("Loaded {}x{} mask from {}", gray.width(), gray.height(), path.display());

        Ok(MaskArray {
            width: gray.width(),
            height: gray.height(),
            data: gray.into_raw(),
        })
    }

    /// Value at column `x`, row `y`, or None if out of bounds
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let idx = (y * self.width + x) as usize;
        self.data.get(idx).copied()
    }

    /// Save the mask to a file in the specified format
    ///
    /// # Arguments
    /// * `path` - Path to save the file
    /// * `format` - One of `png`, `csv`, `json`, `npy`
    ///
    /// # Returns
    /// Result indicating success or an error
    pub fn save_to_file(&self, path: &Path, format: &str) -> KitResult<()> {
        info!("Saving {}x{} mask to {} as {}", self.width, self.height, path.display(), format);

        match format.to_lowercase().as_str() {
            "png" => self.save_as_png(path),
            "csv" => self.save_as_csv(path),
            "json" => self.save_as_json(path),
            "npy" => write_npy(path, &self.to_array()?),
            _ => Err(KitError::Generic(format!("Unsupported array format: {}", format))),
        }
    }

    fn save_as_png(&self, path: &Path) -> KitResult<()> {
        let image = GrayImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| KitError::Generic("Mask data does not fit its size".to_string()))?;
        image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    /// Save the mask as CSV with a `row/col` header
    fn save_as_csv(&self, path: &Path) -> KitResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        write!(writer, "row/col")?;
        for x in 0..self.width {
            write!(writer, ",{}", x)?;
        }
        writeln!(writer)?;

        for y in 0..self.height {
            write!(writer, "{}", y)?;
            for x in 0..self.width {
                write!(writer, ",{}", self.get(x, y).unwrap_or(0))?;
            }
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Save the mask as JSON with rows as nested arrays
    fn save_as_json(&self, path: &Path) -> KitResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "{{")?;
        writeln!(writer, "  \"width\": {},", self.width)?;
        writeln!(writer, "  \"height\": {},", self.height)?;
        writeln!(writer, "  \"data\": [")?;

        for y in 0..self.height {
            let row: Vec<String> = (0..self.width)
                .map(|x| self.get(x, y).unwrap_or(0).to_string())
                .collect();
            let separator = if y + 1 < self.height { "," } else { "" };
            writeln!(writer, "    [{}]{}", row.join(", "), separator)?;
        }

        writeln!(writer, "  ]")?;
        writeln!(writer, "}}")?;

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample() -> MaskArray {
        MaskArray::from_array(&Array2::from_shape_vec((2, 3), vec![0, 1, 0, 1, 1, 0]).unwrap())
    }

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("changekit_mask_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_get_bounds() {
        let mask = sample();
        assert_eq!(mask.get(1, 0), Some(1));
        assert_eq!(mask.get(2, 1), Some(0));
        assert_eq!(mask.get(3, 0), None);
    }

    #[test]
    fn test_csv_layout() {
        let path = scratch("mask.csv");
        sample().save_to_file(&path, "csv").unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "row/col,0,1,2\n0,0,1,0\n1,1,1,0\n");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_json_layout() {
        let path = scratch("mask.json");
        sample().save_to_file(&path, "JSON").unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"width\": 3,"));
        assert!(text.contains("    [0, 1, 0],\n    [1, 1, 0]\n  ]"));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_png_reloads() {
        let path = scratch("mask.png");
        sample().save_to_file(&path, "png").unwrap();
        assert_eq!(MaskArray::load(&path).unwrap(), sample());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_unknown_format() {
        assert!(sample().save_to_file(&scratch("mask.bmp"), "bmp").is_err());
    }
}
