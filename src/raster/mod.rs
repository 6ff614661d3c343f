//! Band raster reading and scene assembly
//!
//! Decodes single-band TIFF files, discovers the bands of an acquisition
//! directory and stacks them into the `(H, W, D)` scenes the patch core
//! consumes.

mod sample;
mod band_reader;
mod band;
mod discovery;
mod scene;

pub use sample::SampleFormat;
pub use band_reader::BandReader;
pub use band::{band_id_from_path, BandRaster};
pub use discovery::discover_band_files;
pub use scene::{extract_pair, resample_bilinear, PatchPair, Scene, SceneLoader, ScenePair, DEFAULT_TEMPLATE_BAND};
