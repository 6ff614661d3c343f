//! NumPy `.npy` files
//!
//! Patch batches leave the crate and predictions come back as `.npy`
//! arrays. Both directions go through `ndarray_npy`; reading accepts the
//! common native-endian numeric dtypes and widens them to `f32`.

use log::{debug, info};
use ndarray::{ArrayBase, ArrayD, ArrayViewD, Data, Dimension};
use ndarray_npy::{ViewElement, ViewNpyError, ViewNpyExt, WritableElement};
use std::fs;
use std::path::Path;

use crate::errors::{KitError, KitResult};

/// Writes an array as a `.npy` file
///
/// # Arguments
/// * `path` - Output file
/// * `array` - Array of any rank, written in logical (C) order
pub fn write_npy<T, S, D>(path: &Path, array: &ArrayBase<S, D>) -> KitResult<()>
where
    T: WritableElement,
    S: Data<Elem = T>,
    D: Dimension,
{
    ndarray_npy::write_npy(path, array)
        .map_err(|e| KitError::Npy(format!("Cannot write {}: {}", path.display(), e)))?;

    info!("Wrote array {:?} to {}", array.shape(), path.display());
    Ok(())
}

type Widen = fn(&[u8]) -> KitResult<Option<ArrayD<f32>>>;

/// Views `bytes` as an array of `T`, or `None` if the file stores another dtype
fn view_as_f32<T>(bytes: &[u8], widen: fn(T) -> f32) -> KitResult<Option<ArrayD<f32>>>
where
    T: ViewElement + Copy,
{
    match ArrayViewD::<T>::view_npy(bytes) {
        Ok(view) => Ok(Some(view.mapv(widen))),
        Err(ViewNpyError::WrongDescriptor(_)) => Ok(None),
        Err(e) => Err(KitError::Npy(e.to_string())),
    }
}

const READERS: [(&str, Widen); 6] = [
    ("u8", |b| view_as_f32::<u8>(b, f32::from)),
    ("u16", |b| view_as_f32::<u16>(b, f32::from)),
    ("i32", |b| view_as_f32::<i32>(b, |v| v as f32)),
    ("i64", |b| view_as_f32::<i64>(b, |v| v as f32)),
    ("f32", |b| view_as_f32::<f32>(b, |v| v)),
    ("f64", |b| view_as_f32::<f64>(b, |v| v as f32)),
];

/// Reads an `.npy` file into an `f32` array of its stored shape
///
/// Supported dtypes are `u8`, `u16`, `i32`, `i64`, `f32` and `f64`. The
/// stored shape must match the data length exactly, so a corrupt header
/// fails without allocating for it.
pub fn read_npy(path: &Path) -> KitResult<ArrayD<f32>> {
    let bytes = fs::read(path)?;

    for (dtype, read) in READERS {
        if let Some(array) = read(&bytes).map_err(|e| match e {
            KitError::Npy(msg) => KitError::Npy(format!("{}: {}", path.display(), msg)),
            other => other,
        })? {
            debug!("{} holds {} data", path.display(), dtype);
            info!("Read {} array {:?} from {}", dtype, array.shape(), path.display());
            return Ok(array);
        }
    }

    Err(KitError::Npy(format!("{}: unsupported dtype", path.display())))
}
