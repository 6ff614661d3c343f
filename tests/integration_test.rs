//! End-to-end tests: band TIFFs on disk through export, reconstruction and scoring

use std::fs;
use std::path::{Path, PathBuf};

use image::{GrayImage, ImageBuffer, Luma};
use ndarray::{Array3, Array4, Axis};

use changekit::io::npy::{read_npy, write_npy};
use changekit::patch::PatchError;
use changekit::{ChangeKit, KitConfig, KitError};

const HEIGHT: u32 = 60;
const WIDTH: u32 = 50;
const THRESHOLD: u32 = 1500;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("changekit_it_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_band(path: &Path, width: u32, height: u32, value: impl Fn(u32, u32) -> u16) {
    let band: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_fn(width, height, |x, y| Luma([value(x, y)]));
    band.save(path).unwrap();
}

/// Writes `<root>/city/imgs_{1,2}` with a coarse B01 and full-size B02, B03
fn write_city(root: &Path, second_height: u32) -> PathBuf {
    let city = root.join("city");
    for (date, height) in [("imgs_1", HEIGHT), ("imgs_2", second_height)] {
        let dir = city.join(date);
        fs::create_dir_all(&dir).unwrap();
        write_band(&dir.join("T31TFJ_B01.tif"), WIDTH / 2, height / 2, |_, _| 100);
        write_band(&dir.join("T31TFJ_B02.tif"), WIDTH, height, |x, _| x as u16);
        write_band(&dir.join("T31TFJ_B03.tif"), WIDTH, height, |x, y| (y * WIDTH + x) as u16);
    }
    city
}

fn kit() -> ChangeKit {
    ChangeKit::new(KitConfig {
        patch_size: 16,
        rgb_bands: [2, 1, 0],
        ..KitConfig::default()
    })
    .unwrap()
}

fn expected_change(row: usize, col: usize) -> u8 {
    u8::from((row as u32) * WIDTH + col as u32 > THRESHOLD)
}

#[test]
fn test_export_reconstruct_evaluate() {
    let root = scratch_dir("pipeline");
    let city = write_city(&root, HEIGHT);
    let out = root.join("out");
    let kit = kit();

    let layout = kit.export_patches(&city, &out, true).unwrap();
    assert_eq!(layout.as_tuple(), (3, 3, 3, 3, 60, 50));
    assert_eq!(layout.total(), 16);
    for name in ["city_date1.npy", "city_date2.npy", "city_layout.toml", "city_date1_rgb.png", "city_date2_rgb.png"] {
        assert!(out.join(name).is_file(), "{} missing", name);
    }

    let batch = read_npy(&out.join("city_date1.npy")).unwrap();
    assert_eq!(batch.shape(), &[16, 3, 16, 16]);
    // first grid patch, band B03, unresampled
    assert_eq!(batch[[0, 2, 1, 3]], 53.0);
    // resampled constant band
    assert!((batch[[15, 0, 15, 15]] - 100.0).abs() < 1e-3);

    // threshold band B03 of each patch into class maps
    let labels = batch.index_axis(Axis(1), 2).mapv(|v| if v > THRESHOLD as f32 { 1.0f32 } else { 0.0 });
    let predictions = root.join("predictions.npy");
    write_npy(&predictions, &labels).unwrap();

    let mask_path = root.join("mask.png");
    let classes_path = root.join("mask_classes.csv");
    let mask = kit.reconstruct(&predictions, &out.join("city_layout.toml"), &mask_path, Some(classes_path.as_path())).unwrap();

    assert_eq!(mask.dim(), (60, 50));
    for ((row, col), &value) in mask.indexed_iter() {
        assert_eq!(value, expected_change(row, col), "pixel ({}, {})", row, col);
    }

    let saved = image::open(&mask_path).unwrap().to_luma8();
    assert_eq!(saved.get_pixel(0, 0)[0], 0);
    assert_eq!(saved.get_pixel(49, 59)[0], 255);
    assert!(fs::read_to_string(&classes_path).unwrap().starts_with("row/col,0,1,2"));

    let truth = GrayImage::from_fn(WIDTH, HEIGHT, |x, y| Luma([expected_change(y as usize, x as usize) * 255]));
    let truth_path = root.join("cm.png");
    truth.save(&truth_path).unwrap();

    let report = kit.evaluate(&mask_path, &truth_path).unwrap();
    assert_eq!(report.pixels, 3000);
    assert_eq!(report.accuracy, 100.0);
    assert_eq!(report.change.f1, 1.0);

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_scores_are_reduced_by_argmax() {
    let root = scratch_dir("scores");
    let city = write_city(&root, HEIGHT);
    let out = root.join("out");
    let kit = kit();

    let layout = kit.export_patches(&city, &out, false).unwrap();
    let p = layout.patch_size;

    // channel 1 wins on every pixel of the corner patch only
    let mut scores = Array4::<f32>::zeros((layout.total(), 2, p, p));
    scores.index_axis_mut(Axis(0), layout.total() - 1).index_axis_mut(Axis(0), 1).fill(1.0);
    let predictions = root.join("scores.npy");
    write_npy(&predictions, &scores).unwrap();

    let mask = kit.reconstruct(&predictions, &out.join("city_layout.toml"), &root.join("mask.png"), None).unwrap();
    assert_eq!(mask[[59, 49]], 1);
    assert_eq!(mask[[44, 34]], 1);
    assert_eq!(mask[[43, 49]], 0);
    assert_eq!(mask.iter().filter(|&&v| v == 1).count(), 16 * 16);

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_wrong_prediction_count_is_rejected() {
    let root = scratch_dir("count");
    let city = write_city(&root, HEIGHT);
    let out = root.join("out");
    let kit = kit();

    kit.export_patches(&city, &out, false).unwrap();

    let predictions = root.join("short.npy");
    write_npy(&predictions, &Array3::<f32>::zeros((15, 16, 16))).unwrap();

    let err = kit.reconstruct(&predictions, &out.join("city_layout.toml"), &root.join("mask.png"), None).unwrap_err();
    assert!(matches!(err, KitError::Patch(PatchError::PatchCountMismatch { expected: 16, actual: 15 })));

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_second_date_takes_first_date_size() {
    let root = scratch_dir("resized");
    let city = write_city(&root, 40);
    let out = root.join("out");

    let pair = kit().load_pair(&city).unwrap();
    assert_eq!(pair.second.data.dim(), (60, 50, 3));

    let layout = kit().export_patches(&city, &out, false).unwrap();
    assert_eq!(layout.as_tuple(), (3, 3, 3, 3, 60, 50));
    assert_eq!(read_npy(&out.join("city_date2.npy")).unwrap().shape(), &[16, 3, 16, 16]);

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_band_count_mismatch_is_rejected() {
    let root = scratch_dir("bands");
    let city = write_city(&root, HEIGHT);
    fs::remove_file(city.join("imgs_2").join("T31TFJ_B01.tif")).unwrap();

    let err = kit().export_patches(&city, &root.join("out"), false).unwrap_err();
    assert!(matches!(err, KitError::Patch(PatchError::BandCountMismatch { expected: 3, actual: 2 })));

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_analyze_reports_layout() {
    let root = scratch_dir("analyze");
    let city = write_city(&root, HEIGHT);

    let summary = kit().analyze(&city).unwrap();
    assert!(summary.contains("B03 [u16] (template)"));
    assert!(summary.contains("Scene: 60x50x3"));
    assert!(summary.contains("Total per date: 16"));

    let band = kit().describe_band(&city.join("imgs_1").join("T31TFJ_B02.tif")).unwrap();
    assert!(band.contains("Dimensions: 50x60"));

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_evaluate_rejects_size_mismatch() {
    let root = scratch_dir("eval");
    let mask = root.join("mask.png");
    let truth = root.join("cm.png");
    GrayImage::new(4, 4).save(&mask).unwrap();
    GrayImage::new(4, 5).save(&truth).unwrap();

    assert!(matches!(kit().evaluate(&mask, &truth), Err(KitError::Metrics(_))));

    fs::remove_dir_all(&root).unwrap();
}
