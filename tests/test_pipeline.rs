//! End-to-end scanning of synthesized photos.

mod common;

use eanscan::{
    BarcodeError, BarcodeScanner, ImageSource, LocatorConfig, Pipeline, ReaderConfig,
    get_barcode_from_image, locate_barcode, scan_source,
};
use image::DynamicImage;
use image::imageops::{rotate90, rotate270};

use common::*;

#[test]
fn decodes_synthetic_photo() {
    let photo = DynamicImage::ImageLuma8(barcode_image(EAN_A));
    let found = get_barcode_from_image(&photo).expect("barcode should be found");
    assert_eq!(found.as_str(), EAN_A);
    assert!(found.has_valid_checksum());
}

#[test]
fn decodes_color_photo() {
    let photo = DynamicImage::ImageRgb8(DynamicImage::ImageLuma8(barcode_image(EAN_B)).to_rgb8());
    assert_eq!(get_barcode_from_image(&photo).unwrap().as_str(), EAN_B);
}

#[test]
fn decodes_rotated_photo() {
    // Bars now run horizontally; the crop is turned back before reading.
    let photo = DynamicImage::ImageLuma8(rotate90(&barcode_image(EAN_A)));
    assert_eq!(get_barcode_from_image(&photo).unwrap().as_str(), EAN_A);
}

#[test]
fn decodes_counter_clockwise_rotated_photo() {
    // De-rotation turns this crop upside down, so every scanline reads
    // right to left and only the reversed retry decodes it.
    let photo = DynamicImage::ImageLuma8(rotate270(&barcode_image(EAN_A)));
    assert_eq!(get_barcode_from_image(&photo).unwrap().as_str(), EAN_A);

    let forward_only = BarcodeScanner::new(
        LocatorConfig::default(),
        ReaderConfig::default().with_try_reversed(false),
    );
    assert_eq!(forward_only.scan(&photo).unwrap(), None);
}

#[test]
fn located_crops_carry_window_and_group() {
    let photo = DynamicImage::ImageLuma8(barcode_image(EAN_A));
    let scanner = BarcodeScanner::default().with_verbose(true);
    let items = scanner
        .locator
        .pipeline_with_reader(scanner.reader.clone())
        .run(photo)
        .unwrap();
    assert!(!items.is_empty());

    let (cx, cy) = (CANVAS_WIDTH / 2, CANVAS_HEIGHT / 2);
    for item in &items {
        let rect = item.bbox.expect("located crops record their window");
        assert!(rect.x < cx && cx < rect.x + rect.width);
        assert!(rect.y < cy && cy < rect.y + rect.height);
        assert!(rect.x + rect.width <= CANVAS_WIDTH && rect.y + rect.height <= CANVAS_HEIGHT);
        assert_eq!((item.image.width(), item.image.height()), (rect.width, rect.height));

        assert!(item.get_int("group_size").unwrap() >= 10);
        assert!(item.get_int("segments").unwrap() >= item.get_int("group_size").unwrap());
        assert!(item.get_string("strategy").is_some());
        assert!(item.get_list("candidates").is_some());
    }
}

#[test]
fn locate_returns_wide_crops() {
    let photo = DynamicImage::ImageLuma8(barcode_image(EAN_A));
    let crops = locate_barcode(&photo);
    assert!(!crops.is_empty());
    for crop in &crops {
        assert!(crop.width() > crop.height());
        assert!(crop.width() <= CANVAS_WIDTH && crop.height() <= CANVAS_HEIGHT);
    }
}

#[test]
fn blank_photos_have_no_barcode() {
    for value in [0u8, 255] {
        let photo = uniform_image(value);
        assert!(locate_barcode(&photo).is_empty());
        assert_eq!(get_barcode_from_image(&photo), None);
    }
}

#[test]
fn scan_source_from_path_and_bytes() {
    let photo = DynamicImage::ImageLuma8(barcode_image(EAN_ZERO));
    let file = save_temp_png(&photo);

    let from_path = scan_source(&ImageSource::from_path(file.path())).unwrap();
    assert_eq!(from_path.as_str(), EAN_ZERO);

    let bytes = std::fs::read(file.path()).unwrap();
    let from_bytes = scan_source(&ImageSource::from_bytes(bytes)).unwrap();
    assert_eq!(from_bytes, from_path);
}

#[test]
fn scan_source_errors() {
    assert!(matches!(
        scan_source(&ImageSource::from_bytes(b"definitely not a picture".to_vec())),
        Err(BarcodeError::ImageDecode(_))
    ));
    assert!(matches!(
        scan_source(&ImageSource::from_path("/nonexistent/photo.png")),
        Err(BarcodeError::ImageDecode(_))
    ));

    let blank = save_temp_png(&uniform_image(255));
    assert!(matches!(
        scan_source(&ImageSource::from_path(blank.path())),
        Err(BarcodeError::NoBarcodeDecoded)
    ));
}

#[test]
fn scanner_candidates_agree_with_vote() {
    let photo = DynamicImage::ImageLuma8(barcode_image(EAN_B));
    let scanner = BarcodeScanner::default();

    let candidates = scanner.candidates(&photo).unwrap();
    assert!(!candidates.is_empty());
    let winner = eanscan::majority_vote(&candidates).unwrap();
    assert_eq!(winner, EAN_B);
    assert_eq!(scanner.scan(&photo).unwrap().unwrap().as_str(), EAN_B);
}

#[test]
fn scanner_writes_debug_images() {
    let dir = tempfile::TempDir::new().unwrap();
    let out = dir.path().join("debug");
    let photo = DynamicImage::ImageLuma8(barcode_image(EAN_A));

    let scanner = BarcodeScanner::new(LocatorConfig::default(), ReaderConfig::default())
        .with_debug(out.clone());
    assert_eq!(scanner.scan(&photo).unwrap().unwrap().as_str(), EAN_A);

    for step in [
        "00_input",
        "01_grayscale_conversion",
        "02_binarization",
        "03_barcode_localization",
        "04_barcode_reading",
    ] {
        assert!(out.join(step).is_dir(), "missing {step}");
    }
    assert!(out.join("02_binarization/01_adaptive_11x11_c2.png").is_file());
    assert_eq!(std::fs::read_dir(out.join("02_binarization")).unwrap().count(), 14);
}

#[test]
fn debug_dir_must_be_empty() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("leftover.txt"), "x").unwrap();
    assert!(Pipeline::new().with_debug(dir.path().to_path_buf()).is_err());

    let empty = tempfile::TempDir::new().unwrap();
    assert!(Pipeline::new().with_debug(empty.path().to_path_buf()).is_ok());
}

#[test]
fn locator_pipeline_step_names() {
    let scanner = BarcodeScanner::default();
    assert_eq!(
        scanner.locator.pipeline().step_names(),
        vec!["Grayscale Conversion", "Binarization", "Barcode Localization"]
    );
    assert_eq!(
        scanner
            .locator
            .pipeline_with_reader(scanner.reader.clone())
            .step_names()
            .last(),
        Some(&"Barcode Reading")
    );
}
