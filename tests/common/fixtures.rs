use eanscan::decoding::ean13::encode_ean13;
use image::{DynamicImage, GrayImage, Luma};
use tempfile::NamedTempFile;

/// Valid EAN-13 values (check digit included).
pub const EAN_A: &str = "4006381333931";
pub const EAN_B: &str = "5901234123457";
/// Leading zero, so every left digit uses the L table.
pub const EAN_ZERO: &str = "0012345678905";

/// Pixels per module in synthesized images.
pub const MODULE_PX: u32 = 3;
pub const CANVAS_WIDTH: u32 = 720;
pub const CANVAS_HEIGHT: u32 = 600;
pub const BAR_HEIGHT: u32 = 280;

/// The 95-module bitstream for `digits`.
pub fn modules_for(digits: &str) -> Vec<u8> {
    encode_ean13(digits).expect("test digits must be 13 ASCII digits")
}

/// A scanline: `quiet` zero pixels, every module repeated `module` times, `quiet` zeros.
pub fn scanline_for(digits: &str, module: usize, quiet: usize) -> Vec<u8> {
    let mut line = vec![0u8; quiet];
    for bit in modules_for(digits) {
        line.extend(std::iter::repeat_n(bit, module));
    }
    line.extend(std::iter::repeat_n(0u8, quiet));
    line
}

/// Black bars on white, bars running vertically, centered on the canvas.
pub fn barcode_image(digits: &str) -> GrayImage {
    let modules = modules_for(digits);
    let code_width = modules.len() as u32 * MODULE_PX;
    let left = (CANVAS_WIDTH - code_width) / 2;
    let top = (CANVAS_HEIGHT - BAR_HEIGHT) / 2;

    GrayImage::from_fn(CANVAS_WIDTH, CANVAS_HEIGHT, |x, y| {
        let in_rows = y >= top && y < top + BAR_HEIGHT;
        let in_cols = x >= left && x < left + code_width;
        if in_rows && in_cols && modules[((x - left) / MODULE_PX) as usize] == 1 {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    })
}

/// A crop as the locator would produce it: the barcode plus a small margin.
pub fn barcode_crop(digits: &str, margin: u32, height: u32) -> DynamicImage {
    let modules = modules_for(digits);
    let width = modules.len() as u32 * MODULE_PX + 2 * margin;
    let img = GrayImage::from_fn(width, height, |x, _| {
        if x < margin || x >= width - margin {
            return Luma([255u8]);
        }
        if modules[((x - margin) / MODULE_PX) as usize] == 1 {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    });
    DynamicImage::ImageLuma8(img)
}

pub fn uniform_image(value: u8) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, Luma([value])))
}

/// Writes `img` as PNG to a temp file that is removed on drop.
pub fn save_temp_png(img: &DynamicImage) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}
