//! Source image preparation for image-to-video submission.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Canvas aspect ratio (16:9).
pub const TARGET_ASPECT: (u32, u32) = (16, 9);
pub const MAX_WIDTH: u32 = 1280;
pub const MAX_HEIGHT: u32 = 720;
pub const JPEG_QUALITY: u8 = 95;

/// Canvas dimensions for an image of the given size.
///
/// Wide images keep their width (capped at [`MAX_WIDTH`]), others keep their
/// height (capped at [`MAX_HEIGHT`]); the other side follows the 16:9 ratio.
pub fn canvas_size(width: u32, height: u32) -> (u32, u32) {
    let (rw, rh) = TARGET_ASPECT;
    // width / height > rw / rh without floating point
    if u64::from(width) * u64::from(rh) > u64::from(height) * u64::from(rw) {
        let canvas_w = width.min(MAX_WIDTH);
        (canvas_w, canvas_w * rh / rw)
    } else {
        let canvas_h = height.min(MAX_HEIGHT);
        (canvas_h * rw / rh, canvas_h)
    }
}

/// Center the image on a black 16:9 canvas and encode it as JPEG.
///
/// The image is only ever scaled down. Transparent areas show the canvas.
pub fn preprocess_image(data: &[u8]) -> MediaResult<Vec<u8>> {
    let img = image::load_from_memory(data)?;
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(MediaError::InvalidSpec("Image has no pixels".to_string()));
    }

    let (canvas_w, canvas_h) = canvas_size(width, height);
    let fitted = fit_within(img, canvas_w, canvas_h).to_rgba8();

    let mut canvas = RgbaImage::from_pixel(canvas_w, canvas_h, Rgba([0, 0, 0, 255]));
    let x = (canvas_w - fitted.width()) / 2;
    let y = (canvas_h - fitted.height()) / 2;
    imageops::overlay(&mut canvas, &fitted, i64::from(x), i64::from(y));

    let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
    let mut output = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY).encode_image(&rgb)?;

    debug!(
        source_width = width,
        source_height = height,
        canvas_width = canvas_w,
        canvas_height = canvas_h,
        "Preprocessed source image"
    );

    Ok(output.into_inner())
}

fn fit_within(img: DynamicImage, max_w: u32, max_h: u32) -> DynamicImage {
    if img.width() <= max_w && img.height() <= max_h {
        return img;
    }
    img.resize(max_w, max_h, FilterType::Lanczos3)
}
