//! Image preprocessing for the pose landmark model

use anyhow::Result;
use image::{DynamicImage, GenericImageView, ImageBuffer, Rgb};
use ndarray::Array4;

/// Input size of the pose landmark model
pub const LANDMARKER_INPUT_SIZE: (u32, u32) = (256, 256);

/// Preprocess a frame for the landmark model: letterbox to 256x256 and
/// convert to an NCHW tensor normalized to [0, 1], RGB channel order.
pub fn preprocess_for_landmarks(image: &DynamicImage) -> Result<Array4<f32>> {
    let (target_w, target_h) = LANDMARKER_INPUT_SIZE;
    let padded = resize_with_padding(image, target_w, target_h);
    Ok(image_to_nchw(&padded))
}

/// Resize with aspect ratio preservation, centered on a black canvas
fn resize_with_padding(image: &DynamicImage, target_w: u32, target_h: u32) -> DynamicImage {
    let (orig_w, orig_h) = image.dimensions();

    let scale = f32::min(
        target_w as f32 / orig_w as f32,
        target_h as f32 / orig_h as f32,
    );

    let new_w = ((orig_w as f32 * scale) as u32).max(1);
    let new_h = ((orig_h as f32 * scale) as u32).max(1);

    let resized = image
        .resize_exact(new_w, new_h, image::imageops::FilterType::Triangle)
        .to_rgb8();

    let mut padded = ImageBuffer::from_pixel(target_w, target_h, Rgb([0u8, 0, 0]));
    let offset_x = (target_w - new_w) / 2;
    let offset_y = (target_h - new_h) / 2;

    for y in 0..new_h {
        for x in 0..new_w {
            padded.put_pixel(x + offset_x, y + offset_y, *resized.get_pixel(x, y));
        }
    }

    DynamicImage::ImageRgb8(padded)
}

/// Convert an RGB image to a [0, 1] NCHW tensor
fn image_to_nchw(image: &DynamicImage) -> Array4<f32> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));
    for y in 0..height {
        for x in 0..width {
            let pixel = rgb.get_pixel(x, y);
            for c in 0..3 {
                tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
            }
        }
    }

    tensor
}

/// Decode image from bytes with EXIF orientation handling
pub fn decode_image(data: &[u8]) -> Result<DynamicImage> {
    let image = image::load_from_memory(data)?;
    Ok(apply_exif_orientation(data, image))
}

/// Apply EXIF orientation to correct image rotation
/// Browsers usually bake orientation into canvas captures, but uploaded
/// stills from phones may still carry the tag.
fn apply_exif_orientation(data: &[u8], image: DynamicImage) -> DynamicImage {
    use std::io::Cursor;

    let orientation = match exif::Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif_data) => exif_data
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .unwrap_or(1) as u8,
        Err(_) => 1,
    };

    match orientation {
        1 => image,
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

/// Letterbox geometry for mapping model-space coordinates back to the
/// original frame's normalized coordinate system.
#[derive(Debug, Clone, Copy)]
pub struct Letterbox {
    pub scale: f32,
    pub offset_x: u32,
    pub offset_y: u32,
    pub content_width: u32,
    pub content_height: u32,
}

impl Letterbox {
    pub fn new(original: (u32, u32), target: (u32, u32)) -> Self {
        let (orig_w, orig_h) = original;
        let (target_w, target_h) = target;

        let scale = f32::min(
            target_w as f32 / orig_w as f32,
            target_h as f32 / orig_h as f32,
        );

        let new_w = ((orig_w as f32 * scale) as u32).max(1);
        let new_h = ((orig_h as f32 * scale) as u32).max(1);

        Self {
            scale,
            offset_x: (target_w - new_w) / 2,
            offset_y: (target_h - new_h) / 2,
            content_width: new_w,
            content_height: new_h,
        }
    }

    /// Map a point in model input pixels to normalized [0, 1] coordinates
    /// of the original frame.
    pub fn to_original_norm(&self, x: f32, y: f32) -> (f32, f32) {
        let nx = (x - self.offset_x as f32) / self.content_width as f32;
        let ny = (y - self.offset_y as f32) / self.content_height as f32;
        (nx, ny)
    }
}
