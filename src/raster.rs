//! Whole-buffer raster operations: decode, encode, crop and rotate.
//!
//! Pixel work is delegated to `image` wherever it has a primitive for it.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage, imageops};

use crate::error::{EditorError, EditorResult};

/// Decode image bytes into an RGBA buffer.
///
/// Resolves once decoding finishes; malformed input resolves to
/// [`EditorError::Decode`] rather than never resolving.
pub async fn decode_image(bytes: Vec<u8>) -> EditorResult<RgbaImage> {
    decode_image_blocking(&bytes)
}

/// Synchronous variant of [`decode_image`]
pub fn decode_image_blocking(bytes: &[u8]) -> EditorResult<RgbaImage> {
    let img = image::load_from_memory(bytes).map_err(EditorError::Decode)?;
    log::debug!("Decoded image: {}x{}", img.width(), img.height());
    Ok(img.to_rgba8())
}

/// Encode a buffer as PNG
pub fn encode_png(image: &RgbaImage) -> EditorResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(EditorError::Encode)?;
    Ok(bytes)
}

/// Shrink `image` so its longer side is at most `max_side`, keeping the
/// aspect ratio. `None` when it already fits.
pub fn downscale_to_fit(image: &RgbaImage, max_side: u32) -> Option<RgbaImage> {
    let (w, h) = image.dimensions();
    let longest = w.max(h);
    if max_side == 0 || longest <= max_side {
        return None;
    }
    let ratio = max_side as f32 / longest as f32;
    let width = ((w as f32 * ratio).round() as u32).max(1);
    let height = ((h as f32 * ratio).round() as u32).max(1);
    Some(imageops::resize(image, width, height, imageops::FilterType::Triangle))
}

/// Rotate by a whole number of quarter turns (positive = clockwise).
/// Odd turn counts swap width and height.
pub fn rotate_quarter_turns(image: &RgbaImage, turns: i32) -> RgbaImage {
    match turns.rem_euclid(4) {
        1 => imageops::rotate90(image),
        2 => imageops::rotate180(image),
        3 => imageops::rotate270(image),
        _ => image.clone(),
    }
}

/// Rotate around the centre, keeping the canvas size.
/// Corners that leave the canvas are clipped, uncovered areas stay transparent.
pub fn rotate_about_center(src: &RgbaImage, degrees: f32) -> RgbaImage {
    let (w, h) = src.dimensions();
    if degrees.rem_euclid(360.0) == 0.0 {
        return src.clone();
    }

    let mut dst = RgbaImage::new(w, h);
    let cx = w as f32 * 0.5;
    let cy = h as f32 * 0.5;
    // Inverse mapping: sample the source at R(-θ)·(p - c) + c
    let (sin, cos) = (-degrees).to_radians().sin_cos();

    for (x, y, pixel) in dst.enumerate_pixels_mut() {
        let u = x as f32 + 0.5 - cx;
        let v = y as f32 + 0.5 - cy;
        let sx = (u * cos - v * sin + cx).floor();
        let sy = (u * sin + v * cos + cy).floor();
        if sx < 0.0 || sy < 0.0 || sx >= w as f32 || sy >= h as f32 {
            continue;
        }
        *pixel = *src.get_pixel(sx as u32, sy as u32);
    }
    dst
}

/// Copy a region out of `image`. The region is clipped to the image and is
/// at least one pixel in each direction.
pub fn crop_region(image: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> RgbaImage {
    let (w, h) = image.dimensions();
    let x = x.min(w.saturating_sub(1));
    let y = y.min(h.saturating_sub(1));
    let width = width.clamp(1, (w - x).max(1));
    let height = height.clamp(1, (h - y).max(1));
    imageops::crop_imm(image, x, y, width, height).to_image()
}

/// Alpha-blend `color` onto one pixel with the given coverage
pub fn blend_pixel(image: &mut RgbaImage, x: i64, y: i64, color: [u8; 4], coverage: f32) {
    if x < 0 || y < 0 || x >= image.width() as i64 || y >= image.height() as i64 {
        return;
    }
    let alpha = (color[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let dst = image.get_pixel_mut(x as u32, y as u32);
    let Rgba([dr, dg, db, da]) = *dst;
    let mix = |s: u8, d: u8| (s as f32 * alpha + d as f32 * (1.0 - alpha)).round() as u8;
    let out_a = (alpha + da as f32 / 255.0 * (1.0 - alpha)) * 255.0;
    *dst = Rgba([
        mix(color[0], dr),
        mix(color[1], dg),
        mix(color[2], db),
        out_a.round().min(255.0) as u8,
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, 7, 255]))
    }

    #[test]
    fn test_downscale_keeps_aspect() {
        let small = downscale_to_fit(&gradient(4000, 3000), 1600).unwrap();
        assert_eq!(small.dimensions(), (1600, 1200));
        assert!(downscale_to_fit(&gradient(800, 600), 1600).is_none());
    }

    #[test]
    fn test_quarter_turn_swaps_dimensions() {
        let img = gradient(4, 2);
        assert_eq!(rotate_quarter_turns(&img, 1).dimensions(), (2, 4));
        assert_eq!(rotate_quarter_turns(&img, -1).dimensions(), (2, 4));
        assert_eq!(rotate_quarter_turns(&img, 2).dimensions(), (4, 2));
    }

    #[test]
    fn test_clockwise_quarter_turn_moves_top_left_to_top_right() {
        let img = gradient(4, 2);
        let rotated = rotate_quarter_turns(&img, 1);
        assert_eq!(rotated.get_pixel(1, 0), img.get_pixel(0, 0));
    }

    #[test]
    fn test_crop_region_is_clipped() {
        let img = gradient(10, 10);
        let cropped = crop_region(&img, 8, 8, 5, 5);
        assert_eq!(cropped.dimensions(), (2, 2));
        assert_eq!(cropped.get_pixel(0, 0), img.get_pixel(8, 8));
    }

    #[test]
    fn test_rotate_about_center_by_zero_is_identity() {
        let img = gradient(5, 3);
        assert_eq!(rotate_about_center(&img, 0.0), img);
    }

    #[test]
    fn test_encode_then_decode_keeps_size() {
        let img = gradient(6, 3);
        let bytes = encode_png(&img).unwrap();
        let decoded = decode_image_blocking(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (6, 3));
    }

    #[test]
    fn test_decode_garbage_is_an_error() {
        let result = decode_image_blocking(b"definitely not an image");
        assert!(matches!(result, Err(EditorError::Decode(_))));
    }
}
