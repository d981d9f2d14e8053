//! Pixel rendition of the filter descriptor, used for previews and export.
//!
//! Each function follows the CSS filter definition of the same name and
//! they are applied in descriptor order.

use image::{Rgba, RgbaImage, imageops};

use crate::tools::FilterSettings;

type Matrix = [[f32; 3]; 3];

/// Apply every non-identity filter in `settings` to a copy of `image`
pub fn apply_filters(image: &RgbaImage, settings: &FilterSettings) -> RgbaImage {
    let mut out = image.clone();
    if settings.is_identity() {
        return out;
    }

    let brightness = settings.brightness / 100.0;
    if brightness != 1.0 {
        map_channels(&mut out, |v| v * brightness);
    }

    let contrast = settings.contrast / 100.0;
    if contrast != 1.0 {
        map_channels(&mut out, |v| (v - 0.5) * contrast + 0.5);
    }

    if settings.saturation != 100.0 {
        apply_matrix(&mut out, &saturate_matrix(settings.saturation / 100.0));
    }

    if settings.blur > 0.0 {
        out = imageops::blur(&out, settings.blur);
    }

    if settings.grayscale > 0.0 {
        apply_matrix(&mut out, &grayscale_matrix(settings.grayscale / 100.0));
    }

    if settings.sepia > 0.0 {
        apply_matrix(&mut out, &sepia_matrix(settings.sepia / 100.0));
    }

    if settings.hue.rem_euclid(360.0) != 0.0 {
        out = imageops::huerotate(&out, settings.hue.round() as i32);
    }

    out
}

fn map_channels(image: &mut RgbaImage, f: impl Fn(f32) -> f32) {
    for Rgba([r, g, b, _]) in image.pixels_mut() {
        for channel in [r, g, b] {
            *channel = to_byte(f(*channel as f32 / 255.0));
        }
    }
}

fn apply_matrix(image: &mut RgbaImage, m: &Matrix) {
    for Rgba([r, g, b, _]) in image.pixels_mut() {
        let src = [*r as f32 / 255.0, *g as f32 / 255.0, *b as f32 / 255.0];
        let dot = |row: &[f32; 3]| row[0] * src[0] + row[1] * src[1] + row[2] * src[2];
        *r = to_byte(dot(&m[0]));
        *g = to_byte(dot(&m[1]));
        *b = to_byte(dot(&m[2]));
    }
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn saturate_matrix(s: f32) -> Matrix {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn grayscale_matrix(amount: f32) -> Matrix {
    let a = 1.0 - amount.clamp(0.0, 1.0);
    [
        [0.2126 + 0.7874 * a, 0.7152 - 0.7152 * a, 0.0722 - 0.0722 * a],
        [0.2126 - 0.2126 * a, 0.7152 + 0.2848 * a, 0.0722 - 0.0722 * a],
        [0.2126 - 0.2126 * a, 0.7152 - 0.7152 * a, 0.0722 + 0.9278 * a],
    ]
}

fn sepia_matrix(amount: f32) -> Matrix {
    let a = 1.0 - amount.clamp(0.0, 1.0);
    [
        [0.393 + 0.607 * a, 0.769 - 0.769 * a, 0.189 - 0.189 * a],
        [0.349 - 0.349 * a, 0.686 + 0.314 * a, 0.168 - 0.168 * a],
        [0.272 - 0.272 * a, 0.534 - 0.534 * a, 0.131 + 0.869 * a],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::FilterParam;

    fn solid(color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(4, 4, Rgba(color))
    }

    #[test]
    fn test_identity_settings_leave_pixels_alone() {
        let img = solid([12, 34, 56, 255]);
        assert_eq!(apply_filters(&img, &FilterSettings::default()), img);
    }

    #[test]
    fn test_brightness_scales_channels() {
        let mut settings = FilterSettings::default();
        settings.set(FilterParam::Brightness, 50.0);
        let out = apply_filters(&solid([200, 100, 0, 255]), &settings);
        assert_eq!(out.get_pixel(0, 0), &Rgba([100, 50, 0, 255]));
    }

    #[test]
    fn test_full_grayscale_equalizes_channels() {
        let mut settings = FilterSettings::default();
        settings.set(FilterParam::Grayscale, 100.0);
        let Rgba([r, g, b, a]) = *apply_filters(&solid([255, 0, 0, 200]), &settings).get_pixel(1, 1);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 200);
    }

    #[test]
    fn test_zero_contrast_is_mid_gray() {
        let mut settings = FilterSettings::default();
        settings.set(FilterParam::Contrast, 0.0);
        let out = apply_filters(&solid([0, 255, 90, 255]), &settings);
        assert_eq!(out.get_pixel(2, 2), &Rgba([128, 128, 128, 255]));
    }
}
