//! Fonts used to burn text overlays into exported images.

use std::collections::HashMap;

use ab_glyph::{Font, FontArc, GlyphId, ScaleFont, point};
use egui::Color32;
use image::RgbaImage;

use crate::error::{EditorError, EditorResult};
use crate::raster;

/// Registered fonts, looked up by family name
#[derive(Clone, Default)]
pub struct FontBook {
    fonts: HashMap<String, FontArc>,
    default_family: Option<String>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut families: Vec<_> = self.fonts.keys().collect();
        families.sort();
        f.debug_struct("FontBook")
            .field("families", &families)
            .field("default_family", &self.default_family)
            .finish()
    }
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// A book holding the fonts egui ships with. The proportional UI font
    /// becomes the default.
    pub fn with_builtin_fonts() -> Self {
        let mut book = Self::new();
        let definitions = egui::FontDefinitions::default();
        for (name, data) in &definitions.font_data {
            if let Err(err) = book.register(name, data.font.to_vec()) {
                log::warn!("Skipping built-in font: {err}");
            }
        }
        let proportional = definitions
            .families
            .get(&egui::FontFamily::Proportional)
            .and_then(|names| names.first())
            .cloned();
        if let Some(name) = proportional {
            book.set_default(&name);
        }
        book
    }

    /// Parse and register a TrueType/OpenType font. The first font
    /// registered becomes the default until `set_default` says otherwise.
    pub fn register(&mut self, family: &str, data: Vec<u8>) -> EditorResult<()> {
        let font = FontArc::try_from_vec(data).map_err(|_| EditorError::InvalidFont {
            family: family.to_owned(),
        })?;
        let key = normalize(family);
        if self.default_family.is_none() {
            self.default_family = Some(key.clone());
        }
        self.fonts.insert(key, font);
        log::debug!("Registered font '{family}'");
        Ok(())
    }

    pub fn set_default(&mut self, family: &str) -> bool {
        let key = normalize(family);
        if self.fonts.contains_key(&key) {
            self.default_family = Some(key);
            true
        } else {
            false
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(String::as_str)
    }

    /// Resolve a CSS-style family list ("Georgia, serif") to a font.
    /// Falls back to the default font when no listed family is registered.
    pub fn resolve(&self, family_list: &str) -> Option<&FontArc> {
        family_list
            .split(',')
            .map(normalize)
            .find_map(|family| self.fonts.get(&family))
            .or_else(|| self.default_family.as_ref().and_then(|d| self.fonts.get(d)))
    }
}

fn normalize(family: &str) -> String {
    family
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_ascii_lowercase()
}

/// How a run of text should be drawn
#[derive(Debug, Clone, Copy)]
pub struct TextRun<'a> {
    pub text: &'a str,
    pub size: f32,
    pub color: Color32,
    pub bold: bool,
    pub italic: bool,
}

/// Draw a single line of text into `target`.
///
/// `left` is the x of the first glyph and `bottom` the bottom of the text's
/// em box, both in target pixels. Bold is a one pixel double strike and
/// italic a shear around the baseline.
pub fn draw_text(target: &mut RgbaImage, font: &FontArc, run: &TextRun<'_>, left: f32, bottom: f32) {
    if run.text.is_empty() || run.size <= 0.0 {
        return;
    }
    let scaled = font.as_scaled(run.size);
    // descent is negative
    let baseline = bottom + scaled.descent();
    let color = run.color.to_array();

    let mut cursor = left;
    let mut previous: Option<GlyphId> = None;
    for ch in run.text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = previous {
            cursor += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(run.size, point(cursor, baseline));
        cursor += scaled.h_advance(id);
        previous = Some(id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|px, py, coverage| {
            let mut x = bounds.min.x + px as f32;
            let y = bounds.min.y + py as f32;
            if run.italic {
                x += (baseline - y) * 0.2;
            }
            let (ix, iy) = (x.round() as i64, y.round() as i64);
            raster::blend_pixel(target, ix, iy, color, coverage);
            if run.bold {
                raster::blend_pixel(target, ix + 1, iy, color, coverage);
            }
        });
    }
}
